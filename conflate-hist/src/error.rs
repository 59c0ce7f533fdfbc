//! Error taxonomy for histogram construction and recording.

/// Errors a precision histogram can report.
#[derive(Debug, snafu::Snafu)]
#[snafu(visibility(pub(crate)))]
#[non_exhaustive]
pub enum HistogramError {
    /// `digits` was outside the supported `[1, 5]` range.
    #[snafu(display("digits must be in 1..=5, got {digits}"))]
    InvalidDigits {
        /// The out-of-range value supplied.
        digits: u32,
    },

    /// A negative value was offered to the signed recording entry point.
    #[snafu(display("cannot record a negative value"))]
    NegativeValue,
}

/// Convenience alias for this crate's `Result`.
pub type Result<T, E = HistogramError> = core::result::Result<T, E>;
