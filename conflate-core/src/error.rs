//! Error taxonomy for conflation queue construction and operation.
//!
//! Validation and construction errors are returned synchronously and leave
//! queue state unchanged. Backing-queue refusal is fatal and propagated.
//! Callback (merger/listener) panics are caught at the boundary where that is
//! possible (see [`crate::queue::merge`]) and rewrapped here.

/// Errors a conflation queue can report.
#[derive(Debug, snafu::Snafu)]
#[snafu(visibility(pub(crate)))]
#[non_exhaustive]
pub enum ConflateError {
    /// A value or key failed validation before being accepted.
    #[snafu(display("validation failed: {reason}"))]
    Validation {
        /// Human-readable reason, fixed at the call site (no formatting
        /// allocation on the hot path).
        reason: &'static str,
    },

    /// Queue construction received inconsistent or missing configuration.
    #[snafu(display("construction failed: {reason}"))]
    Construction {
        /// Human-readable reason.
        reason: &'static str,
    },

    /// The backing queue refused to accept a newly-queued Entry.
    ///
    /// This is fatal: the Entry is left in the "queued" state (its value slot
    /// is non-empty) without actually being reachable from the backing queue,
    /// which would otherwise violate invariant I-1/I-4. Callers should treat
    /// this as an unrecoverable condition for the affected queue instance.
    #[snafu(display("backing queue refused entry"))]
    BackingQueueRefused,

    /// A merger or listener callback panicked.
    #[cfg(feature = "std")]
    #[snafu(display("callback panicked"))]
    Callback {
        /// The panic payload, if it could be captured as a string.
        message: alloc::string::String,
    },
}

impl ConflateError {
    /// Build a [`ConflateError::Validation`].
    #[must_use]
    pub const fn validation(reason: &'static str) -> Self {
        Self::Validation { reason }
    }

    /// Build a [`ConflateError::Construction`].
    #[must_use]
    pub const fn construction(reason: &'static str) -> Self {
        Self::Construction { reason }
    }
}

/// Convenience alias for this crate's `Result`.
pub type Result<T, E = ConflateError> = core::result::Result<T, E>;
