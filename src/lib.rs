//! Low-latency conflation queues and precision histograms for in-process pipelines.
//!
//! This is a thin facade over [`conflate_core`] (the conflation-queue variants)
//! and [`conflate_hist`] (the precision histogram), re-exported as `queue` and
//! `histogram` for a single point of entry.
#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

/// Conflation queues: Atomic, Evict and Merge variants over a pluggable
/// [`BackingQueue`](queue::BackingQueue) and [`KeyIndex`](queue::KeyIndex).
pub mod queue {
    pub use conflate_core::*;
}

/// Precision histograms with configurable decimal significant digits.
pub mod histogram {
    pub use conflate_hist::*;
}
