//! Allocation-lean precision histograms.
//!
//! A histogram here is built from three pieces that stay deliberately
//! separate: a [`Bucketizer`](bucket::Bucketizer) that maps values to
//! `(bucket, position)` cells at a chosen decimal precision, a
//! [`CountStore`](store::CountStore) that holds one counter per cell, and a
//! [`Recorder`](recorder::Recorder) that ties the two together with
//! running min/max/count. A [`Reporter`](reporter::Reporter) reads
//! percentiles back out without needing write access.
//!
//! Recording is single-writer — nothing in this crate is atomic. Pair a
//! recorder with a conflation queue's consumer side when multiple threads
//! need to feed one histogram.
#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

pub mod bucket;
pub mod error;
pub mod recorder;
pub mod reporter;
pub mod store;

pub use bucket::Bucketizer;
pub use error::{HistogramError, Result};
pub use recorder::Recorder;
pub use reporter::Reporter;
pub use store::{CountStore, DenseIntStore, DenseLongStore, SparseStore};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_to_end_record_and_report_roundtrip() {
        let bucketizer = Bucketizer::new(2).unwrap();
        let mut recorder = Recorder::new(bucketizer, SparseStore::new());
        for _ in 0..300 {
            recorder.record(7);
        }
        assert_eq!(recorder.count(), 300);
        assert_eq!(recorder.min(), 7);
        assert_eq!(recorder.max(), 7);

        let reporter = Reporter::new(
            recorder.bucketizer(),
            recorder.store(),
            recorder.count(),
            recorder.min(),
            recorder.max(),
        );
        assert_eq!(reporter.value_at_percentile(0.5), 7);
        assert_eq!(reporter.value_at_percentile(1.0), 7);
    }
}
