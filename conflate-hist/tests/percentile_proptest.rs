//! Property-based checks for histogram invariants I-5 and I-6.

use conflate_hist::store::CountStore;
use conflate_hist::{Bucketizer, DenseLongStore, Recorder, Reporter};
use proptest::prelude::*;

proptest! {
    /// I-5: the sum of every cell's count always equals the recorder's
    /// running count, for any sequence of recorded values.
    #[test]
    fn sum_over_cells_equals_count(values in prop::collection::vec(0u64..1_000_000, 0..500)) {
        let bucketizer = Bucketizer::new(3).unwrap();
        let mut recorder = Recorder::new(bucketizer, DenseLongStore::new());
        for &v in &values {
            recorder.record(v);
        }

        let b = recorder.bucketizer();
        let mut sum = 0u64;
        for bucket in 0..b.num_buckets() {
            for position in 0..b.bucket_length() {
                sum += recorder.store().count_at(bucket, position as usize);
            }
        }
        prop_assert_eq!(sum, recorder.count());
        prop_assert_eq!(recorder.count(), values.len() as u64);
    }

    /// I-6: cells represent value ranges via their upper bound (matching
    /// scenario 6's "returns the cell's upper-value"), so both
    /// `value_at_percentile(0.0)` and `value_at_percentile(1.0)` are never
    /// smaller than the true `min()`/`max()` they approximate, and
    /// `value_at_percentile(1.0)` never exceeds max's bucket width past it.
    #[test]
    fn percentile_bounds_respect_min_and_max(values in prop::collection::vec(1u64..1_000_000, 1..500)) {
        let bucketizer = Bucketizer::new(3).unwrap();
        let mut recorder = Recorder::new(bucketizer, DenseLongStore::new());
        for &v in &values {
            recorder.record(v);
        }

        let reporter = Reporter::new(
            recorder.bucketizer(),
            recorder.store(),
            recorder.count(),
            recorder.min(),
            recorder.max(),
        );
        let b = recorder.bucketizer();
        let max_cell_width = 1u64 << b.bucket_for(recorder.max()).saturating_sub(1);

        prop_assert!(reporter.value_at_percentile(0.0) >= recorder.min());
        prop_assert!(reporter.value_at_percentile(1.0) >= recorder.max());
        prop_assert!(reporter.value_at_percentile(1.0) <= recorder.max() + max_cell_width);
    }

    /// Percentile is monotonic non-decreasing as p increases.
    #[test]
    fn percentile_is_monotonic(values in prop::collection::vec(1u64..1_000_000, 1..300)) {
        let bucketizer = Bucketizer::new(3).unwrap();
        let mut recorder = Recorder::new(bucketizer, DenseLongStore::new());
        for &v in &values {
            recorder.record(v);
        }
        let reporter = Reporter::new(
            recorder.bucketizer(),
            recorder.store(),
            recorder.count(),
            recorder.min(),
            recorder.max(),
        );

        let ps = [0.0, 0.1, 0.25, 0.5, 0.75, 0.9, 0.99, 1.0];
        let mut prev = 0u64;
        for &p in &ps {
            let v = reporter.value_at_percentile(p);
            prop_assert!(v >= prev, "percentile regressed at p={p}: {v} < {prev}");
            prev = v;
        }
    }
}
