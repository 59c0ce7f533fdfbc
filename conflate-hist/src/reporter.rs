//! Read-side percentile extraction.

use crate::bucket::Bucketizer;
use crate::store::CountStore;

/// Reads percentiles and summary statistics out of a recorded histogram.
///
/// A reporter borrows rather than owns its bucketizer and store, so it can
/// be built cheaply whenever a snapshot is needed and dropped again; it
/// holds no state of its own between calls.
pub struct Reporter<'a, S> {
    bucketizer: &'a Bucketizer,
    store: &'a S,
    count: u64,
    min: u64,
    max: u64,
}

impl<'a, S: CountStore> Reporter<'a, S> {
    /// Build a reporter over a recorder's bucketizer, store and summary
    /// stats — see [`crate::recorder::Recorder::store`] and friends.
    pub fn new(bucketizer: &'a Bucketizer, store: &'a S, count: u64, min: u64, max: u64) -> Self {
        Self {
            bucketizer,
            store,
            count,
            min,
            max,
        }
    }

    /// Total recorded value count.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Smallest recorded value, `0` if empty.
    #[must_use]
    pub fn min(&self) -> u64 {
        self.min
    }

    /// Largest recorded value, `0` if empty.
    #[must_use]
    pub fn max(&self) -> u64 {
        self.max
    }

    /// Value at or below which `p` (a fraction in `[0, 1]`) of recorded
    /// values fall.
    ///
    /// `p` is clamped into `[0, 1]` and nudged toward `0` by one ULP before
    /// use (mirroring `Math.nextAfter(p, Double.NEGATIVE_INFINITY)` in the
    /// system this was modeled on), so `value_at_percentile(1.0)` lands on
    /// the bucket holding the true maximum rather than one past it due to
    /// floating-point rounding at the boundary. Returns `0` if nothing has
    /// been recorded.
    #[must_use]
    pub fn value_at_percentile(&self, p: f64) -> u64 {
        if self.count == 0 {
            return 0;
        }
        let clamped = p.clamp(0.0, 1.0);
        let nudged = next_after_toward_zero(clamped).clamp(0.0, 1.0);
        let target = ((nudged * self.count as f64).ceil() as u64).max(1);

        let mut accumulated: u64 = 0;
        for bucket in 0..self.bucketizer.num_buckets() {
            let width = self.bucketizer.bucket_length();
            for position in 0..width {
                let hits = self.store.count_at(bucket, position as usize);
                if hits == 0 {
                    continue;
                }
                accumulated += hits;
                if accumulated >= target {
                    return self.bucketizer.value_at(bucket, position);
                }
            }
        }
        self.max
    }
}

/// Largest representable `f64` strictly less than `x`, or `x` unchanged at
/// the representable limits. Stands in for `f64::next_down` (still
/// unstable) since this is the one place that needs it.
fn next_after_toward_zero(x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    f64::from_bits(x.to_bits() - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DenseLongStore;

    fn filled_store(b: &Bucketizer, values: &[u64]) -> (DenseLongStore, u64, u64, u64) {
        let mut store = DenseLongStore::new();
        let mut min = u64::MAX;
        let mut max = 0;
        for &v in values {
            let (bucket, position) = b.locate(v);
            store.ensure_bucket(bucket, b.bucket_length() as usize);
            store.increment(bucket, position);
            min = min.min(v);
            max = max.max(v);
        }
        (store, values.len() as u64, min, max)
    }

    #[test]
    fn empty_histogram_reports_zero_percentile() {
        let b = Bucketizer::new(2).unwrap();
        let store = DenseLongStore::new();
        let r = Reporter::new(&b, &store, 0, 0, 0);
        assert_eq!(r.value_at_percentile(0.5), 0);
    }

    #[test]
    fn median_of_uniform_small_values_is_exact() {
        let b = Bucketizer::new(3).unwrap();
        let values: Vec<u64> = (1..=100).collect();
        let (store, count, min, max) = filled_store(&b, &values);
        let r = Reporter::new(&b, &store, count, min, max);
        let p50 = r.value_at_percentile(0.5);
        assert!((45..=55).contains(&p50), "p50={p50}");
    }

    #[test]
    fn p100_reaches_the_maximum() {
        let b = Bucketizer::new(2).unwrap();
        let values = [1u64, 2, 3, 1000];
        let (store, count, min, max) = filled_store(&b, &values);
        let r = Reporter::new(&b, &store, count, min, max);
        assert!(r.value_at_percentile(1.0) >= 1000);
    }
}
