//! Single-writer value recording.

use crate::bucket::Bucketizer;
use crate::error::{HistogramError, Result};
use crate::store::CountStore;

/// Records values into a [`CountStore`] keyed by a [`Bucketizer`].
///
/// Recording is not thread-safe: callers own exclusive access to a recorder
/// for the duration of a `record` call, same as the conflation queues'
/// appender/poller scratch objects own their slice of a queue.
pub struct Recorder<S> {
    bucketizer: Bucketizer,
    store: S,
    count: u64,
    min: u64,
    max: u64,
}

impl<S: CountStore> Recorder<S> {
    /// Build a recorder from an already-constructed bucketizer and an
    /// empty count store.
    pub fn new(bucketizer: Bucketizer, store: S) -> Self {
        Self {
            bucketizer,
            store,
            count: 0,
            min: u64::MAX,
            max: 0,
        }
    }

    /// Record an unsigned value.
    pub fn record(&mut self, value: u64) {
        let (bucket, position) = self.bucketizer.locate(value);
        self.store
            .ensure_bucket(bucket, self.bucketizer.bucket_length() as usize);
        self.store.increment(bucket, position);
        self.count += 1;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    /// Record a signed value, rejecting negatives.
    pub fn record_signed(&mut self, value: i64) -> Result<()> {
        if value < 0 {
            return Err(HistogramError::NegativeValue);
        }
        self.record(value as u64);
        Ok(())
    }

    /// Grow backing storage so that every bucket touched by values up to
    /// and including `max_value` is pre-allocated, so the first `record`
    /// calls in that range don't pay for storage growth.
    pub fn pre_allocate_up_to(&mut self, max_value: u64) {
        let top_bucket = self.bucketizer.bucket_for(max_value);
        for bucket in 0..=top_bucket {
            self.store
                .ensure_bucket(bucket, self.bucketizer.bucket_length() as usize);
        }
    }

    /// Reset counts, min and max to the empty-histogram state, keeping
    /// allocated storage in place so the next `record` stays allocation-free.
    pub fn reset(&mut self) {
        self.store.zero_all();
        self.count = 0;
        self.min = u64::MAX;
        self.max = 0;
    }

    /// Reset counts, min and max to the empty-histogram state and release
    /// the store's backing allocations. Unlike [`Self::reset`], the next
    /// `record` call reallocates bucket storage from scratch.
    pub fn clear(&mut self) {
        log::debug!("recorder: releasing count store allocations");
        self.store.release_all();
        self.count = 0;
        self.min = u64::MAX;
        self.max = 0;
    }

    /// Total number of values recorded since construction or the last
    /// [`Self::reset`].
    #[must_use]
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Smallest value recorded, or `0` if nothing has been recorded.
    #[must_use]
    pub fn min(&self) -> u64 {
        if self.count == 0 {
            0
        } else {
            self.min
        }
    }

    /// Largest value recorded, or `0` if nothing has been recorded.
    #[must_use]
    pub fn max(&self) -> u64 {
        self.max
    }

    /// The bucketizer this recorder was built with.
    #[must_use]
    pub fn bucketizer(&self) -> &Bucketizer {
        &self.bucketizer
    }

    /// Borrow the underlying count store, e.g. to hand to a
    /// [`Reporter`](crate::reporter::Reporter).
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }
}
