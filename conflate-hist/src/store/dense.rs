//! Fixed-width dense count stores.

use alloc::vec::Vec;

use super::CountStore;

/// One `u64` counter per cell. Widest range, largest footprint.
#[derive(Debug, Default)]
pub struct DenseLongStore {
    buckets: Vec<Vec<u64>>,
}

impl DenseLongStore {
    /// An empty store with no buckets allocated yet.
    #[must_use]
    pub fn new() -> Self {
        Self { buckets: Vec::new() }
    }
}

impl CountStore for DenseLongStore {
    fn ensure_bucket(&mut self, bucket: usize, positions: usize) {
        if self.buckets.len() <= bucket {
            self.buckets.resize_with(bucket + 1, Vec::new);
        }
        let row = &mut self.buckets[bucket];
        if row.len() < positions {
            row.resize(positions, 0);
        }
    }

    fn increment(&mut self, bucket: usize, position: usize) {
        self.buckets[bucket][position] += 1;
    }

    fn count_at(&self, bucket: usize, position: usize) -> u64 {
        self.buckets
            .get(bucket)
            .and_then(|row| row.get(position))
            .copied()
            .unwrap_or(0)
    }

    fn zero_all(&mut self) {
        for row in &mut self.buckets {
            row.iter_mut().for_each(|c| *c = 0);
        }
    }

    fn release_all(&mut self) {
        self.buckets = Vec::new();
    }
}

/// One `u32` counter per cell. Half the footprint of [`DenseLongStore`];
/// a single cell saturates (rather than wraps) at `u32::MAX`.
#[derive(Debug, Default)]
pub struct DenseIntStore {
    buckets: Vec<Vec<u32>>,
}

impl DenseIntStore {
    /// An empty store with no buckets allocated yet.
    #[must_use]
    pub fn new() -> Self {
        Self { buckets: Vec::new() }
    }
}

impl CountStore for DenseIntStore {
    fn ensure_bucket(&mut self, bucket: usize, positions: usize) {
        if self.buckets.len() <= bucket {
            self.buckets.resize_with(bucket + 1, Vec::new);
        }
        let row = &mut self.buckets[bucket];
        if row.len() < positions {
            row.resize(positions, 0);
        }
    }

    fn increment(&mut self, bucket: usize, position: usize) {
        let cell = &mut self.buckets[bucket][position];
        *cell = cell.saturating_add(1);
    }

    fn count_at(&self, bucket: usize, position: usize) -> u64 {
        self.buckets
            .get(bucket)
            .and_then(|row| row.get(position))
            .copied()
            .unwrap_or(0) as u64
    }

    fn zero_all(&mut self) {
        for row in &mut self.buckets {
            row.iter_mut().for_each(|c| *c = 0);
        }
    }

    fn release_all(&mut self) {
        self.buckets = Vec::new();
    }
}
