//! Value → `(bucket, position)` addressing.
//!
//! All three [`CountStore`](crate::store::CountStore) backends share this
//! one addressing scheme (the "variable-width" layout: bucket 0 and every
//! later bucket both have `2^(s-1)` positions) — they differ only in what
//! they store at a cell, not in how a value maps to one.

use crate::error::{HistogramError, Result};

/// Maps values to histogram cells for a fixed decimal-digit precision.
#[derive(Debug, Clone, Copy)]
pub struct Bucketizer {
    s: u32,
    bucket_length: u64,
    num_buckets: usize,
}

impl Bucketizer {
    /// Build a bucketizer for `digits` significant decimal digits, `1..=5`.
    ///
    /// `s` is precomputed per `digits` rather than derived from a runtime
    /// `log2`/`ceil` of `10^digits`, since the domain is exactly five values
    /// and this sidesteps floating-point rounding at the one boundary that
    /// actually matters (this parameter fixes every bucket's width).
    pub fn new(digits: u32) -> Result<Self> {
        let s = match digits {
            1 => 5,
            2 => 8,
            3 => 11,
            4 => 15,
            5 => 18,
            _ => {
                log::warn!("bucketizer construction refused digits={digits}, must be 1..=5");
                return Err(HistogramError::InvalidDigits { digits });
            }
        };
        Ok(Self {
            s,
            bucket_length: 1u64 << (s - 1),
            num_buckets: (64 - s + 1) as usize,
        })
    }

    /// Significant-bit parameter this bucketizer was built with.
    #[must_use]
    pub const fn significant_bits(&self) -> u32 {
        self.s
    }

    /// Number of positions in every bucket.
    #[must_use]
    pub const fn bucket_length(&self) -> u64 {
        self.bucket_length
    }

    /// Total number of buckets needed to cover the full `u64` range.
    #[must_use]
    pub const fn num_buckets(&self) -> usize {
        self.num_buckets
    }

    /// Locate the cell `v` falls into.
    #[must_use]
    pub fn locate(&self, v: u64) -> (usize, usize) {
        let bits = 64 - v.leading_zeros() as i64;
        let bucket = (bits - self.s as i64 + 1).max(0) as usize;
        let shift = bucket.saturating_sub(1) as u32;
        let raw = v >> shift;
        let position = if bucket == 0 {
            raw
        } else {
            raw - self.bucket_length
        };
        (bucket, position as usize)
    }

    /// The largest bucket index that `locate` could return for `v`.
    #[must_use]
    pub fn bucket_for(&self, v: u64) -> usize {
        self.locate(v).0
    }

    /// The value represented by cell `(bucket, position)` — the inverse of
    /// [`Self::locate`], used by percentile extraction.
    #[must_use]
    pub fn value_at(&self, bucket: usize, position: u64) -> u64 {
        if bucket == 0 {
            position
        } else {
            ((1 + self.bucket_length + position) << (bucket - 1)) - 1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_digits() {
        assert!(Bucketizer::new(0).is_err());
        assert!(Bucketizer::new(6).is_err());
    }

    #[test]
    fn zero_locates_to_first_cell() {
        let b = Bucketizer::new(3).unwrap();
        assert_eq!(b.locate(0), (0, 0));
    }

    #[test]
    fn locate_and_value_at_are_consistent_within_a_cell() {
        let b = Bucketizer::new(3).unwrap();
        for v in [1u64, 7, 100, 1_000, 999_999, u32::MAX as u64] {
            let (bucket, position) = b.locate(v);
            let represented = b.value_at(bucket, position as u64);
            // The cell's represented value is the *upper* bound of the
            // range it covers, so it must be >= v and in the same cell.
            assert_eq!(b.locate(represented), (bucket, position), "v={v}");
            assert!(represented >= v, "v={v} represented={represented}");
        }
    }

    #[test]
    fn bucket_zero_spans_contiguous_small_values() {
        let b = Bucketizer::new(2).unwrap();
        let len = b.bucket_length();
        for v in 0..len {
            assert_eq!(b.locate(v), (0, v as usize));
        }
    }
}
