//! Difference range table for value differencing.

use crate::config::MAX_BIT_DEPTH;
use crate::error::{Error, Result};

/// One interval of the range table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DifferenceRange {
    /// Smallest difference in the interval.
    pub lower: u64,
    /// Largest difference in the interval.
    pub upper: u64,
    /// Bits embeddable in a pair whose difference falls here.
    pub bits: u32,
}

impl DifferenceRange {
    /// Largest difference an embedding can produce: `lower + 2^bits - 1`.
    pub fn max_embedded(&self) -> u64 {
        self.lower + ((1u64 << self.bits) - 1)
    }

    /// Whether `d` falls inside the interval.
    pub fn contains(&self, d: u64) -> bool {
        self.lower <= d && d <= self.upper
    }
}

/// Partition of `[0, max_difference]` into contiguous intervals.
///
/// The first interval is `[0, 2^f - 1]` and carries `f` bits; after it,
/// `[2^n, 2^(n+1) - 1]` carries `n` bits. A final interval cut short by
/// `max_difference` carries `floor(log2(width))` bits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeTable {
    ranges: Vec<DifferenceRange>,
}

impl RangeTable {
    /// Build the table for differences up to `max_difference`.
    pub fn define(max_difference: u64, first_range_bits: u8) -> Result<Self> {
        let first = u32::from(first_range_bits);
        if first == 0 || first > MAX_BIT_DEPTH {
            return Err(Error::InvalidParameter(format!(
                "first range bits must be between 1 and {}, got {}",
                MAX_BIT_DEPTH, first_range_bits
            )));
        }

        let mut ranges = Vec::new();
        let mut lower = 0u64;
        let mut nominal_upper = (1u64 << first) - 1;
        loop {
            let upper = nominal_upper.min(max_difference);
            let width = upper - lower + 1;
            ranges.push(DifferenceRange {
                lower,
                upper,
                bits: width.ilog2(),
            });
            if upper >= max_difference {
                break;
            }
            lower = upper + 1;
            nominal_upper = lower
                .checked_mul(2)
                .map(|v| v - 1)
                .unwrap_or(u64::MAX);
        }
        Ok(Self { ranges })
    }

    /// Table for an element range of `[0, 2^bit_depth - 1]`.
    pub fn for_bit_depth(bit_depth: u32, first_range_bits: u8) -> Result<Self> {
        if bit_depth == 0 || bit_depth > MAX_BIT_DEPTH {
            return Err(Error::InvalidParameter(format!(
                "bit depth must be between 1 and {}, got {}",
                MAX_BIT_DEPTH, bit_depth
            )));
        }
        Self::define((1u64 << bit_depth) - 1, first_range_bits)
    }

    /// Interval containing `d`, if `d` is within the table.
    pub fn lookup(&self, d: u64) -> Option<&DifferenceRange> {
        let idx = self.ranges.partition_point(|r| r.upper < d);
        self.ranges.get(idx).filter(|r| r.contains(d))
    }

    /// All intervals, in ascending order.
    pub fn ranges(&self) -> &[DifferenceRange] {
        &self.ranges
    }

    /// Largest bit count of any interval.
    pub fn max_bits(&self) -> u32 {
        self.ranges.iter().map(|r| r.bits).max().unwrap_or(0)
    }

    /// Largest difference covered.
    pub fn max_difference(&self) -> u64 {
        self.ranges.last().map(|r| r.upper).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eight_bit_table() {
        let table = RangeTable::for_bit_depth(8, 3).unwrap();
        let expected = [
            (0, 7, 3),
            (8, 15, 3),
            (16, 31, 4),
            (32, 63, 5),
            (64, 127, 6),
            (128, 255, 7),
        ];
        let actual: Vec<_> = table
            .ranges()
            .iter()
            .map(|r| (r.lower, r.upper, r.bits))
            .collect();
        assert_eq!(actual, expected);
        assert_eq!(table.max_bits(), 7);
    }

    #[test]
    fn test_partition_is_contiguous() {
        for (max, first) in [(255, 3), (1, 3), (1000, 2), (65535, 4), (u32::MAX as u64, 3)] {
            let table = RangeTable::define(max, first).unwrap();
            let ranges = table.ranges();
            assert_eq!(ranges[0].lower, 0);
            assert_eq!(table.max_difference(), max);
            for pair in ranges.windows(2) {
                assert_eq!(pair[0].upper + 1, pair[1].lower);
            }
            for r in ranges {
                assert!(r.max_embedded() <= r.upper);
            }
        }
    }

    #[test]
    fn test_every_difference_matches_once() {
        let table = RangeTable::define(1000, 3).unwrap();
        for d in 0..=1000u64 {
            let hits = table.ranges().iter().filter(|r| r.contains(d)).count();
            assert_eq!(hits, 1, "difference {}", d);
            assert!(table.lookup(d).unwrap().contains(d));
        }
        assert!(table.lookup(1001).is_none());
    }

    #[test]
    fn test_truncated_last_range() {
        // [0,7]:3 [8,15]:3 [16,20] has width 5 -> 2 bits.
        let table = RangeTable::define(20, 3).unwrap();
        let last = table.ranges().last().unwrap();
        assert_eq!((last.lower, last.upper, last.bits), (16, 20, 2));

        // A one-wide tail carries nothing.
        let table = RangeTable::define(16, 3).unwrap();
        assert_eq!(table.ranges().last().unwrap().bits, 0);
    }

    #[test]
    fn test_small_depth() {
        let table = RangeTable::for_bit_depth(2, 3).unwrap();
        assert_eq!(table.ranges().len(), 1);
        assert_eq!(table.ranges()[0].bits, 2);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(RangeTable::define(255, 0).is_err());
        assert!(RangeTable::for_bit_depth(0, 3).is_err());
        assert!(RangeTable::for_bit_depth(33, 3).is_err());
    }
}
