//! Capacity accounting for pre-flight validation.

use crate::carrier::Shape;
use crate::error::{Error, Result};
use crate::framing::Framing;

/// Embedding capacity of a carrier under one codec configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capacity {
    /// Bits the carrier can hold, framing included.
    pub total_bits: usize,
    /// Embedding units that carry bits (elements, or usable pair channels).
    pub units: usize,
    /// Embedding units that were skipped as unusable.
    pub skipped_units: usize,
}

impl Capacity {
    /// Fail with [`Error::Capacity`] unless `needed_bits` fit.
    pub fn ensure_fits(&self, needed_bits: usize) -> Result<()> {
        if needed_bits > self.total_bits {
            return Err(Error::Capacity {
                needed: needed_bits,
                available: self.total_bits,
            });
        }
        Ok(())
    }

    /// Largest payload, in whole bytes, that fits once framing is added.
    pub fn max_payload_bytes(&self, framing: &Framing) -> usize {
        let bits = self
            .total_bits
            .saturating_sub(framing.overhead_bits())
            .min(framing.max_payload_bits());
        bits / 8
    }
}

/// Fixed-rate capacity: `k` bits for every element. Depends on the shape only.
pub fn fixed_rate_capacity(shape: &Shape, bits_per_element: u8) -> usize {
    shape.len() * bits_per_element as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_fits() {
        let capacity = Capacity {
            total_bits: 40,
            units: 40,
            skipped_units: 0,
        };
        assert!(capacity.ensure_fits(40).is_ok());
        let err = capacity.ensure_fits(41).unwrap_err();
        assert!(matches!(err, Error::Capacity { needed: 41, available: 40 }));
    }

    #[test]
    fn test_max_payload_bytes() {
        let capacity = Capacity {
            total_bits: 100,
            ..Default::default()
        };
        assert_eq!(capacity.max_payload_bytes(&Framing::default()), 8);
        assert_eq!(capacity.max_payload_bytes(&Framing::Raw), 12);
        assert_eq!(capacity.max_payload_bytes(&Framing::default_delimiter()), 3);
        // A 4-bit header cannot describe more than 14 bits.
        assert_eq!(capacity.max_payload_bytes(&Framing::length_prefix(4)), 1);
    }

    #[test]
    fn test_fixed_rate_capacity_monotonic() {
        let mut previous = 0;
        for len in [0, 1, 8, 100, 4096] {
            let bits = fixed_rate_capacity(&Shape::flat(len), 2);
            assert!(bits >= previous);
            previous = bits;
        }
        let image = Shape::new(vec![4, 4], 3).unwrap();
        assert_eq!(fixed_rate_capacity(&image, 1), 48);
    }
}
