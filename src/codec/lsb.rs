//! Fixed-rate least-significant-bit substitution.

use crate::carrier::{Carrier, Shape};
use crate::codec::capacity::{fixed_rate_capacity, Capacity};
use crate::codec::Codec;
use crate::config::{DEFAULT_BITS_PER_ELEMENT, MAX_BIT_DEPTH};
use crate::error::{Error, Result};
use crate::framing::{chunk_at, BitStr, FrameDecoder, Framing};
use crate::sequencer::{sequence, Seed};
use log::{debug, trace};

/// Replaces the low `k` bits of each visited element with payload bits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LsbCodec {
    bits_per_element: u8,
    seed: Option<Seed>,
    framing: Framing,
}

impl Default for LsbCodec {
    fn default() -> Self {
        Self {
            bits_per_element: DEFAULT_BITS_PER_ELEMENT,
            seed: None,
            framing: Framing::default(),
        }
    }
}

impl LsbCodec {
    /// Create a codec writing `bits_per_element` bits into every element.
    pub fn new(bits_per_element: u8) -> Result<Self> {
        if bits_per_element == 0 || u32::from(bits_per_element) > MAX_BIT_DEPTH {
            return Err(Error::InvalidParameter(format!(
                "bits per element must be between 1 and {}, got {}",
                MAX_BIT_DEPTH, bits_per_element
            )));
        }
        Ok(Self {
            bits_per_element,
            ..Default::default()
        })
    }

    /// Set the ordering seed.
    pub fn with_seed(mut self, seed: Option<Seed>) -> Self {
        self.seed = seed;
        self
    }

    /// Set the framing.
    pub fn with_framing(mut self, framing: Framing) -> Self {
        self.framing = framing;
        self
    }

    /// Bits written per element.
    pub fn bits_per_element(&self) -> u8 {
        self.bits_per_element
    }

    /// Ordering seed.
    pub fn seed(&self) -> Option<&Seed> {
        self.seed.as_ref()
    }

    /// Capacity in bits of any carrier with this shape.
    pub fn max_capacity(&self, shape: &Shape) -> usize {
        fixed_rate_capacity(shape, self.bits_per_element)
    }

    fn check_depth<C: Carrier + ?Sized>(&self, carrier: &C) -> Result<()> {
        if u32::from(self.bits_per_element) > carrier.bit_depth() {
            return Err(Error::InvalidParameter(format!(
                "cannot replace {} bits of {}-bit elements",
                self.bits_per_element,
                carrier.bit_depth()
            )));
        }
        Ok(())
    }

    fn mask(&self) -> u64 {
        (1u64 << self.bits_per_element) - 1
    }
}

impl Codec for LsbCodec {
    fn framing(&self) -> &Framing {
        &self.framing
    }

    fn capacity<C: Carrier + ?Sized>(&self, carrier: &C) -> Result<Capacity> {
        self.check_depth(carrier)?;
        Ok(Capacity {
            total_bits: self.max_capacity(carrier.shape()),
            units: carrier.len(),
            skipped_units: 0,
        })
    }

    fn write_bits<C: Carrier + ?Sized>(&self, carrier: &mut C, bits: &BitStr) -> Result<usize> {
        self.check_depth(carrier)?;
        let k = u32::from(self.bits_per_element);
        let units = bits.len().div_ceil(k as usize);
        let positions = sequence(carrier.shape(), self.seed.as_ref()).take_exact(units)?;

        let mask = self.mask();
        for (n, index) in positions.into_iter().enumerate() {
            let chunk = chunk_at(bits, n * k as usize, k);
            let value = (carrier.get(index) & !mask) | chunk;
            carrier.set(index, value);
        }

        debug!(
            "lsb: wrote {} bits into {} of {} elements at {} bits/element",
            bits.len(),
            units,
            carrier.len(),
            k
        );
        Ok(units)
    }

    fn read_bits<C: Carrier + ?Sized>(
        &self,
        carrier: &C,
        decoder: &mut FrameDecoder<'_>,
    ) -> Result<()> {
        self.check_depth(carrier)?;
        let k = u32::from(self.bits_per_element);
        let mask = self.mask();

        for index in sequence(carrier.shape(), self.seed.as_ref()) {
            if decoder.push_uint(carrier.get(index) & mask, k)?.is_complete() {
                break;
            }
        }
        trace!("lsb: read {} bits", decoder.bits_read());
        Ok(())
    }
}
