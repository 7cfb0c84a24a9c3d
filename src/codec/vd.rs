//! Adaptive pixel-value differencing.
//!
//! Adjacent sites `(2p, 2p + 1)` form pair `p`, and the seed only shuffles
//! the order in which pairs are visited. The difference inside each pair
//! decides how many bits it carries: smooth regions take few bits, edges take
//! many. Embedding replaces the difference with `lower + secret` while keeping
//! `S = floor((x + y) / 2)` fixed, which keeps the pair's range and
//! usability unchanged so the decoder can classify stego pairs exactly as the
//! encoder classified cover pairs.

use crate::carrier::Carrier;
use crate::codec::capacity::Capacity;
use crate::codec::range::{DifferenceRange, RangeTable};
use crate::codec::Codec;
use crate::config::{DEFAULT_FIRST_RANGE_BITS, MAX_BIT_DEPTH};
use crate::error::{Error, Result};
use crate::framing::{chunk_at, BitStr, FrameDecoder, Framing};
use crate::sequencer::{Seed, Sequence};
use log::{debug, trace};

/// A pair that can carry `range.bits` bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsablePair {
    /// Range the pair's difference falls in.
    pub range: DifferenceRange,
    /// `floor((x + y) / 2)`, preserved by embedding.
    pub midpoint: u64,
    /// Whether the first element is the larger one.
    pub descending: bool,
}

impl UsablePair {
    /// New values for the pair after embedding `secret`.
    pub fn embed(&self, secret: u64) -> (u64, u64) {
        let e = self.range.lower + secret;
        let low = self.midpoint - e / 2;
        let high = self.midpoint + e.div_ceil(2);
        if self.descending {
            (high, low)
        } else {
            (low, high)
        }
    }

    /// Value carried by a pair whose difference is `difference`.
    pub fn secret(&self, difference: u64) -> u64 {
        difference - self.range.lower
    }
}

/// Decide whether `(x, y)` can carry bits.
///
/// Returns `Ok(None)` when the difference maps to no range or to a range
/// carrying zero bits, and [`Error::RangeOverflow`] when some embeddable
/// difference would push an element outside `[0, max_value]`. The answer
/// depends on the midpoint and range only, both of which embedding
/// preserves.
pub fn classify_pair(
    x: u64,
    y: u64,
    table: &RangeTable,
    max_value: u64,
) -> Result<Option<UsablePair>> {
    let range = match table.lookup(x.abs_diff(y)) {
        Some(range) if range.bits > 0 => *range,
        _ => return Ok(None),
    };

    let midpoint = (x + y) / 2;
    let half = range.max_embedded().div_ceil(2);
    if midpoint < half || midpoint + half > max_value {
        return Err(Error::RangeOverflow {
            first: x,
            second: y,
            lower: range.lower,
            upper: range.max_embedded(),
        });
    }

    Ok(Some(UsablePair {
        range,
        midpoint,
        descending: y < x,
    }))
}

/// Embed `secret` into a single pair.
pub fn embed_pair(
    x: u64,
    y: u64,
    secret: u64,
    table: &RangeTable,
    max_value: u64,
) -> Result<(u64, u64)> {
    let pair = classify_pair(x, y, table, max_value)?.ok_or_else(|| {
        Error::InvalidParameter(format!("pair ({}, {}) carries no bits", x, y))
    })?;
    if secret >> pair.range.bits != 0 {
        return Err(Error::InvalidParameter(format!(
            "secret {} does not fit in {} bits",
            secret, pair.range.bits
        )));
    }
    Ok(pair.embed(secret))
}

/// Overflowing pairs are skipped, not reported.
fn usable_pair(x: u64, y: u64, table: &RangeTable, max_value: u64) -> Option<UsablePair> {
    match classify_pair(x, y, table, max_value) {
        Ok(pair) => pair,
        Err(e) => {
            trace!("vd: skipping pair: {}", e);
            None
        }
    }
}

/// Flat index pairs in embedding order: pair `p` joins sites `2p` and
/// `2p + 1`, pairs come in sequenced order, one unit per channel.
fn pair_units(
    sites: usize,
    channels: usize,
    seed: Option<&Seed>,
) -> impl Iterator<Item = (usize, usize)> {
    Sequence::new(sites / 2, seed).flat_map(move |p| {
        let (a, b) = (2 * p, 2 * p + 1);
        (0..channels).map(move |c| (a * channels + c, b * channels + c))
    })
}

/// Value-differencing codec over adjacent pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VdCodec {
    first_range_bits: u8,
    seed: Option<Seed>,
    framing: Framing,
}

impl Default for VdCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl VdCodec {
    pub fn new() -> Self {
        Self {
            first_range_bits: DEFAULT_FIRST_RANGE_BITS,
            seed: None,
            framing: Framing::default(),
        }
    }

    /// Bits carried by the first range, `[0, 2^bits - 1]`.
    pub fn with_first_range_bits(mut self, bits: u8) -> Result<Self> {
        if bits == 0 || u32::from(bits) > MAX_BIT_DEPTH {
            return Err(Error::InvalidParameter(format!(
                "first range bits must be between 1 and {}, got {}",
                MAX_BIT_DEPTH, bits
            )));
        }
        self.first_range_bits = bits;
        Ok(self)
    }

    pub fn with_seed(mut self, seed: Option<Seed>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_framing(mut self, framing: Framing) -> Self {
        self.framing = framing;
        self
    }

    pub fn first_range_bits(&self) -> u8 {
        self.first_range_bits
    }

    pub fn seed(&self) -> Option<&Seed> {
        self.seed.as_ref()
    }

    /// Range table matching the carrier's value range.
    pub fn range_table<C: Carrier + ?Sized>(&self, carrier: &C) -> Result<RangeTable> {
        RangeTable::for_bit_depth(carrier.bit_depth(), self.first_range_bits)
    }

    /// Total bits the carrier can hold. Needs a full pass over the values.
    pub fn max_capacity<C: Carrier + ?Sized>(&self, carrier: &C) -> Result<usize> {
        Ok(self.capacity(carrier)?.total_bits)
    }

    fn units<C: Carrier + ?Sized>(&self, carrier: &C) -> impl Iterator<Item = (usize, usize)> {
        let shape = carrier.shape();
        pair_units(shape.sites(), shape.channels(), self.seed.as_ref())
    }
}

impl Codec for VdCodec {
    fn framing(&self) -> &Framing {
        &self.framing
    }

    fn capacity<C: Carrier + ?Sized>(&self, carrier: &C) -> Result<Capacity> {
        let table = self.range_table(carrier)?;
        let max = carrier.max_value();

        let mut capacity = Capacity::default();
        for (i, j) in self.units(carrier) {
            match usable_pair(carrier.get(i), carrier.get(j), &table, max) {
                Some(pair) => {
                    capacity.total_bits += pair.range.bits as usize;
                    capacity.units += 1;
                }
                None => capacity.skipped_units += 1,
            }
        }

        debug!(
            "vd: {} bits over {} usable pairs, {} skipped",
            capacity.total_bits, capacity.units, capacity.skipped_units
        );
        Ok(capacity)
    }

    fn write_bits<C: Carrier + ?Sized>(&self, carrier: &mut C, bits: &BitStr) -> Result<usize> {
        let table = self.range_table(carrier)?;
        let max = carrier.max_value();
        let (sites, channels) = (carrier.shape().sites(), carrier.shape().channels());

        let mut offset = 0;
        let mut touched = 0;
        for (i, j) in pair_units(sites, channels, self.seed.as_ref()) {
            if offset >= bits.len() {
                break;
            }
            let (x, y) = (carrier.get(i), carrier.get(j));
            let Some(pair) = usable_pair(x, y, &table, max) else {
                continue;
            };

            let secret = chunk_at(bits, offset, pair.range.bits);
            let (nx, ny) = pair.embed(secret);
            trace!("vd: ({}, {}) -> ({}, {}) carrying {} bits", x, y, nx, ny, pair.range.bits);
            carrier.set(i, nx);
            carrier.set(j, ny);
            offset += pair.range.bits as usize;
            touched += 1;
        }

        if offset < bits.len() {
            return Err(Error::Capacity {
                needed: bits.len(),
                available: offset,
            });
        }
        debug!("vd: wrote {} bits into {} pairs", bits.len(), touched);
        Ok(touched)
    }

    fn read_bits<C: Carrier + ?Sized>(
        &self,
        carrier: &C,
        decoder: &mut FrameDecoder<'_>,
    ) -> Result<()> {
        let table = self.range_table(carrier)?;
        let max = carrier.max_value();

        for (i, j) in self.units(carrier) {
            let (x, y) = (carrier.get(i), carrier.get(j));
            if let Some(pair) = usable_pair(x, y, &table, max) {
                let secret = pair.secret(x.abs_diff(y));
                if decoder.push_uint(secret, pair.range.bits)?.is_complete() {
                    break;
                }
            }
        }
        trace!("vd: read {} bits", decoder.bits_read());
        Ok(())
    }
}
