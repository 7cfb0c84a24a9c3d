//! Embedding strategies.
//!
//! Both codecs share the same contract: frame the payload, check capacity
//! before touching the carrier, then write bits at positions produced by the
//! [sequencer](crate::sequencer). Decoding regenerates the positions and
//! feeds bits into a [`FrameDecoder`] until the frame is whole.
//!
//! # Mutation contract
//!
//! [`Codec::embed`] never modifies its input; it returns a modified copy.
//! [`Codec::embed_in_place`] modifies the carrier it is given and is the
//! explicit opt-in for callers that cannot afford the copy. Either way the
//! capacity check runs first, so a payload that does not fit leaves the
//! carrier untouched.

mod capacity;
mod lsb;
mod range;
mod vd;

pub use capacity::{fixed_rate_capacity, Capacity};
pub use lsb::LsbCodec;
pub use range::{DifferenceRange, RangeTable};
pub use vd::{classify_pair, embed_pair, UsablePair, VdCodec};

use crate::carrier::Carrier;
use crate::error::{Error, Result};
use crate::framing::{BitStr, FrameDecoder, Framing};

/// A steganographic embedding strategy.
pub trait Codec {
    /// Framing used for payloads.
    fn framing(&self) -> &Framing;

    /// Capacity of `carrier`, framing included.
    fn capacity<C: Carrier + ?Sized>(&self, carrier: &C) -> Result<Capacity>;

    /// Write already-framed bits into the carrier, returning the number of
    /// embedding units touched.
    ///
    /// Callers are expected to have checked capacity; running out of units
    /// part-way is reported as [`Error::Capacity`], with the carrier partly
    /// written.
    fn write_bits<C: Carrier + ?Sized>(&self, carrier: &mut C, bits: &BitStr) -> Result<usize>;

    /// Read bits in embedding order into `decoder` until it completes or the
    /// carrier is exhausted.
    fn read_bits<C: Carrier + ?Sized>(
        &self,
        carrier: &C,
        decoder: &mut FrameDecoder<'_>,
    ) -> Result<()>;

    /// Embed `payload`, modifying `carrier` in place.
    fn embed_in_place<C: Carrier + ?Sized>(&self, carrier: &mut C, payload: &[u8]) -> Result<Capacity> {
        let bits = self.framing().frame(payload)?;
        let capacity = self.capacity(carrier)?;
        capacity.ensure_fits(bits.len())?;
        self.write_bits(carrier, &bits)?;
        Ok(capacity)
    }

    /// Embed `payload` into a copy of `carrier`.
    fn embed<C: Carrier + Clone>(&self, carrier: &C, payload: &[u8]) -> Result<C> {
        let mut stego = carrier.clone();
        self.embed_in_place(&mut stego, payload)?;
        Ok(stego)
    }

    /// Recover the payload from `carrier`.
    fn extract<C: Carrier + ?Sized>(&self, carrier: &C) -> Result<Vec<u8>> {
        let capacity = self.capacity(carrier)?;
        let framing = self.framing();
        let mut decoder = framing.decoder(capacity.total_bits);
        self.read_bits(carrier, &mut decoder)?;

        if !decoder.is_complete() && *framing != Framing::Raw {
            return Err(Error::Decode(format!(
                "carrier exhausted after {} bits without a complete frame",
                decoder.bits_read()
            )));
        }
        decoder.finish()
    }

    /// Largest payload, in bytes, `carrier` can take.
    fn max_payload_bytes<C: Carrier + ?Sized>(&self, carrier: &C) -> Result<usize> {
        Ok(self.capacity(carrier)?.max_payload_bytes(self.framing()))
    }
}

/// Either codec, selected at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnyCodec {
    /// Fixed-rate LSB.
    Lsb(LsbCodec),
    /// Adaptive value differencing.
    Vd(VdCodec),
}

impl AnyCodec {
    /// Short name of the strategy.
    pub fn name(&self) -> &'static str {
        match self {
            AnyCodec::Lsb(_) => "lsb",
            AnyCodec::Vd(_) => "vd",
        }
    }
}

impl From<LsbCodec> for AnyCodec {
    fn from(codec: LsbCodec) -> Self {
        AnyCodec::Lsb(codec)
    }
}

impl From<VdCodec> for AnyCodec {
    fn from(codec: VdCodec) -> Self {
        AnyCodec::Vd(codec)
    }
}

impl Codec for AnyCodec {
    fn framing(&self) -> &Framing {
        match self {
            AnyCodec::Lsb(codec) => codec.framing(),
            AnyCodec::Vd(codec) => codec.framing(),
        }
    }

    fn capacity<C: Carrier + ?Sized>(&self, carrier: &C) -> Result<Capacity> {
        match self {
            AnyCodec::Lsb(codec) => codec.capacity(carrier),
            AnyCodec::Vd(codec) => codec.capacity(carrier),
        }
    }

    fn write_bits<C: Carrier + ?Sized>(&self, carrier: &mut C, bits: &BitStr) -> Result<usize> {
        match self {
            AnyCodec::Lsb(codec) => codec.write_bits(carrier, bits),
            AnyCodec::Vd(codec) => codec.write_bits(carrier, bits),
        }
    }

    fn read_bits<C: Carrier + ?Sized>(
        &self,
        carrier: &C,
        decoder: &mut FrameDecoder<'_>,
    ) -> Result<()> {
        match self {
            AnyCodec::Lsb(codec) => codec.read_bits(carrier, decoder),
            AnyCodec::Vd(codec) => codec.read_bits(carrier, decoder),
        }
    }
}
