//! Streaming frame recovery.
//!
//! Codecs read carrier bits one unit at a time and push them here; the
//! decoder reports completion as soon as the frame is whole, so decoding
//! never reads further into the carrier than the message extends.

use crate::error::{Error, Result};
use crate::framing::bits::{bits_to_bytes, bytes_to_bits, read_uint, Bits};
use crate::framing::Framing;

/// Progress of a [`FrameDecoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    /// More bits are needed.
    NeedMore,
    /// The frame is complete; further bits are ignored.
    Complete,
}

impl FrameState {
    /// Whether the frame is complete.
    pub fn is_complete(self) -> bool {
        self == FrameState::Complete
    }
}

/// Incremental form of [`Framing::unframe`].
#[derive(Debug)]
pub struct FrameDecoder<'a> {
    framing: &'a Framing,
    available: usize,
    bits: Bits,
    marker: Bits,
    frame_len: Option<usize>,
    complete: bool,
}

impl<'a> FrameDecoder<'a> {
    /// Create a decoder for a carrier that can supply `available` bits.
    pub fn new(framing: &'a Framing, available: usize) -> Self {
        let marker = match framing {
            Framing::Delimiter { marker, .. } => bytes_to_bits(marker),
            _ => Bits::new(),
        };
        Self {
            framing,
            available,
            bits: Bits::new(),
            marker,
            frame_len: None,
            complete: false,
        }
    }

    /// Number of bits consumed so far.
    pub fn bits_read(&self) -> usize {
        self.bits.len()
    }

    /// Whether a whole frame has been recovered.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Push one bit.
    pub fn push(&mut self, bit: bool) -> Result<FrameState> {
        if self.complete {
            return Ok(FrameState::Complete);
        }
        self.bits.push(bit);

        match self.framing {
            Framing::LengthPrefix { header_bits } => {
                let header_bits = *header_bits as usize;
                if self.frame_len.is_none() && self.bits.len() == header_bits {
                    self.frame_len = Some(self.parse_header(header_bits)?);
                }
                if self.frame_len == Some(self.bits.len()) {
                    self.complete = true;
                }
            }
            Framing::Delimiter { max_scan_bits, .. } => {
                let len = self.bits.len();
                let m = self.marker.len();
                if len >= m && self.bits[len - m..] == self.marker[..] {
                    self.complete = true;
                } else if len >= *max_scan_bits {
                    return Err(Error::Framing(format!(
                        "delimiter not found within {} bits",
                        max_scan_bits
                    )));
                }
            }
            Framing::Raw => {}
        }

        Ok(if self.complete {
            FrameState::Complete
        } else {
            FrameState::NeedMore
        })
    }

    /// Push the low `width` bits of `value`, most significant first.
    ///
    /// Stops early if the frame completes part-way through the chunk.
    pub fn push_uint(&mut self, value: u64, width: u32) -> Result<FrameState> {
        for shift in (0..width).rev() {
            if self.push((value >> shift) & 1 == 1)?.is_complete() {
                return Ok(FrameState::Complete);
            }
        }
        Ok(FrameState::NeedMore)
    }

    /// Validate the length header and return the total frame length.
    fn parse_header(&self, header_bits: usize) -> Result<usize> {
        let declared = read_uint(&self.bits[..header_bits]);
        if declared == 0 {
            return Err(Error::Framing(
                "length header is zero: no message present".to_string(),
            ));
        }
        let payload_bits = declared - 1;
        if payload_bits % 8 != 0 {
            return Err(Error::Framing(format!(
                "length header declares {} bits, not a whole number of bytes",
                payload_bits
            )));
        }
        let remaining = self.available.saturating_sub(header_bits);
        match usize::try_from(payload_bits) {
            Ok(bits) if bits <= remaining => Ok(header_bits + bits),
            _ => Err(Error::Framing(format!(
                "length header declares {} payload bits but only {} are available",
                payload_bits, remaining
            ))),
        }
    }

    /// Return the payload.
    ///
    /// For raw framing this packs every bit read so far. For the other
    /// framings an incomplete frame is an error.
    pub fn finish(self) -> Result<Vec<u8>> {
        match self.framing {
            Framing::Raw => Ok(bits_to_bytes(&self.bits)),
            Framing::LengthPrefix { header_bits } => {
                let header_bits = *header_bits as usize;
                match self.frame_len {
                    Some(len) if self.complete => Ok(bits_to_bytes(&self.bits[header_bits..len])),
                    Some(len) => Err(Error::Framing(format!(
                        "truncated payload: frame needs {} bits, got {}",
                        len,
                        self.bits.len()
                    ))),
                    None => Err(Error::Framing(format!(
                        "truncated length header: {} of {} bits",
                        self.bits.len(),
                        header_bits
                    ))),
                }
            }
            Framing::Delimiter { .. } => {
                if !self.complete {
                    return Err(Error::Framing(format!(
                        "delimiter not found in {} bits",
                        self.bits.len()
                    )));
                }
                let end = self.bits.len() - self.marker.len();
                if end % 8 != 0 {
                    return Err(Error::Framing(format!(
                        "delimiter found at bit {}, not on a byte boundary",
                        end
                    )));
                }
                Ok(bits_to_bytes(&self.bits[..end]))
            }
        }
    }
}
