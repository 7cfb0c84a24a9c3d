//! Message framing: how a payload is delimited inside the embedded bitstream.

use crate::config::{DEFAULT_DELIMITER, DEFAULT_HEADER_BITS, DEFAULT_MAX_SCAN_BITS, MAX_HEADER_BITS};
use crate::error::{Error, Result};
use crate::framing::bits::{bytes_to_bits, find, push_uint, BitStr, Bits};
use crate::framing::decoder::FrameDecoder;
use serde::{Deserialize, Serialize};

/// How the payload is delimited in the bitstream.
///
/// Encoder and decoder of a session must agree on the framing; it is not
/// recorded in the carrier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Framing {
    /// `[header][payload]`. The header holds the payload bit count plus one,
    /// so an all-zero header means "no message" and one means "empty message".
    LengthPrefix { header_bits: u8 },

    /// `[payload][marker]`. The marker may not occur anywhere else in the frame.
    Delimiter { marker: Vec<u8>, max_scan_bits: usize },

    /// Bare payload bits. Decoding returns every bit the carrier holds.
    Raw,
}

impl Default for Framing {
    fn default() -> Self {
        Framing::LengthPrefix {
            header_bits: DEFAULT_HEADER_BITS,
        }
    }
}

impl Framing {
    /// Length-prefix framing with the given header width.
    pub fn length_prefix(header_bits: u8) -> Self {
        Framing::LengthPrefix { header_bits }
    }

    /// Delimiter framing with the default scan window.
    pub fn delimiter(marker: Vec<u8>) -> Self {
        Framing::Delimiter {
            marker,
            max_scan_bits: DEFAULT_MAX_SCAN_BITS,
        }
    }

    /// Delimiter framing with the default `###END###` marker.
    pub fn default_delimiter() -> Self {
        Self::delimiter(DEFAULT_DELIMITER.to_vec())
    }

    /// Validate the framing parameters.
    pub fn validate(&self) -> std::result::Result<(), String> {
        match self {
            Framing::LengthPrefix { header_bits } => {
                if *header_bits == 0 || *header_bits > MAX_HEADER_BITS {
                    return Err(format!(
                        "Header width must be between 1 and {} bits",
                        MAX_HEADER_BITS
                    ));
                }
            }
            Framing::Delimiter {
                marker,
                max_scan_bits,
            } => {
                if marker.is_empty() {
                    return Err("Delimiter marker must not be empty".to_string());
                }
                if *max_scan_bits < marker.len() * 8 {
                    return Err("Scan window is shorter than the delimiter marker".to_string());
                }
            }
            Framing::Raw => {}
        }
        Ok(())
    }

    /// Bits the framing adds on top of the payload.
    pub fn overhead_bits(&self) -> usize {
        match self {
            Framing::LengthPrefix { header_bits } => *header_bits as usize,
            Framing::Delimiter { marker, .. } => marker.len() * 8,
            Framing::Raw => 0,
        }
    }

    /// Largest payload, in bits, the framing can describe.
    pub fn max_payload_bits(&self) -> usize {
        match self {
            Framing::LengthPrefix { header_bits } => {
                let max_header = if *header_bits >= 64 {
                    u64::MAX
                } else {
                    (1u64 << header_bits) - 1
                };
                usize::try_from(max_header.saturating_sub(1)).unwrap_or(usize::MAX)
            }
            Framing::Delimiter {
                marker,
                max_scan_bits,
            } => max_scan_bits.saturating_sub(marker.len() * 8),
            Framing::Raw => usize::MAX,
        }
    }

    /// Build the framed bitstream for a payload.
    pub fn frame(&self, payload: &[u8]) -> Result<Bits> {
        self.validate().map_err(Error::InvalidParameter)?;

        let payload_bits = payload.len() * 8;
        if payload_bits > self.max_payload_bits() {
            return Err(Error::Framing(format!(
                "payload of {} bits exceeds the {} bits this framing can describe",
                payload_bits,
                self.max_payload_bits()
            )));
        }

        let mut bits = Bits::with_capacity(payload_bits + self.overhead_bits());
        match self {
            Framing::LengthPrefix { header_bits } => {
                push_uint(&mut bits, payload_bits as u64 + 1, u32::from(*header_bits));
                bits.extend_from_bitslice(&bytes_to_bits(payload));
            }
            Framing::Delimiter { marker, .. } => {
                let marker_bits = bytes_to_bits(marker);
                bits.extend_from_bitslice(&bytes_to_bits(payload));
                bits.extend_from_bitslice(&marker_bits);
                if find(&bits, &marker_bits) != Some(payload_bits) {
                    return Err(Error::Framing(
                        "payload contains the delimiter pattern; choose another marker".to_string(),
                    ));
                }
            }
            Framing::Raw => {
                bits.extend_from_bitslice(&bytes_to_bits(payload));
            }
        }
        Ok(bits)
    }

    /// Recover the payload from a bitstream produced by [`frame`](Framing::frame).
    ///
    /// Trailing bits after the frame are ignored.
    pub fn unframe(&self, bits: &BitStr) -> Result<Vec<u8>> {
        let mut decoder = self.decoder(bits.len());
        for bit in bits.iter().by_vals() {
            if decoder.push(bit)?.is_complete() {
                break;
            }
        }
        decoder.finish()
    }

    /// Streaming decoder for a carrier that can supply `available_bits` in total.
    pub fn decoder(&self, available_bits: usize) -> FrameDecoder<'_> {
        FrameDecoder::new(self, available_bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framing::bits::bits_to_bytes;

    #[test]
    fn test_length_prefix_roundtrip() {
        let framing = Framing::default();
        let payload = b"hidden message";

        let bits = framing.frame(payload).unwrap();
        assert_eq!(bits.len(), 32 + payload.len() * 8);
        assert_eq!(framing.unframe(&bits).unwrap(), payload);
    }

    #[test]
    fn test_empty_payload_is_not_absent() {
        let framing = Framing::default();
        let bits = framing.frame(b"").unwrap();
        assert_eq!(bits.len(), 32);
        assert_eq!(framing.unframe(&bits).unwrap(), Vec::<u8>::new());

        // An all-zero header is "no message", not an empty one.
        let blank = Bits::repeat(false, 64);
        assert!(matches!(framing.unframe(&blank), Err(Error::Framing(_))));
    }

    #[test]
    fn test_header_exceeding_available_bits() {
        let framing = Framing::length_prefix(16);
        let mut bits = framing.frame(b"abcd").unwrap();
        bits.truncate(16 + 16);
        let err = framing.unframe(&bits).unwrap_err();
        assert!(matches!(err, Error::Framing(_)));
    }

    #[test]
    fn test_header_not_whole_bytes() {
        let framing = Framing::length_prefix(8);
        let mut bits = Bits::new();
        push_uint(&mut bits, 4, 8); // three payload bits
        bits.extend_from_bitslice(&bytes_to_bits(&[0xFF]));
        assert!(matches!(framing.unframe(&bits), Err(Error::Framing(_))));
    }

    #[test]
    fn test_small_header_limits_payload() {
        let framing = Framing::length_prefix(4);
        assert_eq!(framing.max_payload_bits(), 14);
        assert!(framing.frame(&[1]).is_ok());
        assert!(matches!(framing.frame(&[1, 2]), Err(Error::Framing(_))));
    }

    #[test]
    fn test_delimiter_roundtrip() {
        let framing = Framing::default_delimiter();
        let payload = b"attack at dawn";

        let bits = framing.frame(payload).unwrap();
        assert_eq!(bits.len(), (payload.len() + 9) * 8);
        assert_eq!(framing.unframe(&bits).unwrap(), payload);
    }

    #[test]
    fn test_delimiter_empty_payload() {
        let framing = Framing::default_delimiter();
        let bits = framing.frame(b"").unwrap();
        assert_eq!(framing.unframe(&bits).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_delimiter_inside_payload_rejected() {
        let framing = Framing::delimiter(b"END".to_vec());
        let err = framing.frame(b"THE END IS NEAR").unwrap_err();
        assert!(matches!(err, Error::Framing(_)));
    }

    #[test]
    fn test_delimiter_missing() {
        let framing = Framing::delimiter(b"END".to_vec());
        let bits = bytes_to_bits(b"no terminator here");
        assert!(matches!(framing.unframe(&bits), Err(Error::Framing(_))));
    }

    #[test]
    fn test_delimiter_scan_window() {
        let framing = Framing::Delimiter {
            marker: b"!".to_vec(),
            max_scan_bits: 32,
        };
        assert!(framing.frame(b"abc").is_ok());
        assert!(matches!(framing.frame(b"abcd"), Err(Error::Framing(_))));

        let bits = bytes_to_bits(b"abcdefgh!");
        assert!(matches!(framing.unframe(&bits), Err(Error::Framing(_))));
    }

    #[test]
    fn test_trailing_bits_ignored() {
        let framing = Framing::default();
        let mut bits = framing.frame(b"xy").unwrap();
        bits.extend_from_bitslice(&bytes_to_bits(&[0xAA; 4]));
        assert_eq!(framing.unframe(&bits).unwrap(), b"xy");
    }

    #[test]
    fn test_raw_framing() {
        let framing = Framing::Raw;
        let bits = framing.frame(&[0b1011_0010]).unwrap();
        assert_eq!(bits.len(), 8);
        assert_eq!(bits_to_bytes(&bits), vec![0b1011_0010]);
        assert_eq!(framing.unframe(&bits).unwrap(), vec![0b1011_0010]);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(Framing::length_prefix(0).validate().is_err());
        assert!(Framing::length_prefix(65).validate().is_err());
        assert!(Framing::delimiter(Vec::new()).validate().is_err());
        assert!(matches!(
            Framing::length_prefix(0).frame(b"x"),
            Err(Error::InvalidParameter(_))
        ));
    }
}
