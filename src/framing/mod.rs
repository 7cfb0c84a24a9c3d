//! Bitstream framing.
//!
//! Turns a payload into a self-delimiting bit sequence and back. Three
//! framings are available:
//!
//! - length prefix (default): a fixed-width header followed by the payload
//! - delimiter: the payload followed by a marker that occurs nowhere else
//! - raw: the payload bits alone

mod bits;
mod decoder;
mod framer;

pub use bits::{bits_to_bytes, bytes_to_bits, chunk_at, find, push_uint, read_uint, BitStr, Bits};
pub use decoder::{FrameDecoder, FrameState};
pub use framer::Framing;
