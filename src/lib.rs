//! Carrier Stego
//!
//! A steganographic codec engine that hides arbitrary payloads in the
//! low-order information of sample carriers (image channels, audio samples,
//! font tables, plain arrays) and recovers them exactly.
//!
//! # Features
//!
//! - **Fixed-rate LSB**: replace the low `k` bits of each visited element
//! - **Adaptive value differencing**: bits per pair follow the local difference,
//!   with overflow-free pair selection
//! - **Framing**: length prefix, end delimiter or raw bitstreams
//! - **Seeded ordering**: a ChaCha20-driven permutation shared by both sides
//! - **Payload sealing**: optional DEFLATE and AES-256-GCM with Argon2id
//! - **Distribution**: split one payload across several carriers, optionally
//!   scrambled by a seed
//! - **Wavelet domain**: integer Haar transform to embed into subbands
//!
//! # Architecture
//!
//! ```text
//! payload → seal → frame → sequence positions → codec → carrier
//! ```
//!
//! # Example
//!
//! ```rust
//! use carrier_stego::carrier::SampleBuffer;
//! use carrier_stego::codec::{Codec, LsbCodec};
//! use carrier_stego::sequencer::Seed;
//!
//! let cover = SampleBuffer::from_flat((0..512).map(|i| (i % 256) as u8).collect());
//! let codec = LsbCodec::new(2)?.with_seed(Some(Seed::Number(42)));
//!
//! let stego = codec.embed(&cover, b"Hidden data")?;
//! assert_eq!(codec.extract(&stego)?, b"Hidden data");
//! # Ok::<(), carrier_stego::Error>(())
//! ```

pub mod analysis;
pub mod carrier;
pub mod codec;
pub mod config;
pub mod distribute;
pub mod error;
pub mod framing;
pub mod iwt;
pub mod payload;
pub mod sequencer;

pub use carrier::{Carrier, SampleBuffer, Shape};
pub use codec::{AnyCodec, Capacity, Codec, LsbCodec, VdCodec};
pub use config::{CodecConfig, Method};
pub use distribute::{embed_across, extract_across, Split};
pub use error::{Error, Result};
pub use framing::Framing;
pub use payload::{open, seal, PayloadOptions};
pub use sequencer::Seed;
