//! Configuration constants and types for the codec engine.

use crate::codec::{AnyCodec, LsbCodec, VdCodec};
use crate::error::{Error, Result};
use crate::framing::Framing;
use crate::sequencer::Seed;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default width of the length header, in bits.
pub const DEFAULT_HEADER_BITS: u8 = 32;

/// Widest length header supported.
pub const MAX_HEADER_BITS: u8 = 64;

/// Default end-of-message marker for delimiter framing.
pub const DEFAULT_DELIMITER: &[u8] = b"###END###";

/// Default bound on how many bits a delimiter scan may read (16 MiB of payload).
pub const DEFAULT_MAX_SCAN_BITS: usize = 1 << 27;

/// Default number of low-order bits replaced per element by the fixed-rate codec.
pub const DEFAULT_BITS_PER_ELEMENT: u8 = 1;

/// Default bit count of the first (smallest-difference) range of the range table.
pub const DEFAULT_FIRST_RANGE_BITS: u8 = 3;

/// Widest element supported by the carrier model.
pub const MAX_BIT_DEPTH: u32 = 32;

/// Seeded ordering algorithm version. Bumping this changes every seeded permutation.
pub const ORDER_VERSION: u8 = 1;

/// Hash domain for deriving the ordering key from a seed. Followed by
/// [`ORDER_VERSION`] in the hash input.
pub const ORDER_DOMAIN: &[u8] = b"carrier-stego/order";

/// Argon2id parameters for payload encryption keys.
pub mod argon2_params {
    /// Memory cost in KiB (64 MB).
    pub const MEMORY_COST: u32 = 65536;

    /// Time cost (iterations).
    pub const TIME_COST: u32 = 3;

    /// Parallelism factor.
    pub const PARALLELISM: u32 = 4;

    /// Output length in bytes (256 bits).
    pub const OUTPUT_LENGTH: usize = 32;

    /// Salt length in bytes.
    pub const SALT_LENGTH: usize = 32;
}

/// Embedding strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// Fixed-rate least-significant-bit substitution.
    #[default]
    Lsb,
    /// Adaptive value differencing.
    Vd,
}

/// Codec configuration, shared by encoder and decoder of a session.
///
/// Both sides must use an identical configuration; nothing in it is
/// stored inside the carrier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Embedding strategy.
    pub method: Method,

    /// Bits replaced per element (fixed-rate codec only).
    pub bits_per_element: u8,

    /// Bits carried by the first range of the range table (value differencing only).
    pub first_range_bits: u8,

    /// Message framing.
    pub framing: Framing,

    /// Ordering seed; `None` walks the carrier in natural order.
    pub seed: Option<Seed>,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            method: Method::default(),
            bits_per_element: DEFAULT_BITS_PER_ELEMENT,
            first_range_bits: DEFAULT_FIRST_RANGE_BITS,
            framing: Framing::default(),
            seed: None,
        }
    }
}

impl CodecConfig {
    /// Load a configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: CodecConfig = serde_json::from_str(&content)?;
        config
            .validate()
            .map_err(Error::InvalidParameter)?;
        Ok(config)
    }

    /// Save the configuration as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.bits_per_element == 0 || u32::from(self.bits_per_element) > MAX_BIT_DEPTH {
            return Err(format!(
                "Bits per element must be between 1 and {}",
                MAX_BIT_DEPTH
            ));
        }
        if self.first_range_bits == 0 || u32::from(self.first_range_bits) > MAX_BIT_DEPTH {
            return Err(format!(
                "First range bits must be between 1 and {}",
                MAX_BIT_DEPTH
            ));
        }
        self.framing.validate()
    }

    /// Build the codec this configuration describes.
    pub fn build(&self) -> Result<AnyCodec> {
        self.validate().map_err(Error::InvalidParameter)?;
        let codec = match self.method {
            Method::Lsb => AnyCodec::Lsb(
                LsbCodec::new(self.bits_per_element)?
                    .with_seed(self.seed.clone())
                    .with_framing(self.framing.clone()),
            ),
            Method::Vd => AnyCodec::Vd(
                VdCodec::new()
                    .with_first_range_bits(self.first_range_bits)?
                    .with_seed(self.seed.clone())
                    .with_framing(self.framing.clone()),
            ),
        };
        Ok(codec)
    }
}
