//! Ordering seeds.

use crate::config::{ORDER_DOMAIN, ORDER_VERSION};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Seed for the pseudo-random position order.
///
/// Integer and byte-string seeds live in separate key spaces: `Number(0x61)`
/// and `Bytes(b"a")` produce different orders.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Seed {
    /// Integer seed, hashed as little-endian `u64`.
    Number(u64),
    /// Byte-string seed (passphrase, shared secret).
    Bytes(Vec<u8>),
}

impl Seed {
    /// Parse a command-line seed: decimal integers become [`Seed::Number`],
    /// anything else is taken as a byte string.
    pub fn parse(text: &str) -> Self {
        match text.parse::<u64>() {
            Ok(n) => Seed::Number(n),
            Err(_) => Seed::Bytes(text.as_bytes().to_vec()),
        }
    }

    /// Derive the 32-byte ChaCha20 key for the versioned ordering.
    pub fn order_key(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(ORDER_DOMAIN);
        hasher.update([ORDER_VERSION]);
        match self {
            Seed::Number(n) => {
                hasher.update([0u8]);
                hasher.update(n.to_le_bytes());
            }
            Seed::Bytes(bytes) => {
                hasher.update([1u8]);
                hasher.update(bytes);
            }
        }
        hasher.finalize().into()
    }
}

impl From<u64> for Seed {
    fn from(n: u64) -> Self {
        Seed::Number(n)
    }
}

impl From<&str> for Seed {
    fn from(s: &str) -> Self {
        Seed::Bytes(s.as_bytes().to_vec())
    }
}

impl From<&[u8]> for Seed {
    fn from(bytes: &[u8]) -> Self {
        Seed::Bytes(bytes.to_vec())
    }
}
