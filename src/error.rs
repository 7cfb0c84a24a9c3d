//! Error types for the steganographic codec engine.

use thiserror::Error;

/// Result type alias for codec operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while embedding or extracting payloads.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error while reading or writing carrier files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The framed payload does not fit the carrier.
    #[error("Not enough capacity: need {needed} bits, have {available} bits")]
    Capacity { needed: usize, available: usize },

    /// Malformed or truncated bitstream (corrupted carrier, wrong seed or wrong codec).
    #[error("Framing error: {0}")]
    Framing(String),

    /// All carrier positions were read without recovering a complete frame.
    #[error("Decoding failed: {0}")]
    Decode(String),

    /// A value adjustment would leave the carrier's representable range.
    #[error("Range overflow: pair ({first}, {second}) cannot carry difference range {lower}..={upper}")]
    RangeOverflow {
        first: u64,
        second: u64,
        lower: u64,
        upper: u64,
    },

    /// A codec or framing parameter is out of its valid domain.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Carrier data does not match its declared shape.
    #[error("Shape mismatch: expected {expected} elements, found {found}")]
    ShapeMismatch { expected: usize, found: usize },

    /// A carrier element lies outside the declared value range.
    #[error("Element {index} has value {value}, outside [0, {max}]")]
    ValueOutOfRange { index: usize, value: i64, max: u64 },

    /// Encryption error.
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Decryption error (wrong password or corrupted data).
    #[error("Decryption failed: wrong password or corrupted data")]
    Decryption,

    /// Key derivation error.
    #[error("Key derivation error: {0}")]
    KeyDerivation(String),

    /// Compression or decompression error.
    #[error("Compression error: {0}")]
    Compression(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<bincode::Error> for Error {
    fn from(e: bincode::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

