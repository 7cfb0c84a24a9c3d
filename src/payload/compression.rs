//! DEFLATE compression of payload bytes.

use crate::error::{Error, Result};
use flate2::read::{DeflateDecoder, DeflateEncoder};
use flate2::Compression;
use std::io::Read;

pub fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    DeflateEncoder::new(data, Compression::best())
        .read_to_end(&mut out)
        .map_err(|e| Error::Compression(e.to_string()))?;
    Ok(out)
}

pub fn inflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    DeflateDecoder::new(data)
        .read_to_end(&mut out)
        .map_err(|e| Error::Compression(e.to_string()))?;
    Ok(out)
}
