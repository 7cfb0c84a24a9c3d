//! Optional payload sealing: compression and password encryption.
//!
//! Sealing happens before framing and opening after unframing, so the codecs
//! only ever see opaque bytes. A sealed payload is one flag byte followed by
//! the body:
//!
//! | bit | meaning                                   |
//! |-----|-------------------------------------------|
//! | 0   | body was DEFLATE-compressed               |
//! | 1   | body is a bincode [`EncryptedPayload`]    |
//!
//! Compression is applied first and kept only when it shrinks the data.

mod cipher;
mod compression;
mod kdf;

pub use cipher::{EncryptedPayload, PayloadCipher};
pub use compression::{deflate, inflate};
pub use kdf::{KeyDeriver, SALT_LEN};

use crate::error::{Error, Result};
use log::{debug, warn};

const FLAG_COMPRESSED: u8 = 0b01;
const FLAG_ENCRYPTED: u8 = 0b10;

/// How to seal a payload.
#[derive(Debug, Clone, Default)]
pub struct PayloadOptions {
    /// Try DEFLATE before embedding.
    pub compress: bool,
    /// Encrypt with a key derived from this password.
    pub password: Option<String>,
}

/// Seal `data` into bytes ready for embedding.
pub fn seal(data: &[u8], options: &PayloadOptions) -> Result<Vec<u8>> {
    let mut flags = 0u8;
    let mut body = data.to_vec();

    if options.compress {
        let packed = deflate(&body)?;
        if packed.len() < body.len() {
            debug!("payload: compressed {} -> {} bytes", body.len(), packed.len());
            body = packed;
            flags |= FLAG_COMPRESSED;
        } else {
            warn!(
                "payload: compression would grow {} bytes to {}, storing uncompressed",
                body.len(),
                packed.len()
            );
        }
    }

    if let Some(password) = &options.password {
        body = EncryptedPayload::encrypt(&body, password)?.to_bytes()?;
        flags |= FLAG_ENCRYPTED;
    }

    let mut sealed = Vec::with_capacity(body.len() + 1);
    sealed.push(flags);
    sealed.extend_from_slice(&body);
    Ok(sealed)
}

/// Whether a sealed payload needs a password to open.
pub fn is_encrypted(sealed: &[u8]) -> bool {
    sealed.first().is_some_and(|flags| flags & FLAG_ENCRYPTED != 0)
}

/// Reverse [`seal`].
pub fn open(sealed: &[u8], password: Option<&str>) -> Result<Vec<u8>> {
    let (&flags, body) = sealed
        .split_first()
        .ok_or_else(|| Error::Decode("sealed payload is empty".to_string()))?;
    if flags & !(FLAG_COMPRESSED | FLAG_ENCRYPTED) != 0 {
        return Err(Error::Decode(format!("unknown payload flags {:#04x}", flags)));
    }

    let mut body = body.to_vec();
    if flags & FLAG_ENCRYPTED != 0 {
        let password = password.ok_or_else(|| {
            Error::InvalidParameter("payload is encrypted but no password was given".to_string())
        })?;
        body = EncryptedPayload::from_bytes(&body)?.decrypt(password)?;
    }
    if flags & FLAG_COMPRESSED != 0 {
        body = inflate(&body)?;
    }
    Ok(body)
}
