//! AES-256-GCM payload encryption.

use crate::error::{Error, Result};
use crate::payload::kdf::{KeyDeriver, SALT_LEN};
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// 96-bit nonce.
const NONCE_LEN: usize = 12;

/// 128-bit authentication tag.
const TAG_LEN: usize = 16;

/// Password-encrypted payload body as stored in the carrier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedPayload {
    /// Argon2id salt.
    pub salt: [u8; SALT_LEN],
    /// `nonce || ciphertext || tag`.
    pub sealed: Vec<u8>,
}

impl EncryptedPayload {
    /// Encrypt `plaintext` under a key derived from `password`.
    pub fn encrypt(plaintext: &[u8], password: &str) -> Result<Self> {
        let deriver = KeyDeriver::random();
        let cipher = PayloadCipher::new(&deriver.derive_key(password)?);
        Ok(Self {
            salt: *deriver.salt(),
            sealed: cipher.encrypt(plaintext)?,
        })
    }

    /// Decrypt with `password`. Wrong passwords and tampering both fail.
    pub fn decrypt(&self, password: &str) -> Result<Vec<u8>> {
        let key = KeyDeriver::from_salt(self.salt).derive_key(password)?;
        PayloadCipher::new(&key).decrypt(&self.sealed)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }
}

/// AES-256-GCM with a random nonce per message.
pub struct PayloadCipher {
    cipher: Aes256Gcm,
}

impl PayloadCipher {
    pub fn new(key: &[u8; 32]) -> Self {
        Self {
            cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key)),
        }
    }

    /// Returns `nonce || ciphertext || tag`.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let mut nonce = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce);

        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext)
            .map_err(|e| Error::Encryption(e.to_string()))?;

        let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }

    pub fn decrypt(&self, sealed: &[u8]) -> Result<Vec<u8>> {
        if sealed.len() < NONCE_LEN + TAG_LEN {
            return Err(Error::Decryption);
        }
        let (nonce, ciphertext) = sealed.split_at(NONCE_LEN);
        self.cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| Error::Decryption)
    }
}
