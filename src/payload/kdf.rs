//! Argon2id key derivation for payload passwords.

use crate::config::argon2_params;
use crate::error::{Error, Result};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;

/// Salt length used for payload keys.
pub const SALT_LEN: usize = argon2_params::SALT_LENGTH;

/// Derives payload keys from a password and a per-payload salt.
#[derive(Debug, Clone)]
pub struct KeyDeriver {
    salt: [u8; SALT_LEN],
}

impl KeyDeriver {
    /// Fresh random salt, for sealing.
    pub fn random() -> Self {
        let mut salt = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        Self { salt }
    }

    /// Salt recovered from a sealed payload, for opening.
    pub fn from_salt(salt: [u8; SALT_LEN]) -> Self {
        Self { salt }
    }

    pub fn salt(&self) -> &[u8; SALT_LEN] {
        &self.salt
    }

    /// Derive a 256-bit key. Memory 64 MB, 3 iterations, 4 lanes.
    pub fn derive_key(&self, password: &str) -> Result<[u8; 32]> {
        let params = Params::new(
            argon2_params::MEMORY_COST,
            argon2_params::TIME_COST,
            argon2_params::PARALLELISM,
            Some(argon2_params::OUTPUT_LENGTH),
        )
        .map_err(|e| Error::KeyDerivation(e.to_string()))?;

        let mut key = [0u8; 32];
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
            .hash_password_into(password.as_bytes(), &self.salt, &mut key)
            .map_err(|e| Error::KeyDerivation(e.to_string()))?;
        Ok(key)
    }
}
