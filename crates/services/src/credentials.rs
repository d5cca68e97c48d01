//! Argon2id password hashing for stored credentials.
//!
//! Encoded layout: `version (1) || salt (16) || hash (32)`.

use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use subtle::ConstantTimeEq;
use thiserror::Error;

pub const HASH_VERSION: u8 = 0x01;
pub const SALT_SIZE: usize = 16;
pub const HASH_SIZE: usize = 32;
pub const ENCODED_SIZE: usize = 1 + SALT_SIZE + HASH_SIZE;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CredentialError {
    #[error("invalid encoded hash length: expected {ENCODED_SIZE}, got {0}")]
    Length(usize),
    #[error("unsupported hash version {0}")]
    Version(u8),
    #[error("argon2 failure: {0}")]
    Argon(String),
}

fn argon() -> Result<Argon2<'static>, CredentialError> {
    let params = Params::new(19_456, 2, 1, Some(HASH_SIZE))
        .map_err(|e| CredentialError::Argon(e.to_string()))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

fn derive(password: &str, salt: &[u8; SALT_SIZE]) -> Result<[u8; HASH_SIZE], CredentialError> {
    let mut output = [0u8; HASH_SIZE];
    argon()?
        .hash_password_into(password.as_bytes(), salt, &mut output)
        .map_err(|e| CredentialError::Argon(e.to_string()))?;
    Ok(output)
}

/// Hashes a password with a fresh random salt.
///
/// # Errors
///
/// Returns `CredentialError::Argon` if key derivation fails.
pub fn hash_password(password: &str) -> Result<Vec<u8>, CredentialError> {
    let mut salt = [0u8; SALT_SIZE];
    rand::rng().fill_bytes(&mut salt);
    let hash = derive(password, &salt)?;

    let mut encoded = Vec::with_capacity(ENCODED_SIZE);
    encoded.push(HASH_VERSION);
    encoded.extend_from_slice(&salt);
    encoded.extend_from_slice(&hash);
    Ok(encoded)
}

/// Checks a password against an encoded hash in constant time.
///
/// # Errors
///
/// Returns `CredentialError` if the encoded hash is malformed.
pub fn verify_password(password: &str, encoded: &[u8]) -> Result<bool, CredentialError> {
    if encoded.len() != ENCODED_SIZE {
        return Err(CredentialError::Length(encoded.len()));
    }
    if encoded[0] != HASH_VERSION {
        return Err(CredentialError::Version(encoded[0]));
    }
    let mut salt = [0u8; SALT_SIZE];
    salt.copy_from_slice(&encoded[1..=SALT_SIZE]);
    let computed = derive(password, &salt)?;
    Ok(computed[..].ct_eq(&encoded[1 + SALT_SIZE..]).into())
}
