//! Password hashing.
//!
//! Hashes are Argon2id PHC strings (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`)
//! with a fresh random salt per password. The parameters travel inside the
//! stored string, so verification keeps working if the defaults change.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

#[derive(Debug, thiserror::Error)]
#[error("password hashing failed: {0}")]
pub struct PasswordError(String);

/// Hash a password with a fresh random salt.
///
/// # Errors
///
/// Returns an error if Argon2 rejects the input or parameters.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError(e.to_string()))
}

/// Check `password` against a stored PHC string. Malformed hashes never verify.
#[must_use]
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        return false;
    };
    Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok()
}

#[cfg(test)]
#[path = "password_test.rs"]
mod tests;
