//! Password hashing and policy.
//!
//! Hashes are argon2id PHC strings with a per-password random salt.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use zeroize::Zeroizing;

/// Shortest accepted plain-text password.
pub const PASSWORD_MIN: usize = 6;
/// Longest accepted plain-text password.
pub const PASSWORD_MAX: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasswordError {
    #[error("password must be between {min} and {max} characters")]
    Length { min: usize, max: usize },
    #[error("password hashing failed: {0}")]
    Hashing(String),
}

/// Plain-text password that satisfies the length policy.
///
/// The buffer is wiped on drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlainPassword(Zeroizing<String>);

impl PlainPassword {
    pub fn new(raw: impl Into<String>) -> Result<Self, PasswordError> {
        let raw = Zeroizing::new(raw.into());
        let length = raw.chars().count();
        if !(PASSWORD_MIN..=PASSWORD_MAX).contains(&length) {
            return Err(PasswordError::Length {
                min: PASSWORD_MIN,
                max: PASSWORD_MAX,
            });
        }
        Ok(Self(raw))
    }

    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

/// Hash a password with argon2id.
pub fn hash_password(password: &PlainPassword) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.expose().as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| PasswordError::Hashing(err.to_string()))
}

/// Check `password` against a stored PHC hash.
///
/// A malformed hash never verifies.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}
