// Password hashing and verification

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;

use crate::auth::error::AuthError;

/// Password service for hashing and verification
pub struct PasswordService;

impl PasswordService {
    /// Hash a password using Argon2id with a fresh per-record salt
    pub fn hash_password(password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::PasswordHashError(e.to_string()))
    }

    /// Verify a password against a stored PHC hash
    ///
    /// A mismatch is `Ok(false)`; only an unreadable stored hash is an error.
    pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(hash).map_err(|e| AuthError::PasswordHashError(e.to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    /// Hash on the blocking pool so request workers are not stalled
    pub async fn hash_password_blocking(password: String) -> Result<String, AuthError> {
        tokio::task::spawn_blocking(move || Self::hash_password(&password))
            .await
            .map_err(|e| AuthError::PasswordHashError(e.to_string()))?
    }

    pub async fn verify_password_blocking(password: String, hash: String) -> Result<bool, AuthError> {
        tokio::task::spawn_blocking(move || Self::verify_password(&password, &hash))
            .await
            .map_err(|e| AuthError::PasswordHashError(e.to_string()))?
    }
}
