// JWT token issuing and verification

use crate::auth::error::AuthError;
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid, // user id
    pub iat: i64,
    pub exp: i64,
}

/// Token service for JWT operations
///
/// Built once from configuration; the secret and lifetime never change
/// afterwards.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expiry_secs: i64,
}

impl TokenService {
    pub fn new(secret: &str, expiry: Duration) -> Self {
        // Expiry is exact; no clock-skew grace period
        let mut validation = Validation::default();
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            expiry_secs: i64::try_from(expiry.as_secs()).unwrap_or(i64::MAX),
        }
    }

    /// Issue a bearer token whose subject is `user_id`
    pub fn issue(&self, user_id: Uuid) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id,
            iat: now,
            exp: now.saturating_add(self.expiry_secs),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenGenerationError(e.to_string()))
    }

    /// Check signature and expiry, returning the full claims
    pub fn decode_claims(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!("Token rejected: {:?}", e.kind());
                AuthError::InvalidToken
            })
    }

    /// Verify a token and return the user id it was issued for
    pub fn verify(&self, token: &str) -> Result<Uuid, AuthError> {
        self.decode_claims(token).map(|claims| claims.sub)
    }
}
