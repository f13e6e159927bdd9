use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::User;

/// Represents the claims encoded within an identity token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    pub email: String,
    pub username: String,
    /// Subject of the token; always the user's email.
    pub sub: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: usize,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
}

/// Issues and validates HS256-signed identity tokens.
///
/// Tokens are self-contained: nothing is stored server-side, and there is no
/// refresh. Once `exp` passes the user has to log in again.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    /// Returns `AppError::Signing` when the secret is empty.
    pub fn new(secret: &str, ttl: Duration) -> Result<Self, AppError> {
        if secret.is_empty() {
            return Err(AppError::Signing("signing secret is not configured".into()));
        }
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        })
    }

    pub fn issue(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            email: user.email.clone(),
            username: user.username.clone(),
            sub: user.email.clone(),
            iat: now.timestamp().max(0) as usize,
            exp: (now + self.ttl).timestamp().max(0) as usize,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Signing(format!("Failed to generate token: {}", e)))
    }

    /// Checks signature and expiry. Every failure is `AppError::Unauthorized`.
    pub fn validate(&self, token: &str) -> Result<Claims, AppError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }
}
