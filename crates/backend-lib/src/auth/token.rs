// ============================
// worksphere-backend-lib/src/auth/token.rs
// ============================
//! Signed, time-bounded identity tokens.
//!
//! Tokens are HS256 JWTs carrying the user id, the issue time and the expiry.
//! Nothing is stored server side: a token stays valid until it expires.
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use worksphere_common::UserId;
use zeroize::Zeroizing;

/// Claims encoded in every token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: UserId,
    /// Issued at (seconds since epoch)
    pub iat: i64,
    /// Expiry (seconds since epoch)
    pub exp: i64,
}

/// Why a token was refused
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("token rejected: {0}")]
    Rejected(#[from] jsonwebtoken::errors::Error),

    #[error("token expired at {0}")]
    Expired(i64),

    #[error("token expiry is out of range")]
    ExpiryOutOfRange,
}

/// Issues and verifies bearer tokens with a process-wide secret
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &[u8], ttl: std::time::Duration) -> anyhow::Result<Self> {
        let ttl = Duration::from_std(ttl)?;
        let mut validation = Validation::new(Algorithm::HS256);
        // expiry is checked in `verify_at` against an explicit clock
        validation.validate_exp = false;
        validation.leeway = 0;

        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        })
    }

    /// Build the service from a secret held in a string, wiping the copy.
    pub fn from_secret(secret: Zeroizing<String>, ttl: std::time::Duration) -> anyhow::Result<Self> {
        Self::new(secret.as_bytes(), ttl)
    }

    /// Issue a token for `user_id` valid from now until now + ttl
    pub fn issue(&self, user_id: UserId) -> Result<String, TokenError> {
        self.issue_at(user_id, Utc::now())
    }

    pub fn issue_at(&self, user_id: UserId, now: DateTime<Utc>) -> Result<String, TokenError> {
        let exp = now
            .checked_add_signed(self.ttl)
            .ok_or(TokenError::ExpiryOutOfRange)?;
        let claims = Claims {
            user_id,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Verify a token and return the user id it was issued for
    pub fn verify(&self, token: &str) -> Result<UserId, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify against an explicit clock. A token is expired once `now`
    /// reaches its `exp`; there is no leeway.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<UserId, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)?;
        if now.timestamp() >= data.claims.exp {
            return Err(TokenError::Expired(data.claims.exp));
        }
        Ok(data.claims.user_id)
    }
}
