pub mod revocation;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::database::models::product::UserId;

pub use revocation::RevocationList;

/// Authenticated actor making a request, derived from a verified bearer token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: UserId,
}

impl Principal {
    pub fn new(id: UserId) -> Self {
        Self { id }
    }
}

impl From<&Claims> for Principal {
    fn from(claims: &Claims) -> Self {
        Self { id: claims.sub }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Principal id
    pub sub: UserId,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: UserId, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT secret not configured")]
    InvalidSecret,

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),
}

/// Sign a set of claims with the shared HS256 secret
pub fn encode_claims(secret: &str, claims: &Claims) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

/// Mint a bearer token for `user_id` valid for `expiry_hours`
pub fn issue_token(secret: &str, user_id: UserId, expiry_hours: u64) -> Result<String, JwtError> {
    let out_of_range = || JwtError::TokenGeneration(format!("expiry of {expiry_hours} hours is out of range"));

    let ttl = i64::try_from(expiry_hours)
        .ok()
        .and_then(Duration::try_hours)
        .ok_or_else(out_of_range)?;
    let now = Utc::now();
    let expires_at = now.checked_add_signed(ttl).ok_or_else(out_of_range)?;

    let claims = Claims {
        sub: user_id,
        iat: now.timestamp(),
        exp: expires_at.timestamp(),
    };
    encode_claims(secret, &claims)
}

/// Verify signature and expiry, returning the decoded claims
pub fn validate_token(secret: &str, token: &str) -> Result<Claims, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    decode::<Claims>(token, &decoding_key, &Validation::default())
        .map(|data| data.claims)
        .map_err(|e| JwtError::InvalidToken(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";

    #[test]
    fn issued_token_round_trips_principal() {
        let token = issue_token(SECRET, 17, 1).unwrap();
        let claims = validate_token(SECRET, &token).unwrap();
        assert_eq!(Principal::from(&claims), Principal::new(17));
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn expired_token_is_rejected() {
        let claims = Claims::new(3, Duration::hours(-2));
        let token = encode_claims(SECRET, &claims).unwrap();
        assert!(matches!(validate_token(SECRET, &token), Err(JwtError::InvalidToken(_))));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = issue_token("someone-else", 3, 1).unwrap();
        assert!(validate_token(SECRET, &token).is_err());
    }

    #[test]
    fn oversized_expiry_is_an_error() {
        for hours in [u64::MAX, 10_000_000_000_000, i64::MAX as u64] {
            assert!(matches!(issue_token(SECRET, 1, hours), Err(JwtError::TokenGeneration(_))));
        }
        assert!(issue_token(SECRET, 1, 24 * 365 * 100).is_ok());
    }

    #[test]
    fn empty_secret_is_refused() {
        assert!(matches!(issue_token("", 1, 1), Err(JwtError::InvalidSecret)));
        assert!(matches!(validate_token("", "abc"), Err(JwtError::InvalidSecret)));
    }
}
