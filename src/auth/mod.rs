use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;
use crate::models::User;

/// Session token claims. Everything the client needs to render the current
/// user without another round trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub name: String,
    pub is_admin: bool,
    pub year_of_birth: i64,
    pub is_male: bool,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user: &User, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            is_admin: user.is_admin,
            year_of_birth: user.year_of_birth,
            is_male: user.is_male,
            exp,
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("JWT secret not configured")]
    InvalidSecret,

    #[error("JWT generation error: {0}")]
    Generation(String),

    #[error("Invalid JWT token: {0}")]
    Invalid(String),

    #[error("Password hashing error: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

pub fn generate_jwt(user: &User, security: &SecurityConfig) -> Result<String, TokenError> {
    if security.jwt_secret.is_empty() {
        return Err(TokenError::InvalidSecret);
    }

    let claims = Claims::new(user, security.jwt_expiry_hours);
    let encoding_key = EncodingKey::from_secret(security.jwt_secret.as_bytes());

    encode(&Header::default(), &claims, &encoding_key).map_err(|e| TokenError::Generation(e.to_string()))
}

/// Verify signature and expiry, returning the claims.
pub fn validate_jwt(token: &str, security: &SecurityConfig) -> Result<Claims, TokenError> {
    if security.jwt_secret.is_empty() {
        return Err(TokenError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(security.jwt_secret.as_bytes());
    decode::<Claims>(token, &decoding_key, &Validation::default())
        .map(|data| data.claims)
        .map_err(|e| TokenError::Invalid(e.to_string()))
}

pub fn hash_password(password: &str, cost: u32) -> Result<String, TokenError> {
    Ok(bcrypt::hash(password, cost)?)
}

/// False for a wrong password and for a malformed stored hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn user() -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            email: "ada@example.com".to_string(),
            password_hash: String::new(),
            name: "Ada".to_string(),
            year_of_birth: 1990,
            is_male: false,
            is_admin: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn security() -> SecurityConfig {
        let mut security = AppConfig::development().security;
        security.jwt_secret = "test-secret".to_string();
        security
    }

    #[test]
    fn token_round_trip_keeps_identity() {
        let user = user();
        let token = generate_jwt(&user, &security()).unwrap();
        let claims = validate_jwt(&token, &security()).unwrap();
        assert_eq!(claims.sub, user.id);
        assert!(claims.is_admin);
        assert_eq!(claims.email, "ada@example.com");
    }

    #[test]
    fn tokens_signed_with_another_secret_are_rejected() {
        let token = generate_jwt(&user(), &security()).unwrap();
        let mut other = security();
        other.jwt_secret = "other".to_string();
        assert!(matches!(validate_jwt(&token, &other), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn empty_secret_refuses_to_sign() {
        let mut security = security();
        security.jwt_secret.clear();
        assert!(matches!(generate_jwt(&user(), &security), Err(TokenError::InvalidSecret)));
    }

    #[test]
    fn passwords_verify_against_their_hash() {
        let hash = hash_password("secret1", 4).unwrap();
        assert!(verify_password("secret1", &hash));
        assert!(!verify_password("secret2", &hash));
        assert!(!verify_password("secret1", "not-a-hash"));
    }
}
