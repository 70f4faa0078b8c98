use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{SecurityConfig, MAX_JWT_EXPIRY_HOURS};
use crate::database::models::{Role, User};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    InvalidToken(String),

    #[error("JWT secret is not configured")]
    InvalidSecret,

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("password hashing error: {0}")]
    PasswordHash(String),
}

/// Session claims carried by the cookie token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// User UUID
    pub sub: String,
    pub id: i32,
    pub name: String,
    pub role: i16,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user: &User, security: &SecurityConfig) -> Self {
        let now = Utc::now();
        let hours = security.jwt_expiry_hours.min(MAX_JWT_EXPIRY_HOURS) as i64;
        let exp = (now + Duration::hours(hours)).timestamp();

        Self {
            sub: user.uuid.to_string(),
            id: user.id,
            name: user.name.clone(),
            role: user.role,
            iss: security.jwt_issuer.clone(),
            iat: now.timestamp(),
            exp,
        }
    }

    pub fn role(&self) -> Role {
        Role::try_from(self.role).unwrap_or(Role::Unknown)
    }

    /// Seconds until expiry, never less than one so a revoked token is
    /// always blacklisted for at least a moment.
    pub fn remaining_secs(&self) -> u64 {
        (self.exp - Utc::now().timestamp()).max(1) as u64
    }
}

pub fn generate_jwt(claims: &Claims, security: &SecurityConfig) -> Result<String, AuthError> {
    if security.jwt_secret.is_empty() {
        return Err(AuthError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(security.jwt_secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key).map_err(|e| AuthError::TokenGeneration(e.to_string()))
}

/// Issues a token for the user and returns it with its lifetime in seconds.
pub fn issue_token(user: &User, security: &SecurityConfig) -> Result<(String, i64), AuthError> {
    let claims = Claims::new(user, security);
    let token = generate_jwt(&claims, security)?;
    Ok((token, claims.exp - claims.iat))
}

pub fn validate_token(token: &str, security: &SecurityConfig) -> Result<Claims, AuthError> {
    if security.jwt_secret.is_empty() {
        return Err(AuthError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(security.jwt_secret.as_bytes());
    let mut validation = Validation::default();
    validation.set_issuer(&[security.jwt_issuer.as_str()]);

    decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| AuthError::InvalidToken(e.to_string()))
}

/// Argon2id with a random salt, PHC string output.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::PasswordHash(e.to_string()))
}

/// A stored value that is not a valid PHC string never matches.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!("Stored password hash is malformed: {}", e);
            false
        }
    }
}
