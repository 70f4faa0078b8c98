//! Revoked session tokens.
//!
//! A token that was logged out stays in the blacklist until it would have
//! expired anyway. Keys are SHA-256 digests of the token, never the token itself.

pub mod memory;
pub mod redis;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{AppConfig, Environment};

pub use self::memory::MemoryBlacklist;
pub use self::redis::RedisBlacklist;

#[derive(Debug, Error)]
pub enum BlacklistError {
    #[error("redis error: {0}")]
    Redis(#[from] ::redis::RedisError),

    #[error("blacklist connection error: {0}")]
    Connection(String),
}

#[async_trait]
pub trait TokenBlacklist: Send + Sync {
    /// Marks the token revoked for `ttl`.
    async fn revoke(&self, token: &str, ttl: Duration) -> Result<(), BlacklistError>;

    async fn is_revoked(&self, token: &str) -> Result<bool, BlacklistError>;

    async fn health_check(&self) -> Result<(), BlacklistError>;
}

pub fn token_key(prefix: &str, token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    format!("{}:{}", prefix, hex::encode(digest))
}

/// Redis when a host is configured, otherwise the in-process store.
/// Production refuses to run without Redis.
pub fn from_config(config: &AppConfig) -> Result<Arc<dyn TokenBlacklist>, BlacklistError> {
    match config.redis.connection_url() {
        Some(url) => {
            info!(
                "Token blacklist backed by Redis on port {} (prefix {})",
                config.redis.port, config.redis.key_prefix
            );
            Ok(Arc::new(RedisBlacklist::new(&url, &config.redis.key_prefix)?))
        }
        None if config.environment == Environment::Production => Err(BlacklistError::Connection(
            "REDIS_HOST must be set in production".to_string(),
        )),
        None => {
            warn!("REDIS_HOST is not set, revoked tokens are kept in memory");
            Ok(Arc::new(MemoryBlacklist::new(&config.redis.key_prefix)))
        }
    }
}
