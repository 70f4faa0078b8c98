use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use tokio::sync::OnceCell;

use super::{token_key, BlacklistError, TokenBlacklist};

/// Blacklist stored as expiring Redis keys.
///
/// The connection is opened on first use so the service starts even when
/// Redis is unreachable; requests that need it then fail with a server error.
pub struct RedisBlacklist {
    client: redis::Client,
    conn: OnceCell<ConnectionManager>,
    prefix: String,
}

impl RedisBlacklist {
    pub fn new(url: &str, prefix: &str) -> Result<Self, BlacklistError> {
        let client = redis::Client::open(url).map_err(|e| BlacklistError::Connection(e.to_string()))?;
        Ok(Self {
            client,
            conn: OnceCell::new(),
            prefix: prefix.to_string(),
        })
    }

    async fn connection(&self) -> Result<ConnectionManager, BlacklistError> {
        let conn = self
            .conn
            .get_or_try_init(|| ConnectionManager::new(self.client.clone()))
            .await?;
        Ok(conn.clone())
    }
}

#[async_trait]
impl TokenBlacklist for RedisBlacklist {
    async fn revoke(&self, token: &str, ttl: Duration) -> Result<(), BlacklistError> {
        let mut conn = self.connection().await?;
        // SET key 1 EX seconds
        redis::cmd("SET")
            .arg(token_key(&self.prefix, token))
            .arg(1)
            .arg("EX")
            .arg(ttl.as_secs().max(1))
            .query_async::<()>(&mut conn)
            .await?;
        Ok(())
    }

    async fn is_revoked(&self, token: &str) -> Result<bool, BlacklistError> {
        let mut conn = self.connection().await?;
        let exists: bool = redis::cmd("EXISTS")
            .arg(token_key(&self.prefix, token))
            .query_async(&mut conn)
            .await?;
        Ok(exists)
    }

    async fn health_check(&self) -> Result<(), BlacklistError> {
        let mut conn = self.connection().await?;
        redis::cmd("PING").query_async::<String>(&mut conn).await?;
        Ok(())
    }
}
