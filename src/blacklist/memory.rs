use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;

use super::{token_key, BlacklistError, TokenBlacklist};

/// Upper bound on revoked tokens held in memory.
pub const MAX_REVOKED_TOKENS: u64 = 100_000;

/// Each entry lives for the remaining lifetime of its token.
struct RemainingLifetime;

impl Expiry<String, Duration> for RemainingLifetime {
    fn expire_after_create(&self, _key: &String, ttl: &Duration, _created_at: Instant) -> Option<Duration> {
        Some(*ttl)
    }
}

/// Single-process blacklist for development and tests.
pub struct MemoryBlacklist {
    entries: Cache<String, Duration>,
    prefix: String,
}

impl MemoryBlacklist {
    pub fn new(prefix: &str) -> Self {
        Self::with_capacity(prefix, MAX_REVOKED_TOKENS)
    }

    pub fn with_capacity(prefix: &str, capacity: u64) -> Self {
        let entries = Cache::builder()
            .max_capacity(capacity)
            .expire_after(RemainingLifetime)
            .build();

        Self {
            entries,
            prefix: prefix.to_string(),
        }
    }
}

#[async_trait]
impl TokenBlacklist for MemoryBlacklist {
    async fn revoke(&self, token: &str, ttl: Duration) -> Result<(), BlacklistError> {
        self.entries.insert(token_key(&self.prefix, token), ttl).await;
        Ok(())
    }

    async fn is_revoked(&self, token: &str) -> Result<bool, BlacklistError> {
        Ok(self.entries.get(&token_key(&self.prefix, token)).await.is_some())
    }

    async fn health_check(&self) -> Result<(), BlacklistError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn revoked_token_is_reported_until_expiry() {
        let blacklist = MemoryBlacklist::new("test");
        assert!(!blacklist.is_revoked("a").await.unwrap());

        blacklist.revoke("a", Duration::from_secs(60)).await.unwrap();
        assert!(blacklist.is_revoked("a").await.unwrap());
        assert!(!blacklist.is_revoked("b").await.unwrap());
    }

    #[tokio::test]
    async fn expired_entries_are_ignored() {
        let blacklist = MemoryBlacklist::new("test");
        blacklist.revoke("old", Duration::from_millis(50)).await.unwrap();
        blacklist.revoke("fresh", Duration::from_secs(60)).await.unwrap();

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!blacklist.is_revoked("old").await.unwrap());
        assert!(blacklist.is_revoked("fresh").await.unwrap());
    }

    #[tokio::test]
    async fn entry_count_stays_within_capacity() {
        let blacklist = MemoryBlacklist::with_capacity("test", 10);
        for i in 0..500 {
            blacklist
                .revoke(&format!("token-{}", i), Duration::from_secs(3600))
                .await
                .unwrap();
        }
        blacklist.entries.run_pending_tasks().await;
        assert!(blacklist.entries.entry_count() <= 10);
    }
}
