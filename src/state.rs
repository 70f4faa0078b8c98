use std::sync::Arc;

use sqlx::PgPool;

use crate::blacklist::TokenBlacklist;
use crate::config::AppConfig;
use crate::database::{ApplicationRepository, KingdomRepository, UserRepository};

/// Shared handles passed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub blacklist: Arc<dyn TokenBlacklist>,
    pub config: Arc<AppConfig>,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(pool: PgPool, blacklist: Arc<dyn TokenBlacklist>, config: AppConfig) -> Self {
        Self {
            pool,
            blacklist,
            config: Arc::new(config),
            http: reqwest::Client::new(),
        }
    }

    pub fn kingdoms(&self) -> KingdomRepository {
        KingdomRepository::new(self.pool.clone())
    }

    pub fn applications(&self) -> ApplicationRepository {
        ApplicationRepository::new(self.pool.clone())
    }

    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }
}
