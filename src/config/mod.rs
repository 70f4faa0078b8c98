use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("redis port must be int value: {0}")]
    InvalidRedisPort(String),

    #[error("invalid database settings: {0}")]
    InvalidDatabase(String),

    #[error("JWT_SECRET must be set in production")]
    MissingJwtSecret,

    #[error("ASYNC_SERVICE_KEY must be set in production when the async service is enabled")]
    MissingAsyncKey,

    #[error("SECURITY_JWT_EXPIRY_HOURS must be between 1 and {max}, got {value}")]
    InvalidJwtExpiry { value: u64, max: u64 },
}

/// Upper bound for session lifetime, one year.
pub const MAX_JWT_EXPIRY_HOURS: u64 = 24 * 366;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub security: SecurityConfig,
    pub async_service: AsyncServiceConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Full connection string. When absent it is assembled from the DB_* variables.
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Unset host means the in-process blacklist is used (development only).
    pub host: Option<String>,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    pub key_prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub jwt_issuer: String,
    pub cookie_name: String,
    pub cookie_secure: bool,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AsyncServiceConfig {
    pub enabled: bool,
    pub url: String,
    pub key: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("SERVICE_HOST") {
            self.server.host = v;
        }
        if let Some(port) = env::var("SERVICE_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.server.port = port;
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Ok(v) = env::var("DB_HOST") {
            self.database.host = v;
        }
        if let Ok(v) = env::var("DB_PORT") {
            self.database.port = v.parse().unwrap_or(self.database.port);
        }
        if let Ok(v) = env::var("DB_USER") {
            self.database.user = v;
        }
        if let Ok(v) = env::var("DB_PASS") {
            self.database.password = v;
        }
        if let Ok(v) = env::var("DB_NAME") {
            self.database.name = v;
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_RUN_MIGRATIONS") {
            self.database.run_migrations = v.parse().unwrap_or(self.database.run_migrations);
        }

        // Redis overrides. The port is validated in `validate`, so keep the raw value around.
        if let Ok(v) = env::var("REDIS_HOST") {
            self.redis.host = Some(v).filter(|h| !h.is_empty());
        }
        if let Ok(v) = env::var("REDIS_USER") {
            self.redis.user = Some(v).filter(|u| !u.is_empty());
        }
        if let Ok(v) = env::var("REDIS_PASSWORD") {
            self.redis.password = Some(v).filter(|p| !p.is_empty());
        }
        if let Ok(v) = env::var("REDIS_PORT") {
            if let Ok(port) = v.parse() {
                self.redis.port = port;
            }
        }
        if let Ok(v) = env::var("REDIS_KEY_PREFIX") {
            self.redis.key_prefix = v;
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_COOKIE_SECURE") {
            self.security.cookie_secure = v.parse().unwrap_or(self.security.cookie_secure);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }

        // Async service overrides
        if let Ok(v) = env::var("ASYNC_SERVICE_ENABLED") {
            self.async_service.enabled = v.parse().unwrap_or(self.async_service.enabled);
        }
        if let Ok(v) = env::var("ASYNC_SERVICE_URL") {
            self.async_service.url = v;
        }
        if let Ok(v) = env::var("ASYNC_SERVICE_KEY") {
            self.async_service.key = v;
        }

        self
    }

    /// Startup checks that cannot be expressed as defaults.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Ok(raw) = env::var("REDIS_PORT") {
            raw.parse::<u16>()
                .map_err(|e| ConfigError::InvalidRedisPort(e.to_string()))?;
        }
        if self.environment == Environment::Production && self.security.jwt_secret.is_empty() {
            return Err(ConfigError::MissingJwtSecret);
        }
        if self.environment == Environment::Production
            && self.async_service.enabled
            && self.async_service.key.is_empty()
        {
            return Err(ConfigError::MissingAsyncKey);
        }
        let hours = self.security.jwt_expiry_hours;
        if hours == 0 || hours > MAX_JWT_EXPIRY_HOURS {
            return Err(ConfigError::InvalidJwtExpiry {
                value: hours,
                max: MAX_JWT_EXPIRY_HOURS,
            });
        }
        self.database.connection_url()?;
        Ok(())
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
            database: DatabaseConfig {
                url: None,
                host: "localhost".to_string(),
                port: 5432,
                user: "postgres".to_string(),
                password: "postgres".to_string(),
                name: "kingdoms".to_string(),
                max_connections: 10,
                connection_timeout: 30,
                run_migrations: true,
            },
            redis: RedisConfig {
                host: None,
                port: 6379,
                user: None,
                password: None,
                key_prefix: "kingdoms:blacklist".to_string(),
            },
            security: SecurityConfig {
                jwt_secret: "kingdoms-dev-secret".to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
                jwt_issuer: "kingdoms-api".to_string(),
                cookie_name: "kingdoms-token".to_string(),
                cookie_secure: false,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
            },
            async_service: AsyncServiceConfig {
                enabled: false,
                url: "http://127.0.0.1:8080/".to_string(),
                key: "secret".to_string(),
            },
        }
    }

    fn staging() -> Self {
        let dev = Self::development();
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                max_connections: 20,
                connection_timeout: 10,
                ..dev.database
            },
            redis: RedisConfig {
                host: Some("localhost".to_string()),
                ..dev.redis
            },
            security: SecurityConfig {
                jwt_expiry_hours: 24,
                cookie_secure: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
                ..dev.security
            },
            async_service: AsyncServiceConfig {
                enabled: true,
                ..dev.async_service
            },
            ..dev
        }
    }

    fn production() -> Self {
        let dev = Self::development();
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                max_connections: 50,
                connection_timeout: 5,
                run_migrations: false,
                ..dev.database
            },
            redis: RedisConfig {
                host: Some("localhost".to_string()),
                ..dev.redis
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 4,
                cookie_secure: true,
                cors_origins: vec!["https://app.example.com".to_string()],
                ..dev.security
            },
            async_service: AsyncServiceConfig {
                enabled: true,
                key: String::new(),
                ..dev.async_service
            },
            ..dev
        }
    }
}

impl DatabaseConfig {
    /// DATABASE_URL wins; otherwise the URL is built from the individual parts.
    pub fn connection_url(&self) -> Result<String, ConfigError> {
        if let Some(url) = &self.url {
            return Ok(url.clone());
        }

        let mut url = url::Url::parse(&format!("postgres://{}:{}", self.host, self.port))
            .map_err(|e| ConfigError::InvalidDatabase(e.to_string()))?;
        url.set_username(&self.user)
            .map_err(|_| ConfigError::InvalidDatabase("invalid user".to_string()))?;
        url.set_password(Some(&self.password))
            .map_err(|_| ConfigError::InvalidDatabase("invalid password".to_string()))?;
        url.set_path(&format!("/{}", self.name));
        Ok(url.into())
    }
}

impl RedisConfig {
    pub fn connection_url(&self) -> Option<String> {
        let host = self.host.as_ref()?;
        let auth = match (&self.user, &self.password) {
            (Some(user), Some(pass)) => format!("{}:{}@", user, pass),
            (None, Some(pass)) => format!(":{}@", pass),
            _ => String::new(),
        };
        Some(format!("redis://{}{}:{}/", auth, host, self.port))
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

pub fn config() -> &'static AppConfig {
    &CONFIG
}
