use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub default_page_size: u32,
    pub max_page_size: u32,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub cors_origin: String,
    pub cookie_name: String,
    pub cookie_secure: bool,
    pub bcrypt_cost: u32,
    pub min_password_length: usize,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

impl AppConfig {
    /// Build the configuration from the process environment.
    ///
    /// `JWT_SECRET`, `DATABASE_URL` and `CORS_ORIGIN` are required; the
    /// server refuses to boot without them.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::store_from_env()?;
        config.security.jwt_secret = required("JWT_SECRET")?;
        config.security.cors_origin = required("CORS_ORIGIN")?;
        Ok(config)
    }

    /// Configuration for tools that only open the store. Session and CORS
    /// settings keep their defaults.
    pub fn store_from_env() -> Result<Self, ConfigError> {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        let mut config = match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()?;

        config.database.url = match config.database.backend {
            StoreBackend::Postgres => required("DATABASE_URL")?,
            StoreBackend::Memory => env::var("DATABASE_URL").unwrap_or_default(),
        };

        Ok(config)
    }

    fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        // Server overrides
        if let Ok(v) = env::var("HOST") {
            self.server.host = v;
        }
        if let Some(v) = env::var("MATHGENIUS_PORT").ok().or_else(|| env::var("PORT").ok()) {
            self.server.port = parse("PORT", &v)?;
        }

        // Database overrides
        if let Ok(v) = env::var("STORE") {
            self.database.backend = match v.as_str() {
                "postgres" | "pg" => StoreBackend::Postgres,
                "memory" | "mem" => StoreBackend::Memory,
                _ => return Err(ConfigError::Invalid { key: "STORE", value: v }),
            };
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse("DATABASE_MAX_CONNECTIONS", &v)?;
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = parse("DATABASE_CONNECTION_TIMEOUT", &v)?;
        }
        if let Ok(v) = env::var("DATABASE_RUN_MIGRATIONS") {
            self.database.run_migrations = parse("DATABASE_RUN_MIGRATIONS", &v)?;
        }

        // API overrides
        if let Ok(v) = env::var("API_DEFAULT_PAGE_SIZE") {
            self.api.default_page_size = parse("API_DEFAULT_PAGE_SIZE", &v)?;
        }
        if let Ok(v) = env::var("API_MAX_PAGE_SIZE") {
            self.api.max_page_size = parse("API_MAX_PAGE_SIZE", &v)?;
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = parse("API_MAX_REQUEST_SIZE_BYTES", &v)?;
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = parse("JWT_EXPIRY_HOURS", &v)?;
        }
        if let Ok(v) = env::var("SESSION_COOKIE_NAME") {
            self.security.cookie_name = v;
        }
        if let Ok(v) = env::var("SESSION_COOKIE_SECURE") {
            self.security.cookie_secure = parse("SESSION_COOKIE_SECURE", &v)?;
        }
        if let Ok(v) = env::var("BCRYPT_COST") {
            self.security.bcrypt_cost = parse("BCRYPT_COST", &v)?;
        }

        Ok(self)
    }

    /// Development defaults. Secrets are left empty and must be filled in.
    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            database: DatabaseConfig {
                backend: StoreBackend::Postgres,
                url: String::new(),
                max_connections: 10,
                connection_timeout: 30,
                run_migrations: true,
            },
            api: ApiConfig {
                default_page_size: 10,
                max_page_size: 100,
                max_request_size_bytes: 1024 * 1024, // 1MB
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24 * 7, // 1 week
                cors_origin: "http://localhost:5173".to_string(),
                cookie_name: "token".to_string(),
                cookie_secure: false,
                bcrypt_cost: 10,
                min_password_length: 6,
            },
        }
    }

    fn staging() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Staging;
        config.database.max_connections = 20;
        config.database.connection_timeout = 10;
        config.security.jwt_expiry_hours = 24;
        config.security.cookie_secure = true;
        config.security.bcrypt_cost = 12;
        config
    }

    fn production() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Production;
        config.database.max_connections = 50;
        config.database.connection_timeout = 5;
        config.database.run_migrations = false;
        config.api.max_page_size = 50;
        config.security.jwt_expiry_hours = 24;
        config.security.cookie_secure = true;
        config.security.bcrypt_cost = 12;
        config.security.min_password_length = 8;
        config
    }
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    match env::var(key) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::Missing(key)),
    }
}

fn parse<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        key,
        value: value.to_string(),
    })
}

// Global singleton config - initialized once at startup
static CONFIG: OnceCell<AppConfig> = OnceCell::new();

/// Load and validate the process-wide configuration on first use.
pub fn init() -> Result<&'static AppConfig, ConfigError> {
    CONFIG.get_or_try_init(AppConfig::from_env)
}
