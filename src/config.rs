//! # Unified Application Configuration
//!
//! Consolidates database, parser, catalog and observability settings into one
//! structure loaded from environment variables (a `.env` file is honoured),
//! with per-section validation.

use crate::catalog::{detect_language, Language};
use crate::errors::{error_logging, AppError, AppResult};
use crate::observability_config::ObservabilityConfig;
use crate::text_processing::ParserConfig;
use serde::{Deserialize, Serialize};
use std::env;

/// Database configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,
    /// Minimum number of idle connections
    pub min_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            connect_timeout_secs: 30,
            min_connections: 1,
        }
    }
}

impl DatabaseConfig {
    /// Validate database configuration
    pub fn validate(&self) -> AppResult<()> {
        if self.url.trim().is_empty() {
            return Err(AppError::Config("Database URL cannot be empty".to_string()));
        }

        if !self.url.starts_with("postgresql://") && !self.url.starts_with("postgres://") {
            return Err(AppError::Config(
                "Database URL must start with 'postgresql://' or 'postgres://'".to_string(),
            ));
        }

        let connection_part = self.url.split("://").nth(1).unwrap_or("");
        if !connection_part.contains('@') {
            return Err(AppError::Config(
                "Database URL must contain authentication information".to_string(),
            ));
        }

        if self.max_connections == 0 {
            return Err(AppError::Config("Max connections cannot be 0".to_string()));
        }

        if self.max_connections > 100 {
            return Err(AppError::Config(
                "Max connections cannot be greater than 100".to_string(),
            ));
        }

        if self.connect_timeout_secs == 0 || self.connect_timeout_secs > 300 {
            return Err(AppError::Config(
                "Connect timeout must be between 1 and 300 seconds".to_string(),
            ));
        }

        if self.min_connections > self.max_connections {
            return Err(AppError::Config(
                "Min connections cannot be greater than max connections".to_string(),
            ));
        }

        Ok(())
    }
}

/// Reference catalog settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Language used when a request does not name one
    pub default_language: Language,
    /// Directory holding `<lang>/catalog.ftl`
    pub locales_dir: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            default_language: Language::En,
            locales_dir: "locales".to_string(),
        }
    }
}

impl CatalogConfig {
    pub fn validate(&self) -> AppResult<()> {
        if self.locales_dir.trim().is_empty() {
            return Err(AppError::Config(
                "Catalog locales directory cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Unified application configuration
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub parser: ParserConfig,
    pub catalog: CatalogConfig,
    pub observability: ObservabilityConfig,
}

fn env_number<T: std::str::FromStr>(key: &str, default: &str) -> AppResult<T> {
    env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|_| {
            let error = AppError::Config(format!("{} must be a valid number", key));
            error_logging::log_config_error(&error, key, "from_env");
            error
        })
}

fn log_section(section: &'static str) -> impl Fn(&AppError) {
    move |e: &AppError| error_logging::log_config_error(e, section, "validate")
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        config.database.url = env::var("DATABASE_URL").map_err(|_| {
            let error =
                AppError::Config("DATABASE_URL environment variable is required".to_string());
            error_logging::log_config_error(&error, "DATABASE_URL", "from_env");
            error
        })?;
        config.database.max_connections = env_number("DATABASE_MAX_CONNECTIONS", "10")?;
        config.database.connect_timeout_secs = env_number("DATABASE_CONNECT_TIMEOUT_SECS", "30")?;
        config.database.min_connections = env_number("DATABASE_MIN_CONNECTIONS", "1")?;

        config.parser.max_ingredient_length = env_number("MAX_INGREDIENT_LENGTH", "255")?;

        config.catalog.default_language =
            detect_language(env::var("DEFAULT_LANGUAGE").ok().as_deref());
        if let Ok(dir) = env::var("CATALOG_LOCALES_DIR") {
            config.catalog.locales_dir = dir;
        }

        config.observability = ObservabilityConfig::from_env();

        Ok(config)
    }

    /// Validate all configuration sections
    ///
    /// The first failing section is logged with its name and returned.
    pub fn validate(&self) -> AppResult<()> {
        self.database.validate().inspect_err(log_section("database"))?;
        self.parser.validate().inspect_err(log_section("parser"))?;
        self.catalog.validate().inspect_err(log_section("catalog"))?;
        self.observability
            .validate()
            .inspect_err(log_section("observability"))?;
        Ok(())
    }

    /// Get a summary of the current configuration for logging
    pub fn summary(&self) -> String {
        format!(
            "Configuration: db_url=[REDACTED], max_connections={}, default_language={}, \
             locales_dir={}, environment={}, metrics_export={}",
            self.database.max_connections,
            self.catalog.default_language,
            self.catalog.locales_dir,
            self.observability.environment,
            self.observability.enable_metrics_export
        )
    }
}
