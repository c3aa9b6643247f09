// src/config.rs - Configuration from environment variables
use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub thresholds: ThresholdConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

/// Domain thresholds driving the derived inventory status and alert
/// generation.
#[derive(Debug, Clone)]
pub struct ThresholdConfig {
    /// Stock level (%) at or below which an item is 'low'.
    pub stock_low_pct: i64,
    /// Stock level (%) at or below which an item is 'critical'.
    pub stock_critical_pct: i64,
    /// Running machines below this efficiency raise a warning alert.
    pub efficiency_warn: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            allowed_origins: vec!["*".to_string()],
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:dyetrack.db".to_string(),
            max_connections: 10,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            stock_low_pct: 50,
            stock_critical_pct: 20,
            efficiency_warn: 85,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            logging: LoggingConfig::default(),
            thresholds: ThresholdConfig::default(),
        }
    }
}

pub fn load_config() -> Result<Config> {
    let defaults = Config::default();

    let server = ServerConfig {
        host: env::var("HOST").unwrap_or(defaults.server.host),
        port: parse_env("PORT", defaults.server.port)?,
        allowed_origins: env::var("ALLOWED_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or(defaults.server.allowed_origins),
    };

    let database = DatabaseConfig {
        url: env::var("DATABASE_URL").unwrap_or(defaults.database.url),
        max_connections: parse_env("DATABASE_MAX_CONNECTIONS", defaults.database.max_connections)?,
    };

    let logging = LoggingConfig {
        level: env::var("LOG_LEVEL").unwrap_or(defaults.logging.level),
    };

    let thresholds = ThresholdConfig {
        stock_low_pct: parse_env("STOCK_LOW_PCT", defaults.thresholds.stock_low_pct)?,
        stock_critical_pct: parse_env(
            "STOCK_CRITICAL_PCT",
            defaults.thresholds.stock_critical_pct,
        )?,
        efficiency_warn: parse_env("EFFICIENCY_WARN", defaults.thresholds.efficiency_warn)?,
    };

    if thresholds.stock_critical_pct > thresholds.stock_low_pct {
        anyhow::bail!(
            "STOCK_CRITICAL_PCT ({}) must not exceed STOCK_LOW_PCT ({})",
            thresholds.stock_critical_pct,
            thresholds.stock_low_pct
        );
    }

    Ok(Config {
        server,
        database,
        logging,
        thresholds,
    })
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("Invalid value for {}: '{}'", key, raw)),
        Err(_) => Ok(default),
    }
}
