//! API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults. A `.env` file in the working directory is read first if present.

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use tracing::warn;
use wako_pdf::BusinessProfile;

const DEV_JWT_SECRET: &str = "wako-dev-secret-change-in-production";

/// API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// HTTP listen port
    pub http_port: u16,

    /// SQLite database file
    pub database_path: String,

    /// Pool size
    pub db_max_connections: u32,

    /// JWT secret key for signing tokens
    pub jwt_secret: String,

    /// JWT lifetime in seconds
    pub jwt_lifetime_secs: i64,

    /// Shop-local offset from UTC in hours, used for code dates and printed dates
    pub utc_offset_hours: i32,

    /// Seller details printed on invoices
    pub business: BusinessProfile,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = BusinessProfile::default();

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => secret,
            _ => {
                // In production, this MUST be set via environment variable
                warn!("JWT_SECRET not set, using the development secret");
                DEV_JWT_SECRET.to_string()
            }
        };

        let config = ApiConfig {
            http_port: parse_var("HTTP_PORT", 3000)?,

            database_path: env::var("DATABASE_PATH").unwrap_or_else(|_| "./wako.db".to_string()),

            db_max_connections: parse_var("DB_MAX_CONNECTIONS", 5)?,

            jwt_secret,

            jwt_lifetime_secs: parse_var("JWT_LIFETIME_SECS", 86_400)?,

            utc_offset_hours: parse_var("UTC_OFFSET_HOURS", 7)?,

            business: BusinessProfile {
                name: env::var("BUSINESS_NAME").unwrap_or(defaults.name),
                address_lines: env::var("BUSINESS_ADDRESS")
                    .map(|v| split_lines(&v))
                    .unwrap_or(defaults.address_lines),
                phone: env::var("BUSINESS_PHONE").ok().or(defaults.phone),
                bank_name: env::var("BANK_NAME").unwrap_or(defaults.bank_name),
                bank_account: env::var("BANK_ACCOUNT").unwrap_or(defaults.bank_account),
                bank_account_holder: env::var("BANK_ACCOUNT_HOLDER")
                    .unwrap_or(defaults.bank_account_holder),
            },
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()));
        }
        if config.jwt_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue("JWT_LIFETIME_SECS".to_string()));
        }
        config.local_offset()?;

        Ok(config)
    }

    /// The configured offset as a chrono type.
    pub fn local_offset(&self) -> Result<FixedOffset, ConfigError> {
        self.utc_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| ConfigError::InvalidValue("UTC_OFFSET_HOURS".to_string()))
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name.to_string())),
        Err(_) => Ok(default),
    }
}

fn split_lines(value: &str) -> Vec<String> {
    value
        .split('|')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
