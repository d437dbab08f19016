//! Central module for application-wide configuration settings.
//!
//! This module loads the server address, the database URL and the limits that
//! bound voucher generation and pagination from environment variables.

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

/// Runtime configuration for the voucher service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub host: IpAddr,
    pub port: u16,
    /// `None` runs the service on the in-memory store.
    pub database_url: Option<String>,
    pub max_db_connections: u32,
    /// Batch size used when a request does not name one.
    pub default_batch_size: usize,
    pub max_batch_size: usize,
    /// Upper bound on vouchers generated by a single request.
    pub max_generation_count: u64,
    pub default_page_size: u32,
    pub max_page_size: u32,
    /// `None` allows any origin.
    pub cors_origin: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 4000,
            database_url: None,
            max_db_connections: 5,
            default_batch_size: 1_000,
            max_batch_size: 10_000,
            max_generation_count: 1_000_000,
            default_page_size: 50,
            max_page_size: 1_000,
            cors_origin: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads `HOST`, `PORT`, `DATABASE_URL`, `DATABASE_MAX_CONNECTIONS`,
    /// `VOUCHER_BATCH_SIZE`, `VOUCHER_MAX_BATCH_SIZE`, `VOUCHER_MAX_COUNT`,
    /// `VOUCHER_PAGE_SIZE`, `VOUCHER_MAX_PAGE_SIZE` and `CORS_ORIGIN`. Unset
    /// variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let config = Self {
            host: parse_or(&lookup, "HOST", defaults.host)?,
            port: parse_or(&lookup, "PORT", defaults.port)?,
            database_url: non_empty("DATABASE_URL"),
            max_db_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", defaults.max_db_connections)?,
            default_batch_size: parse_or(&lookup, "VOUCHER_BATCH_SIZE", defaults.default_batch_size)?,
            max_batch_size: parse_or(&lookup, "VOUCHER_MAX_BATCH_SIZE", defaults.max_batch_size)?,
            max_generation_count: parse_or(&lookup, "VOUCHER_MAX_COUNT", defaults.max_generation_count)?,
            default_page_size: parse_or(&lookup, "VOUCHER_PAGE_SIZE", defaults.default_page_size)?,
            max_page_size: parse_or(&lookup, "VOUCHER_MAX_PAGE_SIZE", defaults.max_page_size)?,
            cors_origin: non_empty("CORS_ORIGIN"),
        };
        config.validate()
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    fn validate(self) -> Result<Self, ConfigError> {
        let invalid = |key: &'static str, value: String| Err(ConfigError::Invalid { key, value });

        if self.max_batch_size == 0 {
            return invalid("VOUCHER_MAX_BATCH_SIZE", self.max_batch_size.to_string());
        }
        if self.default_batch_size == 0 || self.default_batch_size > self.max_batch_size {
            return invalid("VOUCHER_BATCH_SIZE", self.default_batch_size.to_string());
        }
        if self.max_generation_count == 0 {
            return invalid("VOUCHER_MAX_COUNT", self.max_generation_count.to_string());
        }
        if self.max_page_size == 0 {
            return invalid("VOUCHER_MAX_PAGE_SIZE", self.max_page_size.to_string());
        }
        if self.default_page_size == 0 || self.default_page_size > self.max_page_size {
            return invalid("VOUCHER_PAGE_SIZE", self.default_page_size.to_string());
        }
        if self.max_db_connections == 0 {
            return invalid("DATABASE_MAX_CONNECTIONS", self.max_db_connections.to_string());
        }
        Ok(self)
    }
}

/// Reads a single variable from the environment, falling back to `default`
/// when it is unset or blank.
pub fn env_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    parse_or(&|k: &str| env::var(k).ok(), key, default)
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) if raw.trim().is_empty() => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}
