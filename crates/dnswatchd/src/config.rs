//! Daemon configuration
//!
//! All configuration is read from environment variables:
//!
//! ### Server
//! - `DNSWATCH_BIND_ADDR`: Address of the HTTP listener (default `0.0.0.0:5100`)
//! - `DNSWATCH_LOG_LEVEL`: trace, debug, info, warn or error (default `info`)
//!
//! ### Monitoring
//! - `DNSWATCH_POLL_INTERVAL_SECS`: Delay between queries of one domain (default 10)
//! - `DNSWATCH_DEFAULT_NAMESERVER`: Nameserver used when a request names none (default `8.8.8.8`)
//! - `DNSWATCH_QUERY_TIMEOUT_SECS`: Timeout of a single query (default 5)
//! - `DNSWATCH_QUERY_ATTEMPTS`: Attempts per query (default 2)
//! - `DNSWATCH_NORMALIZE_ORDER`: Compare multi-value answers order-independently (default false)

use anyhow::{Context, Result};
use dnswatch_core::MonitorConfig;
use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

/// Default HTTP listener address
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5100";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP listener address
    pub bind_addr: SocketAddr,

    /// Settings for the registry and every monitor
    pub monitor: MonitorConfig,

    /// Log level name
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup
    pub fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = MonitorConfig::default();

        let bind_addr = parse_var(&var, "DNSWATCH_BIND_ADDR")?
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 5100)));

        let monitor = MonitorConfig {
            poll_interval_secs: parse_var(&var, "DNSWATCH_POLL_INTERVAL_SECS")?
                .unwrap_or(defaults.poll_interval_secs),
            default_ttl_secs: defaults.default_ttl_secs,
            default_nameserver: var("DNSWATCH_DEFAULT_NAMESERVER")
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.default_nameserver),
            query_timeout_secs: parse_var(&var, "DNSWATCH_QUERY_TIMEOUT_SECS")?
                .unwrap_or(defaults.query_timeout_secs),
            query_attempts: parse_var(&var, "DNSWATCH_QUERY_ATTEMPTS")?
                .unwrap_or(defaults.query_attempts),
            normalize_value_order: parse_var(&var, "DNSWATCH_NORMALIZE_ORDER")?
                .unwrap_or(defaults.normalize_value_order),
        };

        Ok(Self {
            bind_addr,
            monitor,
            log_level: var("DNSWATCH_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Validate the configuration
    ///
    /// This performs:
    /// - Monitor settings validation (interval range, nameserver format)
    /// - Numeric range validation for query settings
    /// - Log level validation
    pub fn validate(&self) -> Result<()> {
        self.monitor
            .validate()
            .context("invalid monitoring configuration")?;

        if !(1..=60).contains(&self.monitor.query_timeout_secs) {
            anyhow::bail!(
                "DNSWATCH_QUERY_TIMEOUT_SECS must be between 1 and 60 seconds. Got: {}",
                self.monitor.query_timeout_secs
            );
        }

        if !(1..=10).contains(&self.monitor.query_attempts) {
            anyhow::bail!(
                "DNSWATCH_QUERY_ATTEMPTS must be between 1 and 10. Got: {}",
                self.monitor.query_attempts
            );
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "DNSWATCH_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }
}

/// Parse an optional variable, failing on malformed values
fn parse_var<F, T>(var: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{} has an invalid value: '{}'", key, raw)),
        _ => Ok(None),
    }
}
