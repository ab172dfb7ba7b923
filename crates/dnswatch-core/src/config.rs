//! Configuration types for dnswatch
//!
//! This module defines the settings shared by the registry, every monitor
//! loop and the resolver factory.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Lower bound for the polling interval
pub const MIN_POLL_INTERVAL_SECS: u64 = 1;

/// Upper bound for the polling interval
pub const MAX_POLL_INTERVAL_SECS: u64 = 3600;

/// Monitor configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Delay between two queries of the same domain (in seconds)
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// TTL assumed when the resolver does not expose one (in seconds)
    #[serde(default = "default_ttl_secs")]
    pub default_ttl_secs: u32,

    /// Nameserver used when a start request does not name one
    #[serde(default = "default_nameserver")]
    pub default_nameserver: String,

    /// Timeout of a single query, enforced by the resolver (in seconds)
    #[serde(default = "default_query_timeout_secs")]
    pub query_timeout_secs: u64,

    /// Attempts per query, enforced by the resolver
    #[serde(default = "default_query_attempts")]
    pub query_attempts: usize,

    /// Sort resource data before comparing values
    ///
    /// When disabled, values are compared in the order the server returned
    /// them, so a reordered multi-value answer is reported as a change.
    #[serde(default)]
    pub normalize_value_order: bool,
}

impl MonitorConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            default_ttl_secs: default_ttl_secs(),
            default_nameserver: default_nameserver(),
            query_timeout_secs: default_query_timeout_secs(),
            query_attempts: default_query_attempts(),
            normalize_value_order: false,
        }
    }

    /// Set the polling interval
    pub fn with_poll_interval_secs(mut self, secs: u64) -> Self {
        self.poll_interval_secs = secs;
        self
    }

    /// Set the default nameserver
    pub fn with_default_nameserver(mut self, nameserver: impl Into<String>) -> Self {
        self.default_nameserver = nameserver.into();
        self
    }

    /// Enable or disable order-independent value comparison
    pub fn with_normalized_order(mut self, normalize: bool) -> Self {
        self.normalize_value_order = normalize;
        self
    }

    /// Polling interval as a [`Duration`]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Query timeout as a [`Duration`]
    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if !(MIN_POLL_INTERVAL_SECS..=MAX_POLL_INTERVAL_SECS).contains(&self.poll_interval_secs) {
            return Err(crate::Error::config(format!(
                "poll interval must be between {} and {} seconds, got {}",
                MIN_POLL_INTERVAL_SECS, MAX_POLL_INTERVAL_SECS, self.poll_interval_secs
            )));
        }

        if self.query_timeout_secs == 0 {
            return Err(crate::Error::config("query timeout must be > 0"));
        }

        if self.query_attempts == 0 {
            return Err(crate::Error::config("query attempts must be > 0"));
        }

        crate::request::validate_nameserver(&self.default_nameserver)
            .map_err(|e| crate::Error::config(format!("default nameserver: {}", e)))?;

        Ok(())
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn default_poll_interval_secs() -> u64 {
    10
}

fn default_ttl_secs() -> u32 {
    60
}

fn default_nameserver() -> String {
    "8.8.8.8".to_string()
}

fn default_query_timeout_secs() -> u64 {
    5
}

fn default_query_attempts() -> usize {
    2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MonitorConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_secs(10));
        assert_eq!(config.default_ttl_secs, 60);
        assert_eq!(config.default_nameserver, "8.8.8.8");
        assert!(!config.normalize_value_order);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: MonitorConfig =
            serde_json::from_str(r#"{"poll_interval_secs": 30}"#).unwrap();
        assert_eq!(config.poll_interval_secs, 30);
        assert_eq!(config.query_attempts, 2);
        assert_eq!(config.default_nameserver, "8.8.8.8");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(MonitorConfig::new().with_poll_interval_secs(0).validate().is_err());
        assert!(MonitorConfig::new().with_poll_interval_secs(7200).validate().is_err());
        assert!(
            MonitorConfig::new()
                .with_default_nameserver("not-an-ip")
                .validate()
                .is_err()
        );

        let mut config = MonitorConfig::new();
        config.query_timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
