//! Start requests and their validation
//!
//! A [`StartRequest`] carries raw caller input. [`StartRequest::validate`]
//! turns it into a [`MonitorTarget`] or rejects it before any session is
//! touched.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, SocketAddr};

/// Maximum length of a domain name (RFC 1035)
const MAX_DOMAIN_LEN: usize = 253;

/// Maximum length of a single label (RFC 1035)
const MAX_LABEL_LEN: usize = 63;

/// Longest record type mnemonic accepted (e.g. "OPENPGPKEY")
const MAX_RECORD_TYPE_LEN: usize = 10;

/// Raw request to start monitoring a domain
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartRequest {
    /// Domain to watch
    pub domain: String,

    /// Record type to query (e.g. "A", "cname")
    pub record_type: String,

    /// Nameserver to query; the configured default is used when absent
    #[serde(default)]
    pub nameserver: Option<String>,
}

impl StartRequest {
    /// Create a request that uses the default nameserver
    pub fn new(domain: impl Into<String>, record_type: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            record_type: record_type.into(),
            nameserver: None,
        }
    }

    /// Set the nameserver
    pub fn with_nameserver(mut self, nameserver: impl Into<String>) -> Self {
        self.nameserver = Some(nameserver.into());
        self
    }

    /// Validate and normalize the request
    ///
    /// # Parameters
    ///
    /// - `default_nameserver`: Used when the request names no nameserver
    pub fn validate(&self, default_nameserver: &str) -> Result<MonitorTarget> {
        let domain = DomainName::parse(&self.domain)?;
        let record_type = normalize_record_type(&self.record_type)?;

        let nameserver = match self.nameserver.as_deref().map(str::trim) {
            Some(ns) if !ns.is_empty() => ns.to_string(),
            _ => default_nameserver.to_string(),
        };
        validate_nameserver(&nameserver)?;

        Ok(MonitorTarget {
            domain,
            record_type,
            nameserver,
        })
    }
}

/// A validated monitoring target
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct MonitorTarget {
    /// Normalized domain name
    pub domain: DomainName,

    /// Upper-case record type mnemonic
    pub record_type: String,

    /// Nameserver address
    pub nameserver: String,
}

/// Case-insensitive domain name
///
/// Stored lowercased, without a trailing dot, so that `Example.COM.` and
/// `example.com` identify the same session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct DomainName(String);

impl DomainName {
    /// Parse and normalize a domain name
    ///
    /// This implements basic DNS domain name validation per RFC 1035.
    /// Underscores are accepted so that service labels such as `_dmarc`
    /// can be watched.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let name = trimmed.strip_suffix('.').unwrap_or(trimmed).to_ascii_lowercase();

        if name.is_empty() {
            return Err(Error::invalid_input("domain name cannot be empty"));
        }

        if name.len() > MAX_DOMAIN_LEN {
            return Err(Error::invalid_input(format!(
                "domain name too long: {} chars (max {})",
                name.len(),
                MAX_DOMAIN_LEN
            )));
        }

        for label in name.split('.') {
            if label.is_empty() {
                return Err(Error::invalid_input(format!(
                    "domain name has empty label: '{}'",
                    raw
                )));
            }

            if label.len() > MAX_LABEL_LEN {
                return Err(Error::invalid_input(format!(
                    "domain label too long: {} chars (max {}). Label: '{}'",
                    label.len(),
                    MAX_LABEL_LEN,
                    label
                )));
            }

            if !label
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
            {
                return Err(Error::invalid_input(format!(
                    "domain label contains invalid characters: '{}'",
                    label
                )));
            }

            if label.starts_with('-') || label.ends_with('-') {
                return Err(Error::invalid_input(format!(
                    "domain label cannot start or end with hyphen: '{}'",
                    label
                )));
            }
        }

        Ok(Self(name))
    }

    /// The normalized name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DomainName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn normalize_record_type(raw: &str) -> Result<String> {
    let record_type = raw.trim().to_ascii_uppercase();

    if record_type.is_empty() {
        return Err(Error::invalid_input("record type cannot be empty"));
    }

    if record_type.len() > MAX_RECORD_TYPE_LEN
        || !record_type.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return Err(Error::invalid_input(format!(
            "record type is not a valid mnemonic: '{}'",
            raw
        )));
    }

    Ok(record_type)
}

/// Check that `nameserver` is an IP address or an `ip:port` socket address
pub fn validate_nameserver(nameserver: &str) -> Result<()> {
    if nameserver.parse::<IpAddr>().is_ok() || nameserver.parse::<SocketAddr>().is_ok() {
        Ok(())
    } else {
        Err(Error::invalid_input(format!(
            "nameserver must be an IP address: '{}'",
            nameserver
        )))
    }
}
