// # DNS Resolver Trait
//
// Defines the interface the monitor uses to query a nameserver.
//
// ## Implementations
//
// - Hickory-based: `dnswatch-resolver-hickory` crate
// - Tests: scripted resolvers in `tests/common`
//
// ## Usage
//
// ```rust,ignore
// use dnswatch_core::DnsResolver;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let resolver = /* DnsResolver implementation */;
//
//     let answer = resolver.resolve("example.com", "A", "8.8.8.8").await?;
//     println!("{:?} (ttl {:?})", answer.values, answer.ttl);
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

/// Answer to a single DNS query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Resource data of every matching record, in the order the server returned them
    pub values: Vec<String>,

    /// TTL of the answer's record set, if the resolver exposes one
    pub ttl: Option<u32>,
}

impl Resolution {
    /// Create a resolution with a known TTL
    pub fn new<I, S>(values: I, ttl: u32) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
            ttl: Some(ttl),
        }
    }

    /// Create a resolution for which no TTL is available
    pub fn without_ttl<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
            ttl: None,
        }
    }
}

/// Trait for DNS resolver implementations
///
/// A resolver performs exactly one query per call against the given
/// nameserver and reports either the answer or a failure.
///
/// # Responsibilities
///
/// - Enforce its own per-query timeout (the monitor never cancels a query)
/// - Return only records of the requested type (skip CNAME chain links
///   when an A record was asked for)
/// - Report NXDOMAIN, SERVFAIL and empty answers as errors
///
/// Retry between polls, change detection and scheduling belong to the
/// monitor, not the resolver.
///
/// # Thread Safety
///
/// Implementations are shared by every monitor task and must be
/// `Send + Sync`.
#[async_trait]
pub trait DnsResolver: Send + Sync {
    /// Resolve `domain` for `record_type` against `nameserver`
    ///
    /// # Parameters
    ///
    /// - `domain`: Normalized domain name (lowercase, no trailing dot)
    /// - `record_type`: Upper-case record type mnemonic (e.g. "A", "TXT")
    /// - `nameserver`: IP address, optionally with a port (e.g. "8.8.8.8", "[::1]:5353")
    ///
    /// # Returns
    ///
    /// - `Ok(Resolution)`: The matching records and their TTL
    /// - `Err(Error)`: If the query failed or returned no matching records
    async fn resolve(
        &self,
        domain: &str,
        record_type: &str,
        nameserver: &str,
    ) -> Result<Resolution, crate::Error>;

    /// Get the resolver name (for logging/debugging)
    fn resolver_name(&self) -> &'static str;
}

/// Helper trait for constructing resolvers from configuration
pub trait DnsResolverFactory: Send + Sync {
    /// Create a DnsResolver instance using the query settings in `config`
    fn create(
        &self,
        config: &crate::config::MonitorConfig,
    ) -> Result<std::sync::Arc<dyn DnsResolver>, crate::Error>;
}
