// # Hickory DNS Resolver
//
// This crate provides the production `DnsResolver` for dnswatch, backed by
// `hickory-resolver`.
//
// ## Behavior
//
// - One query per `resolve()` call, sent to exactly the requested nameserver
// - Answer caching disabled, so every poll sees the server's current TTL
// - Per-query timeout and attempt count taken from `MonitorConfig`
// - Only records of the requested type are returned (CNAME chain links
//   are dropped when an A record was asked for)
// - One underlying resolver per nameserver, created on first use
//
// ## Not Handled Here
//
// - Polling, change detection and retry between polls (owned by `DomainMonitor`)
// - Input validation (owned by `StartRequest::validate`)

use async_trait::async_trait;
use dnswatch_core::config::MonitorConfig;
use dnswatch_core::traits::{DnsResolver, DnsResolverFactory, Resolution};
use dnswatch_core::{Error, Result};
use hickory_resolver::TokioResolver;
use hickory_resolver::config::{NameServerConfigGroup, ResolverConfig};
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::proto::rr::RecordType;
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

/// Default DNS port
const DNS_PORT: u16 = 53;

/// DNS resolver backed by hickory
pub struct HickoryResolver {
    /// Timeout of a single query
    timeout: Duration,

    /// Attempts per query
    attempts: usize,

    /// Resolvers by nameserver address
    resolvers: Mutex<HashMap<SocketAddr, TokioResolver>>,
}

impl HickoryResolver {
    /// Create a new resolver
    ///
    /// # Parameters
    ///
    /// - `timeout`: Timeout of a single query
    /// - `attempts`: Attempts per query before reporting failure
    pub fn new(timeout: Duration, attempts: usize) -> Self {
        Self {
            timeout,
            attempts: attempts.max(1),
            resolvers: Mutex::new(HashMap::new()),
        }
    }

    /// Create a resolver using the query settings of `config`
    pub fn from_config(config: &MonitorConfig) -> Self {
        Self::new(config.query_timeout(), config.query_attempts)
    }

    /// Get or build the resolver for `nameserver`
    async fn resolver_for(&self, nameserver: SocketAddr) -> TokioResolver {
        let mut resolvers = self.resolvers.lock().await;

        resolvers
            .entry(nameserver)
            .or_insert_with(|| {
                debug!("Creating resolver for nameserver {}", nameserver);

                let group =
                    NameServerConfigGroup::from_ips_clear(&[nameserver.ip()], nameserver.port(), true);
                let config = ResolverConfig::from_parts(None, vec![], group);

                let mut builder =
                    TokioResolver::builder_with_config(config, TokioConnectionProvider::default());
                let opts = builder.options_mut();
                opts.timeout = self.timeout;
                opts.attempts = self.attempts;
                opts.cache_size = 0;

                builder.build()
            })
            .clone()
    }
}

#[async_trait]
impl DnsResolver for HickoryResolver {
    async fn resolve(&self, domain: &str, record_type: &str, nameserver: &str) -> Result<Resolution> {
        let nameserver = parse_nameserver(nameserver)?;
        let rtype = parse_record_type(record_type)?;
        let resolver = self.resolver_for(nameserver).await;

        // Fully qualified, so no search domains are appended
        let fqdn = format!("{}.", domain.trim_end_matches('.'));

        let lookup = resolver
            .lookup(fqdn.as_str(), rtype)
            .await
            .map_err(|e| Error::resolver(e.to_string()))?;

        let matching: Vec<_> = lookup
            .records()
            .iter()
            .filter(|record| record.record_type() == rtype)
            .collect();

        if matching.is_empty() {
            return Err(Error::resolver(format!(
                "no {} records in answer for {}",
                record_type, domain
            )));
        }

        let values = matching
            .iter()
            .map(|record| record.data().to_string())
            .collect();
        let ttl = matching.iter().map(|record| record.ttl()).min();

        Ok(Resolution { values, ttl })
    }

    fn resolver_name(&self) -> &'static str {
        "hickory"
    }
}

/// Factory for creating hickory resolvers
pub struct HickoryResolverFactory;

impl DnsResolverFactory for HickoryResolverFactory {
    fn create(&self, config: &MonitorConfig) -> Result<Arc<dyn DnsResolver>> {
        if config.query_attempts == 0 {
            return Err(Error::config("query attempts must be > 0"));
        }

        Ok(Arc::new(HickoryResolver::from_config(config)))
    }
}

/// Parse "ip" or "ip:port" into a socket address
fn parse_nameserver(nameserver: &str) -> Result<SocketAddr> {
    if let Ok(ip) = nameserver.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, DNS_PORT));
    }

    nameserver
        .parse::<SocketAddr>()
        .map_err(|_| Error::invalid_input(format!("invalid nameserver address: {}", nameserver)))
}

/// Parse a record type mnemonic
fn parse_record_type(record_type: &str) -> Result<RecordType> {
    RecordType::from_str(&record_type.to_ascii_uppercase())
        .map_err(|_| Error::resolver(format!("unsupported record type: {}", record_type)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nameserver() {
        assert_eq!(
            parse_nameserver("8.8.8.8").unwrap(),
            "8.8.8.8:53".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(
            parse_nameserver("127.0.0.1:5353").unwrap(),
            "127.0.0.1:5353".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(parse_nameserver("::1").unwrap().port(), 53);
        assert!(parse_nameserver("dns.google").is_err());
    }

    #[test]
    fn test_parse_record_type() {
        assert_eq!(parse_record_type("A").unwrap(), RecordType::A);
        assert_eq!(parse_record_type("txt").unwrap(), RecordType::TXT);
        assert_eq!(parse_record_type("CNAME").unwrap(), RecordType::CNAME);
        assert!(parse_record_type("BOGUS").is_err());
    }

    #[test]
    fn test_factory_creation() {
        let factory = HickoryResolverFactory;
        let resolver = factory.create(&MonitorConfig::default()).unwrap();
        assert_eq!(resolver.resolver_name(), "hickory");
    }

    #[test]
    fn test_unsupported_type_fails_before_query() {
        let resolver = HickoryResolver::new(Duration::from_secs(1), 1);
        let result = tokio_test::block_on(resolver.resolve("example.com", "BOGUS", "127.0.0.1"));
        assert!(matches!(result, Err(Error::Resolver(_))));
    }
}
