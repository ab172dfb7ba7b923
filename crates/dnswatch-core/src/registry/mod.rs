//! Session registry
//!
//! The registry maps every watched domain to its [`DomainSession`] and the
//! handle of the monitor task driving it.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dnswatch_core::{MonitorConfig, SessionRegistry, StartRequest};
//!
//! let registry = SessionRegistry::new(resolver, MonitorConfig::default())?;
//!
//! // Start (or detect an existing) monitor
//! let outcome = registry
//!     .start_monitoring(&StartRequest::new("example.com", "A"))
//!     .await?;
//!
//! // Read the log at any time
//! let log = registry.get_log("example.com").await;
//! ```
//!
//! ## At Most One Monitor
//!
//! The check for an existing session and the insertion of a new one happen
//! under a single write guard, so concurrent start requests for the same
//! domain spawn exactly one monitor. A domain stays registered after its
//! monitor exits (for instance after a failed first query); later start
//! requests report `AlreadyRunning` and do not retry.

use crate::config::MonitorConfig;
use crate::error::{Error, Result};
use crate::monitor::{DomainMonitor, MonitorExit};
use crate::request::{DomainName, MonitorTarget, StartRequest};
use crate::session::{DomainSession, LogSnapshot, SessionStatus};
use crate::traits::DnsResolver;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use tokio::sync::{RwLock, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Outcome of a start request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// A new session was created and its monitor spawned
    Started {
        /// The validated target
        target: MonitorTarget,
    },

    /// The domain already has a session; nothing was changed
    AlreadyRunning {
        /// The target of the existing session
        target: MonitorTarget,
    },
}

impl StartOutcome {
    /// The target the outcome refers to
    pub fn target(&self) -> &MonitorTarget {
        match self {
            StartOutcome::Started { target } | StartOutcome::AlreadyRunning { target } => target,
        }
    }

    /// Whether a new monitor was spawned
    pub fn is_started(&self) -> bool {
        matches!(self, StartOutcome::Started { .. })
    }

    /// Operator-facing description of the outcome
    pub fn message(&self) -> String {
        match self {
            StartOutcome::Started { target } => format!(
                "Started monitoring {} ({} record) using {}",
                target.domain, target.record_type, target.nameserver
            ),
            StartOutcome::AlreadyRunning { .. } => {
                "Monitoring already in progress for this domain.".to_string()
            }
        }
    }
}

/// A registered session and the task driving it
struct SessionEntry {
    session: Arc<DomainSession>,
    handle: JoinHandle<MonitorExit>,
}

/// Registry of domain sessions
///
/// ## Thread Safety
///
/// The session map sits behind a `tokio::sync::RwLock`. Start requests take
/// the write guard for the check-and-insert; every other operation takes a
/// read guard and releases it before touching a session, so readers never
/// wait for a monitor.
pub struct SessionRegistry {
    /// Resolver shared by all monitors
    resolver: Arc<dyn DnsResolver>,

    /// Settings applied to every monitor
    config: MonitorConfig,

    /// Sessions by normalized domain name
    sessions: RwLock<HashMap<DomainName, SessionEntry>>,
}

impl SessionRegistry {
    /// Create an empty registry
    ///
    /// # Returns
    ///
    /// - `Ok(SessionRegistry)`: Ready to accept start requests
    /// - `Err(Error)`: If `config` is invalid
    pub fn new(resolver: Arc<dyn DnsResolver>, config: MonitorConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            resolver,
            config,
            sessions: RwLock::new(HashMap::new()),
        })
    }

    /// The configuration applied to every monitor
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Start monitoring a domain
    ///
    /// Input is validated before the registry is touched. If the domain
    /// already has a session the call is a no-op returning
    /// [`StartOutcome::AlreadyRunning`]; otherwise a session is created and
    /// exactly one monitor task is spawned for it.
    ///
    /// # Returns
    ///
    /// - `Ok(StartOutcome)`: Started or already running
    /// - `Err(Error::InvalidInput)`: If the request is malformed
    pub async fn start_monitoring(&self, request: &StartRequest) -> Result<StartOutcome> {
        let target = request.validate(&self.config.default_nameserver)?;

        let mut sessions = self.sessions.write().await;
        match sessions.entry(target.domain.clone()) {
            Entry::Occupied(existing) => {
                debug!("Monitor for {} already registered", target.domain);
                Ok(StartOutcome::AlreadyRunning {
                    target: existing.get().session.target().clone(),
                })
            }
            Entry::Vacant(slot) => {
                let session = Arc::new(DomainSession::new(target.clone()));
                let monitor =
                    DomainMonitor::new(session.clone(), self.resolver.clone(), &self.config);
                let handle = tokio::spawn(monitor.run());

                info!(
                    "Started monitoring {} ({} record) using {} via {}",
                    target.domain,
                    target.record_type,
                    target.nameserver,
                    self.resolver.resolver_name()
                );

                slot.insert(SessionEntry { session, handle });
                Ok(StartOutcome::Started { target })
            }
        }
    }

    /// Look up the session of a domain
    pub async fn session(&self, domain: &str) -> Option<Arc<DomainSession>> {
        let key = DomainName::parse(domain).ok()?;
        let sessions = self.sessions.read().await;
        sessions.get(&key).map(|entry| entry.session.clone())
    }

    /// Look up the session of a domain, failing if there is none
    ///
    /// # Returns
    ///
    /// - `Ok(session)`: The domain's session
    /// - `Err(Error::NotFound)`: If the domain has no session
    pub async fn find_session(&self, domain: &str) -> Result<Arc<DomainSession>> {
        self.session(domain)
            .await
            .ok_or_else(|| Error::not_found(format!("no session for {}", domain)))
    }

    /// Snapshot of a domain's log
    ///
    /// # Returns
    ///
    /// - `Some(records)`: The log as it is now (it may keep growing)
    /// - `None`: If the domain has no session
    pub async fn get_log(&self, domain: &str) -> Option<LogSnapshot> {
        self.session(domain)
            .await
            .map(|session| session.log().snapshot())
    }

    /// Follow a domain's log
    ///
    /// The receiver holds the current log and is notified after every
    /// append. `None` if the domain has no session.
    pub async fn subscribe(&self, domain: &str) -> Option<watch::Receiver<LogSnapshot>> {
        self.session(domain)
            .await
            .map(|session| session.log().subscribe())
    }

    /// Latest status of a domain's session
    pub async fn status(&self, domain: &str) -> Option<SessionStatus> {
        self.session(domain).await.map(|session| session.status())
    }

    /// Whether the domain's monitor task is still running
    ///
    /// # Returns
    ///
    /// `None` if the domain has no session
    pub async fn is_alive(&self, domain: &str) -> Option<bool> {
        let key = DomainName::parse(domain).ok()?;
        let sessions = self.sessions.read().await;
        sessions.get(&key).map(|entry| !entry.handle.is_finished())
    }

    /// List all registered domains, sorted
    pub async fn domains(&self) -> Vec<DomainName> {
        let sessions = self.sessions.read().await;
        let mut domains: Vec<DomainName> = sessions.keys().cloned().collect();
        domains.sort();
        domains
    }

    /// Number of registered domains
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Check if no domain is registered
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
