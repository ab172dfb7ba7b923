//! Per-domain monitor loop
//!
//! The DomainMonitor is responsible for:
//! - Performing the initial resolution of one domain
//! - Polling the resolver at a fixed interval
//! - Feeding every answer through the [`ChangeDetector`]
//! - Appending the resulting events to the session log
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐
//! │ DnsResolver  │◄──── resolve() ─────┐
//! └──────────────┘                     │
//!                             ┌────────────────┐
//!                             │ DomainMonitor  │
//!                             └────────────────┘
//!                                      │
//!                   ┌──────────────────┼──────────────────┐
//!                   ▼                  ▼                  ▼
//!          ┌────────────────┐  ┌──────────────┐  ┌──────────────┐
//!          │ChangeDetector  │  │  EventLog    │  │SessionStatus │
//!          │ (decide)       │  │  (append)    │  │  (publish)   │
//!          └────────────────┘  └──────────────┘  └──────────────┘
//! ```
//!
//! ## State Machine
//!
//! ```text
//! Initializing ──ok──► Steady ──► Steady ──► ... (until process exit)
//!      │
//!      └──error──► Failed (monitor returns)
//! ```
//!
//! A failed first query ends the monitor without retry. Failures while
//! steady are logged and polling continues.

pub mod detector;

pub use detector::ChangeDetector;

use crate::config::MonitorConfig;
use crate::error::Result;
use crate::event::{EventKind, EventRecord, RecordValue, ResolutionPhase, SoundKind};
use crate::session::{DomainSession, MonitorPhase, SessionStatus};
use crate::traits::DnsResolver;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Why a monitor returned
///
/// A healthy monitor never returns; the only exit is a failed first query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorExit {
    /// The first query failed
    InitialResolutionFailed {
        /// Resolver error message
        message: String,
    },
}

/// Monitor loop for one domain session
pub struct DomainMonitor {
    /// Session this monitor writes to
    session: Arc<DomainSession>,

    /// Resolver used for every query
    resolver: Arc<dyn DnsResolver>,

    /// Delay between two queries
    poll_interval: Duration,

    /// TTL assumed when the resolver reports none
    default_ttl: u32,

    /// Sort resource data before comparing
    normalize_order: bool,

    /// Completed queries
    polls: u64,
}

impl DomainMonitor {
    /// Create a monitor bound to `session`
    ///
    /// # Parameters
    ///
    /// - `session`: Session to drive; the monitor becomes its only writer
    /// - `resolver`: Resolver implementation
    /// - `config`: Monitor settings (interval, default TTL, normalization)
    pub fn new(
        session: Arc<DomainSession>,
        resolver: Arc<dyn DnsResolver>,
        config: &MonitorConfig,
    ) -> Self {
        Self {
            session,
            resolver,
            poll_interval: config.poll_interval(),
            default_ttl: config.default_ttl_secs,
            normalize_order: config.normalize_value_order,
            polls: 0,
        }
    }

    /// Run the monitor
    ///
    /// Resolves once, then polls forever. Returns only when the first query
    /// fails.
    pub async fn run(mut self) -> MonitorExit {
        let mut detector = match self.initialize().await {
            Ok(detector) => detector,
            Err(exit) => return exit,
        };

        loop {
            self.poll(&mut detector).await;
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Perform the first query
    ///
    /// On success the session moves to `Steady` and the detector is seeded.
    async fn initialize(&mut self) -> std::result::Result<ChangeDetector, MonitorExit> {
        let domain = self.session.domain().clone();
        let record_type = self.session.record_type().to_string();

        let (value, ttl) = match self.query().await {
            Ok(answer) => answer,
            Err(e) => {
                let message = e.to_string();
                error!(
                    "Unable to resolve {} record for {}: {}",
                    record_type, domain, message
                );
                self.emit(EventKind::ResolutionError {
                    phase: ResolutionPhase::Initial,
                    message: message.clone(),
                });
                self.session.publish_status(SessionStatus {
                    phase: MonitorPhase::Failed,
                    last_value: None,
                    last_alerted_value: None,
                    last_ttl: None,
                    polls: self.polls,
                    start_sound_emitted: self.session.start_sound_emitted(),
                });
                return Err(MonitorExit::InitialResolutionFailed { message });
            }
        };

        info!(
            "Initial {} record for {}: {} (TTL: {})",
            record_type, domain, value, ttl
        );
        self.emit(EventKind::InitialResolution {
            value: value.clone(),
            ttl,
        });

        if self.session.claim_start_sound() {
            self.emit(EventKind::SoundAlert {
                kind: SoundKind::Start,
            });
        }

        let detector = ChangeDetector::new(value, ttl);
        self.publish(&detector);
        Ok(detector)
    }

    /// Perform one steady-state poll
    async fn poll(&mut self, detector: &mut ChangeDetector) {
        let domain = self.session.domain().clone();

        match self.query().await {
            Ok((value, ttl)) => {
                debug!("Polled {}: {} (TTL: {})", domain, value, ttl);

                for event in detector.observe(value, ttl) {
                    match &event {
                        EventKind::ValueChanged { old, new, ttl } => {
                            info!("Change detected for {}: {} -> {} (TTL: {})", domain, old, new, ttl);
                        }
                        EventKind::TtlChanged { ttl, .. } => {
                            info!("TTL update for {}: {}", domain, ttl);
                        }
                        _ => {}
                    }
                    self.emit(event);
                }
            }
            Err(e) => {
                warn!("Error querying {}: {}", domain, e);
                self.emit(EventKind::ResolutionError {
                    phase: ResolutionPhase::Polling,
                    message: e.to_string(),
                });
            }
        }

        self.publish(detector);
    }

    /// Query the resolver and reduce the answer to a comparable value and TTL
    async fn query(&mut self) -> Result<(RecordValue, u32)> {
        let result = self
            .resolver
            .resolve(
                self.session.domain().as_str(),
                self.session.record_type(),
                self.session.nameserver(),
            )
            .await;
        self.polls += 1;

        let resolution = result?;
        let value = RecordValue::from_rdata(&resolution.values, self.normalize_order);
        let ttl = resolution.ttl.unwrap_or(self.default_ttl);
        Ok((value, ttl))
    }

    /// Append an event to the session log
    fn emit(&self, kind: EventKind) {
        self.session.log().append(EventRecord::now(kind));
    }

    /// Publish the detector state as the session status
    fn publish(&self, detector: &ChangeDetector) {
        self.session.publish_status(SessionStatus {
            phase: MonitorPhase::Steady,
            last_value: Some(detector.last_value().clone()),
            last_alerted_value: Some(detector.last_alerted_value().clone()),
            last_ttl: Some(detector.last_ttl()),
            polls: self.polls,
            start_sound_emitted: self.session.start_sound_emitted(),
        });
    }
}
