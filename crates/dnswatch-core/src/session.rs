//! Domain sessions
//!
//! A [`DomainSession`] holds everything known about one watched domain: the
//! validated target, its append-only [`EventLog`] and the latest
//! [`SessionStatus`] published by the monitor.
//!
//! ## Single Writer
//!
//! Only the domain's monitor task appends to the log and publishes status,
//! so the mutators are crate-private. Readers take snapshots through
//! `tokio::sync::watch` and never observe a partially written record.
//!
//! The log is shared as an `Arc<Vec<_>>`: a snapshot is a reference count
//! bump taken under the watch lock, and an append copies the entries only
//! while some reader still holds an older snapshot.

use crate::event::{EventRecord, RecordValue};
use crate::request::{DomainName, MonitorTarget};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;

/// Lifecycle phase of a domain's monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitorPhase {
    /// First query not finished yet
    Initializing,
    /// Polling at the fixed interval
    Steady,
    /// First query failed; the monitor exited
    Failed,
}

/// Snapshot of a session's change-detection state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionStatus {
    /// Current phase
    pub phase: MonitorPhase,
    /// Last observed value
    pub last_value: Option<RecordValue>,
    /// Last value a change alert was emitted for
    pub last_alerted_value: Option<RecordValue>,
    /// Last observed TTL (in seconds)
    pub last_ttl: Option<u32>,
    /// Number of completed queries, successful or not
    pub polls: u64,
    /// Whether the start alert has been emitted
    pub start_sound_emitted: bool,
}

impl SessionStatus {
    fn initializing() -> Self {
        Self {
            phase: MonitorPhase::Initializing,
            last_value: None,
            last_alerted_value: None,
            last_ttl: None,
            polls: 0,
            start_sound_emitted: false,
        }
    }
}

/// Immutable view of an [`EventLog`] at one point in time
pub type LogSnapshot = Arc<Vec<EventRecord>>;

/// Append-only, ordered event log
#[derive(Debug)]
pub struct EventLog {
    entries: watch::Sender<LogSnapshot>,
}

impl EventLog {
    /// Create an empty log
    pub fn new() -> Self {
        let (entries, _) = watch::channel(Arc::new(Vec::new()));
        Self { entries }
    }

    /// Append a record at the end of the log
    pub(crate) fn append(&self, record: EventRecord) {
        self.entries
            .send_modify(|entries| Arc::make_mut(entries).push(record));
    }

    /// The log as it is now
    pub fn snapshot(&self) -> LogSnapshot {
        Arc::clone(&self.entries.borrow())
    }

    /// Number of records in the log
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Check if the log is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Receiver that is notified after every append
    pub fn subscribe(&self) -> watch::Receiver<LogSnapshot> {
        self.entries.subscribe()
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Monitoring state of one domain
#[derive(Debug)]
pub struct DomainSession {
    target: MonitorTarget,
    log: EventLog,
    status: watch::Sender<SessionStatus>,
    start_sound_emitted: AtomicBool,
    created_at: DateTime<Utc>,
}

impl DomainSession {
    /// Create a session for a validated target
    pub fn new(target: MonitorTarget) -> Self {
        let (status, _) = watch::channel(SessionStatus::initializing());
        Self {
            target,
            log: EventLog::new(),
            status,
            start_sound_emitted: AtomicBool::new(false),
            created_at: Utc::now(),
        }
    }

    /// The monitored target
    pub fn target(&self) -> &MonitorTarget {
        &self.target
    }

    /// The domain name
    pub fn domain(&self) -> &DomainName {
        &self.target.domain
    }

    /// The record type being queried
    pub fn record_type(&self) -> &str {
        &self.target.record_type
    }

    /// The nameserver being queried
    pub fn nameserver(&self) -> &str {
        &self.target.nameserver
    }

    /// When the session was created
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// The session's event log
    pub fn log(&self) -> &EventLog {
        &self.log
    }

    /// Latest published status
    pub fn status(&self) -> SessionStatus {
        self.status.borrow().clone()
    }

    /// Receiver that is notified whenever the status changes
    pub fn watch_status(&self) -> watch::Receiver<SessionStatus> {
        self.status.subscribe()
    }

    /// Whether the start alert has already been emitted
    pub fn start_sound_emitted(&self) -> bool {
        self.start_sound_emitted.load(Ordering::SeqCst)
    }

    /// Mark the start alert as emitted
    ///
    /// Returns `true` for exactly one caller over the session's lifetime.
    pub(crate) fn claim_start_sound(&self) -> bool {
        !self.start_sound_emitted.swap(true, Ordering::SeqCst)
    }

    pub(crate) fn publish_status(&self, status: SessionStatus) {
        self.status.send_replace(status);
    }
}
