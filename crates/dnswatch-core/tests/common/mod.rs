//! Test doubles and common utilities for monitor contract tests
//!
//! This module provides a scripted resolver that replays a fixed sequence
//! of answers per domain, plus helpers to wait on session logs.

#![allow(dead_code)]

use dnswatch_core::error::Result;
use dnswatch_core::{
    DnsResolver, DomainSession, Error, EventKind, EventRecord, MonitorConfig, MonitorPhase,
    Resolution, SessionRegistry, SoundKind,
};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One scripted resolver reply
#[derive(Debug, Clone)]
pub enum Step {
    /// Successful answer
    Answer(Resolution),
    /// Failure with the given message
    Fail(String),
}

/// Successful answer with a TTL
pub fn answer(values: &[&str], ttl: u32) -> Step {
    Step::Answer(Resolution::new(values.iter().copied(), ttl))
}

/// Failed query
pub fn fail(message: &str) -> Step {
    Step::Fail(message.to_string())
}

/// A resolver that replays scripted replies per domain
///
/// Domains without a script always resolve to `1.2.3.4` with TTL 300.
/// Once a domain's script is exhausted, further queries never complete,
/// which freezes that domain's monitor without affecting others.
pub struct ScriptedResolver {
    scripts: Mutex<HashMap<String, VecDeque<Step>>>,
    calls: AtomicUsize,
}

impl ScriptedResolver {
    pub fn new() -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Set the replies for `domain`
    pub fn script(self, domain: &str, steps: Vec<Step>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(domain.to_string(), steps.into());
        self
    }

    /// Total number of resolve() calls
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl DnsResolver for ScriptedResolver {
    async fn resolve(&self, domain: &str, _record_type: &str, _nameserver: &str) -> Result<Resolution> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let step = {
            let mut scripts = self.scripts.lock().unwrap();
            match scripts.get_mut(domain) {
                Some(steps) => steps.pop_front(),
                None => Some(answer(&["1.2.3.4"], 300)),
            }
        };

        match step {
            Some(Step::Answer(resolution)) => Ok(resolution),
            Some(Step::Fail(message)) => Err(Error::resolver(message)),
            None => std::future::pending().await,
        }
    }

    fn resolver_name(&self) -> &'static str {
        "scripted"
    }
}

/// Registry over `resolver` with the default configuration
pub fn registry_with(resolver: Arc<ScriptedResolver>) -> SessionRegistry {
    SessionRegistry::new(resolver, MonitorConfig::default()).expect("valid config")
}

/// Wait until the session log holds at least `len` records
///
/// Panics after ten minutes of (virtual) time.
pub async fn wait_for_len(session: &DomainSession, len: usize) -> Vec<EventRecord> {
    let mut rx = session.log().subscribe();
    let result = tokio::time::timeout(
        Duration::from_secs(600),
        rx.wait_for(|entries| entries.len() >= len),
    )
    .await;

    match result {
        Ok(Ok(entries)) => entries.to_vec(),
        _ => panic!(
            "log of {} never reached {} records: {:?}",
            session.domain(),
            len,
            session.log().snapshot()
        ),
    }
}

/// Wait until the session's monitor publishes `phase`
///
/// Panics after ten minutes of (virtual) time.
pub async fn wait_for_phase(session: &DomainSession, phase: MonitorPhase) {
    let mut rx = session.watch_status();
    let result = tokio::time::timeout(
        Duration::from_secs(600),
        rx.wait_for(|status| status.phase == phase),
    )
    .await;

    if !matches!(result, Ok(Ok(_))) {
        panic!(
            "{} never reached {:?}: {:?}",
            session.domain(),
            phase,
            session.status()
        );
    }
}

/// Let monitors run for `secs` seconds of virtual time
pub async fn advance(secs: u64) {
    tokio::time::sleep(Duration::from_secs(secs)).await;
}

/// Count sound alerts of the given kind
pub fn sound_count(log: &[EventRecord], kind: SoundKind) -> usize {
    log.iter().filter(|r| r.kind.is_sound(kind)).count()
}

/// Strip timestamps for comparisons
pub fn kinds(log: &[EventRecord]) -> Vec<EventKind> {
    log.iter().map(|r| r.kind.clone()).collect()
}
