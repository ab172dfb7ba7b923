//! Event records appended to a domain's log
//!
//! Events are data only. Turning them into operator-facing text is done by
//! [`crate::render`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Observed value of a record set
///
/// The resource data strings joined by a single space. Two values are equal
/// when their joined forms are equal, so the order in which the server
/// returned the records matters unless the monitor normalizes it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordValue(String);

impl RecordValue {
    /// Build a value from resource data strings
    ///
    /// # Parameters
    ///
    /// - `rdata`: Resource data in resolver order
    /// - `normalize_order`: Sort the strings first so that reordered answers compare equal
    pub fn from_rdata<S: AsRef<str>>(rdata: &[S], normalize_order: bool) -> Self {
        let mut parts: Vec<&str> = rdata.iter().map(AsRef::as_ref).collect();
        if normalize_order {
            parts.sort_unstable();
        }
        Self(parts.join(" "))
    }

    /// The joined representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of sound alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundKind {
    /// Monitoring of the domain started
    Start,
    /// The record value changed to a value not alerted before
    Change,
}

/// Whether a resolution failure happened on the first query or a later poll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionPhase {
    /// First query; failure ends the monitor
    Initial,
    /// Steady-state poll; failure is logged and polling continues
    Polling,
}

/// What happened
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    /// First successful resolution
    InitialResolution {
        value: RecordValue,
        ttl: u32,
    },

    /// The record value differs from the previous poll
    ValueChanged {
        old: RecordValue,
        new: RecordValue,
        ttl: u32,
    },

    /// The TTL changed while the value stayed the same
    TtlChanged {
        ttl: u32,
        /// The unchanged value
        value: RecordValue,
    },

    /// A query failed
    ResolutionError {
        phase: ResolutionPhase,
        message: String,
    },

    /// User-facing notification marker
    SoundAlert {
        kind: SoundKind,
    },
}

impl EventKind {
    /// Whether this is a sound alert of the given kind
    pub fn is_sound(&self, kind: SoundKind) -> bool {
        matches!(self, EventKind::SoundAlert { kind: k } if *k == kind)
    }
}

/// A timestamped entry of a domain's log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// When the event was recorded
    pub timestamp: DateTime<Utc>,

    /// The event itself
    #[serde(flatten)]
    pub kind: EventKind,
}

impl EventRecord {
    /// Create a record stamped with the current time
    pub fn now(kind: EventKind) -> Self {
        Self {
            timestamp: Utc::now(),
            kind,
        }
    }

    /// Create a record with an explicit timestamp
    pub fn at(timestamp: DateTime<Utc>, kind: EventKind) -> Self {
        Self { timestamp, kind }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_keeps_resolver_order() {
        let a = RecordValue::from_rdata(&["1.1.1.1", "2.2.2.2"], false);
        let b = RecordValue::from_rdata(&["2.2.2.2", "1.1.1.1"], false);
        assert_eq!(a.as_str(), "1.1.1.1 2.2.2.2");
        assert_ne!(a, b);
    }

    #[test]
    fn test_value_normalized_order() {
        let a = RecordValue::from_rdata(&["1.1.1.1", "2.2.2.2"], true);
        let b = RecordValue::from_rdata(&["2.2.2.2", "1.1.1.1"], true);
        assert_eq!(a, b);
    }

    #[test]
    fn test_event_json_shape() {
        let record = EventRecord::now(EventKind::SoundAlert {
            kind: SoundKind::Change,
        });
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "sound_alert");
        assert_eq!(json["kind"], "change");
        assert!(json["timestamp"].is_string());
    }
}
