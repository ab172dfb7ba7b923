// # Change Detector
//
// The synchronous half of the monitor: given the previous observation and
// a new one, decide which events to emit.
//
// ## Rules
//
// 1. Value differs from the last value → `ValueChanged`, plus a
//    `SoundAlert{Change}` when it also differs from the last alerted value
// 2. Otherwise, TTL differs from the last TTL → `TtlChanged` (never a sound)
// 3. The last TTL is always updated
//
// A flap A → B → A alerts twice: after A → B the last alerted value is B,
// so the return to A is a new alert.

use crate::event::{EventKind, RecordValue, SoundKind};

/// Change-detection state of one domain after its first successful query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeDetector {
    last_value: RecordValue,
    last_alerted_value: RecordValue,
    last_ttl: u32,
}

impl ChangeDetector {
    /// Seed the detector with the initial resolution
    pub fn new(value: RecordValue, ttl: u32) -> Self {
        Self {
            last_alerted_value: value.clone(),
            last_value: value,
            last_ttl: ttl,
        }
    }

    /// Compare a new observation with the current state and advance it
    ///
    /// # Returns
    ///
    /// The events to append, in order. Empty when nothing changed.
    pub fn observe(&mut self, value: RecordValue, ttl: u32) -> Vec<EventKind> {
        let mut events = Vec::new();

        if value != self.last_value {
            events.push(EventKind::ValueChanged {
                old: self.last_value.clone(),
                new: value.clone(),
                ttl,
            });

            if value != self.last_alerted_value {
                events.push(EventKind::SoundAlert {
                    kind: SoundKind::Change,
                });
                self.last_alerted_value = value.clone();
            }

            self.last_value = value;
        } else if ttl != self.last_ttl {
            events.push(EventKind::TtlChanged {
                ttl,
                value: value.clone(),
            });
        }

        self.last_ttl = ttl;
        events
    }

    /// Last observed value
    pub fn last_value(&self) -> &RecordValue {
        &self.last_value
    }

    /// Last value a change alert was emitted for
    pub fn last_alerted_value(&self) -> &RecordValue {
        &self.last_alerted_value
    }

    /// Last observed TTL
    pub fn last_ttl(&self) -> u32 {
        self.last_ttl
    }
}
