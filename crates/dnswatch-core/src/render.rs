//! Text rendering of log events
//!
//! Pure functions from [`EventRecord`] to the lines shown to operators.
//! Initial resolutions, initial failures and sound markers are rendered
//! without a timestamp prefix; everything produced by polling carries one.

use crate::event::{EventKind, EventRecord, ResolutionPhase, SoundKind};

/// Timestamp format used in rendered lines
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Marker line for [`SoundKind::Start`]
pub const SOUND_ALERT_START: &str = "SOUND_ALERT_START";

/// Marker line for [`SoundKind::Change`]
pub const SOUND_ALERT_CHANGE: &str = "SOUND_ALERT_CHANGE";

/// Render a single event
///
/// # Parameters
///
/// - `record`: The event to render
/// - `domain`: Domain the event belongs to
/// - `record_type`: Record type being monitored
pub fn render_event(record: &EventRecord, domain: &str, record_type: &str) -> String {
    let ts = record.timestamp.format(TIMESTAMP_FORMAT);

    match &record.kind {
        EventKind::InitialResolution { value, ttl } => {
            format!("✅ Initial {} Record: {} (TTL: {})", record_type, value, ttl)
        }
        EventKind::ValueChanged { old, new, ttl } => {
            format!(
                "[{}] 🚨 CHANGE DETECTED! Old: {} -> New: {} (TTL: {})",
                ts, old, new, ttl
            )
        }
        EventKind::TtlChanged { ttl, value } => {
            format!("[{}] TTL Update: {} (Record Unchanged: {})", ts, ttl, value)
        }
        EventKind::ResolutionError {
            phase: ResolutionPhase::Initial,
            message,
        } => format!(
            "Error: Unable to resolve {} record for {}. {}",
            record_type, domain, message
        ),
        EventKind::ResolutionError {
            phase: ResolutionPhase::Polling,
            message,
        } => format!("[{}] Error querying {}: {}", ts, domain, message),
        EventKind::SoundAlert {
            kind: SoundKind::Start,
        } => SOUND_ALERT_START.to_string(),
        EventKind::SoundAlert {
            kind: SoundKind::Change,
        } => SOUND_ALERT_CHANGE.to_string(),
    }
}

/// Render a whole log, preserving order
pub fn render_log(records: &[EventRecord], domain: &str, record_type: &str) -> Vec<String> {
    records
        .iter()
        .map(|record| render_event(record, domain, record_type))
        .collect()
}
