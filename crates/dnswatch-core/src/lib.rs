// # dnswatch-core
//
// Core library for watching DNS records for value and TTL changes.
//
// ## Architecture Overview
//
// - **DnsResolver**: Trait for performing a single DNS query
// - **DomainSession**: Per-domain state and append-only event log
// - **DomainMonitor**: Long-running loop that polls one domain and detects changes
// - **SessionRegistry**: Process-wide map of sessions, at most one monitor per domain
// - **render**: Pure event-to-text presentation
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Change detection is separate from DNS I/O and presentation
// 2. **Single Writer**: Each session is written only by its own monitor task
// 3. **Library-First**: The HTTP daemon is a thin shell over this crate
// 4. **Idempotency**: Repeated start requests never spawn a second monitor

pub mod config;
pub mod error;
pub mod event;
pub mod monitor;
pub mod registry;
pub mod render;
pub mod request;
pub mod session;
pub mod traits;

// Re-export core types for convenience
pub use config::MonitorConfig;
pub use error::{Error, Result};
pub use event::{EventKind, EventRecord, RecordValue, ResolutionPhase, SoundKind};
pub use monitor::{ChangeDetector, DomainMonitor, MonitorExit};
pub use registry::{SessionRegistry, StartOutcome};
pub use request::{DomainName, MonitorTarget, StartRequest};
pub use session::{DomainSession, EventLog, LogSnapshot, MonitorPhase, SessionStatus};
pub use traits::{DnsResolver, DnsResolverFactory, Resolution};
