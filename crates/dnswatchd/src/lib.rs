//! # dnswatchd
//!
//! HTTP daemon for dnswatch. A thin integration layer: it reads
//! configuration, builds the resolver and registry, and exposes the
//! registry over HTTP. All monitoring logic lives in `dnswatch-core`.

pub mod api;
pub mod config;

pub use api::{AppState, create_routes};
pub use config::Config;
