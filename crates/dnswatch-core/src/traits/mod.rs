//! Core traits for dnswatch
//!
//! This module defines the abstract interfaces that implementations must follow.
//!
//! - [`DnsResolver`]: Perform a single DNS query against a chosen nameserver

pub mod resolver;

pub use resolver::{DnsResolver, DnsResolverFactory, Resolution};
