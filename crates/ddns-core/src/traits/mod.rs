//! Core traits for the DDNS system
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`IpSource`]: Resolve the machine's current public IPv4 address
//! - [`DnsProvider`]: List, create and update records via the provider API
//! - [`ConfigSource`]: Supply the runtime configuration for each pass

pub mod ip_source;
pub mod dns_provider;
pub mod config_source;

pub use ip_source::IpSource;
pub use dns_provider::{DnsProvider, DnsRecord, RecordPage, MutationOutcome, RecordChange};
pub use config_source::ConfigSource;
