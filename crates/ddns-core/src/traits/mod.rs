//! Core traits for the DDNS system
//!
//! This module defines the capability interfaces the controller depends on.
//!
//! - [`IpResolver`]: Look up the current public IP
//! - [`DnsProvider`]: Find, create and update the managed record
//! - [`HealthNotifier`]: Best-effort signal after each cycle

pub mod ip_resolver;
pub mod dns_provider;
pub mod health;

pub use ip_resolver::{IpResolver, parse_ip_response};
pub use dns_provider::DnsProvider;
pub use health::{HealthNotifier, NoopHealthNotifier};
