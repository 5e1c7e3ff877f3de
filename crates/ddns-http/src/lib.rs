// # HTTP Adapters
//
// This crate provides the plain-HTTP collaborators of the DDNS controller:
//
// - [`HttpIpResolver`]: reads the public IP from an echo service
// - [`HttpHealthNotifier`]: pings an uptime monitor after each cycle
//
// ## Architectural Constraints
//
// - ✅ One GET per call
// - ❌ NO retry logic, NO caching, NO background tasks
//
// Both hold a `reqwest::Client` built once at construction.

pub mod health;
pub mod resolver;

pub use health::HttpHealthNotifier;
pub use resolver::{DEFAULT_IP_URL, HttpIpResolver};

use std::time::Duration;

/// Default HTTP timeout for outbound requests (10 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

fn build_client(timeout: Duration) -> ddns_core::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ddns_core::Error::config(format!("Failed to build HTTP client: {}", e)))
}
