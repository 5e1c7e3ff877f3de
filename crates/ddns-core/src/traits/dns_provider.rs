// # DNS Provider Trait
//
// Defines the three operations the controller needs from a DNS provider:
// find the managed record, create it, and edit its content.
//
// ## Implementations
//
// - Porkbun: `ddns-provider-porkbun` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::{DnsProvider, RecordData, RecordLookup};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let provider = /* DnsProvider implementation */;
//
//     match provider.find_first().await? {
//         RecordLookup::Found(record) => println!("record {} -> {}", record.id, record.content),
//         RecordLookup::NotFound => provider.create(&RecordData::a("dns", "1.2.3.4", 300)).await?,
//     }
//
//     Ok(())
// }
// ```

use crate::record::{RecordData, RecordLookup};
use async_trait::async_trait;

/// Trait for DNS provider implementations
///
/// A provider is bound at construction to its credentials, the domain and
/// the subdomain it manages. It holds no other state across calls.
///
/// # Trust Level: Untrusted
///
/// ## Allowed Capabilities
/// - ✅ Perform HTTP/HTTPS API calls to their endpoints only
/// - ✅ Parse provider-specific responses
/// - ✅ Return success or failure (controller handles retry)
///
/// ## Forbidden Capabilities
/// - ❌ Spawn tasks or threads
/// - ❌ Implement retry logic or backoff (owned by `DdnsController`)
/// - ❌ Remember the tracked record (owned by `DdnsController`)
/// - ❌ Decide whether an update is needed (owned by `DdnsController`)
///
/// ## Error mapping
///
/// - transport failures → `Error::Network`
/// - non-success status → `Error::ProviderRejection`
/// - undecodable body → `Error::InvalidResponse` / `Error::Json`
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Find the first A record matching the configured domain and subdomain
    ///
    /// An empty result set is a successful [`RecordLookup::NotFound`], not an error.
    async fn find_first(&self) -> Result<RecordLookup, crate::Error>;

    /// Create a new record
    async fn create(&self, record: &RecordData) -> Result<(), crate::Error>;

    /// Replace the record with the given id
    async fn update(&self, id: &str, record: &RecordData) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
