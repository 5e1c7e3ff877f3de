// # IP Resolver Trait
//
// Defines the interface for looking up the machine's current public IP.
//
// ## Implementations
//
// - HTTP echo service: `ddns-http` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::IpResolver;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let resolver = /* IpResolver implementation */;
//     let ip = resolver.resolve().await?;
//     println!("public ip: {ip}");
//     Ok(())
// }
// ```

use async_trait::async_trait;

/// Trait for public IP lookups
///
/// # Trust Level: Semi-Trusted
///
/// Resolvers perform exactly one outbound request per call.
///
/// ## Forbidden Capabilities
/// - ❌ Retry or back off (owned by `DdnsController`)
/// - ❌ Cache the last answer (every tick must observe the network)
/// - ❌ Spawn tasks
///
/// # Cancellation
///
/// Dropping the returned future abandons the request. The controller relies
/// on this to stop promptly on shutdown.
#[async_trait]
pub trait IpResolver: Send + Sync {
    /// Fetch the current public IP address
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: the trimmed address text
    /// - `Err(Error::InvalidResponse)`: the body did not look like an address
    /// - `Err(Error)`: transport failure or non-success status
    async fn resolve(&self) -> Result<String, crate::Error>;

    /// Get the resolver name (for logging/debugging)
    fn resolver_name(&self) -> &'static str;
}

/// Sanity-check an IP echo response body
///
/// Trims surrounding whitespace and requires at least one `.`, which is
/// enough to reject HTML error pages and empty bodies while accepting any
/// dotted IPv4 address.
pub fn parse_ip_response(raw: &str) -> Result<String, crate::Error> {
    let ip = raw.trim();
    if !ip.contains('.') {
        return Err(crate::Error::invalid_response(raw));
    }
    Ok(ip.to_string())
}
