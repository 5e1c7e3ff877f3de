// # HTTP IP Resolver
//
// Fetches the current public IP from an echo service that answers a GET
// with the caller's address as plain text (e.g., ifconfig.co/ip).

use async_trait::async_trait;
use ddns_core::traits::{IpResolver, parse_ip_response};
use ddns_core::{Error, Result};
use std::time::Duration;

use crate::{DEFAULT_HTTP_TIMEOUT, build_client};

/// Echo service used when no URL is configured
pub const DEFAULT_IP_URL: &str = "https://ifconfig.co/ip";

/// HTTP-based public IP resolver
#[derive(Debug, Clone)]
pub struct HttpIpResolver {
    /// URL to fetch the IP from
    url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpResolver {
    /// Create a resolver against [`DEFAULT_IP_URL`]
    pub fn new() -> Result<Self> {
        Self::with_url(DEFAULT_IP_URL)
    }

    /// Create a resolver against a custom echo service
    pub fn with_url(url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(url, DEFAULT_HTTP_TIMEOUT)
    }

    /// Create a resolver with a custom request timeout
    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            url: url.into(),
            client: build_client(timeout)?,
        })
    }

    /// The echo service URL
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl IpResolver for HttpIpResolver {
    async fn resolve(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::network(format!("IP lookup request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::http(
                status.as_u16(),
                format!("IP lookup returned {}", status),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::network(format!("Failed to read IP lookup response: {}", e)))?;

        let ip = parse_ip_response(&body)?;
        tracing::debug!(url = %self.url, ip = %ip, "Resolved public IP");
        Ok(ip)
    }

    fn resolver_name(&self) -> &'static str {
        "http"
    }
}
