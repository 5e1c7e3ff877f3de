// # HTTP Health Notifier
//
// Pings a health-check URL (healthchecks.io style) after each successful
// reconciliation cycle. Failures are logged and swallowed.

use async_trait::async_trait;
use ddns_core::Result;
use ddns_core::traits::HealthNotifier;
use std::time::Duration;

use crate::{DEFAULT_HTTP_TIMEOUT, build_client};

/// Health notifier that issues a GET to a fixed URL
#[derive(Debug, Clone)]
pub struct HttpHealthNotifier {
    /// URL to ping
    url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpHealthNotifier {
    /// Create a notifier for `url`
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(url, DEFAULT_HTTP_TIMEOUT)
    }

    /// Create a notifier with a custom request timeout
    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            url: url.into(),
            client: build_client(timeout)?,
        })
    }

    /// The ping URL
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl HealthNotifier for HttpHealthNotifier {
    async fn notify(&self) {
        match self.client.get(&self.url).send().await {
            Ok(response) if response.status().is_success() => {
                tracing::debug!(url = %self.url, "Health check ping sent");
            }
            Ok(response) => {
                tracing::warn!(
                    url = %self.url,
                    status = %response.status(),
                    "Health check ping rejected"
                );
            }
            Err(e) => {
                tracing::warn!(url = %self.url, error = %e, "Health check ping failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn sends_one_get_per_notify() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping/abc"))
            .respond_with(ResponseTemplate::new(200))
            .expect(2)
            .mount(&server)
            .await;

        let notifier = HttpHealthNotifier::new(format!("{}/ping/abc", server.uri())).unwrap();
        notifier.notify().await;
        notifier.notify().await;

        server.verify().await;
    }

    #[tokio::test]
    async fn error_status_is_swallowed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        // Must return normally.
        HttpHealthNotifier::new(server.uri()).unwrap().notify().await;
    }

    #[tokio::test]
    async fn unreachable_url_is_swallowed() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/ping", listener.local_addr().unwrap());
        drop(listener);

        HttpHealthNotifier::new(url).unwrap().notify().await;
    }
}
