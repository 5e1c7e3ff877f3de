// # Porkbun DNS Provider
//
// This crate provides a Porkbun DNS provider implementation for the DDNS system.
//
// ## API Surface
//
// Only the three calls the controller needs are implemented, all JSON POSTs
// against the v3 API:
//
// - `POST /dns/retrieveByNameType/{domain}/A/{subdomain}`: find the record
// - `POST /dns/create/{domain}`: create the record
// - `POST /dns/edit/{domain}/{id}`: replace the record content
//
// Porkbun authenticates per request: `apikey` and `secretapikey` travel in
// every body. There is no session or auth header.
//
// ## Architectural Constraints
//
// - ✅ One HTTP request per trait call
// - ✅ Full error propagation (the controller owns retries)
// - ❌ NO retry logic, NO backoff, NO caching of the record
// - ❌ NO background tasks
//
// ## Security Requirements
//
// - API key and secret NEVER appear in logs, errors or `Debug` output

use async_trait::async_trait;
use ddns_core::config::{DdnsConfig, ProviderConfig};
use ddns_core::record::{DnsRecord, RecordData, RecordLookup, RecordType};
use ddns_core::traits::DnsProvider;
use ddns_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Provider name used in errors and logs
const PROVIDER_NAME: &str = "porkbun";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Status value Porkbun returns on success
const STATUS_SUCCESS: &str = "SUCCESS";

/// Porkbun DNS provider
///
/// Bound to one domain and one subdomain label at construction.
pub struct PorkbunProvider {
    /// API base URL (e.g., "https://api.porkbun.com/api/json/v3")
    endpoint: String,

    /// API key
    /// ⚠️ NEVER log this value
    api_key: String,

    /// Secret API key
    /// ⚠️ NEVER log this value
    secret_api_key: String,

    /// Registered domain
    domain: String,

    /// Subdomain label being managed
    subdomain: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the credentials
impl std::fmt::Debug for PorkbunProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PorkbunProvider")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<REDACTED>")
            .field("secret_api_key", &"<REDACTED>")
            .field("domain", &self.domain)
            .field("subdomain", &self.subdomain)
            .finish()
    }
}

/// Credentials block embedded in every request body
#[derive(Serialize)]
struct Credentials<'a> {
    apikey: &'a str,
    secretapikey: &'a str,
}

/// Body of create and edit requests
#[derive(Serialize)]
struct RecordPayload<'a> {
    #[serde(flatten)]
    credentials: Credentials<'a>,
    name: &'a str,
    content: &'a str,
    #[serde(rename = "type")]
    record_type: &'static str,
    ttl: String,
}

/// Minimal status envelope shared by every response
#[derive(Deserialize)]
struct StatusResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
}

/// Response of `retrieveByNameType`
#[derive(Deserialize)]
struct RetrieveResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    records: Vec<WireRecord>,
}

/// A record as Porkbun serializes it
#[derive(Deserialize)]
struct WireRecord {
    id: StringOrNumber,
    content: String,
    #[serde(rename = "type")]
    record_type: String,
    #[serde(default)]
    ttl: Option<StringOrNumber>,
}

/// Porkbun sends ids and TTLs as strings; accept numbers too
#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(u64),
}

impl StringOrNumber {
    fn into_string(self) -> String {
        match self {
            StringOrNumber::String(s) => s,
            StringOrNumber::Number(n) => n.to_string(),
        }
    }
}

impl PorkbunProvider {
    /// Create a new Porkbun provider
    ///
    /// # Parameters
    ///
    /// - `endpoint`: API base URL
    /// - `api_key` / `secret_api_key`: Porkbun API credentials
    /// - `domain`: registered domain (e.g., "example.com")
    /// - `subdomain`: label to manage (e.g., "dns")
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        secret_api_key: impl Into<String>,
        domain: impl Into<String>,
        subdomain: impl Into<String>,
    ) -> Result<Self> {
        let api_key = api_key.into();
        let secret_api_key = secret_api_key.into();

        if api_key.is_empty() || secret_api_key.is_empty() {
            return Err(Error::config("Porkbun API key and secret are required"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into(),
            api_key,
            secret_api_key,
            domain: domain.into(),
            subdomain: subdomain.into(),
            client,
        })
    }

    /// Create a provider from the daemon configuration
    pub fn from_config(config: &DdnsConfig) -> Result<Self> {
        match &config.provider {
            ProviderConfig::Porkbun {
                endpoint,
                api_key,
                secret_api_key,
            } => Self::new(
                endpoint.clone(),
                api_key.clone(),
                secret_api_key.clone(),
                config.record.domain.clone(),
                config.record.subdomain.clone(),
            ),
        }
    }

    /// Join the endpoint and an API path
    fn path(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.endpoint.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn credentials(&self) -> Credentials<'_> {
        Credentials {
            apikey: &self.api_key,
            secretapikey: &self.secret_api_key,
        }
    }

    fn payload<'a>(&'a self, record: &'a RecordData) -> RecordPayload<'a> {
        RecordPayload {
            credentials: self.credentials(),
            name: &record.name,
            content: &record.content,
            record_type: record.record_type.as_str(),
            ttl: record.ttl.to_string(),
        }
    }

    /// POST a JSON body and map transport and status failures
    ///
    /// Returns the response body on a 2xx status.
    async fn post<T: Serialize + ?Sized>(&self, operation: &str, url: &str, body: &T) -> Result<String> {
        tracing::debug!(method = "POST", url, operation, "req  ->");

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::network(format!("{}: HTTP request failed: {}", operation, e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::network(format!("{}: failed to read response: {}", operation, e)));

        if !status.is_success() {
            tracing::warn!(url, operation, status = %status, "resp <-");
            let text = text.unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(Error::provider_rejection(
                PROVIDER_NAME,
                status.as_u16(),
                format!("{}: {}", operation, error_message(&text)),
            ));
        }

        tracing::debug!(url, operation, status = %status, "resp <-");
        text
    }

    /// Reject 2xx responses whose envelope still reports an error
    fn check_envelope(operation: &str, status: &str, message: Option<String>) -> Result<()> {
        if status.eq_ignore_ascii_case(STATUS_SUCCESS) {
            return Ok(());
        }
        Err(Error::provider_rejection(
            PROVIDER_NAME,
            200,
            format!(
                "{}: {}",
                operation,
                message.unwrap_or_else(|| format!("status {}", status))
            ),
        ))
    }

    fn record_from_wire(&self, wire: WireRecord) -> Result<DnsRecord> {
        if wire.record_type != RecordType::A.as_str() {
            return Err(Error::invalid_response(format!(
                "expected an A record, got type {}",
                wire.record_type
            )));
        }

        let ttl = match wire.ttl {
            Some(ttl) => {
                let raw = ttl.into_string();
                raw.parse()
                    .map_err(|_| Error::invalid_response(format!("invalid ttl: {}", raw)))?
            }
            None => ddns_core::record::DEFAULT_TTL,
        };

        // Porkbun echoes the FQDN; the tracked name stays the configured label.
        Ok(DnsRecord::new(
            wire.id.into_string(),
            RecordData::a(self.subdomain.clone(), wire.content, ttl),
        ))
    }
}

/// Extract the human-readable message from an error body
fn error_message(body: &str) -> String {
    match serde_json::from_str::<StatusResponse>(body) {
        Ok(StatusResponse {
            message: Some(message),
            ..
        }) => message,
        _ if body.trim().is_empty() => "empty response".to_string(),
        _ => body.trim().to_string(),
    }
}

#[async_trait]
impl DnsProvider for PorkbunProvider {
    async fn find_first(&self) -> Result<RecordLookup> {
        let url = self.path(&format!(
            "/dns/retrieveByNameType/{}/{}/{}",
            self.domain,
            RecordType::A,
            self.subdomain
        ));

        let body = self.post("retrieve", &url, &self.credentials()).await?;
        let response: RetrieveResponse = serde_json::from_str(&body).map_err(|e| {
            Error::invalid_response(format!("retrieve: failed to decode response ({}): {}", e, body))
        })?;
        Self::check_envelope("retrieve", &response.status, response.message)?;

        match response.records.into_iter().next() {
            Some(wire) => {
                let record = self.record_from_wire(wire)?;
                tracing::debug!(record_id = %record.id, content = %record.content, "Found record");
                Ok(RecordLookup::Found(record))
            }
            None => {
                tracing::debug!(domain = %self.domain, subdomain = %self.subdomain, "No matching records");
                Ok(RecordLookup::NotFound)
            }
        }
    }

    async fn create(&self, record: &RecordData) -> Result<()> {
        let url = self.path(&format!("/dns/create/{}", self.domain));
        let body = self.post("create", &url, &self.payload(record)).await?;

        // A 2xx body we cannot decode is still a success.
        if let Ok(envelope) = serde_json::from_str::<StatusResponse>(&body) {
            Self::check_envelope("create", &envelope.status, envelope.message)?;
        }

        tracing::info!(
            domain = %self.domain,
            name = %record.name,
            content = %record.content,
            "Porkbun record created"
        );
        Ok(())
    }

    async fn update(&self, id: &str, record: &RecordData) -> Result<()> {
        let url = self.path(&format!("/dns/edit/{}/{}", self.domain, id));
        let body = self.post("edit", &url, &self.payload(record)).await?;

        if let Ok(envelope) = serde_json::from_str::<StatusResponse>(&body) {
            Self::check_envelope("edit", &envelope.status, envelope.message)?;
        }

        tracing::info!(
            domain = %self.domain,
            record_id = id,
            content = %record.content,
            "Porkbun record updated"
        );
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}
