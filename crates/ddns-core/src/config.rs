//! Configuration types for the DDNS system
//!
//! The controller receives a validated [`DdnsConfig`] at construction and
//! never re-reads flags or environment variables itself.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::record::DEFAULT_TTL;

/// Default Porkbun API endpoint
pub const DEFAULT_PORKBUN_ENDPOINT: &str = "https://api.porkbun.com/api/json/v3";

/// Main DDNS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DdnsConfig {
    /// The record to manage
    pub record: RecordConfig,

    /// DNS provider configuration
    pub provider: ProviderConfig,

    /// URL pinged after each successful cycle
    #[serde(default)]
    pub health_check_url: Option<String>,

    /// Optional engine settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl DdnsConfig {
    /// Create a configuration with default engine settings
    pub fn new(record: RecordConfig, provider: ProviderConfig) -> Self {
        Self {
            record,
            provider,
            health_check_url: None,
            engine: EngineConfig::default(),
        }
    }

    /// Set the health-check URL
    pub fn with_health_check_url(mut self, url: impl Into<String>) -> Self {
        self.health_check_url = Some(url.into());
        self
    }

    /// Replace the engine settings
    pub fn with_engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.record.validate()?;
        self.provider.validate()?;
        self.engine.validate()?;

        if let Some(url) = &self.health_check_url {
            validate_http_url("health check URL", url)?;
        }

        Ok(())
    }
}

/// The managed record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordConfig {
    /// Registered domain (e.g., "example.com")
    pub domain: String,

    /// Subdomain label to keep updated (e.g., "dns" for dns.example.com)
    #[serde(default = "default_subdomain")]
    pub subdomain: String,

    /// TTL for created and updated records
    #[serde(default = "default_ttl")]
    pub ttl: u32,
}

impl RecordConfig {
    /// Create a record configuration with the default TTL
    pub fn new(domain: impl Into<String>, subdomain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            subdomain: subdomain.into(),
            ttl: DEFAULT_TTL,
        }
    }

    /// Fully-qualified record name (for logging)
    pub fn fqdn(&self) -> String {
        if self.subdomain.is_empty() {
            self.domain.clone()
        } else {
            format!("{}.{}", self.subdomain, self.domain)
        }
    }

    fn validate(&self) -> Result<(), crate::Error> {
        if self.domain.trim().is_empty() {
            return Err(crate::Error::config("Domain cannot be empty"));
        }
        if !self.domain.contains('.') {
            return Err(crate::Error::config(format!(
                "Domain '{}' is not a registered domain name",
                self.domain
            )));
        }
        if self.subdomain.contains('.') || self.subdomain.contains('/') {
            return Err(crate::Error::config(format!(
                "Subdomain must be a single label, got '{}'",
                self.subdomain
            )));
        }
        if self.ttl == 0 {
            return Err(crate::Error::config("TTL must be > 0"));
        }
        Ok(())
    }
}

fn default_subdomain() -> String {
    "dns".to_string()
}

fn default_ttl() -> u32 {
    DEFAULT_TTL
}

/// DNS provider configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Porkbun JSON API
    Porkbun {
        /// API base URL
        #[serde(default = "default_porkbun_endpoint")]
        endpoint: String,
        /// API key, sent as `apikey`
        api_key: String,
        /// Secret API key, sent as `secretapikey`
        secret_api_key: String,
    },
}

impl ProviderConfig {
    /// Porkbun configuration against the public endpoint
    pub fn porkbun(api_key: impl Into<String>, secret_api_key: impl Into<String>) -> Self {
        ProviderConfig::Porkbun {
            endpoint: default_porkbun_endpoint(),
            api_key: api_key.into(),
            secret_api_key: secret_api_key.into(),
        }
    }

    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ProviderConfig::Porkbun {
                endpoint,
                api_key,
                secret_api_key,
            } => {
                if api_key.is_empty() {
                    return Err(crate::Error::config("Porkbun API key cannot be empty"));
                }
                if secret_api_key.is_empty() {
                    return Err(crate::Error::config(
                        "Porkbun secret API key cannot be empty",
                    ));
                }
                validate_http_url("Porkbun endpoint", endpoint)
            }
        }
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &str {
        match self {
            ProviderConfig::Porkbun { .. } => "porkbun",
        }
    }
}

// Credentials stay out of logs.
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderConfig::Porkbun { endpoint, .. } => f
                .debug_struct("Porkbun")
                .field("endpoint", endpoint)
                .field("api_key", &"<REDACTED>")
                .field("secret_api_key", &"<REDACTED>")
                .finish(),
        }
    }
}

fn default_porkbun_endpoint() -> String {
    DEFAULT_PORKBUN_ENDPOINT.to_string()
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Seconds between the end of one tick and the start of the next
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Total discover-or-create attempts before initialization gives up
    #[serde(default = "default_max_init_attempts")]
    pub max_init_attempts: usize,

    /// Pause after a failed initialization attempt (in seconds)
    ///
    /// No pause is taken after a successful create; the next attempt
    /// re-queries straight away to pick up the new record id.
    #[serde(default = "default_init_retry_delay_secs")]
    pub init_retry_delay_secs: u64,

    /// Capacity of the controller event channel
    ///
    /// When full, events are dropped (with a warning log).
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl EngineConfig {
    /// Polling interval as a duration
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Pause between failed initialization attempts as a duration
    pub fn init_retry_delay(&self) -> Duration {
        Duration::from_secs(self.init_retry_delay_secs)
    }

    fn validate(&self) -> Result<(), crate::Error> {
        if self.interval_secs == 0 {
            return Err(crate::Error::config("Polling interval must be > 0"));
        }
        if self.max_init_attempts == 0 {
            return Err(crate::Error::config(
                "At least one initialization attempt is required",
            ));
        }
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("Event channel capacity must be > 0"));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            max_init_attempts: default_max_init_attempts(),
            init_retry_delay_secs: default_init_retry_delay_secs(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

fn default_interval_secs() -> u64 {
    300
}

fn default_max_init_attempts() -> usize {
    5
}

fn default_init_retry_delay_secs() -> u64 {
    2
}

fn default_event_channel_capacity() -> usize {
    1000
}

fn validate_http_url(what: &str, url: &str) -> Result<(), crate::Error> {
    if !url.starts_with("https://") && !url.starts_with("http://") {
        return Err(crate::Error::config(format!(
            "{} must use HTTP or HTTPS scheme. Got: {}",
            what, url
        )));
    }
    Ok(())
}
