// Command-line interface
//
// Every flag can also be set from the environment variable named next to it.

use clap::{Args, Parser, Subcommand, ValueEnum};
use ddns_core::config::DEFAULT_PORKBUN_ENDPOINT;
use ddns_core::{DdnsConfig, EngineConfig, ProviderConfig, RecordConfig};
use ddns_http::DEFAULT_IP_URL;
use tracing::Level;

#[derive(Debug, Parser)]
#[command(
    name = "ddnsd",
    version,
    about = "Keep a Porkbun A record pointed at this host's public IP"
)]
pub struct Cli {
    /// Log level
    #[arg(
        long,
        global = true,
        env = "LOG_LEVEL",
        value_enum,
        ignore_case = true,
        default_value_t = LogLevel::Info
    )]
    pub log_level: LogLevel,

    /// Log output format
    #[arg(
        long,
        global = true,
        env = "LOG_STYLE",
        value_enum,
        ignore_case = true,
        default_value_t = LogStyle::Console
    )]
    pub log_style: LogStyle,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the reconciliation loop until SIGINT/SIGTERM
    Run(RunArgs),
    /// Resolve and print the current public IP once
    TestIp(ResolverArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogStyle {
    /// Human-readable lines
    Console,
    /// One JSON object per line
    Json,
}

#[derive(Debug, Args)]
pub struct ResolverArgs {
    /// Echo service returning the caller's IP as plain text
    #[arg(long, default_value = DEFAULT_IP_URL)]
    pub ip_url: String,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Seconds between checks
    #[arg(long, env = "INTERVAL", default_value_t = 300)]
    pub interval: u64,

    /// Health-check URL pinged after every successful check
    #[arg(long, env = "PING_URL")]
    pub ping_url: Option<String>,

    /// Subdomain label to keep updated
    #[arg(long, env = "PORKBUN_SUBDOMAIN", default_value = "dns")]
    pub porkbun_subdomain: String,

    /// Registered domain at Porkbun
    #[arg(long, env = "PORKBUN_DOMAIN")]
    pub porkbun_domain: String,

    /// Porkbun API base URL
    #[arg(long, env = "PORKBUN_API_ENDPOINT", default_value = DEFAULT_PORKBUN_ENDPOINT)]
    pub porkbun_endpoint: String,

    /// Porkbun API key
    #[arg(long, env = "PORKBUN_API_KEY", hide_env_values = true)]
    pub porkbun_key: String,

    /// Porkbun API secret
    #[arg(long, env = "PORKBUN_API_SECRET", hide_env_values = true)]
    pub porkbun_secret: String,

    #[command(flatten)]
    pub resolver: ResolverArgs,
}

impl RunArgs {
    /// Build the controller configuration from the parsed flags
    pub fn to_config(&self) -> DdnsConfig {
        let record = RecordConfig::new(&self.porkbun_domain, &self.porkbun_subdomain);
        let provider = ProviderConfig::Porkbun {
            endpoint: self.porkbun_endpoint.clone(),
            api_key: self.porkbun_key.clone(),
            secret_api_key: self.porkbun_secret.clone(),
        };
        let engine = EngineConfig {
            interval_secs: self.interval,
            ..EngineConfig::default()
        };

        let config = DdnsConfig::new(record, provider).with_engine(engine);
        match self.ping_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => config.with_health_check_url(url),
            _ => config,
        }
    }
}
