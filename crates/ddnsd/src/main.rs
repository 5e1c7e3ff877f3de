// # ddnsd - DDNS Daemon
//
// ⚠️ ARCHITECTURAL CONSTRAINTS ⚠️
//
// - This is a THIN integration layer ONLY
// - DO NOT add business logic, DNS logic, or retry logic here
// - All reconciliation logic lives in ddns-core
//
// The ddnsd daemon is responsible for:
// 1. Parsing flags (or their environment variables)
// 2. Initializing logging and the runtime
// 3. Wiring the resolver, provider and notifier into the controller
// 4. Translating SIGINT/SIGTERM into cancellation
//
// ## Example
//
// ```bash
// export PORKBUN_DOMAIN=example.com
// export PORKBUN_API_KEY=pk1_...
// export PORKBUN_API_SECRET=sk1_...
// export PING_URL=https://hc-ping.com/your-uuid
//
// ddnsd run
// ddnsd test-ip
// ```

mod cli;

use anyhow::Result;
use clap::Parser;
use ddns_core::traits::{HealthNotifier, IpResolver};
use ddns_core::{
    CancellationToken, ControllerEvent, DdnsConfig, DdnsController, Error, NoopHealthNotifier,
};
use ddns_http::{HttpHealthNotifier, HttpIpResolver};
use ddns_provider_porkbun::PorkbunProvider;
use std::process::ExitCode;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{Level, debug, error, info};
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, Command, LogLevel, LogStyle, ResolverArgs, RunArgs};

#[cfg(unix)]
use tokio::signal::unix::{Signal, SignalKind, signal};

/// How long the controller gets to stop after cancellation
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (initialization failure, lookup failure)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DdnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version land here too
            let _ = e.print();
            return if e.use_stderr() {
                DdnsExitCode::ConfigError.into()
            } else {
                DdnsExitCode::CleanShutdown.into()
            };
        }
    };

    if let Err(e) = init_tracing(cli.log_level, cli.log_style) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    let code = rt.block_on(async {
        match cli.command {
            Command::Run(args) => run_daemon(args).await,
            Command::TestIp(args) => test_ip(args).await,
        }
    });

    code.into()
}

/// Install the global subscriber, writing to stderr
fn init_tracing(level: LogLevel, style: LogStyle) -> Result<()> {
    let builder = FmtSubscriber::builder()
        .with_max_level(Level::from(level))
        .with_writer(std::io::stderr);

    match style {
        LogStyle::Console => tracing::subscriber::set_global_default(builder.finish())?,
        LogStyle::Json => tracing::subscriber::set_global_default(builder.json().finish())?,
    }

    Ok(())
}

/// Resolve the public IP once and log it
async fn test_ip(args: ResolverArgs) -> DdnsExitCode {
    let resolver = match HttpIpResolver::with_url(&args.ip_url) {
        Ok(resolver) => resolver,
        Err(e) => {
            error!("Failed to create IP resolver: {}", e);
            return DdnsExitCode::ConfigError;
        }
    };

    match resolver.resolve().await {
        Ok(ip) => {
            info!(ip = %ip, url = %args.ip_url, "Found external IP");
            DdnsExitCode::CleanShutdown
        }
        Err(e) => {
            error!(url = %args.ip_url, "Failed to resolve external IP: {}", e);
            DdnsExitCode::RuntimeError
        }
    }
}

/// Run the daemon until a shutdown signal arrives
async fn run_daemon(args: RunArgs) -> DdnsExitCode {
    let config = args.to_config();
    if let Err(e) = config.validate() {
        error!("Configuration validation error: {}", e);
        return DdnsExitCode::ConfigError;
    }

    let (controller, events) = match build_controller(&args, &config) {
        Ok(parts) => parts,
        Err(e) => {
            error!("Failed to build controller: {}", e);
            return DdnsExitCode::ConfigError;
        }
    };

    let mut signals = match ShutdownSignals::install() {
        Ok(signals) => signals,
        Err(e) => {
            error!("{}", e);
            return DdnsExitCode::RuntimeError;
        }
    };

    info!(
        record = %config.record.fqdn(),
        provider = config.provider.type_name(),
        interval_secs = config.engine.interval_secs,
        health_check = config.health_check_url.is_some(),
        "Starting ddnsd daemon"
    );

    tokio::spawn(log_events(events));

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            let signal = signals.recv().await;
            info!("Received shutdown signal: {}", signal);
            cancel.cancel();
        }
    });

    let handle = match controller.start(cancel.clone()).await {
        Ok(handle) => handle,
        Err(Error::Cancelled) => {
            info!("Shut down during initialization");
            return DdnsExitCode::CleanShutdown;
        }
        Err(e) => {
            error!("Initialization failed: {}", e);
            return DdnsExitCode::RuntimeError;
        }
    };

    let finished = handle.wait();
    tokio::pin!(finished);

    tokio::select! {
        biased;
        _ = cancel.cancelled() => {}
        result = &mut finished => {
            // The loop only ends on cancellation; anything else is a crash.
            error!("Controller stopped unexpectedly: {:?}", result);
            return DdnsExitCode::RuntimeError;
        }
    }

    info!("Shutting down daemon");
    match tokio::time::timeout(SHUTDOWN_TIMEOUT, finished).await {
        Ok(Ok(())) => {
            info!("Shutdown complete");
            DdnsExitCode::CleanShutdown
        }
        Ok(Err(e)) => {
            error!("Shutdown error: {}", e);
            DdnsExitCode::RuntimeError
        }
        Err(_) => {
            error!("Shutdown timeout after {:?}", SHUTDOWN_TIMEOUT);
            DdnsExitCode::RuntimeError
        }
    }
}

/// Construct the collaborators and the controller
fn build_controller(
    args: &RunArgs,
    config: &DdnsConfig,
) -> Result<(DdnsController, mpsc::Receiver<ControllerEvent>)> {
    let resolver: Box<dyn IpResolver> = Box::new(HttpIpResolver::with_url(&args.resolver.ip_url)?);
    let provider = Box::new(PorkbunProvider::from_config(config)?);
    let notifier: Box<dyn HealthNotifier> = match &config.health_check_url {
        Some(url) => Box::new(HttpHealthNotifier::new(url)?),
        None => Box::new(NoopHealthNotifier),
    };

    Ok(DdnsController::new(resolver, provider, notifier, config.clone())?)
}

/// Mirror controller events into the debug log
async fn log_events(mut events: mpsc::Receiver<ControllerEvent>) {
    while let Some(event) = events.recv().await {
        debug!(?event, "Controller event");
    }
}

/// SIGTERM and SIGINT listeners, installed before the controller starts
#[cfg(unix)]
struct ShutdownSignals {
    sigterm: Signal,
    sigint: Signal,
}

#[cfg(unix)]
impl ShutdownSignals {
    fn install() -> Result<Self> {
        let sigterm = signal(SignalKind::terminate())
            .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
        let sigint = signal(SignalKind::interrupt())
            .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;
        Ok(Self { sigterm, sigint })
    }

    /// Wait for either signal and return its name
    async fn recv(&mut self) -> &'static str {
        tokio::select! {
            _ = self.sigterm.recv() => "SIGTERM",
            _ = self.sigint.recv() => "SIGINT",
        }
    }
}

/// Fallback for non-Unix platforms (CTRL-C only)
#[cfg(not(unix))]
struct ShutdownSignals;

#[cfg(not(unix))]
impl ShutdownSignals {
    fn install() -> Result<Self> {
        Ok(Self)
    }

    async fn recv(&mut self) -> &'static str {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to wait for CTRL-C: {}", e);
        }
        "SIGINT"
    }
}
