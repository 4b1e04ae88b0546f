// # ddnsd - DDNS Daemon
//
// Keeps one Alibaba Cloud DNS "A" record pointed at this machine's public
// IPv4 address.
//
// This is a thin integration layer: it reads the process settings, builds
// the components and hands them to the `Scheduler` in ddns-core. No DNS
// logic lives here.
//
// ## Configuration
//
// The record and credentials come from a JSON file that is re-read before
// every pass, so edits apply without a restart:
//
// ```json
// {
//   "AccessKeyId": "LTAI...",
//   "AccessKeySecret": "...",
//   "Domain": "example.com",
//   "SubDomain": "home",
//   "TTL": 600,
//   "Interval": 300
// }
// ```
//
// Process settings come from environment variables:
//
// - `DDNS_CONFIG_PATH`: Path to the JSON file (default: config.json)
// - `DDNS_LOG_LEVEL`: trace, debug, info, warn, error (default: info)
// - `DDNS_IP_LOOKUP_URL`: Public IP lookup service (default: https://ipinfo.io/json)
// - `DDNS_API_ENDPOINT`: Alibaba Cloud DNS endpoint (default: https://alidns.aliyuncs.com/)
// - `DDNS_HTTP_TIMEOUT_SECS`: API request timeout, 1-300 (default: 30)
// - `DDNS_FALLBACK_INTERVAL_SECS`: Delay after a failed pass (default: 60)
// - `DDNS_MAX_BACKOFF_SECS`: Ceiling for repeated failures (default: fallback interval)
// - `DDNS_MODE`: live or dry-run (default: live)
//
// ## Example
//
// ```bash
// export DDNS_CONFIG_PATH=/etc/ddns/config.json
// export DDNS_MODE=dry-run
//
// ddnsd
// ```

use anyhow::Result;
use ddns_core::config::DEFAULT_FALLBACK_INTERVAL_SECS;
use ddns_core::source::file::DEFAULT_CONFIG_PATH;
use ddns_core::{FileConfigSource, Reconciler, Scheduler, SchedulerConfig};
use ddns_ip_http::{DEFAULT_LOOKUP_URL, HttpIpSource};
use ddns_provider_alidns::{ALIDNS_API_ENDPOINT, AlidnsProvider, DEFAULT_HTTP_TIMEOUT};
use std::env;
use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum DdnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Process settings
#[derive(Debug, Clone, PartialEq, Eq)]
struct Settings {
    config_path: String,
    log_level: String,
    ip_lookup_url: String,
    api_endpoint: String,
    http_timeout_secs: u64,
    fallback_interval_secs: u64,
    max_backoff_secs: u64,
    mode: String,
}

impl Settings {
    /// Load settings from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load settings through `lookup`, applying defaults for unset names
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let fallback_interval_secs = parse_secs(
            "DDNS_FALLBACK_INTERVAL_SECS",
            var("DDNS_FALLBACK_INTERVAL_SECS"),
            DEFAULT_FALLBACK_INTERVAL_SECS,
        )?;

        Ok(Self {
            config_path: var("DDNS_CONFIG_PATH").unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string()),
            log_level: var("DDNS_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            ip_lookup_url: var("DDNS_IP_LOOKUP_URL")
                .unwrap_or_else(|| DEFAULT_LOOKUP_URL.to_string()),
            api_endpoint: var("DDNS_API_ENDPOINT")
                .unwrap_or_else(|| ALIDNS_API_ENDPOINT.to_string()),
            http_timeout_secs: parse_secs(
                "DDNS_HTTP_TIMEOUT_SECS",
                var("DDNS_HTTP_TIMEOUT_SECS"),
                DEFAULT_HTTP_TIMEOUT.as_secs(),
            )?,
            fallback_interval_secs,
            max_backoff_secs: parse_secs(
                "DDNS_MAX_BACKOFF_SECS",
                var("DDNS_MAX_BACKOFF_SECS"),
                fallback_interval_secs,
            )?,
            mode: var("DDNS_MODE").unwrap_or_else(|| "live".to_string()),
        })
    }

    /// Validate the settings
    ///
    /// The record configuration file is not checked here: it is re-read
    /// before every pass and a bad file only delays that pass.
    fn validate(&self) -> Result<()> {
        if self.config_path.trim().is_empty() {
            anyhow::bail!("DDNS_CONFIG_PATH cannot be empty");
        }

        validate_url("DDNS_IP_LOOKUP_URL", &self.ip_lookup_url)?;
        validate_url("DDNS_API_ENDPOINT", &self.api_endpoint)?;

        if !(1..=300).contains(&self.http_timeout_secs) {
            anyhow::bail!(
                "DDNS_HTTP_TIMEOUT_SECS must be between 1 and 300 seconds. Got: {}",
                self.http_timeout_secs
            );
        }

        if self.fallback_interval_secs == 0 {
            anyhow::bail!("DDNS_FALLBACK_INTERVAL_SECS must be greater than 0");
        }

        if self.max_backoff_secs < self.fallback_interval_secs {
            anyhow::bail!(
                "DDNS_MAX_BACKOFF_SECS ({}) cannot be shorter than DDNS_FALLBACK_INTERVAL_SECS ({})",
                self.max_backoff_secs,
                self.fallback_interval_secs
            );
        }

        match self.mode.to_lowercase().as_str() {
            "live" | "dry-run" => {}
            _ => anyhow::bail!(
                "DDNS_MODE '{}' is not valid. Valid modes: live, dry-run",
                self.mode
            ),
        }

        self.level()?;

        Ok(())
    }

    fn level(&self) -> Result<Level> {
        Ok(match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => anyhow::bail!(
                "DDNS_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        })
    }

    fn dry_run(&self) -> bool {
        self.mode.eq_ignore_ascii_case("dry-run")
    }

    fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            fallback_interval_secs: self.fallback_interval_secs,
            max_backoff_secs: self.max_backoff_secs,
        }
    }
}

fn parse_secs(name: &str, value: Option<String>, default: u64) -> Result<u64> {
    match value {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| {
            anyhow::anyhow!("{} must be a whole number of seconds. Got: {}", name, raw)
        }),
    }
}

fn validate_url(name: &str, url: &str) -> Result<()> {
    if !url.starts_with("https://") && !url.starts_with("http://") {
        anyhow::bail!("{} must use HTTP or HTTPS scheme. Got: {}", name, url);
    }
    Ok(())
}

fn main() -> ExitCode {
    // Load settings from environment
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    if let Err(e) = settings.validate() {
        eprintln!("Configuration validation error: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    // Initialize tracing
    let log_level = settings.level().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    info!("Starting ddnsd daemon");

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

    let result = rt.block_on(async {
        if let Err(e) = run_daemon(settings).await {
            error!("Daemon error: {}", e);
            DdnsExitCode::RuntimeError
        } else {
            DdnsExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Run the daemon until a shutdown signal arrives
async fn run_daemon(settings: Settings) -> Result<()> {
    if settings.dry_run() {
        warn!("Running in DRY-RUN mode - no DNS records will be created or changed");
    }

    if !Path::new(&settings.config_path).exists() {
        warn!(
            "Config file {} does not exist yet; passes will fail until it is created",
            settings.config_path
        );
    }

    let ip_source = HttpIpSource::new(settings.ip_lookup_url.clone());
    let provider = AlidnsProvider::new(settings.dry_run())?
        .with_endpoint(settings.api_endpoint.clone())
        .with_timeout(Duration::from_secs(settings.http_timeout_secs))?;

    info!("IP lookup service: {}", ip_source.url());
    info!("DNS API endpoint: {}", provider.endpoint());

    let reconciler = Reconciler::new(Box::new(ip_source), Box::new(provider));
    let config_source = FileConfigSource::new(&settings.config_path);
    let mut scheduler = Scheduler::new(
        Box::new(config_source),
        reconciler,
        settings.scheduler_config(),
    )?;

    // Install handlers before the first pass so a failure is a startup error
    let signal = shutdown_signal()?;
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let signal_task = tokio::spawn(async move {
        let name = signal.await;
        info!("Received shutdown signal: {}", name);
        let _ = shutdown_tx.send(());
    });

    scheduler.run_with_shutdown(shutdown_rx).await?;
    signal_task.abort();

    info!("Shutting down daemon");
    Ok(())
}

/// Install SIGTERM and SIGINT handlers
///
/// # Returns
///
/// A future resolving to the name of the first signal received.
#[cfg(unix)]
fn shutdown_signal() -> Result<impl Future<Output = &'static str> + Send + 'static> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    Ok(async move {
        tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        }
    })
}

/// Install a CTRL-C handler
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
fn shutdown_signal() -> Result<impl Future<Output = &'static str> + Send + 'static> {
    Ok(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to wait for CTRL-C: {}", e);
            std::future::pending::<()>().await;
        }
        "SIGINT"
    })
}
