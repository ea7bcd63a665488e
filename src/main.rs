//! ding binary entry point.
//!
//! Pings every address given with `-a` in batches of `-n` packets, forever,
//! writing one record per address and batch to stdout.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use ding::{
    AddressSet, ConfigError, FileConfig, GenerationScheduler, IcmpProber, LogFormat, ProbeConfig,
    TracingReporter,
    config::parse_positive_duration,
    reporter::{RECORD_TARGET, record_layer},
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::filter::{EnvFilter, FilterExt, filter_fn};
use tracing_subscriber::{Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// ding - differential time-stamped ping
#[derive(Parser, Debug)]
#[command(name = "ding", version, about, long_about = None)]
struct Cli {
    /// Set of addresses to ping (comma separated, may be repeated)
    #[arg(short = 'a', value_name = "ADDRS", env = "DING_ADDRS")]
    addrs: Vec<String>,

    /// Interval between pings for each address [default: 10s]
    #[arg(short = 'i', value_parser = parse_positive_duration, env = "DING_INTERVAL")]
    interval: Option<Duration>,

    /// Length of time for each batch of pings [default: 1m]
    #[arg(short = 'b', value_parser = parse_positive_duration, env = "DING_BATCH")]
    batch: Option<Duration>,

    /// Has access to raw network (requires setcap cap_net_raw=+ep or equivalent) [default: true]
    #[arg(
        long = "priv",
        num_args = 0..=1,
        default_missing_value = "true",
        env = "DING_PRIV"
    )]
    privileged: Option<bool>,

    /// Number of ICMP packets for each batch of pings [default: 5]
    #[arg(short = 'n', value_parser = clap::value_parser!(u64).range(1..=65535), env = "DING_COUNT")]
    count: Option<u64>,

    /// Path to an optional YAML configuration file
    #[arg(short, long, env = "DING_CONFIG")]
    config: Option<PathBuf>,

    /// Encoding of the records written to stdout
    #[arg(long, value_enum, default_value_t = LogFormat::Json, env = "DING_LOG_FORMAT")]
    log_format: LogFormat,
}

impl Cli {
    /// Merge CLI/env values over the file configuration.
    fn probe_config(&self, file: &FileConfig) -> ProbeConfig {
        ProbeConfig {
            count: self.count.map_or(file.count, |n| n as usize),
            interval: self.interval.unwrap_or(file.interval),
            timeout: self.batch.unwrap_or(file.batch),
            privileged: self.privileged.unwrap_or(file.privileged),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Records go to stdout; everything else is a diagnostic on stderr.
    let diagnostics = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into())
                .and(filter_fn(|meta| meta.target() != RECORD_TARGET)),
        );
    tracing_subscriber::registry()
        .with(record_layer(cli.log_format, std::io::stdout))
        .with(diagnostics)
        .init();

    let file = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            FileConfig::load(path)?
        }
        None => FileConfig::default(),
    };

    let probe_config = cli.probe_config(&file);
    probe_config.validate()?;

    let addresses = file.address_set()?;
    for list in &cli.addrs {
        addresses.extend_from_list(list)?;
    }
    if addresses.is_empty() {
        return Err(ConfigError::Validation("no addresses to ping (use -a)".to_string()).into());
    }

    tracing::info!(
        addrs = %addresses,
        count = probe_config.count,
        interval = ?probe_config.interval,
        batch = ?probe_config.timeout,
        privileged = probe_config.privileged,
        "Starting ding"
    );

    let shutdown = CancellationToken::new();
    tokio::spawn(shutdown_signal(shutdown.clone()));

    if let (Some(path), Some(every)) = (cli.config.clone(), file.reload_interval) {
        tokio::spawn(reload_addresses(
            path,
            every,
            cli.addrs.clone(),
            addresses.clone(),
            shutdown.clone(),
        ));
    }

    let scheduler = GenerationScheduler::new(
        Arc::new(IcmpProber::new()),
        Arc::new(TracingReporter::new()),
        probe_config,
    );
    scheduler.run_forever(&addresses, shutdown).await;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Periodically re-read the address list from the configuration file.
///
/// The new membership is the file's addresses plus those given on the
/// command line. An unreadable or invalid file keeps the current membership.
async fn reload_addresses(
    path: PathBuf,
    every: Duration,
    cli_addrs: Vec<String>,
    addresses: AddressSet,
    shutdown: CancellationToken,
) {
    let mut ticker = tokio::time::interval(every);
    ticker.tick().await;
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => return,
            _ = ticker.tick() => {}
        }

        match load_members(&path, &cli_addrs) {
            Ok(members) => {
                let before = addresses.to_string();
                if let Err(e) = addresses.replace(members) {
                    tracing::warn!(error = %e, "Ignoring address reload");
                    continue;
                }
                let after = addresses.to_string();
                if before != after {
                    tracing::info!(addrs = %after, "Address set reloaded");
                }
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring address reload");
            }
        }
    }
}

fn load_members(path: &Path, cli_addrs: &[String]) -> Result<Vec<String>, ConfigError> {
    let mut members = FileConfig::load(path)?.addresses;
    for list in cli_addrs {
        members.extend(ding::config::parse_address_list(list)?);
    }
    Ok(members)
}

/// Cancel `shutdown` on Ctrl+C or SIGTERM.
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal");
        }
    }

    tracing::info!("Finishing current generation before exit");
    shutdown.cancel();
}
