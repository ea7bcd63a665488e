//! Generation scheduler.
//!
//! A generation probes every member of the address set once, concurrently,
//! and ends when every round has been reported. Generations run back to back.
//!
//! # Architecture
//!
//! - [`GenerationScheduler::run_generation`]: snapshot, fan out, join
//! - [`GenerationScheduler::run_forever`]: generations in a loop, with a
//!   shutdown checkpoint between them
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use ding::{AddressSet, GenerationScheduler, IcmpProber, ProbeConfig, TracingReporter};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let addresses = AddressSet::new();
//! addresses.extend_from_list("10.0.0.1,10.0.0.2")?;
//!
//! let scheduler = GenerationScheduler::new(
//!     Arc::new(IcmpProber::new()),
//!     Arc::new(TracingReporter::new()),
//!     ProbeConfig::default(),
//! );
//! scheduler.run_forever(&addresses, CancellationToken::new()).await;
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::{AddressSet, ProbeConfig};
use crate::probe::{ProbeError, Prober, RoundOutcome, run_round};
use crate::reporter::Reporter;

/// Summary of a completed generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GenerationSummary {
    /// 1-based generation number.
    pub generation: u64,
    /// Outcomes handed to the reporter.
    pub reported: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub elapsed: Duration,
}

/// Runs probe rounds for every address, one generation at a time.
pub struct GenerationScheduler {
    prober: Arc<dyn Prober>,
    reporter: Arc<dyn Reporter>,
    config: Arc<ProbeConfig>,
    generation: AtomicU64,
}

impl std::fmt::Debug for GenerationScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationScheduler")
            .field("config", &self.config)
            .field("generation", &self.generation.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl GenerationScheduler {
    pub fn new(prober: Arc<dyn Prober>, reporter: Arc<dyn Reporter>, config: ProbeConfig) -> Self {
        Self {
            prober,
            reporter,
            config: Arc::new(config),
            generation: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Number of generations started so far.
    pub fn generations(&self) -> u64 {
        self.generation.load(Ordering::Relaxed)
    }

    /// Probe every current member of `addresses` once.
    ///
    /// The membership is snapshotted up front; changes made while the
    /// generation runs apply to the next one. Returns only after every
    /// address's outcome has been reported, one record per address, even if
    /// its task panicked.
    pub async fn run_generation(&self, addresses: &AddressSet) -> GenerationSummary {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        let started = Instant::now();
        let generation_start = Utc::now();
        let targets = addresses.snapshot();

        let mut summary = GenerationSummary {
            generation,
            ..GenerationSummary::default()
        };

        if targets.is_empty() {
            tracing::warn!(generation, "Address set is empty, nothing to probe");
            return summary;
        }

        tracing::debug!(generation, targets = targets.len(), "Starting generation");

        let mut tasks = JoinSet::new();
        let mut in_flight = HashMap::with_capacity(targets.len());
        for address in targets {
            let prober = Arc::clone(&self.prober);
            let reporter = Arc::clone(&self.reporter);
            let config = Arc::clone(&self.config);
            let task_address = address.clone();
            let handle = tasks.spawn(async move {
                let outcome = run_round(&*prober, task_address, &config).await;
                reporter.report(&outcome);
                outcome.is_success()
            });
            in_flight.insert(handle.id(), address);
        }

        while let Some(joined) = tasks.join_next_with_id().await {
            summary.reported += 1;
            match joined {
                Ok((id, success)) => {
                    in_flight.remove(&id);
                    if success {
                        summary.succeeded += 1;
                    } else {
                        summary.failed += 1;
                    }
                }
                Err(e) => {
                    let address = in_flight.remove(&e.id()).unwrap_or_default();
                    tracing::error!(generation, addr = %address, error = %e, "Probe task failed");
                    self.reporter.report(&RoundOutcome {
                        address,
                        start: generation_start,
                        result: Err(ProbeError::Task(e.to_string())),
                    });
                    summary.failed += 1;
                }
            }
        }

        summary.elapsed = started.elapsed();
        tracing::debug!(
            generation,
            reported = summary.reported,
            succeeded = summary.succeeded,
            failed = summary.failed,
            elapsed = ?summary.elapsed,
            "Generation complete"
        );
        summary
    }

    /// Run generations back to back until `shutdown` is cancelled.
    ///
    /// Cancellation is only observed between generations; a running
    /// generation always completes. When the address set is empty the loop
    /// waits one probe interval before looking again.
    pub async fn run_forever(&self, addresses: &AddressSet, shutdown: CancellationToken) {
        loop {
            if shutdown.is_cancelled() {
                tracing::info!(
                    generations = self.generations(),
                    "Shutdown requested, stopping between generations"
                );
                return;
            }

            let summary = self.run_generation(addresses).await;
            if summary.reported == 0 {
                tokio::select! {
                    _ = shutdown.cancelled() => {}
                    _ = tokio::time::sleep(self.config.interval) => {}
                }
            }
        }
    }
}
