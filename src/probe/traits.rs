//! Core probe traits and types.

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::stats::Statistics;
use crate::config::ProbeConfig;

/// Errors that end a probe round without statistics.
///
/// Setup failures (resolution, socket creation) and execution failures are
/// rendered the same way once reported: only the message is recorded.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The address could not be resolved.
    #[error("failed to resolve {host}: {source}")]
    Resolve {
        host: String,
        #[source]
        source: std::io::Error,
    },

    /// The ICMP socket could not be created (e.g. missing `CAP_NET_RAW`).
    #[error("failed to create ICMP socket: {0}")]
    Socket(#[source] std::io::Error),

    /// The session failed while sending or receiving.
    #[error("ping failed: {0}")]
    Execution(String),

    /// The probe task did not run to completion.
    #[error("probe task failed: {0}")]
    Task(String),
}

/// Outcome of one probe round for one address.
#[derive(Debug)]
pub struct RoundOutcome {
    pub address: String,
    /// Wall-clock time the round was started.
    pub start: DateTime<Utc>,
    pub result: Result<Statistics, ProbeError>,
}

impl RoundOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Capability to run one bounded ICMP session against an address.
///
/// # Contract
///
/// - Send `config.count` echo requests spaced `config.interval` apart, and stop
///   waiting for replies `config.timeout` after the session starts.
/// - Unanswered requests are **not** errors: they are reported as loss in the
///   returned [`Statistics`].
/// - Return `Err` only when the session cannot be set up or fails outright.
#[async_trait::async_trait]
pub trait Prober: Send + Sync + 'static {
    async fn probe(&self, address: &str, config: &ProbeConfig) -> Result<Statistics, ProbeError>;
}
