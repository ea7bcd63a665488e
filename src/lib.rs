//! ding - differential time-stamped ping
//!
//! Repeatedly pings a set of addresses in fixed-size batches and emits one
//! structured statistics record per address and batch.
//!
//! # Architecture
//!
//! - **Config**: address set, probe settings and the optional YAML file
//! - **Probe**: one bounded ICMP session per address per generation
//! - **Scheduler**: concurrent fan-out per generation, generations back to back
//! - **Reporter**: one structured record per round
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ding::{AddressSet, GenerationScheduler, IcmpProber, ProbeConfig, TracingReporter};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let addresses = AddressSet::new();
//!     addresses.extend_from_list("10.0.0.1,example.org")?;
//!
//!     let scheduler = GenerationScheduler::new(
//!         Arc::new(IcmpProber::new()),
//!         Arc::new(TracingReporter::new()),
//!         ProbeConfig::default(),
//!     );
//!     scheduler.run_generation(&addresses).await;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod probe;
pub mod reporter;
pub mod scheduler;

pub use config::{AddressSet, ConfigError, FileConfig, ProbeConfig};
pub use probe::{IcmpProber, ProbeError, Prober, RoundOutcome, Statistics, run_round};
pub use reporter::{LogFormat, Reporter, TracingReporter};
pub use scheduler::{GenerationScheduler, GenerationSummary};
