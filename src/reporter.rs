//! Result reporting.
//!
//! Every finished probe round is handed to a [`Reporter`] exactly once. The
//! default [`TracingReporter`] turns it into one structured `tracing` event on
//! the [`RECORD_TARGET`] target; [`record_layer`] renders those events to the
//! output sink.

use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use tracing::Subscriber;
use tracing_subscriber::Layer;
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::registry::LookupSpan;

use crate::probe::RoundOutcome;

/// Target of the per-round record events.
///
/// Not a module path, so diagnostics from this crate or the `ding` binary can
/// never be mistaken for records.
pub const RECORD_TARGET: &str = "ding_record";

/// Sink for probe round outcomes.
///
/// Called concurrently from every probe task of a generation, so
/// implementations must emit each record as a unit and return promptly.
pub trait Reporter: Send + Sync + 'static {
    fn report(&self, outcome: &RoundOutcome);
}

/// Reports outcomes as `tracing` events.
///
/// Successful rounds are logged at INFO with the statistics fields; failed
/// rounds at ERROR with only `addr`, `start` and `error`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl TracingReporter {
    pub fn new() -> Self {
        Self
    }
}

impl Reporter for TracingReporter {
    fn report(&self, outcome: &RoundOutcome) {
        let start = outcome.start.to_rfc3339_opts(SecondsFormat::Nanos, true);
        match &outcome.result {
            Ok(stats) => tracing::info!(
                target: RECORD_TARGET,
                addr = %outcome.address,
                start = %start,
                sent = stats.sent,
                loss = stats.loss,
                min_rtt = ?stats.min_rtt,
                max_rtt = ?stats.max_rtt,
                avg_rtt = ?stats.avg_rtt,
                stdev_rtt = ?stats.stddev_rtt,
                "ping"
            ),
            Err(e) => tracing::error!(
                target: RECORD_TARGET,
                addr = %outcome.address,
                start = %start,
                error = %e,
                "ping"
            ),
        }
    }
}

/// Encoding of the record stream.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Human-readable text.
    Text,
}

/// Build the layer that writes round records to `writer`.
///
/// Only events on [`RECORD_TARGET`] pass; diagnostics go through a separate
/// layer.
pub fn record_layer<S, W>(format: LogFormat, writer: W) -> Box<dyn Layer<S> + Send + Sync + 'static>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = match format {
        LogFormat::Json => fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(false)
            .with_span_list(false)
            .with_writer(writer)
            .boxed(),
        LogFormat::Text => fmt::layer().with_ansi(false).with_writer(writer).boxed(),
    };
    layer
        .with_filter(filter_fn(|meta| meta.target() == RECORD_TARGET))
        .boxed()
}
