//! Round statistics.

use std::time::Duration;

/// Aggregate statistics for one probe round.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Statistics {
    /// Echo requests sent.
    pub sent: usize,
    /// Echo replies received before the deadline.
    pub received: usize,
    /// Fraction of sent requests left unanswered, in `[0.0, 1.0]`.
    pub loss: f64,
    pub min_rtt: Duration,
    pub max_rtt: Duration,
    pub avg_rtt: Duration,
    /// Population standard deviation of the round-trip times.
    pub stddev_rtt: Duration,
}

impl Statistics {
    /// Compute statistics over the round-trip times of answered requests.
    ///
    /// RTT fields are zero when nothing was received. A round that sent
    /// nothing reports zero loss.
    pub fn from_rtts(sent: usize, rtts: &[Duration]) -> Self {
        let received = rtts.len().min(sent);
        let loss = if sent == 0 {
            0.0
        } else {
            (sent - received) as f64 / sent as f64
        };

        if rtts.is_empty() {
            return Self {
                sent,
                received,
                loss,
                ..Self::default()
            };
        }

        // Computed in nanoseconds so exact inputs give exact outputs.
        let n = rtts.len() as u128;
        let min_rtt = rtts.iter().copied().min().unwrap_or_default();
        let max_rtt = rtts.iter().copied().max().unwrap_or_default();
        let total: u128 = rtts.iter().map(Duration::as_nanos).sum();
        let mean = total as f64 / n as f64;
        let variance = rtts
            .iter()
            .map(|rtt| {
                let diff = rtt.as_nanos() as f64 - mean;
                diff * diff
            })
            .sum::<f64>()
            / n as f64;

        Self {
            sent,
            received,
            loss,
            min_rtt,
            max_rtt,
            avg_rtt: nanos(total / n),
            stddev_rtt: nanos(variance.sqrt().round() as u128),
        }
    }
}

fn nanos(value: u128) -> Duration {
    Duration::from_nanos(u64::try_from(value).unwrap_or(u64::MAX))
}
