//! A single probe round against one address.

use chrono::Utc;

use super::traits::{Prober, RoundOutcome};
use crate::config::ProbeConfig;

/// Run one probe round and capture its wall-clock start time.
///
/// Never fails: errors from the prober are carried in the outcome.
pub async fn run_round<P>(prober: &P, address: String, config: &ProbeConfig) -> RoundOutcome
where
    P: Prober + ?Sized,
{
    let start = Utc::now();
    let result = prober.probe(&address, config).await;
    RoundOutcome {
        address,
        start,
        result,
    }
}
