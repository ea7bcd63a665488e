//! Probe layer.
//!
//! One probe round sends a fixed number of ICMP echo requests to a single
//! address and aggregates the replies into [`Statistics`].
//!
//! - [`Prober`]: the probing capability; [`IcmpProber`] is the real one
//! - [`run_round`]: runs one round and captures its start time
//! - [`RoundOutcome`]: statistics or error, tagged with address and start

mod icmp;
mod round;
mod stats;
mod traits;

pub use icmp::IcmpProber;
pub use round::run_round;
pub use stats::Statistics;
pub use traits::{ProbeError, Prober, RoundOutcome};
