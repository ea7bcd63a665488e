//! Configuration for ding.
//!
//! - [`AddressSet`]: the shared, live set of probe targets
//! - [`ProbeConfig`]: per-run probe settings (count, interval, batch, privilege)
//! - [`FileConfig`]: optional YAML file, with env var expansion

mod address;
mod app;
mod validation;

pub use address::{AddressSet, parse_address_list};
pub use app::{FileConfig, ProbeConfig};
pub use validation::{ConfigError, expand_env_vars, parse_duration, parse_positive_duration};

pub use app::{
    DEFAULT_BATCH, DEFAULT_COUNT, DEFAULT_INTERVAL, DEFAULT_PRIVILEGED, MAX_COUNT, MIN_RELOAD_INTERVAL,
};
