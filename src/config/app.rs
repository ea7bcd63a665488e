//! Probe settings and the optional YAML configuration file.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::address::AddressSet;
use super::validation::{ConfigError, expand_env_vars};

// =============================================================================
// Constants
// =============================================================================

/// Default interval between pings for each address (10 seconds).
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(10);

/// Default length of each batch of pings (1 minute).
pub const DEFAULT_BATCH: Duration = Duration::from_secs(60);

/// Default number of ICMP packets per batch.
pub const DEFAULT_COUNT: usize = 5;

/// Largest packet count; each request needs its own 16-bit sequence number.
pub const MAX_COUNT: usize = u16::MAX as usize;

/// Raw sockets are used unless told otherwise.
pub const DEFAULT_PRIVILEGED: bool = true;

/// Minimum address reload interval (1 second).
pub const MIN_RELOAD_INTERVAL: Duration = Duration::from_secs(1);

fn default_interval() -> Duration {
    DEFAULT_INTERVAL
}

fn default_batch() -> Duration {
    DEFAULT_BATCH
}

fn default_count() -> usize {
    DEFAULT_COUNT
}

fn default_privileged() -> bool {
    DEFAULT_PRIVILEGED
}

// =============================================================================
// Probe Configuration
// =============================================================================

/// Settings shared by every probe round of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Number of echo requests per round.
    pub count: usize,
    /// Spacing between echo requests within a round.
    pub interval: Duration,
    /// Deadline for a whole round, measured from its start.
    pub timeout: Duration,
    /// Use raw ICMP sockets instead of unprivileged datagram sockets.
    pub privileged: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT,
            interval: DEFAULT_INTERVAL,
            timeout: DEFAULT_BATCH,
            privileged: DEFAULT_PRIVILEGED,
        }
    }
}

impl ProbeConfig {
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_privileged(mut self, privileged: bool) -> Self {
        self.privileged = privileged;
        self
    }

    /// Validate the configuration.
    ///
    /// # Errors
    /// Returns `ConfigError::Validation` if any value is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.count == 0 {
            return Err(ConfigError::Validation(
                "packet count must be positive".to_string(),
            ));
        }
        if self.count > MAX_COUNT {
            return Err(ConfigError::Validation(format!(
                "packet count must be at most {MAX_COUNT}"
            )));
        }
        if self.interval.is_zero() {
            return Err(ConfigError::Validation(
                "interval must be positive".to_string(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::Validation(
                "batch duration must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// File Configuration
// =============================================================================

/// Contents of the optional YAML configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    /// Addresses to ping.
    #[serde(default)]
    pub addresses: Vec<String>,

    /// Interval between pings for each address (default: 10s).
    #[serde(default = "default_interval", with = "humantime_serde")]
    pub interval: Duration,

    /// Length of time for each batch of pings (default: 1m).
    #[serde(default = "default_batch", with = "humantime_serde")]
    pub batch: Duration,

    /// Number of ICMP packets for each batch (default: 5).
    #[serde(default = "default_count")]
    pub count: usize,

    /// Use raw sockets (default: true).
    #[serde(default = "default_privileged")]
    pub privileged: bool,

    /// Re-read `addresses` from the file on this cadence.
    #[serde(default, with = "humantime_serde")]
    pub reload_interval: Option<Duration>,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            addresses: Vec::new(),
            interval: DEFAULT_INTERVAL,
            batch: DEFAULT_BATCH,
            count: DEFAULT_COUNT,
            privileged: DEFAULT_PRIVILEGED,
            reload_interval: None,
        }
    }
}

impl FileConfig {
    /// Load configuration from a YAML file.
    ///
    /// Environment variables are expanded before parsing.
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be read, parsed, or validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(&expand_env_vars(content))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    /// Returns `ConfigError::EmptyTarget` for an empty address, or
    /// `ConfigError::Validation` if any other field is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.addresses.iter().any(String::is_empty) {
            return Err(ConfigError::EmptyTarget);
        }

        self.probe_config().validate()?;

        if self
            .reload_interval
            .is_some_and(|reload| reload < MIN_RELOAD_INTERVAL)
        {
            return Err(ConfigError::Validation(format!(
                "reload_interval must be at least {:?}",
                MIN_RELOAD_INTERVAL
            )));
        }

        Ok(())
    }

    /// Probe settings described by this file.
    pub fn probe_config(&self) -> ProbeConfig {
        ProbeConfig {
            count: self.count,
            interval: self.interval,
            timeout: self.batch,
            privileged: self.privileged,
        }
    }

    /// Build an address set holding the file's addresses.
    pub fn address_set(&self) -> Result<AddressSet, ConfigError> {
        let set = AddressSet::new();
        set.replace(self.addresses.iter().cloned())?;
        Ok(set)
    }
}
