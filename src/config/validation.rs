//! Configuration errors and parsing helpers.

use std::time::Duration;

use thiserror::Error;

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An address list contained an empty element.
    #[error("empty string target")]
    EmptyTarget,

    /// Failed to read configuration file.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse YAML configuration.
    #[error("failed to parse YAML config: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Configuration validation failed.
    #[error("config validation error: {0}")]
    Validation(String),
}

/// Parse duration string using humantime.
///
/// Supports various formats: `30s`, `1m`, `5m30s`, `1h`, `100ms`, etc.
///
/// # Examples
///
/// ```
/// use ding::config::parse_duration;
///
/// assert_eq!(parse_duration("10s").unwrap().as_secs(), 10);
/// assert_eq!(parse_duration("1m").unwrap().as_secs(), 60);
/// assert_eq!(parse_duration("1h30m").unwrap().as_secs(), 5400);
/// ```
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("duration string is empty".to_string());
    }
    humantime::parse_duration(s).map_err(|e| e.to_string())
}

/// Parse a positive duration, for use as a clap value parser.
pub fn parse_positive_duration(s: &str) -> Result<Duration, String> {
    let d = parse_duration(s)?;
    if d.is_zero() {
        return Err("duration must be positive".to_string());
    }
    Ok(d)
}

/// Expand environment variables in a string.
/// Supports ${VAR} and ${VAR:-default} syntax.
pub fn expand_env_vars(input: &str) -> String {
    static ENV_VAR_REGEX: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();

    let regex = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("failed to compile env var regex")
    });

    regex
        .replace_all(input, |caps: &regex::Captures| {
            let var_name = &caps[1];
            let default_value = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            std::env::var(var_name).unwrap_or_else(|_| default_value.to_string())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_valid() {
        assert_eq!(parse_duration("10s").unwrap(), Duration::from_secs(10));
        assert_eq!(parse_duration("1m").unwrap(), Duration::from_secs(60));
        assert_eq!(parse_duration(" 250ms ").unwrap(), Duration::from_millis(250));
    }

    #[test]
    fn test_parse_duration_invalid() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("abc").is_err());
        assert!(parse_duration("30").is_err());
    }

    #[test]
    fn test_parse_positive_duration_rejects_zero() {
        assert!(parse_positive_duration("0s").is_err());
        assert_eq!(parse_positive_duration("1s").unwrap(), Duration::from_secs(1));
    }

    #[test]
    fn test_empty_target_message() {
        assert_eq!(ConfigError::EmptyTarget.to_string(), "empty string target");
    }

    #[test]
    fn test_expand_env_vars_with_default() {
        let result = expand_env_vars("addresses: [${DING_NONEXISTENT_ADDR_12345:-10.0.0.1}]");
        assert_eq!(result, "addresses: [10.0.0.1]");
    }

    #[test]
    fn test_expand_env_vars_from_env() {
        // SAFETY: This test only touches a variable private to it.
        unsafe {
            std::env::set_var("DING_TEST_EXPAND_HOST", "gateway.lan");
        }
        let result = expand_env_vars("- ${DING_TEST_EXPAND_HOST}");
        assert_eq!(result, "- gateway.lan");
        // SAFETY: Cleanup test variable.
        unsafe {
            std::env::remove_var("DING_TEST_EXPAND_HOST");
        }
    }
}
