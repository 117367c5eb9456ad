//! Client configuration from the environment

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_GREETING_DELAY: Duration = Duration::from_millis(800);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("HEXAA_API_BASE_URL is not set")]
    MissingBaseUrl,
    #[error("{name} must be a non-negative integer, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
}

/// Configuration for the chat client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// Webhook host, e.g. `https://automation.hexaa.ai`
    pub api_base_url: String,
    /// Where the session identifier is kept between runs of one session
    pub session_file: Option<PathBuf>,
    /// Upper bound on any single webhook request
    pub request_timeout: Duration,
    /// Pause before the greeting appears
    pub greeting_delay: Duration,
    /// Zone name to send instead of the host's
    pub time_zone: Option<String>,
}

impl ChatConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_base_url = non_empty("HEXAA_API_BASE_URL").ok_or(ConfigError::MissingBaseUrl)?;

        let request_timeout = match non_empty("HEXAA_REQUEST_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(parse_number("HEXAA_REQUEST_TIMEOUT_SECS", &v)?),
            None => DEFAULT_REQUEST_TIMEOUT,
        };

        let greeting_delay = match non_empty("HEXAA_GREETING_DELAY_MS") {
            Some(v) => Duration::from_millis(parse_number("HEXAA_GREETING_DELAY_MS", &v)?),
            None => DEFAULT_GREETING_DELAY,
        };

        Ok(Self {
            api_base_url: api_base_url.trim().to_string(),
            session_file: non_empty("HEXAA_SESSION_FILE").map(PathBuf::from),
            request_timeout,
            greeting_delay,
            time_zone: non_empty("HEXAA_TIME_ZONE"),
        })
    }
}

fn parse_number(name: &'static str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        name,
        value: value.to_string(),
    })
}
