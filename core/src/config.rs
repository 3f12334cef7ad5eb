//! Client configuration.
//!
//! Transport defaults are explicit: a 10 second connect timeout, a 30 second
//! overall timeout, at most 10 redirects, and no retries. Every value can be
//! overridden from the environment with `ClientConfig::from_env`.

use std::time::Duration;

use crate::error::ConfigError;
use crate::log::LogConfig;

pub const ENV_CONNECT_TIMEOUT_MS: &str = "APICHECK_CONNECT_TIMEOUT_MS";
pub const ENV_TIMEOUT_MS: &str = "APICHECK_TIMEOUT_MS";
pub const ENV_MAX_REDIRECTS: &str = "APICHECK_MAX_REDIRECTS";
pub const ENV_LOG: &str = "APICHECK_LOG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub connect_timeout: Duration,
    /// Upper bound for the whole exchange, connect included.
    pub timeout: Duration,
    pub max_redirects: u32,
    pub user_agent: String,
    pub log: LogConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            timeout: Duration::from_secs(30),
            max_redirects: 10,
            user_agent: concat!("apicheck/", env!("CARGO_PKG_VERSION")).to_string(),
            log: LogConfig::off(),
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by any `APICHECK_*` variables that are set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Like `from_env`, reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(ms) = parse_var::<u64>(&lookup, ENV_CONNECT_TIMEOUT_MS)? {
            config.connect_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64>(&lookup, ENV_TIMEOUT_MS)? {
            config.timeout = Duration::from_millis(ms);
        }
        if let Some(max) = parse_var::<u32>(&lookup, ENV_MAX_REDIRECTS)? {
            config.max_redirects = max;
        }
        if let Some(value) = lookup(ENV_LOG) {
            config.log = LogConfig::parse(&value).ok_or_else(|| ConfigError::InvalidEnv {
                var: ENV_LOG.to_string(),
                value,
            })?;
        }
        Ok(config)
    }

    pub fn with_log(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &str,
) -> Result<Option<T>, ConfigError> {
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv {
                var: var.to_string(),
                value,
            }),
    }
}
