//! Runtime configuration for extraction and rate governance.
//!
//! Every struct has a `Default` matching the production deployment and a
//! `from_env` constructor that overrides individual fields.
//!
//! | Variable | Default | Field |
//! |----------|---------|-------|
//! | `ATLASLINK_REDIRECT_TIMEOUT_MS` | `5000` | [`ExtractorConfig::redirect_timeout_ms`] |
//! | `ATLASLINK_SHORTENER_HOSTS` | `goo.gl` | [`ExtractorConfig::shortener_hosts`] |
//! | `ATLASLINK_RATE_LIMIT` | `10` | [`GovernorConfig::limit`] |
//! | `ATLASLINK_RATE_WINDOW_SECS` | `60` | [`GovernorConfig::window`] |
//! | `ATLASLINK_IP_WHITELIST` | `127.0.0.1,::1` | [`GovernorConfig::whitelist`] |

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::ValidationError;

/// Link extraction settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorConfig {
    /// Hosts whose links are resolved through one redirect hop. A host also
    /// matches its subdomains, so `goo.gl` covers `maps.app.goo.gl`.
    pub shortener_hosts: Vec<String>,
    pub redirect_timeout_ms: u64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            shortener_hosts: vec![String::from("goo.gl")],
            redirect_timeout_ms: 5_000,
        }
    }
}

impl ExtractorConfig {
    pub fn from_env() -> Result<Self, ValidationError> {
        let mut config = Self::default();
        if let Some(timeout) = env_parse("ATLASLINK_REDIRECT_TIMEOUT_MS")? {
            config.redirect_timeout_ms = timeout;
        }
        if let Some(hosts) = env_list("ATLASLINK_SHORTENER_HOSTS") {
            config.shortener_hosts = hosts;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.redirect_timeout_ms == 0 {
            return Err(ValidationError::ZeroRedirectTimeout);
        }
        Ok(())
    }

    pub fn redirect_timeout(&self) -> Duration {
        Duration::from_millis(self.redirect_timeout_ms)
    }
}

/// Rate governor settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GovernorConfig {
    /// Admissions allowed per window and client.
    pub limit: u32,
    pub window: Duration,
    /// Client keys that are never counted.
    pub whitelist: Vec<String>,
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            limit: 10,
            window: Duration::from_secs(60),
            whitelist: vec![String::from("127.0.0.1"), String::from("::1")],
        }
    }
}

impl GovernorConfig {
    pub fn from_env() -> Result<Self, ValidationError> {
        let mut config = Self::default();
        if let Some(limit) = env_parse("ATLASLINK_RATE_LIMIT")? {
            config.limit = limit;
        }
        if let Some(seconds) = env_parse::<u64>("ATLASLINK_RATE_WINDOW_SECS")? {
            config.window = Duration::from_secs(seconds);
        }
        if let Some(whitelist) = env_list("ATLASLINK_IP_WHITELIST") {
            config.whitelist = whitelist;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.limit == 0 {
            return Err(ValidationError::ZeroRateLimit);
        }
        if self.window.as_secs() == 0 {
            return Err(ValidationError::ZeroRateWindow);
        }
        Ok(())
    }
}

/// Parse an environment variable, treating unset or blank as `None`.
pub fn env_parse<T: FromStr>(name: &'static str) -> Result<Option<T>, ValidationError> {
    let Ok(raw) = env::var(name) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse()
        .map(Some)
        .map_err(|_| ValidationError::InvalidSetting {
            name,
            value: raw.clone(),
        })
}

/// Read a comma separated environment variable. An unset variable is `None`;
/// a set but blank one is an empty list.
pub fn env_list(name: &str) -> Option<Vec<String>> {
    let raw = env::var(name).ok()?;
    Some(split_list(&raw))
}

pub(crate) fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}
