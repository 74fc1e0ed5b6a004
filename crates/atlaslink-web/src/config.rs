//! Service configuration.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `ATLASLINK_BIND_ADDR` | `0.0.0.0:8080` |
//! | `ATLASLINK_ALLOWED_ORIGINS` | `http://localhost,http://localhost:8080,https://localhost` |
//! | `ATLASLINK_RATE_STORE` | `duckdb` |
//! | `ATLASLINK_HOME` | `$HOME/.atlaslink` |
//!
//! Governor and extractor settings are read by their own `from_env`.

use std::net::SocketAddr;
use std::str::FromStr;

use atlaslink_core::config::{env_list, env_parse};
use atlaslink_core::{ExtractorConfig, GovernorConfig, ValidationError, WarehouseConfig};

/// Backing store of the rate governor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RateStoreKind {
    #[default]
    DuckDb,
    Memory,
}

impl FromStr for RateStoreKind {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "duckdb" => Ok(Self::DuckDb),
            "memory" => Ok(Self::Memory),
            _ => Err(ValidationError::InvalidSetting {
                name: "ATLASLINK_RATE_STORE",
                value: value.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind_addr: SocketAddr,
    /// Origin prefixes allowed to call the API. Empty allows everyone.
    pub allowed_origins: Vec<String>,
    pub rate_store: RateStoreKind,
    pub governor: GovernorConfig,
    pub extractor: ExtractorConfig,
    pub warehouse: WarehouseConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            allowed_origins: default_allowed_origins(),
            rate_store: RateStoreKind::default(),
            governor: GovernorConfig::default(),
            extractor: ExtractorConfig::default(),
            warehouse: WarehouseConfig::default(),
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ValidationError> {
        let mut config = Self {
            governor: GovernorConfig::from_env()?,
            extractor: ExtractorConfig::from_env()?,
            ..Self::default()
        };
        if let Some(bind_addr) = env_parse("ATLASLINK_BIND_ADDR")? {
            config.bind_addr = bind_addr;
        }
        if let Some(origins) = env_list("ATLASLINK_ALLOWED_ORIGINS") {
            config.allowed_origins = origins;
        }
        if let Some(store) = env_parse("ATLASLINK_RATE_STORE")? {
            config.rate_store = store;
        }
        Ok(config)
    }
}

fn default_allowed_origins() -> Vec<String> {
    ["http://localhost", "http://localhost:8080", "https://localhost"]
        .into_iter()
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_store_kind_parses_case_insensitively() {
        assert_eq!("DuckDB".parse::<RateStoreKind>(), Ok(RateStoreKind::DuckDb));
        assert_eq!(" memory ".parse::<RateStoreKind>(), Ok(RateStoreKind::Memory));
        assert!("redis".parse::<RateStoreKind>().is_err());
    }

    #[test]
    fn defaults_allow_localhost_origins() {
        let config = ServiceConfig::default();

        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.allowed_origins.len(), 3);
        assert_eq!(config.rate_store, RateStoreKind::DuckDb);
    }
}
