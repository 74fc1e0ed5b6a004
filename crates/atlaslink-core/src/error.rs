use thiserror::Error;

use crate::http_client::HttpError;

/// Validation and contract errors exposed by `atlaslink-core`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("latitude {value} outside [-90, 90]")]
    LatitudeOutOfRange { value: f64 },
    #[error("longitude {value} outside [-180, 180]")]
    LongitudeOutOfRange { value: f64 },

    #[error("boundary ring needs at least {min} vertices, got {len}")]
    BoundaryTooSmall { len: usize, min: usize },

    #[error("rate limit must be greater than zero")]
    ZeroRateLimit,
    #[error("rate window must be at least one second")]
    ZeroRateWindow,
    #[error("redirect timeout must be greater than zero")]
    ZeroRedirectTimeout,

    #[error("invalid value '{value}' for {name}")]
    InvalidSetting { name: &'static str, value: String },
}

/// Top-level error type for assembling core services.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("http client setup failed: {0}")]
    Http(#[from] HttpError),

    #[error(transparent)]
    Warehouse(#[from] atlaslink_warehouse::WarehouseError),
}
