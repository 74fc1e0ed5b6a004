use thiserror::Error;

use atlaslink_core::{
    ConvertError, CoreError, ExtractionFailure, GeodeticCoordinate, ValidationError,
};

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("invalid URL format: {0}")]
    InvalidUrl(String),

    #[error(transparent)]
    Extraction(#[from] ExtractionFailure),

    #[error("location {coordinate} is outside {region}")]
    OutOfRegion {
        coordinate: GeodeticCoordinate,
        region: String,
    },

    #[error("rate limit exceeded, retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) | Self::InvalidUrl(_) => 2,
            Self::Extraction(_) => 3,
            Self::OutOfRegion { .. } => 4,
            Self::RateLimited { .. } => 5,
            Self::Core(_) | Self::Serialization(_) | Self::Io(_) => 10,
        }
    }
}

impl From<ConvertError> for CliError {
    fn from(error: ConvertError) -> Self {
        match error {
            ConvertError::Extraction(failure) => Self::Extraction(failure),
            ConvertError::OutOfRegion { coordinate, region } => {
                Self::OutOfRegion { coordinate, region }
            }
            ConvertError::RateLimited { retry_after } => Self::RateLimited {
                retry_after_secs: retry_after.as_secs(),
            },
        }
    }
}
