use axum::http::header::RETRY_AFTER;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use atlaslink_core::{ConvertError, CoreError, GeodeticCoordinate, ValidationError};

/// Request failures, each mapped to a status code and a JSON body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Access from this origin not allowed")]
    OriginNotAllowed,

    #[error("Rate limit exceeded")]
    RateLimited { retry_after_secs: u64 },

    #[error("Content-Type must be application/json")]
    UnsupportedContentType,

    #[error("Missing gmaps_url")]
    MissingUrl,

    #[error("Invalid URL format")]
    InvalidUrl,

    #[error("Could not extract coordinates from URL")]
    Extraction,

    #[error("Location is outside {region}")]
    OutOfRegion {
        region: String,
        coordinate: GeodeticCoordinate,
    },

    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::OriginNotAllowed => StatusCode::FORBIDDEN,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::UnsupportedContentType | Self::MissingUrl | Self::InvalidUrl | Self::Extraction => {
                StatusCode::BAD_REQUEST
            }
            Self::OutOfRegion { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ConvertError> for ApiError {
    fn from(error: ConvertError) -> Self {
        match error {
            ConvertError::RateLimited { retry_after } => Self::RateLimited {
                retry_after_secs: retry_after.as_secs(),
            },
            ConvertError::Extraction(_) => Self::Extraction,
            ConvertError::OutOfRegion { coordinate, region } => {
                Self::OutOfRegion { region, coordinate }
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    coordinates: Option<GeodeticCoordinate>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(detail) = &self {
            tracing::error!(detail = %detail, "request failed");
        }

        let status = self.status();
        let retry_after = match &self {
            Self::RateLimited { retry_after_secs } => Some(*retry_after_secs),
            _ => None,
        };
        let coordinates = match &self {
            Self::OutOfRegion { coordinate, .. } => Some(*coordinate),
            _ => None,
        };
        let body = ErrorBody {
            success: false,
            message: self.to_string(),
            coordinates,
        };

        let mut response = (status, Json(body)).into_response();
        if let Some(seconds) = retry_after {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(seconds));
        }
        response
    }
}

/// Startup failures of the service binary.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Config(#[from] ValidationError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn convert_errors_map_to_statuses() {
        let limited: ApiError = ConvertError::RateLimited {
            retry_after: Duration::from_secs(60),
        }
        .into();
        assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);

        let outside: ApiError = ConvertError::OutOfRegion {
            coordinate: GeodeticCoordinate::new_unchecked(52.52, 13.405),
            region: String::from("Bavaria"),
        }
        .into();
        assert_eq!(outside.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(outside.to_string(), "Location is outside Bavaria");
    }

    #[test]
    fn rate_limit_response_carries_retry_after() {
        let response = ApiError::RateLimited {
            retry_after_secs: 60,
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response.headers().get(RETRY_AFTER),
            Some(&HeaderValue::from_static("60"))
        );
    }
}
