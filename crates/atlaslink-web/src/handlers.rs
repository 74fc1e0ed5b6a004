use std::net::SocketAddr;

use axum::body::Bytes;
use axum::extract::{ConnectInfo, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use atlaslink_core::{is_valid_link, Conversion};

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
struct ConvertRequest {
    #[serde(default)]
    gmaps_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ConvertResponse {
    success: bool,
    #[serde(flatten)]
    conversion: Conversion,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// `POST /api/convert`
pub async fn convert(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ConvertResponse>, ApiError> {
    if !state.origins.permits(&headers) {
        debug!(%peer, "origin rejected");
        return Err(ApiError::OriginNotAllowed);
    }

    let client_key = peer.ip().to_canonical().to_string();
    admit(&state, client_key).await?;

    let is_json = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains("application/json"));
    if !is_json {
        return Err(ApiError::UnsupportedContentType);
    }

    let url = serde_json::from_slice::<ConvertRequest>(&body)
        .ok()
        .and_then(|request| request.gmaps_url)
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .ok_or(ApiError::MissingUrl)?;
    if !is_valid_link(&url) {
        return Err(ApiError::InvalidUrl);
    }

    let conversion = state.converter.convert_url(&url).await?;
    info!(
        easting = conversion.projected.easting(),
        northing = conversion.projected.northing(),
        "converted map link"
    );
    Ok(Json(ConvertResponse {
        success: true,
        conversion,
    }))
}

/// Run the governor off the async workers; the durable store blocks.
async fn admit(state: &AppState, client_key: String) -> Result<(), ApiError> {
    let converter = state.converter.clone();
    tokio::task::spawn_blocking(move || converter.admit(&client_key))
        .await
        .map_err(|error| ApiError::Internal(error.to_string()))?
        .map_err(ApiError::from)
}
