//! HTTP surface for atlaslink.
//!
//! | Route | Method | Handler |
//! |-------|--------|---------|
//! | `/api/convert` | `POST` | [`handlers::convert`] |
//! | `/health` | `GET` | [`handlers::health`] |

pub mod config;
pub mod error;
pub mod handlers;
pub mod origin;

use std::sync::Arc;
use std::time::Duration;

use axum::http::header::CONTENT_TYPE;
use axum::http::{request, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use atlaslink_core::{
    Converter, CoreError, InMemoryRateStore, RateStore, Warehouse, WarehouseRateStore,
};

pub use config::{RateStoreKind, ServiceConfig};
pub use error::{ApiError, ServiceError};
pub use origin::OriginPolicy;

const PREFLIGHT_MAX_AGE: Duration = Duration::from_secs(86_400);

/// Shared request state.
#[derive(Clone)]
pub struct AppState {
    pub converter: Arc<Converter>,
    pub origins: Arc<OriginPolicy>,
}

impl AppState {
    pub fn new(converter: Converter, origins: OriginPolicy) -> Self {
        Self {
            converter: Arc::new(converter),
            origins: Arc::new(origins),
        }
    }

    /// Assemble the production state from configuration.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, CoreError> {
        let store: Arc<dyn RateStore> = match config.rate_store {
            RateStoreKind::DuckDb => {
                let warehouse = Warehouse::open(config.warehouse.clone())?;
                info!(path = %warehouse.db_path().display(), "rate records in warehouse");
                Arc::new(WarehouseRateStore::new(warehouse))
            }
            RateStoreKind::Memory => Arc::new(InMemoryRateStore::new()),
        };

        let converter = Converter::builder()
            .extractor_config(config.extractor.clone())
            .governor_config(config.governor.clone())
            .rate_store(store)
            .build()?;

        Ok(Self::new(
            converter,
            OriginPolicy::new(config.allowed_origins.clone()),
        ))
    }
}

pub fn router(state: AppState) -> Router {
    let origins = state.origins.clone();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _parts: &request::Parts| origins.echoes(origin),
        ))
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(PREFLIGHT_MAX_AGE);

    Router::new()
        .route("/api/convert", post(handlers::convert))
        .route("/health", get(handlers::health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
