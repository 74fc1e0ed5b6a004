//! Core contracts for atlaslink.
//!
//! This crate contains:
//! - Geodetic and projected coordinate models with validation
//! - Map link extraction (shortener resolution and URL pattern matchers)
//! - ETRS89 / UTM zone 32N projection and the BayernAtlas deep link
//! - Region containment against the Bavaria boundary ring
//! - Per-client fixed-window rate governance over pluggable stores
//! - The conversion pipeline composing all of the above

pub mod clock;
pub mod config;
pub mod converter;
pub mod domain;
pub mod error;
pub mod extract;
pub mod http_client;
pub mod portal;
pub mod projection;
pub mod rate_limit;
pub mod region;

pub use atlaslink_warehouse::{RateRecordRow, Warehouse, WarehouseConfig, WarehouseError};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ExtractorConfig, GovernorConfig};
pub use converter::{Conversion, ConvertError, Converter, ConverterBuilder};
pub use domain::{GeodeticCoordinate, ProjectedCoordinate};
pub use error::{CoreError, ValidationError};
pub use extract::{is_valid_link, CoordinateMatcher, ExtractionFailure, LinkExtractor};
pub use http_client::{
    HttpClient, HttpError, HttpErrorKind, HttpMethod, HttpRequest, HttpResponse,
    ReqwestHttpClient, ScriptedHttpClient,
};
pub use portal::bayernatlas_url;
pub use projection::{project, ProjectionParams, Transformer};
pub use rate_limit::{
    InMemoryRateStore, RateGovernor, RateRecord, RateStore, RateStoreError, StorageKey,
    WarehouseRateStore,
};
pub use region::{ring_contains, BoundaryRing, RegionPolicy, BAVARIA_BUFFER};
