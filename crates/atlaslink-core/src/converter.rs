//! End-to-end conversion pipeline.
//!
//! ```text
//! admit(client) ──denied──▶ RateLimited
//!      │
//!      ▼
//! extract(url) ──no match──▶ Extraction
//!      │
//!      ▼
//! region.contains ──no──▶ OutOfRegion { coordinate }
//!      │
//!      ▼
//! project ──▶ Conversion { coordinate, projected, portal url }
//! ```

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::clock::{Clock, SystemClock};
use crate::config::{ExtractorConfig, GovernorConfig};
use crate::domain::{GeodeticCoordinate, ProjectedCoordinate};
use crate::error::CoreError;
use crate::extract::{ExtractionFailure, LinkExtractor};
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::portal::bayernatlas_url;
use crate::projection::{ProjectionParams, Transformer};
use crate::rate_limit::{InMemoryRateStore, RateGovernor, RateStore};
use crate::region::RegionPolicy;

/// Terminal outcome of a conversion that produced no portal link.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConvertError {
    #[error("rate limit exceeded")]
    RateLimited { retry_after: Duration },

    #[error(transparent)]
    Extraction(#[from] ExtractionFailure),

    #[error("location is outside {region}")]
    OutOfRegion {
        coordinate: GeodeticCoordinate,
        region: String,
    },
}

/// A successful conversion.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "ConversionDocument")]
pub struct Conversion {
    pub coordinate: GeodeticCoordinate,
    pub projected: ProjectedCoordinate,
    pub portal_url: String,
}

#[derive(Serialize)]
struct ConversionDocument {
    bayernatlas_url: String,
    coordinates: CoordinatesDocument,
}

#[derive(Serialize)]
struct CoordinatesDocument {
    lat: f64,
    lon: f64,
    easting: i64,
    northing: i64,
}

impl From<Conversion> for ConversionDocument {
    fn from(value: Conversion) -> Self {
        Self {
            bayernatlas_url: value.portal_url,
            coordinates: CoordinatesDocument {
                lat: value.coordinate.lat(),
                lon: value.coordinate.lon(),
                easting: value.projected.easting(),
                northing: value.projected.northing(),
            },
        }
    }
}

/// Composes governor, extractor, region check, and projection.
pub struct Converter {
    governor: RateGovernor,
    extractor: LinkExtractor,
    region: RegionPolicy,
    transformer: Transformer,
}

impl Converter {
    pub fn builder() -> ConverterBuilder {
        ConverterBuilder::default()
    }

    pub fn governor(&self) -> &RateGovernor {
        &self.governor
    }

    pub fn extractor(&self) -> &LinkExtractor {
        &self.extractor
    }

    pub fn region(&self) -> &RegionPolicy {
        &self.region
    }

    pub fn transformer(&self) -> &Transformer {
        &self.transformer
    }

    /// Rate-governed conversion for one client.
    pub async fn convert(&self, client_key: &str, url: &str) -> Result<Conversion, ConvertError> {
        self.admit(client_key)?;
        self.convert_url(url).await
    }

    pub fn admit(&self, client_key: &str) -> Result<(), ConvertError> {
        if self.governor.admit(client_key) {
            Ok(())
        } else {
            info!(client = client_key, "conversion rate limited");
            Err(ConvertError::RateLimited {
                retry_after: self.governor.retry_after(),
            })
        }
    }

    /// Conversion without rate governance.
    pub async fn convert_url(&self, url: &str) -> Result<Conversion, ConvertError> {
        let coordinate = self.extractor.extract(url).await?;
        self.convert_coordinate(coordinate)
    }

    pub fn convert_coordinate(
        &self,
        coordinate: GeodeticCoordinate,
    ) -> Result<Conversion, ConvertError> {
        if !self.region.contains(&coordinate) {
            return Err(ConvertError::OutOfRegion {
                coordinate,
                region: self.region.name().to_string(),
            });
        }

        let projected = self.transformer.project(&coordinate);
        Ok(Conversion {
            coordinate,
            projected,
            portal_url: bayernatlas_url(&projected),
        })
    }
}

/// Builder for [`Converter`]; every part has a production default.
#[derive(Default)]
pub struct ConverterBuilder {
    extractor_config: Option<ExtractorConfig>,
    http_client: Option<Arc<dyn HttpClient>>,
    governor_config: Option<GovernorConfig>,
    rate_store: Option<Arc<dyn RateStore>>,
    clock: Option<Arc<dyn Clock>>,
    region: Option<RegionPolicy>,
    projection: Option<ProjectionParams>,
}

impl ConverterBuilder {
    pub fn extractor_config(mut self, config: ExtractorConfig) -> Self {
        self.extractor_config = Some(config);
        self
    }

    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn governor_config(mut self, config: GovernorConfig) -> Self {
        self.governor_config = Some(config);
        self
    }

    pub fn rate_store(mut self, store: Arc<dyn RateStore>) -> Self {
        self.rate_store = Some(store);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn region(mut self, region: RegionPolicy) -> Self {
        self.region = Some(region);
        self
    }

    pub fn projection(mut self, params: ProjectionParams) -> Self {
        self.projection = Some(params);
        self
    }

    pub fn build(self) -> Result<Converter, CoreError> {
        let extractor_config = self.extractor_config.unwrap_or_default();
        extractor_config.validate()?;
        let governor_config = self.governor_config.unwrap_or_default();
        governor_config.validate()?;

        let http_client: Arc<dyn HttpClient> = match self.http_client {
            Some(client) => client,
            None => Arc::new(ReqwestHttpClient::new()?),
        };
        let rate_store = self
            .rate_store
            .unwrap_or_else(|| Arc::new(InMemoryRateStore::new()));
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));

        Ok(Converter {
            governor: RateGovernor::with_clock(governor_config, rate_store, clock),
            extractor: LinkExtractor::new(http_client, extractor_config),
            region: self.region.unwrap_or_default(),
            transformer: Transformer::new(self.projection.unwrap_or_default()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::ScriptedHttpClient;
    use crate::region::BoundaryRing;

    fn offline() -> ConverterBuilder {
        Converter::builder().http_client(Arc::new(ScriptedHttpClient::new()))
    }

    #[tokio::test]
    async fn munich_link_converts() {
        let converter = offline().build().expect("converter");
        let conversion = converter
            .convert_url("https://www.google.com/maps/@48.137,11.575,15z")
            .await
            .expect("conversion");

        assert_eq!(conversion.projected.easting(), 691_567);
        assert_eq!(conversion.projected.northing(), 5_334_734);
        assert!(conversion.portal_url.contains("c=691567,5334734"));
    }

    #[tokio::test]
    async fn out_of_region_keeps_the_coordinate() {
        let converter = offline().build().expect("converter");
        let error = converter
            .convert_url("https://www.google.com/maps/@52.52,13.405,12z")
            .await
            .expect_err("berlin is outside");

        assert_eq!(
            error,
            ConvertError::OutOfRegion {
                coordinate: GeodeticCoordinate::new_unchecked(52.52, 13.405),
                region: String::from("Bavaria"),
            }
        );
        assert_eq!(error.to_string(), "location is outside Bavaria");
    }

    #[tokio::test]
    async fn injected_region_replaces_bavaria() {
        let ring = BoundaryRing::new(vec![(13.0, 52.0), (14.0, 52.0), (14.0, 53.0), (13.0, 53.0)])
            .expect("ring");
        let converter = offline()
            .region(RegionPolicy::new("Berlin", ring))
            .build()
            .expect("converter");

        assert!(converter
            .convert_url("https://www.google.com/maps/@52.52,13.405,12z")
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn rate_limited_requests_skip_extraction() {
        let converter = offline()
            .governor_config(GovernorConfig {
                limit: 1,
                whitelist: Vec::new(),
                ..GovernorConfig::default()
            })
            .build()
            .expect("converter");

        let url = "https://www.google.com/maps/@48.137,11.575,15z";
        assert!(converter.convert("10.1.1.1", url).await.is_ok());
        assert_eq!(
            converter.convert("10.1.1.1", url).await,
            Err(ConvertError::RateLimited {
                retry_after: Duration::from_secs(60)
            })
        );
    }

    #[test]
    fn invalid_governor_config_fails_the_build() {
        let result = offline()
            .governor_config(GovernorConfig {
                limit: 0,
                ..GovernorConfig::default()
            })
            .build();

        assert!(matches!(result, Err(CoreError::Validation(_))));
    }

    #[test]
    fn conversion_serializes_in_response_shape() {
        let converter = offline().build().expect("converter");
        let conversion = converter
            .convert_coordinate(GeodeticCoordinate::new_unchecked(48.137, 11.575))
            .expect("inside");

        let value = serde_json::to_value(conversion).expect("serialize");
        assert_eq!(value["coordinates"]["easting"], 691_567);
        assert_eq!(value["coordinates"]["lat"], 48.137);
        assert_eq!(
            value["bayernatlas_url"],
            "https://atlas.bayern.de/?c=691567,5334734&z=16&r=0&l=atkis&crh=true&mid=1"
        );
    }
}
