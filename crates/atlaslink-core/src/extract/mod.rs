//! Coordinate extraction from consumer map links.
//!
//! Extraction runs in two steps:
//!
//! 1. **Redirect resolution.** Links on a shortener host get exactly one
//!    `HEAD` request with redirects disabled. A `Location` header replaces the
//!    URL; anything else (timeout, network error, no header) keeps the
//!    original URL. This step never fails the extraction.
//! 2. **Pattern matching.** The [`matchers`] run in priority order and the
//!    first hit wins.
//!
//! | Priority | Matcher | Encoding |
//! |----------|---------|----------|
//! | 1 | [`PlaceMarkerMatcher`] | `!3d<lat>!4d<lon>` |
//! | 2 | [`ViewportCenterMatcher`] | `@<lat>,<lon>` |
//! | 3 | [`OsmMapFragmentMatcher`] | `#map=<zoom>/<lat>/<lon>` |
//! | 4 | [`OsmMarkerParamsMatcher`] | `?mlat=<lat>&mlon=<lon>` |

pub mod matchers;

use std::sync::Arc;

use reqwest::Url;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ExtractorConfig;
use crate::domain::GeodeticCoordinate;
use crate::http_client::{HttpClient, HttpError, HttpRequest, ReqwestHttpClient};

pub use matchers::{
    default_matchers, CoordinateMatcher, OsmMapFragmentMatcher, OsmMarkerParamsMatcher,
    PlaceMarkerMatcher, ViewportCenterMatcher,
};

/// No matcher recognised the (possibly resolved) link.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not extract coordinates from URL")]
pub struct ExtractionFailure {
    /// The URL the matchers ran against.
    pub final_url: String,
}

/// Whether `raw` is an absolute URL with a host, the only form worth
/// extracting from.
pub fn is_valid_link(raw: &str) -> bool {
    Url::parse(raw).is_ok_and(|url| url.has_host())
}

/// Resolves shortened links and recovers a coordinate from map URLs.
pub struct LinkExtractor {
    client: Arc<dyn HttpClient>,
    config: ExtractorConfig,
    matchers: Vec<Box<dyn CoordinateMatcher>>,
}

impl LinkExtractor {
    pub fn new(client: Arc<dyn HttpClient>, config: ExtractorConfig) -> Self {
        Self {
            client,
            config,
            matchers: default_matchers(),
        }
    }

    /// Extractor backed by a real reqwest transport.
    pub fn with_default_client(config: ExtractorConfig) -> Result<Self, HttpError> {
        Ok(Self::new(Arc::new(ReqwestHttpClient::new()?), config))
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Matcher names in evaluation order.
    pub fn matcher_names(&self) -> Vec<&'static str> {
        self.matchers.iter().map(|matcher| matcher.name()).collect()
    }

    pub async fn extract(&self, url: &str) -> Result<GeodeticCoordinate, ExtractionFailure> {
        let final_url = self.resolve(url).await;
        match self.match_coordinates(&final_url) {
            Some(coordinate) => Ok(coordinate),
            None => {
                debug!(url = %final_url, "no coordinate pattern matched");
                Err(ExtractionFailure { final_url })
            }
        }
    }

    /// Run the matchers against `url` without any network access.
    pub fn match_coordinates(&self, url: &str) -> Option<GeodeticCoordinate> {
        self.matchers.iter().find_map(|matcher| {
            let coordinate = matcher.try_match(url)?;
            debug!(matcher = matcher.name(), %coordinate, "coordinate pattern matched");
            Some(coordinate)
        })
    }

    /// Whether `url` points at a configured link shortener.
    pub fn is_shortened(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return false;
        };
        let Some(host) = parsed.host_str() else {
            return false;
        };
        let host = host.to_ascii_lowercase();
        self.config.shortener_hosts.iter().any(|pattern| {
            let pattern = pattern.to_ascii_lowercase();
            host == pattern
                || host
                    .strip_suffix(pattern.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
    }

    /// Follow one redirect hop for shortened links, best effort.
    pub async fn resolve(&self, url: &str) -> String {
        if !self.is_shortened(url) {
            return url.to_string();
        }

        let timeout = self.config.redirect_timeout();
        let request = HttpRequest::head(url).with_timeout_ms(self.config.redirect_timeout_ms);
        let outcome = tokio::time::timeout(timeout, self.client.execute(request)).await;

        match outcome {
            Ok(Ok(response)) => match response.location() {
                Some(location) => {
                    debug!(from = url, to = location, "resolved shortened link");
                    location.to_string()
                }
                None => {
                    warn!(
                        url,
                        status = response.status,
                        "shortened link answered without a Location header"
                    );
                    url.to_string()
                }
            },
            Ok(Err(error)) => {
                warn!(url, %error, "shortened link resolution failed");
                url.to_string()
            }
            Err(_) => {
                warn!(
                    url,
                    timeout_ms = self.config.redirect_timeout_ms,
                    "shortened link resolution timed out"
                );
                url.to_string()
            }
        }
    }
}
