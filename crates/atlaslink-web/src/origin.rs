//! Caller origin policy.

use axum::http::header::{ORIGIN, REFERER};
use axum::http::{HeaderMap, HeaderValue};

/// Origin prefixes allowed to use the API.
#[derive(Debug, Clone, Default)]
pub struct OriginPolicy {
    allowed: Vec<String>,
}

impl OriginPolicy {
    pub fn new(allowed: Vec<String>) -> Self {
        Self { allowed }
    }

    /// Policy that lets every caller through.
    pub fn open() -> Self {
        Self::default()
    }

    pub fn allowed(&self) -> &[String] {
        &self.allowed
    }

    /// The `Origin` header, or failing that the `Referer` header, must start
    /// with an allowed prefix. An empty list permits any request.
    pub fn permits(&self, headers: &HeaderMap) -> bool {
        if self.allowed.is_empty() {
            return true;
        }
        [ORIGIN, REFERER].iter().any(|name| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .filter(|value| !value.is_empty())
                .is_some_and(|value| self.has_prefix_of(value))
        })
    }

    /// Whether CORS should echo `origin` back. Requires an exact match.
    pub fn echoes(&self, origin: &HeaderValue) -> bool {
        let Ok(origin) = origin.to_str() else {
            return false;
        };
        self.allowed.is_empty() || self.allowed.iter().any(|allowed| allowed == origin)
    }

    fn has_prefix_of(&self, value: &str) -> bool {
        self.allowed
            .iter()
            .any(|allowed| value.starts_with(allowed.as_str()))
    }
}
