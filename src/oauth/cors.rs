//! CORS preflight handling for the token endpoint.
//!
//! Browser-based clients send an `OPTIONS` preflight before calling the token
//! endpoint cross-origin. The preflight succeeds only for origins present in
//! the [`AllowedOrigins`] allow-list.

use std::collections::HashSet;
use std::sync::Arc;

use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use super::error::OidcServerError;

/// Allow-list of origins permitted to make CORS requests.
pub trait AllowedOrigins: Send + Sync {
    fn has(&self, origin: &str) -> bool;
}

impl<T: AllowedOrigins + ?Sized> AllowedOrigins for Arc<T> {
    fn has(&self, origin: &str) -> bool {
        (**self).has(origin)
    }
}

/// Simple in-memory origin allow-list.
#[derive(Debug, Clone, Default)]
pub struct StaticAllowedOrigins {
    origins: Arc<HashSet<String>>,
}

impl StaticAllowedOrigins {
    pub fn new(origins: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            origins: Arc::new(origins.into_iter().map(Into::into).collect()),
        }
    }

    pub fn add_origin(&mut self, origin: impl Into<String>) {
        Arc::make_mut(&mut self.origins).insert(origin.into());
    }
}

impl AllowedOrigins for StaticAllowedOrigins {
    fn has(&self, origin: &str) -> bool {
        self.origins.contains(origin)
    }
}

/// Headers sent on a successful preflight response.
///
/// # Example
///
/// ```rust
/// use tower_oidc_rules::oauth::CorsConfig;
///
/// let config = CorsConfig::default().allow_header("Content-Type");
/// assert_eq!(config.allow_headers, vec!["Authorization", "Content-Type"]);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    #[serde(default = "default_allow_methods")]
    pub allow_methods: Vec<String>,

    #[serde(default = "default_allow_headers")]
    pub allow_headers: Vec<String>,

    #[serde(default = "default_allow_credentials")]
    pub allow_credentials: bool,
}

fn default_allow_methods() -> Vec<String> {
    vec!["GET".to_string(), "POST".to_string(), "OPTIONS".to_string()]
}

fn default_allow_headers() -> Vec<String> {
    vec!["Authorization".to_string()]
}

fn default_allow_credentials() -> bool {
    true
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_methods: default_allow_methods(),
            allow_headers: default_allow_headers(),
            allow_credentials: default_allow_credentials(),
        }
    }
}

impl CorsConfig {
    pub fn allow_header(mut self, name: impl Into<String>) -> Self {
        self.allow_headers.push(name.into());
        self
    }

    pub fn allow_methods(mut self, methods: Vec<String>) -> Self {
        self.allow_methods = methods;
        self
    }

    pub fn allow_credentials(mut self, allow: bool) -> Self {
        self.allow_credentials = allow;
        self
    }
}

/// Answer a CORS preflight request.
///
/// Fails with `request_not_supported` when no `Origin` header is present and
/// with `access_denied` when the origin is not allowed. Otherwise returns a
/// `204 No Content` echoing the origin.
pub fn handle_preflight(
    headers: &HeaderMap,
    origins: &dyn AllowedOrigins,
    config: &CorsConfig,
) -> Result<Response, OidcServerError> {
    let origin = headers
        .get(header::ORIGIN)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            OidcServerError::request_not_supported(Some("CORS error: no Origin header present"))
        })?;

    let allowed = origin.to_str().is_ok_and(|o| origins.has(o));
    if !allowed {
        let hint = format!(
            "CORS error: origin {} is not allowed",
            String::from_utf8_lossy(origin.as_bytes())
        );
        return Err(OidcServerError::access_denied(Some(&hint)));
    }

    let allow_methods = header_value(&config.allow_methods)?;
    let allow_headers = header_value(&config.allow_headers)?;

    let mut response = StatusCode::NO_CONTENT.into_response();
    let response_headers = response.headers_mut();
    response_headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
    response_headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, allow_methods);
    response_headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, allow_headers);
    if config.allow_credentials {
        response_headers.insert(
            header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static("true"),
        );
    }

    tracing::debug!(origin = ?origin, "CORS preflight allowed");
    Ok(response)
}

fn header_value(values: &[String]) -> Result<HeaderValue, OidcServerError> {
    HeaderValue::from_str(&values.join(", "))
        .map_err(|_| OidcServerError::server_error("invalid CORS header configuration"))
}
