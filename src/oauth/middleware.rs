//! Tower middleware for the token endpoint.
//!
//! Provides [`TokenEndpointLayer`] and [`TokenEndpointService`], which answer
//! CORS preflight requests against an origin allow-list and forward every
//! other request to the wrapped token-issuance service.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::{IntoResponse, Response};
use tower::Layer;

use super::cors::{AllowedOrigins, CorsConfig, handle_preflight};

/// Tower layer that adds CORS preflight handling to a token endpoint.
///
/// # Example
///
/// ```rust
/// use tower_oidc_rules::oauth::{StaticAllowedOrigins, TokenEndpointLayer};
///
/// let layer = TokenEndpointLayer::new(StaticAllowedOrigins::new(["https://app.example"]));
/// ```
#[derive(Clone)]
pub struct TokenEndpointLayer<O: AllowedOrigins> {
    origins: O,
    cors: CorsConfig,
}

impl<O: AllowedOrigins + Clone> TokenEndpointLayer<O> {
    /// Create a new layer with the given origin allow-list and default CORS headers.
    pub fn new(origins: O) -> Self {
        Self {
            origins,
            cors: CorsConfig::default(),
        }
    }

    /// Set the headers sent on successful preflight responses.
    pub fn cors_config(mut self, cors: CorsConfig) -> Self {
        self.cors = cors;
        self
    }
}

impl<S, O: AllowedOrigins + Clone> Layer<S> for TokenEndpointLayer<O> {
    type Service = TokenEndpointService<S, O>;

    fn layer(&self, inner: S) -> Self::Service {
        TokenEndpointService {
            inner,
            origins: self.origins.clone(),
            cors: self.cors.clone(),
        }
    }
}

/// Tower service created by [`TokenEndpointLayer`].
///
/// For each incoming request:
///
/// 1. `OPTIONS` requests are answered here: `204` for an allowed origin,
///    otherwise the protocol error rendered as a JSON error response
/// 2. Every other request goes to the inner service untouched
#[derive(Clone)]
pub struct TokenEndpointService<S, O: AllowedOrigins> {
    inner: S,
    origins: O,
    cors: CorsConfig,
}

impl<S, O> tower_service::Service<Request<Body>> for TokenEndpointService<S, O>
where
    S: tower_service::Service<Request<Body>, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Send,
    O: AllowedOrigins,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        if req.method() != Method::OPTIONS {
            return Box::pin(self.inner.call(req));
        }

        let response = match handle_preflight(req.headers(), &self.origins, &self.cors) {
            Ok(response) => response,
            Err(error) => {
                tracing::warn!(error = %error, "CORS preflight rejected");
                error.into_response()
            }
        };
        Box::pin(std::future::ready(Ok(response)))
    }
}
