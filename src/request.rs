//! Read-only view of an inbound HTTP request for validation rules.
//!
//! Rules never see the raw body stream; [`ServerRequest`] parses the query
//! string and any `application/x-www-form-urlencoded` body up front so every
//! rule in a check session reads the same parameters.

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Method, Request, Uri, header, request::Parts};
use url::form_urlencoded;

use crate::error::{Error, Result};

/// Default cap on the body size read by [`ServerRequest::from_body_request`].
pub const DEFAULT_BODY_LIMIT: usize = 64 * 1024;

/// An inbound request with parsed query and form parameters.
#[derive(Debug, Clone)]
pub struct ServerRequest {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    query: Vec<(String, String)>,
    body: Vec<(String, String)>,
}

impl ServerRequest {
    /// Build from request parts and an already collected body.
    pub fn from_parts(parts: Parts, body: &[u8]) -> Self {
        let query = parts
            .uri
            .query()
            .map(|q| parse_pairs(q.as_bytes()))
            .unwrap_or_default();

        let body = if is_form_encoded(&parts.headers) {
            parse_pairs(body)
        } else {
            Vec::new()
        };

        Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            query,
            body,
        }
    }

    /// Build from a request whose body is already buffered.
    pub fn from_request(request: Request<Bytes>) -> Self {
        let (parts, body) = request.into_parts();
        Self::from_parts(parts, &body)
    }

    /// Build from a streaming axum request, reading at most `limit` body bytes.
    pub async fn from_body_request(request: Request<Body>, limit: usize) -> Result<Self> {
        let (parts, body) = request.into_parts();
        let bytes = axum::body::to_bytes(body, limit)
            .await
            .map_err(|e| Error::Body(e.to_string()))?;
        Ok(Self::from_parts(parts, &bytes))
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the first value of a header, or `None` if absent or not valid UTF-8.
    pub fn header_line(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the first query parameter with the given name.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        find(&self.query, name)
    }

    /// Returns the first form body parameter with the given name.
    pub fn body_param(&self, name: &str) -> Option<&str> {
        find(&self.body, name)
    }

    /// Returns the number of times a parameter occurs in the query and body.
    pub fn param_count(&self, name: &str) -> usize {
        self.query
            .iter()
            .chain(self.body.iter())
            .filter(|(k, _)| k == name)
            .count()
    }

    /// Returns a parameter from the location dictated by the HTTP method.
    ///
    /// GET requests carry parameters in the query, POST requests in the form
    /// body. Other methods have no parameters.
    pub fn param(&self, name: &str) -> Option<&str> {
        if self.method == Method::GET {
            self.query_param(name)
        } else if self.method == Method::POST {
            self.body_param(name)
        } else {
            None
        }
    }
}

fn parse_pairs(input: &[u8]) -> Vec<(String, String)> {
    form_urlencoded::parse(input).into_owned().collect()
}

fn find<'a>(pairs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

fn is_form_encoded(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.starts_with("application/x-www-form-urlencoded"))
        .unwrap_or(false)
}
