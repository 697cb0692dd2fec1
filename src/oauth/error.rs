//! OAuth 2.0 / OpenID Connect protocol errors.
//!
//! Implements error responses per RFC 6749 Section 4.1.2.1 / 5.2 and
//! OpenID Connect Core Section 3.1.2.6. An error either travels back to the
//! client through its redirect URI (in the query component for the code flow,
//! in the fragment for implicit and hybrid flows) or, when no redirect URI is
//! known yet, as a JSON body.

use std::fmt;

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use url::form_urlencoded;

/// Error codes defined by OAuth 2.0 and OpenID Connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidRequest,
    InvalidClient,
    InvalidGrant,
    UnauthorizedClient,
    UnsupportedGrantType,
    UnsupportedResponseType,
    InvalidScope,
    AccessDenied,
    ServerError,
    TemporarilyUnavailable,
    /// OIDC: the OP does not support use of the `request` parameter.
    RequestNotSupported,
    InvalidRequestObject,
    LoginRequired,
    ConsentRequired,
    InteractionRequired,
}

impl ErrorCode {
    /// The wire value of the `error` parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidRequest => "invalid_request",
            ErrorCode::InvalidClient => "invalid_client",
            ErrorCode::InvalidGrant => "invalid_grant",
            ErrorCode::UnauthorizedClient => "unauthorized_client",
            ErrorCode::UnsupportedGrantType => "unsupported_grant_type",
            ErrorCode::UnsupportedResponseType => "unsupported_response_type",
            ErrorCode::InvalidScope => "invalid_scope",
            ErrorCode::AccessDenied => "access_denied",
            ErrorCode::ServerError => "server_error",
            ErrorCode::TemporarilyUnavailable => "temporarily_unavailable",
            ErrorCode::RequestNotSupported => "request_not_supported",
            ErrorCode::InvalidRequestObject => "invalid_request_object",
            ErrorCode::LoginRequired => "login_required",
            ErrorCode::ConsentRequired => "consent_required",
            ErrorCode::InteractionRequired => "interaction_required",
        }
    }

    /// The HTTP status used when the error is rendered as a direct response.
    pub fn default_status(self) -> u16 {
        match self {
            ErrorCode::InvalidClient | ErrorCode::AccessDenied => 401,
            ErrorCode::ServerError => 500,
            ErrorCode::TemporarilyUnavailable => 503,
            _ => 400,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A protocol-level failure raised while validating a request.
///
/// Carries everything the HTTP boundary needs to build a compliant error
/// response: the error code, a description, an optional hint, the HTTP
/// status, and (for authorization requests) the redirect URI, the `state`
/// to echo back, and whether parameters go into the fragment or the query.
///
/// # Example
///
/// ```rust
/// use tower_oidc_rules::oauth::OidcServerError;
///
/// let err = OidcServerError::invalid_scope("admin")
///     .with_redirect_uri(Some("https://rp.example/cb".to_string()))
///     .with_state(Some("xyz".to_string()))
///     .with_fragment(true);
///
/// let location = err.redirect_location().unwrap();
/// assert!(location.starts_with("https://rp.example/cb#error=invalid_scope"));
/// ```
#[derive(Debug, Clone)]
pub struct OidcServerError {
    code: ErrorCode,
    description: String,
    hint: Option<String>,
    http_status: u16,
    redirect_uri: Option<String>,
    state: Option<String>,
    use_fragment: bool,
}

impl OidcServerError {
    /// Create an error with the given code and description.
    ///
    /// The HTTP status defaults to [`ErrorCode::default_status`].
    pub fn new(code: ErrorCode, description: impl Into<String>) -> Self {
        Self {
            code,
            description: description.into(),
            hint: None,
            http_status: code.default_status(),
            redirect_uri: None,
            state: None,
            use_fragment: false,
        }
    }

    /// A required parameter is missing, or a parameter is malformed.
    pub fn invalid_request(parameter: &str, hint: Option<&str>) -> Self {
        let hint = hint
            .map(String::from)
            .unwrap_or_else(|| format!("Check the `{}` parameter", parameter));
        Self::new(
            ErrorCode::InvalidRequest,
            "The request is missing a required parameter, includes an invalid parameter value, \
             includes a parameter more than once, or is otherwise malformed.",
        )
        .with_hint(hint)
    }

    /// Client authentication failed or the client is unknown.
    pub fn invalid_client() -> Self {
        Self::new(ErrorCode::InvalidClient, "Client authentication failed")
    }

    /// The requested scope is invalid, unknown, or malformed.
    pub fn invalid_scope(scope: &str) -> Self {
        Self::new(
            ErrorCode::InvalidScope,
            "The requested scope is invalid, unknown, or malformed",
        )
        .with_hint(format!("Check the `{}` scope", scope))
    }

    /// The resource owner or authorization server denied the request.
    pub fn access_denied(hint: Option<&str>) -> Self {
        let err = Self::new(
            ErrorCode::AccessDenied,
            "The resource owner or authorization server denied the request.",
        );
        match hint {
            Some(hint) => err.with_hint(hint),
            None => err,
        }
    }

    /// The request (or a feature it relies on) is not supported.
    pub fn request_not_supported(hint: Option<&str>) -> Self {
        let err = Self::new(ErrorCode::RequestNotSupported, "Request object not supported.");
        match hint {
            Some(hint) => err.with_hint(hint),
            None => err,
        }
    }

    pub fn unsupported_response_type() -> Self {
        Self::new(
            ErrorCode::UnsupportedResponseType,
            "The response type is not supported by the authorization server.",
        )
    }

    pub fn invalid_request_object(hint: &str) -> Self {
        Self::new(
            ErrorCode::InvalidRequestObject,
            "The request parameter contains an invalid Request Object.",
        )
        .with_hint(hint)
    }

    pub fn login_required() -> Self {
        Self::new(
            ErrorCode::LoginRequired,
            "End-User is not already authenticated.",
        )
    }

    pub fn consent_required() -> Self {
        Self::new(ErrorCode::ConsentRequired, "End-User consent is required.")
    }

    pub fn interaction_required() -> Self {
        Self::new(
            ErrorCode::InteractionRequired,
            "End-User interaction is required.",
        )
    }

    /// The server hit an unexpected condition.
    pub fn server_error(hint: &str) -> Self {
        Self::new(
            ErrorCode::ServerError,
            format!(
                "The authorization server encountered an unexpected condition which prevented \
                 it from fulfilling the request: {}",
                hint
            ),
        )
    }

    /// Attach a hint for the developer of the client.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Override the HTTP status.
    pub fn with_http_status(mut self, status: u16) -> Self {
        self.http_status = status;
        self
    }

    /// Set the redirect URI the error should be delivered to.
    pub fn with_redirect_uri(mut self, redirect_uri: Option<String>) -> Self {
        self.redirect_uri = redirect_uri;
        self
    }

    /// Set the `state` value to echo back to the client.
    pub fn with_state(mut self, state: Option<String>) -> Self {
        self.state = state;
        self
    }

    /// Render the error parameters in the redirect URI fragment instead of the query.
    pub fn with_fragment(mut self, use_fragment: bool) -> Self {
        self.use_fragment = use_fragment;
        self
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    pub fn http_status(&self) -> u16 {
        self.http_status
    }

    pub fn redirect_uri(&self) -> Option<&str> {
        self.redirect_uri.as_deref()
    }

    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    /// Returns true if the error is rendered in the URI fragment.
    pub fn uses_fragment(&self) -> bool {
        self.use_fragment
    }

    fn params(&self) -> Vec<(&'static str, &str)> {
        let mut params = vec![
            ("error", self.code.as_str()),
            ("error_description", self.description.as_str()),
        ];
        if let Some(hint) = &self.hint {
            params.push(("hint", hint));
        }
        if let Some(state) = &self.state {
            params.push(("state", state));
        }
        params
    }

    /// Builds the JSON error body.
    pub fn payload(&self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = self
            .params()
            .into_iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
            .collect();
        serde_json::Value::Object(map)
    }

    /// Builds the redirect URI carrying the error parameters.
    ///
    /// Returns `None` when no redirect URI is set. Parameters are appended to
    /// the existing query, or become the fragment when fragment rendering is on.
    pub fn redirect_location(&self) -> Option<String> {
        let redirect_uri = self.redirect_uri.as_deref()?;
        let encoded = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.params())
            .finish();

        if self.use_fragment {
            let base = redirect_uri.split('#').next().unwrap_or(redirect_uri);
            return Some(format!("{}#{}", base, encoded));
        }

        let separator = if redirect_uri.contains('?') { '&' } else { '?' };
        Some(format!("{}{}{}", redirect_uri, separator, encoded))
    }

    /// Builds the `WWW-Authenticate` challenge for failed client authentication.
    pub fn www_authenticate(&self) -> Option<String> {
        match (self.code, self.http_status) {
            (ErrorCode::InvalidClient, 401) => Some("Basic realm=\"OAuth\"".to_string()),
            _ => None,
        }
    }
}

impl fmt::Display for OidcServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.description)?;
        if let Some(hint) = &self.hint {
            write!(f, " ({})", hint)?;
        }
        Ok(())
    }
}

impl std::error::Error for OidcServerError {}

impl IntoResponse for OidcServerError {
    fn into_response(self) -> Response {
        if let Some(location) = self.redirect_location() {
            return (StatusCode::FOUND, [(header::LOCATION, location)]).into_response();
        }

        let status = StatusCode::from_u16(self.http_status).unwrap_or(StatusCode::BAD_REQUEST);
        let challenge = self.www_authenticate();
        let mut response = (status, Json(self.payload())).into_response();
        if let Some(value) = challenge.and_then(|c| HeaderValue::from_str(&c).ok()) {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, value);
        }
        response
    }
}
