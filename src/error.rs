//! Error types for tower-oidc-rules

use axum::response::{IntoResponse, Response};

use crate::oauth::error::OidcServerError;

/// Boxed error type used at service boundaries.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// tower-oidc-rules error type
///
/// Separates request-caused protocol failures from wiring defects. Only
/// [`Error::Protocol`] should ever be rendered back to the client as an
/// OAuth2/OIDC error; every other variant is a server-side fault.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request violates an OAuth2/OIDC requirement.
    #[error(transparent)]
    Protocol(#[from] OidcServerError),

    /// A rule key was requested that is not present in the registry.
    #[error("Rule for key {0} not defined.")]
    RuleNotDefined(String),

    /// A rule depends on a result that no earlier rule produced.
    #[error("Result for key {0} not set.")]
    ResultNotSet(String),

    /// A stored result or data value had an unexpected type.
    #[error("Value for key {key} is not of type {expected}")]
    UnexpectedType {
        key: String,
        expected: &'static str,
    },

    #[error("Failed to read request body: {0}")]
    Body(String),
}

impl Error {
    /// Returns true for errors caused by the request rather than by the server.
    pub fn is_protocol(&self) -> bool {
        matches!(self, Error::Protocol(_))
    }

    /// Returns the protocol error, if this is one.
    pub fn as_protocol(&self) -> Option<&OidcServerError> {
        match self {
            Error::Protocol(err) => Some(err),
            _ => None,
        }
    }

    /// Returns the HTTP status code to respond with.
    ///
    /// Configuration errors are always 500.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Protocol(err) => err.http_status(),
            Error::Body(_) => 400,
            _ => 500,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::Protocol(err) => err.into_response(),
            Error::Body(message) => OidcServerError::invalid_request("body", Some(&message))
                .into_response(),
            other => {
                tracing::error!(error = %other, "Request validation failed on the server side");
                OidcServerError::server_error("request validation is misconfigured").into_response()
            }
        }
    }
}

/// Result type alias for tower-oidc-rules
pub type Result<T> = std::result::Result<T, Error>;
