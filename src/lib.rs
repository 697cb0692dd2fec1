//! # tower-oidc-rules
//!
//! Ordered request validation for OAuth 2.0 / OpenID Connect endpoints.
//!
//! An authorization or token endpoint validates an inbound request through a
//! series of small checks: is the client known, is the redirect URI
//! registered, are the scopes allowed. Later checks often need what earlier
//! ones found (the client entity, the validated redirect URI, the `state` to
//! echo back). This crate models each check as a [`RequestRule`], runs a
//! caller-ordered list of them through a [`RequestRulesManager`], and collects
//! their outcomes in a [`ResultBag`]. The first failing rule stops the check
//! with an [`OidcServerError`] that knows how to render itself as a
//! protocol-correct response.
//!
//! ## Quick Start
//!
//! ```rust
//! use axum::body::Bytes;
//! use axum::http::Request;
//! use tower_oidc_rules::checker::RequestRulesManager;
//! use tower_oidc_rules::checker::rules::{
//!     ClientIdRule, RedirectUriRule, RequiredOpenIdScopeRule, ScopeRule, StateRule, keys,
//! };
//! use tower_oidc_rules::oauth::{ClientEntity, InMemoryClientRepository, ErrorCode};
//! use tower_oidc_rules::ServerRequest;
//!
//! let clients = InMemoryClientRepository::new()
//!     .client(ClientEntity::new("abc", "App").redirect_uri("https://rp.example/cb"));
//!
//! let mut manager = RequestRulesManager::new()
//!     .rule(StateRule)
//!     .rule(ClientIdRule::new(clients))
//!     .rule(RedirectUriRule)
//!     .rule(ScopeRule::new(["openid", "profile"]))
//!     .rule(RequiredOpenIdScopeRule);
//!
//! let request = ServerRequest::from_request(
//!     Request::builder()
//!         .uri("/authorize?client_id=abc&redirect_uri=https%3A%2F%2Frp.example%2Fcb\
//!               &scope=profile&state=xyz")
//!         .body(Bytes::new())
//!         .unwrap(),
//! );
//!
//! // Implicit/hybrid flows report errors in the fragment
//! let err = manager
//!     .check(
//!         &request,
//!         &[
//!             keys::STATE,
//!             keys::CLIENT_ID,
//!             keys::REDIRECT_URI,
//!             keys::SCOPE,
//!             keys::REQUIRED_OPENID_SCOPE,
//!         ],
//!         true,
//!     )
//!     .unwrap_err();
//!
//! let protocol = err.as_protocol().unwrap();
//! assert_eq!(protocol.code(), ErrorCode::InvalidRequest);
//! assert!(protocol.redirect_location().unwrap().contains("#error=invalid_request"));
//! ```
//!
//! ## Key Types
//!
//! ### Rule engine
//! - [`RequestRulesManager`] - Registry and ordered executor of rules
//! - [`RequestRule`] - The rule capability; [`FnRule`](checker::FnRule) wraps a closure
//! - [`ResultBag`] / [`RuleResult`] - Accumulated rule outcomes
//! - [`RuleData`](checker::RuleData) - Auxiliary data shared by rules
//!
//! ### Protocol
//! - [`OidcServerError`] - OAuth2/OIDC error with query/fragment rendering
//! - [`ServerRequest`] - Parsed, read-only view of the inbound request
//! - [`TokenEndpointLayer`](oauth::TokenEndpointLayer) - CORS preflight handling
//!   for the token endpoint
//!
//! ## Errors
//!
//! [`Error::Protocol`] is caused by the request and should be rendered to the
//! client. [`Error::RuleNotDefined`] and [`Error::ResultNotSet`] mean the rule
//! pipeline is wired incorrectly; they map to a 500 and must not be presented
//! as client errors.

pub mod checker;
pub mod error;
pub mod oauth;
pub mod request;

// Re-exports
pub use checker::{RequestRule, RequestRulesManager, ResultBag, RuleResult};
pub use error::{BoxError, Error, Result};
pub use oauth::OidcServerError;
pub use request::ServerRequest;
