//! OAuth 2.0 / OpenID Connect endpoint support.
//!
//! # Architecture
//!
//! - **Protocol errors** ([`OidcServerError`]): error code, description, hint
//!   and HTTP status, rendered either as a redirect (query or fragment) or as
//!   a JSON body via axum's [`IntoResponse`](axum::response::IntoResponse).
//!
//! - **Clients** ([`ClientRepository`]): lookup of registered clients used by
//!   the built-in request rules. [`InMemoryClientRepository`] is provided.
//!
//! - **CORS** ([`AllowedOrigins`], [`CorsConfig`]): origin allow-list and the
//!   headers sent on successful preflight responses.
//!
//! - **HTTP Middleware** ([`TokenEndpointLayer`]/[`TokenEndpointService`]):
//!   answers `OPTIONS` preflight requests for the token endpoint and forwards
//!   everything else to the token-issuing service.
//!
//! # Example
//!
//! ```rust,no_run
//! use axum::Router;
//! use axum::routing::post;
//! use tower_oidc_rules::oauth::{StaticAllowedOrigins, TokenEndpointLayer};
//!
//! # async fn issue_token() -> &'static str { "{}" }
//! # async fn run() -> Result<(), tower_oidc_rules::BoxError> {
//! let origins = StaticAllowedOrigins::new(["https://app.example"]);
//!
//! let app = Router::new()
//!     .route("/token", post(issue_token))
//!     .layer(TokenEndpointLayer::new(origins));
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod cors;
pub mod error;
pub mod middleware;

// Re-exports
pub use client::{ClientEntity, ClientRepository, InMemoryClientRepository};
pub use cors::{AllowedOrigins, CorsConfig, StaticAllowedOrigins, handle_preflight};
pub use error::{ErrorCode, OidcServerError};
pub use middleware::{TokenEndpointLayer, TokenEndpointService};
