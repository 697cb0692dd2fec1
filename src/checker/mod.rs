//! Request rule engine.
//!
//! A [`RequestRulesManager`] holds a registry of [`RequestRule`]s and runs a
//! caller-chosen, ordered subset of them against a [`ServerRequest`]. Each
//! rule may add a [`RuleResult`] to the session's [`ResultBag`], read results
//! of rules that ran before it, and share auxiliary values through
//! [`RuleData`]. The first failing rule aborts the session.
//!
//! # Example
//!
//! ```rust
//! use axum::body::Bytes;
//! use axum::http::Request;
//! use tower_oidc_rules::checker::RequestRulesManager;
//! use tower_oidc_rules::checker::rules::{
//!     ClientIdRule, RedirectUriRule, ScopeRule, StateRule, keys,
//! };
//! use tower_oidc_rules::oauth::{ClientEntity, InMemoryClientRepository};
//! use tower_oidc_rules::ServerRequest;
//!
//! let clients = InMemoryClientRepository::new()
//!     .client(ClientEntity::new("abc", "App").redirect_uri("https://rp.example/cb"));
//!
//! let mut manager = RequestRulesManager::new()
//!     .rule(StateRule)
//!     .rule(ClientIdRule::new(clients))
//!     .rule(RedirectUriRule)
//!     .rule(ScopeRule::new(["openid"]));
//!
//! let request = ServerRequest::from_request(
//!     Request::builder()
//!         .uri("/authorize?client_id=abc&redirect_uri=https%3A%2F%2Frp.example%2Fcb&scope=openid")
//!         .body(Bytes::new())
//!         .unwrap(),
//! );
//!
//! let results = manager
//!     .check(
//!         &request,
//!         &[keys::STATE, keys::CLIENT_ID, keys::REDIRECT_URI, keys::SCOPE],
//!         false,
//!     )
//!     .unwrap();
//! assert_eq!(
//!     results.get(keys::SCOPE).and_then(|r| r.value::<Vec<String>>()),
//!     Some(&vec!["openid".to_string()])
//! );
//! ```
//!
//! [`ServerRequest`]: crate::ServerRequest

mod bag;
mod data;
mod manager;
mod result;
mod rule;
pub mod rules;

pub use bag::ResultBag;
pub use data::RuleData;
pub use manager::RequestRulesManager;
pub use result::RuleResult;
pub use rule::{FnRule, RequestRule};
