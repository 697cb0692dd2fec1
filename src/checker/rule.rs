//! The request rule capability.

use std::sync::Arc;

use super::bag::ResultBag;
use super::data::RuleData;
use super::result::RuleResult;
use crate::error::Result;
use crate::request::ServerRequest;

/// A named validation unit over a request.
///
/// A rule returns:
///
/// - `Ok(Some(result))` to cache a value for later rules and the caller,
/// - `Ok(None)` when there is nothing worth caching,
/// - `Err(Error::Protocol(..))` when the request violates the rule.
///
/// Rules may read results of rules that ran earlier in the same check, but
/// must not assume they exist unless the caller's ordering guarantees it.
/// Any protocol error raised must honour `use_fragment`.
///
/// # Example
///
/// ```rust
/// use tower_oidc_rules::checker::{RequestRule, ResultBag, RuleData, RuleResult};
/// use tower_oidc_rules::oauth::OidcServerError;
/// use tower_oidc_rules::{Result, ServerRequest};
///
/// struct NonceRule;
///
/// impl RequestRule for NonceRule {
///     fn key(&self) -> &str {
///         "nonce"
///     }
///
///     fn check_rule(
///         &self,
///         request: &ServerRequest,
///         _results: &ResultBag,
///         _data: &mut RuleData,
///         use_fragment: bool,
///     ) -> Result<Option<RuleResult>> {
///         let nonce = request.param("nonce").ok_or_else(|| {
///             OidcServerError::invalid_request("nonce", None).with_fragment(use_fragment)
///         })?;
///         Ok(Some(RuleResult::new(self.key(), nonce.to_string())))
///     }
/// }
/// ```
pub trait RequestRule: Send + Sync {
    /// Unique key of this rule in a registry.
    fn key(&self) -> &str;

    /// Validate the request.
    fn check_rule(
        &self,
        request: &ServerRequest,
        results: &ResultBag,
        data: &mut RuleData,
        use_fragment: bool,
    ) -> Result<Option<RuleResult>>;
}

type CheckFn = dyn Fn(&ServerRequest, &ResultBag, &mut RuleData, bool) -> Result<Option<RuleResult>>
    + Send
    + Sync;

/// A rule backed by a closure.
///
/// # Example
///
/// ```rust
/// use tower_oidc_rules::checker::{FnRule, RuleResult};
///
/// let rule = FnRule::new("response_mode", |request, _results, _data, _fragment| {
///     let mode = request.param("response_mode").unwrap_or("query").to_string();
///     Ok(Some(RuleResult::new("response_mode", mode)))
/// });
/// ```
#[derive(Clone)]
pub struct FnRule {
    key: String,
    check: Arc<CheckFn>,
}

impl FnRule {
    pub fn new<F>(key: impl Into<String>, check: F) -> Self
    where
        F: Fn(&ServerRequest, &ResultBag, &mut RuleData, bool) -> Result<Option<RuleResult>>
            + Send
            + Sync
            + 'static,
    {
        Self {
            key: key.into(),
            check: Arc::new(check),
        }
    }
}

impl std::fmt::Debug for FnRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnRule")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl RequestRule for FnRule {
    fn key(&self) -> &str {
        &self.key
    }

    fn check_rule(
        &self,
        request: &ServerRequest,
        results: &ResultBag,
        data: &mut RuleData,
        use_fragment: bool,
    ) -> Result<Option<RuleResult>> {
        (self.check)(request, results, data, use_fragment)
    }
}
