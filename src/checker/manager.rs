//! Ordered execution of request rules.
//!
//! The [`RequestRulesManager`] owns a registry of rules plus the result bag
//! and data context of one check session. The caller decides which rules run
//! and in what order; the manager never reorders or resolves dependencies.

use std::collections::HashMap;
use std::sync::Arc;

use super::bag::ResultBag;
use super::data::RuleData;
use super::result::RuleResult;
use super::rule::RequestRule;
use crate::error::{Error, Result};
use crate::request::ServerRequest;

/// Runs a caller-ordered subset of registered rules against a request.
///
/// One manager is meant to serve one request. The result bag and data
/// context persist across calls to [`check`](Self::check) on the same
/// instance; build a fresh manager per request (cloning a prepared one is
/// cheap, rules are shared behind `Arc`).
///
/// # Example
///
/// ```rust
/// use axum::body::Bytes;
/// use axum::http::Request;
/// use tower_oidc_rules::checker::{RequestRulesManager, RuleResult};
/// use tower_oidc_rules::checker::rules::StateRule;
/// use tower_oidc_rules::ServerRequest;
///
/// let request = ServerRequest::from_request(
///     Request::builder()
///         .uri("/authorize?state=abc")
///         .body(Bytes::new())
///         .unwrap(),
/// );
///
/// let mut manager = RequestRulesManager::new().rule(StateRule);
/// manager.predefine_result(RuleResult::new("client_id", "known-client".to_string()));
///
/// let results = manager.check(&request, &["state"], false).unwrap();
/// assert!(results.has("state"));
/// assert!(results.has("client_id"));
/// ```
#[derive(Clone, Default)]
pub struct RequestRulesManager {
    rules: HashMap<String, Arc<dyn RequestRule>>,
    result_bag: ResultBag,
    data: RuleData,
}

impl RequestRulesManager {
    /// Create a manager with an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a manager from a set of rules.
    ///
    /// Later rules replace earlier ones registered under the same key.
    pub fn with_rules(rules: impl IntoIterator<Item = Arc<dyn RequestRule>>) -> Self {
        let mut manager = Self::new();
        for rule in rules {
            manager.add_shared(rule);
        }
        manager
    }

    /// Register a rule, builder style.
    pub fn rule(mut self, rule: impl RequestRule + 'static) -> Self {
        self.add(rule);
        self
    }

    /// Register a rule under its key.
    ///
    /// Returns the rule previously registered under the same key, if any.
    /// The last registration wins.
    pub fn add(&mut self, rule: impl RequestRule + 'static) -> Option<Arc<dyn RequestRule>> {
        self.add_shared(Arc::new(rule))
    }

    /// Register an already shared rule under its key.
    pub fn add_shared(&mut self, rule: Arc<dyn RequestRule>) -> Option<Arc<dyn RequestRule>> {
        let key = rule.key().to_string();
        let replaced = self.rules.insert(key.clone(), rule);
        if replaced.is_some() {
            tracing::warn!(rule = %key, "Request rule replaced an existing registration");
        }
        replaced
    }

    /// Check whether a rule is registered under `key`.
    pub fn has_rule(&self, key: &str) -> bool {
        self.rules.contains_key(key)
    }

    /// Keys of all registered rules, in no particular order.
    pub fn rule_keys(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    /// Add an already known result so rules can use it during the check.
    ///
    /// Overwrites any result stored under the same key.
    pub fn predefine_result(&mut self, result: RuleResult) {
        tracing::debug!(rule = %result.key(), "Predefined request rule result");
        self.result_bag.add(result);
    }

    /// Set data available to every rule during the check.
    pub fn set_data<T: Send + Sync + 'static>(&mut self, key: impl Into<String>, value: T) {
        self.data.set(key, value);
    }

    pub fn data(&self) -> &RuleData {
        &self.data
    }

    pub fn result_bag(&self) -> &ResultBag {
        &self.result_bag
    }

    pub fn into_result_bag(self) -> ResultBag {
        self.result_bag
    }

    /// Execute the given rules in order and return the accumulated results.
    ///
    /// `use_fragment` tells rules to flag protocol errors for rendering in the
    /// redirect URI fragment instead of the query.
    ///
    /// Stops at the first failing rule. Results added by rules that already
    /// ran stay in the bag, but a failed check must be treated as having
    /// produced no usable results. A key with no registered rule fails with
    /// [`Error::RuleNotDefined`].
    pub fn check<K: AsRef<str>>(
        &mut self,
        request: &ServerRequest,
        rule_keys_to_execute: &[K],
        use_fragment: bool,
    ) -> Result<&ResultBag> {
        for rule_key in rule_keys_to_execute {
            let rule_key = rule_key.as_ref();
            let Some(rule) = self.rules.get(rule_key) else {
                tracing::error!(rule = %rule_key, "Request rule not defined");
                return Err(Error::RuleNotDefined(rule_key.to_string()));
            };

            tracing::debug!(rule = %rule_key, use_fragment, "Executing request rule");

            let outcome = rule.check_rule(request, &self.result_bag, &mut self.data, use_fragment);
            match outcome {
                Ok(Some(result)) => self.result_bag.add(result),
                Ok(None) => {}
                Err(err) => {
                    if let Error::Protocol(protocol) = &err {
                        tracing::warn!(
                            rule = %rule_key,
                            error = %protocol.code(),
                            "Request rule rejected request"
                        );
                    } else {
                        tracing::error!(rule = %rule_key, error = %err, "Request rule failed");
                    }
                    return Err(err);
                }
            }
        }

        Ok(&self.result_bag)
    }
}

impl std::fmt::Debug for RequestRulesManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestRulesManager")
            .field("rules", &self.rules.keys().collect::<Vec<_>>())
            .field("result_bag", &self.result_bag)
            .field("data", &self.data)
            .finish()
    }
}
