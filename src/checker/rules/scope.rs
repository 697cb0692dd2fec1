use std::collections::HashSet;

use super::{RedirectContext, client, data_keys, keys};
use crate::checker::{RequestRule, ResultBag, RuleData, RuleResult};
use crate::error::Result;
use crate::oauth::OidcServerError;
use crate::request::ServerRequest;

/// Validates requested scopes against the supported set and the client.
///
/// Requires the `state`, `client_id` and `redirect_uri` results. Falls back
/// to the `default_scope` data value when no scope is requested, and splits
/// on the `scope_delimiter` data value (a space by default). Produces the
/// scopes as a `Vec<String>`.
#[derive(Debug, Clone, Default)]
pub struct ScopeRule {
    supported: HashSet<String>,
}

impl ScopeRule {
    pub fn new(supported: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            supported: supported.into_iter().map(Into::into).collect(),
        }
    }
}

impl RequestRule for ScopeRule {
    fn key(&self) -> &str {
        keys::SCOPE
    }

    fn check_rule(
        &self,
        request: &ServerRequest,
        results: &ResultBag,
        data: &mut RuleData,
        use_fragment: bool,
    ) -> Result<Option<RuleResult>> {
        let redirect = RedirectContext::from_results(results, use_fragment)?;
        let client = client(results)?;

        let delimiter = data
            .get::<String>(data_keys::SCOPE_DELIMITER)
            .map(String::as_str)
            .filter(|d| !d.is_empty())
            .unwrap_or(" ");
        let requested = match request.param("scope") {
            Some(scope) if !scope.trim().is_empty() => scope,
            _ => data
                .get::<String>(data_keys::DEFAULT_SCOPE)
                .map(String::as_str)
                .unwrap_or(""),
        };

        let mut scopes: Vec<String> = Vec::new();
        for scope in requested.split(delimiter).map(str::trim).filter(|s| !s.is_empty()) {
            if !self.supported.contains(scope) || !client.allows_scope(scope) {
                return Err(redirect.redirect(OidcServerError::invalid_scope(scope)).into());
            }
            if !scopes.iter().any(|s| s == scope) {
                scopes.push(scope.to_string());
            }
        }

        Ok(Some(RuleResult::new(keys::SCOPE, scopes)))
    }
}
