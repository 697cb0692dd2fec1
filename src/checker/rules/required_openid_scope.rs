use super::{RedirectContext, keys};
use crate::checker::{RequestRule, ResultBag, RuleData, RuleResult};
use crate::error::Result;
use crate::oauth::OidcServerError;
use crate::request::ServerRequest;

/// Requires the `openid` scope. Produces no result.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequiredOpenIdScopeRule;

impl RequestRule for RequiredOpenIdScopeRule {
    fn key(&self) -> &str {
        keys::REQUIRED_OPENID_SCOPE
    }

    fn check_rule(
        &self,
        _request: &ServerRequest,
        results: &ResultBag,
        _data: &mut RuleData,
        use_fragment: bool,
    ) -> Result<Option<RuleResult>> {
        let redirect = RedirectContext::from_results(results, use_fragment)?;
        let scopes = results
            .get_or_fail(keys::SCOPE)?
            .value_or_fail::<Vec<String>>()?;

        if !scopes.iter().any(|s| s == "openid") {
            return Err(redirect
                .redirect(OidcServerError::invalid_request(
                    "scope",
                    Some("Scope openid is required"),
                ))
                .into());
        }

        Ok(None)
    }
}
