use super::{RedirectContext, keys};
use crate::checker::{RequestRule, ResultBag, RuleData, RuleResult};
use crate::error::Result;
use crate::oauth::OidcServerError;
use crate::request::ServerRequest;

/// PKCE methods accepted for `code_challenge_method` (RFC 7636 Section 4.3).
pub const SUPPORTED_CODE_CHALLENGE_METHODS: [&str; 2] = ["plain", "S256"];

/// Validates `code_challenge_method`, defaulting to `plain`.
///
/// Requires the `state` and `redirect_uri` results. Produces the method as a
/// `String`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodeChallengeMethodRule;

impl RequestRule for CodeChallengeMethodRule {
    fn key(&self) -> &str {
        keys::CODE_CHALLENGE_METHOD
    }

    fn check_rule(
        &self,
        request: &ServerRequest,
        results: &ResultBag,
        _data: &mut RuleData,
        use_fragment: bool,
    ) -> Result<Option<RuleResult>> {
        let redirect = RedirectContext::from_results(results, use_fragment)?;
        let method = request.param("code_challenge_method").unwrap_or("plain");

        if !SUPPORTED_CODE_CHALLENGE_METHODS.contains(&method) {
            let hint = format!(
                "Code challenge method must be one of {}",
                SUPPORTED_CODE_CHALLENGE_METHODS.join(", ")
            );
            return Err(redirect
                .redirect(OidcServerError::invalid_request(
                    "code_challenge_method",
                    Some(&hint),
                ))
                .into());
        }

        Ok(Some(RuleResult::new(
            keys::CODE_CHALLENGE_METHOD,
            method.to_string(),
        )))
    }
}
