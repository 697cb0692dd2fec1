use super::{client, keys};
use crate::checker::{RequestRule, ResultBag, RuleData, RuleResult};
use crate::error::Result;
use crate::oauth::OidcServerError;
use crate::request::ServerRequest;

/// Validates `redirect_uri` against the client's registered URIs.
///
/// Requires the `client_id` result. Produces the redirect URI as a `String`.
/// Errors are never redirected: the URI is not trusted yet.
#[derive(Debug, Clone, Copy, Default)]
pub struct RedirectUriRule;

impl RequestRule for RedirectUriRule {
    fn key(&self) -> &str {
        keys::REDIRECT_URI
    }

    fn check_rule(
        &self,
        request: &ServerRequest,
        results: &ResultBag,
        _data: &mut RuleData,
        use_fragment: bool,
    ) -> Result<Option<RuleResult>> {
        let client = client(results)?;

        let Some(redirect_uri) = request.param("redirect_uri") else {
            return Err(OidcServerError::invalid_request("redirect_uri", None)
                .with_fragment(use_fragment)
                .into());
        };

        if !client.has_redirect_uri(redirect_uri) {
            return Err(OidcServerError::invalid_client()
                .with_hint("Redirect URI is not registered for this client")
                .with_fragment(use_fragment)
                .into());
        }

        Ok(Some(RuleResult::new(
            keys::REDIRECT_URI,
            redirect_uri.to_string(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::rules::test_support::{client, get};
    use crate::error::Error;
    use crate::oauth::ErrorCode;

    fn client_bag() -> ResultBag {
        let mut bag = ResultBag::new();
        bag.add(RuleResult::new(keys::CLIENT_ID, client()));
        bag
    }

    #[test]
    fn test_registered_uri() {
        let result = RedirectUriRule
            .check_rule(
                &get("/authorize?redirect_uri=https%3A%2F%2Frp.example%2Fcb"),
                &client_bag(),
                &mut RuleData::new(),
                false,
            )
            .unwrap()
            .unwrap();
        assert_eq!(
            result.value::<String>().map(String::as_str),
            Some("https://rp.example/cb")
        );
    }

    #[test]
    fn test_unregistered_uri() {
        let err = RedirectUriRule
            .check_rule(
                &get("/authorize?redirect_uri=https%3A%2F%2Fevil.example%2Fcb"),
                &client_bag(),
                &mut RuleData::new(),
                true,
            )
            .unwrap_err();
        let protocol = err.as_protocol().unwrap();
        assert_eq!(protocol.code(), ErrorCode::InvalidClient);
        assert!(protocol.uses_fragment());
        assert!(protocol.redirect_location().is_none());
    }

    #[test]
    fn test_missing_uri() {
        let err = RedirectUriRule
            .check_rule(&get("/authorize"), &client_bag(), &mut RuleData::new(), false)
            .unwrap_err();
        assert_eq!(err.as_protocol().unwrap().code(), ErrorCode::InvalidRequest);
    }

    #[test]
    fn test_requires_client_result() {
        let err = RedirectUriRule
            .check_rule(
                &get("/authorize?redirect_uri=x"),
                &ResultBag::new(),
                &mut RuleData::new(),
                false,
            )
            .unwrap_err();
        assert!(matches!(err, Error::ResultNotSet(_)));
    }
}
