use super::keys;
use crate::checker::{RequestRule, ResultBag, RuleData, RuleResult};
use crate::error::Result;
use crate::oauth::{ClientRepository, OidcServerError};
use crate::request::ServerRequest;

/// Resolves the `client_id` parameter to a registered, enabled client.
///
/// Produces the [`ClientEntity`](crate::oauth::ClientEntity).
#[derive(Debug, Clone)]
pub struct ClientIdRule<R> {
    clients: R,
}

impl<R: ClientRepository> ClientIdRule<R> {
    pub fn new(clients: R) -> Self {
        Self { clients }
    }
}

impl<R: ClientRepository> RequestRule for ClientIdRule<R> {
    fn key(&self) -> &str {
        keys::CLIENT_ID
    }

    fn check_rule(
        &self,
        request: &ServerRequest,
        _results: &ResultBag,
        _data: &mut RuleData,
        use_fragment: bool,
    ) -> Result<Option<RuleResult>> {
        let Some(client_id) = request.param("client_id") else {
            return Err(OidcServerError::invalid_request("client_id", None)
                .with_fragment(use_fragment)
                .into());
        };

        let client = self
            .clients
            .find_by_id(client_id)
            .filter(|c| c.is_enabled)
            .ok_or_else(|| OidcServerError::invalid_client().with_fragment(use_fragment))?;

        Ok(Some(RuleResult::new(keys::CLIENT_ID, client)))
    }
}
