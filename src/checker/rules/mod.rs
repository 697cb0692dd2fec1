//! Built-in rules for authorization requests.
//!
//! Each rule is registered under one of the keys in [`keys`]. Rules that
//! depend on earlier results read them with
//! [`ResultBag::get_or_fail`](super::ResultBag::get_or_fail), so a missing
//! dependency surfaces as a configuration error. A typical authorization
//! request runs, in order:
//!
//! ```text
//! state, client_id, redirect_uri, scope, required_openid_scope, code_challenge_method
//! ```

mod client_id;
mod code_challenge_method;
mod redirect_uri;
mod required_openid_scope;
mod scope;
mod state;

pub use client_id::ClientIdRule;
pub use code_challenge_method::{CodeChallengeMethodRule, SUPPORTED_CODE_CHALLENGE_METHODS};
pub use redirect_uri::RedirectUriRule;
pub use required_openid_scope::RequiredOpenIdScopeRule;
pub use scope::ScopeRule;
pub use state::StateRule;

use super::bag::ResultBag;
use crate::error::Result;
use crate::oauth::{ClientEntity, OidcServerError};

/// Registry keys of the built-in rules.
pub mod keys {
    pub const STATE: &str = "state";
    pub const CLIENT_ID: &str = "client_id";
    pub const REDIRECT_URI: &str = "redirect_uri";
    pub const SCOPE: &str = "scope";
    pub const REQUIRED_OPENID_SCOPE: &str = "required_openid_scope";
    pub const CODE_CHALLENGE_METHOD: &str = "code_challenge_method";
}

/// Keys of values the built-in rules read from the data context.
pub mod data_keys {
    /// `String` used when the request carries no `scope` parameter.
    pub const DEFAULT_SCOPE: &str = "default_scope";
    /// `String` separating scopes in the `scope` parameter. Defaults to a space.
    pub const SCOPE_DELIMITER: &str = "scope_delimiter";
}

/// The client resolved by [`ClientIdRule`].
fn client(results: &ResultBag) -> Result<&ClientEntity> {
    results.get_or_fail(keys::CLIENT_ID)?.value_or_fail()
}

/// Redirect target for errors raised after the redirect URI is validated.
struct RedirectContext {
    redirect_uri: String,
    state: Option<String>,
    use_fragment: bool,
}

impl RedirectContext {
    fn from_results(results: &ResultBag, use_fragment: bool) -> Result<Self> {
        let redirect_uri = results
            .get_or_fail(keys::REDIRECT_URI)?
            .value_or_fail::<String>()?
            .clone();
        let state = results
            .get_or_fail(keys::STATE)?
            .value_or_fail::<Option<String>>()?
            .clone();
        Ok(Self {
            redirect_uri,
            state,
            use_fragment,
        })
    }

    fn redirect(&self, error: OidcServerError) -> OidcServerError {
        error
            .with_redirect_uri(Some(self.redirect_uri.clone()))
            .with_state(self.state.clone())
            .with_fragment(self.use_fragment)
    }
}
