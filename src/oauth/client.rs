//! Registered relying-party clients.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// A client registered with the authorization server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientEntity {
    pub id: String,
    pub name: String,
    /// Exact redirect URIs the client may use.
    #[serde(default)]
    pub redirect_uris: Vec<String>,
    /// Scopes the client may request. Empty means any supported scope.
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default)]
    pub is_confidential: bool,
    #[serde(default = "default_enabled")]
    pub is_enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl ClientEntity {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            redirect_uris: Vec::new(),
            scopes: Vec::new(),
            is_confidential: false,
            is_enabled: true,
        }
    }

    pub fn redirect_uri(mut self, uri: impl Into<String>) -> Self {
        self.redirect_uris.push(uri.into());
        self
    }

    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scopes.push(scope.into());
        self
    }

    pub fn confidential(mut self, is_confidential: bool) -> Self {
        self.is_confidential = is_confidential;
        self
    }

    pub fn enabled(mut self, is_enabled: bool) -> Self {
        self.is_enabled = is_enabled;
        self
    }

    pub fn has_redirect_uri(&self, uri: &str) -> bool {
        self.redirect_uris.iter().any(|u| u == uri)
    }

    /// Returns true if the client may request `scope`.
    pub fn allows_scope(&self, scope: &str) -> bool {
        self.scopes.is_empty() || self.scopes.iter().any(|s| s == scope)
    }
}

/// Lookup of registered clients.
pub trait ClientRepository: Send + Sync {
    fn find_by_id(&self, client_id: &str) -> Option<ClientEntity>;
}

impl<T: ClientRepository + ?Sized> ClientRepository for Arc<T> {
    fn find_by_id(&self, client_id: &str) -> Option<ClientEntity> {
        (**self).find_by_id(client_id)
    }
}

/// In-memory client store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryClientRepository {
    clients: HashMap<String, ClientEntity>,
}

impl InMemoryClientRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a client, replacing any client with the same id.
    pub fn client(mut self, client: ClientEntity) -> Self {
        self.clients.insert(client.id.clone(), client);
        self
    }
}

impl ClientRepository for InMemoryClientRepository {
    fn find_by_id(&self, client_id: &str) -> Option<ClientEntity> {
        self.clients.get(client_id).cloned()
    }
}
