use serde::{Deserialize, Serialize};

use crate::registry::Provider;

/// Whether a listed grant is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationState {
    #[serde(alias = "Authorized")]
    Authorized,
    #[serde(alias = "NotAuthorized", alias = "unauthorized")]
    NotAuthorized,
}

/// One row of the authorization listing service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountEntry {
    pub provider_id: String,
    #[serde(default)]
    pub resource_server: Option<String>,
    pub state: AuthorizationState,
    /// Present for redirect providers that can still be linked.
    #[serde(default)]
    pub authorize_url: Option<String>,
}

/// A recorded grant linking the user to a provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Authorization {
    pub provider_id: String,
    /// Distinguishes several API-key grants under one provider.
    pub resource_server: Option<String>,
    pub state: AuthorizationState,
}

impl From<&AccountEntry> for Authorization {
    fn from(entry: &AccountEntry) -> Self {
        Self {
            provider_id: entry.provider_id.clone(),
            resource_server: entry.resource_server.clone(),
            state: entry.state,
        }
    }
}

/// A provider with at least one active grant, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizedAccount {
    pub provider: Provider,
    /// Every active grant; API-key providers may have one per resource server.
    pub authorizations: Vec<Authorization>,
}

impl AuthorizedAccount {
    pub fn resource_servers(&self) -> impl Iterator<Item = Option<&str>> {
        self.authorizations.iter().map(|a| a.resource_server.as_deref())
    }
}

/// A redirect provider that can be linked, with the URL to navigate to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkableProvider {
    pub provider: Provider,
    pub authorize_url: Option<String>,
}

/// Every registry provider, in exactly one bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkState {
    pub authorized: Vec<AuthorizedAccount>,
    pub linkable_redirect: Vec<LinkableProvider>,
    pub linkable_api_key: Vec<Provider>,
}

impl LinkState {
    /// Whether an active grant exists for the provider, optionally for one
    /// resource server.
    pub fn is_authorized(&self, provider_id: &str, resource_server: Option<&str>) -> bool {
        self.authorized
            .iter()
            .filter(|a| a.provider.id == provider_id)
            .any(|a| match resource_server {
                None => true,
                Some(rs) => a.resource_servers().any(|s| s == Some(rs)),
            })
    }

    pub fn authorize_url(&self, provider_id: &str) -> Option<&str> {
        self.linkable_redirect
            .iter()
            .find(|l| l.provider.id == provider_id)
            .and_then(|l| l.authorize_url.as_deref())
    }

    pub fn len(&self) -> usize {
        self.authorized.len() + self.linkable_redirect.len() + self.linkable_api_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Body of an API-key submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeySubmission {
    pub provider_id: String,
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_server: Option<String>,
}

/// What the user entered in the key capture flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedKey {
    pub key: String,
    pub resource_server: Option<String>,
}

/// Result of starting a link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    /// Control was handed to the provider's authorize page.
    Navigated { url: String },
    /// A key was accepted by the platform; re-list to see it.
    KeySubmitted {
        provider_id: String,
        resource_server: Option<String>,
    },
    /// The user closed the capture flow without entering a key.
    Cancelled,
}
