use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::service::AccountService;
use super::types::{
    AccountEntry, ApiKeySubmission, Authorization, AuthorizationState, AuthorizedAccount,
    CapturedKey, LinkOutcome, LinkState, LinkableProvider,
};
use crate::error::LinkError;
use crate::registry::{LinkModality, Provider, ProviderRegistry};

/// Host hook that performs a full navigation away from the application.
pub trait Navigator: Send + Sync {
    fn navigate(&self, url: &str);
}

/// Host hook that asks the user for an API key, e.g. in a modal dialog.
#[async_trait]
pub trait KeyCapture: Send + Sync {
    /// `targets` lists the resource servers the key may be scoped to.
    /// Returns `None` when the user dismisses the flow.
    async fn capture(&self, provider: &Provider, targets: &[String]) -> Option<CapturedKey>;
}

/// Partition every registry provider into exactly one bucket.
///
/// A provider with any active grant is authorized, even if other resource
/// servers under it are still unlinked. Entries naming providers the
/// registry does not describe are skipped.
pub fn classify(entries: &[AccountEntry], registry: &ProviderRegistry) -> LinkState {
    let mut by_provider: HashMap<&str, Vec<&AccountEntry>> = HashMap::new();
    for entry in entries {
        if !registry.contains(&entry.provider_id) {
            debug!(provider = %entry.provider_id, "Skipping listed provider without descriptor");
            continue;
        }
        by_provider
            .entry(entry.provider_id.as_str())
            .or_default()
            .push(entry);
    }

    let mut state = LinkState::default();
    for provider in registry.iter() {
        let listed = by_provider.remove(provider.id.as_str()).unwrap_or_default();
        let mut authorizations: Vec<Authorization> = listed
            .iter()
            .filter(|e| e.state == AuthorizationState::Authorized)
            .map(|e| Authorization::from(*e))
            .collect();

        if !authorizations.is_empty() {
            if provider.link_modality == LinkModality::Redirect && authorizations.len() > 1 {
                warn!(provider = %provider.id, count = authorizations.len(), "Redirect provider listed with several grants");
                authorizations.truncate(1);
            }
            state.authorized.push(AuthorizedAccount {
                provider: provider.clone(),
                authorizations,
            });
            continue;
        }

        match provider.link_modality {
            LinkModality::Redirect => state.linkable_redirect.push(LinkableProvider {
                provider: provider.clone(),
                authorize_url: listed.iter().find_map(|e| e.authorize_url.clone()),
            }),
            LinkModality::ApiKey => state.linkable_api_key.push(provider.clone()),
        }
    }
    state
}

/// Orchestrates listing, linking and revoking external accounts.
///
/// Holds no authorization state of its own: every answer is re-derived from
/// the account service.
#[derive(Clone)]
pub struct AccountLinkManager {
    service: Arc<dyn AccountService>,
    registry: ProviderRegistry,
    navigator: Arc<dyn Navigator>,
    key_capture: Arc<dyn KeyCapture>,
}

impl AccountLinkManager {
    pub fn new(
        service: Arc<dyn AccountService>,
        registry: ProviderRegistry,
        navigator: Arc<dyn Navigator>,
        key_capture: Arc<dyn KeyCapture>,
    ) -> Self {
        Self {
            service,
            registry,
            navigator,
            key_capture,
        }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Fetch the current authorizations and classify them.
    ///
    /// Any listing failure fails the call; no partial buckets are returned.
    pub async fn list_state(&self, redirect_target: &str) -> Result<LinkState, LinkError> {
        let entries = self.service.list(redirect_target).await.map_err(|e| {
            warn!(error = %e, "Listing external accounts failed");
            e
        })?;
        Ok(classify(&entries, &self.registry))
    }

    /// Start linking a provider.
    ///
    /// Redirect providers hand control to the navigator using the authorize
    /// URL from `state`. API-key providers open the capture flow and submit
    /// the entered key. `state` is never modified; call
    /// [`list_state`](Self::list_state) after a submitted key.
    pub async fn begin_link(
        &self,
        state: &LinkState,
        provider_id: &str,
    ) -> Result<LinkOutcome, LinkError> {
        let provider = self
            .registry
            .get(provider_id)
            .ok_or_else(|| LinkError::UnknownProvider(provider_id.to_string()))?;

        match provider.link_modality {
            LinkModality::Redirect => {
                let url = state
                    .authorize_url(provider_id)
                    .ok_or_else(|| LinkError::MissingAuthorizeUrl(provider_id.to_string()))?
                    .to_string();
                debug!(provider = provider_id, "Navigating to provider authorization");
                self.navigator.navigate(&url);
                Ok(LinkOutcome::Navigated { url })
            }
            LinkModality::ApiKey => {
                let targets = self.service.api_key_targets(provider_id).await?;
                let Some(captured) = self.key_capture.capture(provider, &targets).await else {
                    return Ok(LinkOutcome::Cancelled);
                };
                let key = captured.key.trim();
                if key.is_empty() {
                    return Err(LinkError::InvalidArgument("API key is empty".to_string()));
                }
                let submission = ApiKeySubmission {
                    provider_id: provider_id.to_string(),
                    key: key.to_string(),
                    resource_server: captured.resource_server.filter(|rs| !rs.is_empty()),
                };
                self.service
                    .submit_api_key(&submission)
                    .await
                    .map_err(|e| {
                        warn!(provider = provider_id, error = %e, "API key submission failed");
                        e
                    })?;
                Ok(LinkOutcome::KeySubmitted {
                    provider_id: submission.provider_id,
                    resource_server: submission.resource_server,
                })
            }
        }
    }

    /// Revoke a grant, optionally only the one for `resource_server`.
    ///
    /// Not retried. On success the caller re-lists; on failure nothing local
    /// has changed.
    pub async fn revoke(
        &self,
        provider_id: &str,
        resource_server: Option<&str>,
    ) -> Result<(), LinkError> {
        self.service
            .revoke(provider_id, resource_server)
            .await
            .map_err(|e| {
                warn!(provider = provider_id, resource_server, error = %e, "Revoke failed");
                e
            })
    }

    /// Resource servers still open for a new key under an API-key provider.
    pub async fn api_key_targets(&self, provider_id: &str) -> Result<Vec<String>, LinkError> {
        let provider = self
            .registry
            .get(provider_id)
            .ok_or_else(|| LinkError::UnknownProvider(provider_id.to_string()))?;
        if provider.link_modality != LinkModality::ApiKey {
            return Err(LinkError::InvalidArgument(format!(
                "{provider_id} is not linked with an API key"
            )));
        }
        self.service.api_key_targets(provider_id).await
    }
}
