#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use extlink::accounts::{
    AccountEntry, AccountLinkManager, AccountService, ApiKeySubmission, AuthorizationState,
    CapturedKey, KeyCapture, Navigator,
};
use extlink::error::LinkError;
use extlink::registry::{LinkModality, Provider, ProviderRegistry};
use extlink::settings::{Fallback, SettingKey, SettingsStore};
use serde_json::Value;
use tokio::sync::{oneshot, Notify};

pub fn entry(provider: &str, rs: Option<&str>, state: AuthorizationState) -> AccountEntry {
    AccountEntry {
        provider_id: provider.to_string(),
        resource_server: rs.map(str::to_string),
        state,
        authorize_url: None,
    }
}

pub fn linkable(provider: &str, authorize_url: &str) -> AccountEntry {
    AccountEntry {
        authorize_url: Some(authorize_url.to_string()),
        ..entry(provider, None, AuthorizationState::NotAuthorized)
    }
}

pub fn registry() -> ProviderRegistry {
    ProviderRegistry::new([
        Provider::new("orcid", "ORCID", LinkModality::Redirect),
        Provider::new("globus", "Globus", LinkModality::Redirect),
        Provider::new("zenodo", "Zenodo", LinkModality::ApiKey),
    ])
}

/// Account service backed by a vector of listing rows.
#[derive(Default)]
pub struct InMemoryAccountService {
    entries: Mutex<Vec<AccountEntry>>,
    targets: Mutex<HashMap<String, Vec<String>>>,
    submissions: Mutex<Vec<ApiKeySubmission>>,
    fail_revoke: Mutex<bool>,
    fail_list: Mutex<bool>,
    gate: Mutex<Option<oneshot::Receiver<()>>>,
    pub entered: Notify,
    pub list_calls: AtomicUsize,
}

impl InMemoryAccountService {
    pub fn new(entries: Vec<AccountEntry>) -> Self {
        Self {
            entries: Mutex::new(entries),
            ..Self::default()
        }
    }

    pub fn set_targets(&self, provider: &str, targets: &[&str]) {
        self.targets.lock().expect("targets lock poisoned").insert(
            provider.to_string(),
            targets.iter().map(|t| t.to_string()).collect(),
        );
    }

    pub fn set_fail_revoke(&self, fail: bool) {
        *self.fail_revoke.lock().expect("flag lock poisoned") = fail;
    }

    pub fn set_fail_list(&self, fail: bool) {
        *self.fail_list.lock().expect("flag lock poisoned") = fail;
    }

    /// Hold the next listing until the returned sender fires.
    pub fn hold_next_list(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.gate.lock().expect("gate lock poisoned") = Some(rx);
        tx
    }

    pub fn entries(&self) -> Vec<AccountEntry> {
        self.entries.lock().expect("entries lock poisoned").clone()
    }

    pub fn submissions(&self) -> Vec<ApiKeySubmission> {
        self.submissions
            .lock()
            .expect("submissions lock poisoned")
            .clone()
    }
}

#[async_trait]
impl AccountService for InMemoryAccountService {
    async fn list(&self, _redirect: &str) -> Result<Vec<AccountEntry>, LinkError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if *self.fail_list.lock().expect("flag lock poisoned") {
            return Err(LinkError::api(503, "listing down"));
        }
        let snapshot = self.entries();
        let gate = self.gate.lock().expect("gate lock poisoned").take();
        if let Some(rx) = gate {
            self.entered.notify_one();
            let _ = rx.await;
        }
        Ok(snapshot)
    }

    async fn revoke(
        &self,
        provider_id: &str,
        resource_server: Option<&str>,
    ) -> Result<(), LinkError> {
        if *self.fail_revoke.lock().expect("flag lock poisoned") {
            return Err(LinkError::api(500, "revoke failed"));
        }
        self.entries
            .lock()
            .expect("entries lock poisoned")
            .retain(|e| {
                e.provider_id != provider_id
                    || (resource_server.is_some() && e.resource_server.as_deref() != resource_server)
            });
        Ok(())
    }

    async fn submit_api_key(&self, submission: &ApiKeySubmission) -> Result<(), LinkError> {
        self.submissions
            .lock()
            .expect("submissions lock poisoned")
            .push(submission.clone());
        self.entries
            .lock()
            .expect("entries lock poisoned")
            .push(entry(
                &submission.provider_id,
                submission.resource_server.as_deref(),
                AuthorizationState::Authorized,
            ));
        Ok(())
    }

    async fn api_key_targets(&self, provider_id: &str) -> Result<Vec<String>, LinkError> {
        Ok(self
            .targets
            .lock()
            .expect("targets lock poisoned")
            .get(provider_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    visited: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().expect("navigator lock poisoned").clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, url: &str) {
        self.visited
            .lock()
            .expect("navigator lock poisoned")
            .push(url.to_string());
    }
}

/// Returns a preset key once, then behaves as if the user dismissed the flow.
#[derive(Default)]
pub struct ScriptedKeyCapture {
    next: Mutex<Option<CapturedKey>>,
    offered: Mutex<Vec<Vec<String>>>,
}

impl ScriptedKeyCapture {
    pub fn will_enter(&self, key: &str, resource_server: Option<&str>) {
        *self.next.lock().expect("capture lock poisoned") = Some(CapturedKey {
            key: key.to_string(),
            resource_server: resource_server.map(str::to_string),
        });
    }

    pub fn offered(&self) -> Vec<Vec<String>> {
        self.offered.lock().expect("capture lock poisoned").clone()
    }
}

#[async_trait]
impl KeyCapture for ScriptedKeyCapture {
    async fn capture(&self, _provider: &Provider, targets: &[String]) -> Option<CapturedKey> {
        self.offered
            .lock()
            .expect("capture lock poisoned")
            .push(targets.to_vec());
        self.next.lock().expect("capture lock poisoned").take()
    }
}

pub struct Harness {
    pub service: Arc<InMemoryAccountService>,
    pub navigator: Arc<RecordingNavigator>,
    pub capture: Arc<ScriptedKeyCapture>,
    pub manager: AccountLinkManager,
}

pub fn harness(entries: Vec<AccountEntry>) -> Harness {
    let service = Arc::new(InMemoryAccountService::new(entries));
    let navigator = Arc::new(RecordingNavigator::default());
    let capture = Arc::new(ScriptedKeyCapture::default());
    let manager = AccountLinkManager::new(
        service.clone(),
        registry(),
        navigator.clone(),
        capture.clone(),
    );
    Harness {
        service,
        navigator,
        capture,
        manager,
    }
}

/// Settings store answering from two fixed maps, optionally failing one pass.
#[derive(Default)]
pub struct ScriptedSettingsStore {
    pub explicit: HashMap<String, Value>,
    pub defaults: HashMap<String, Value>,
    pub fail: Option<Fallback>,
    pub stored: Mutex<Vec<(SettingKey, Value)>>,
    pub fetches: AtomicUsize,
}

impl ScriptedSettingsStore {
    pub fn new(explicit: &[(SettingKey, Value)], defaults: &[(SettingKey, Value)]) -> Self {
        let to_map = |pairs: &[(SettingKey, Value)]| -> HashMap<String, Value> {
            pairs
                .iter()
                .map(|(k, v)| (k.as_str().to_string(), v.clone()))
                .collect()
        };
        Self {
            explicit: to_map(explicit),
            defaults: to_map(defaults),
            ..Self::default()
        }
    }

    pub fn failing(fallback: Fallback) -> Self {
        Self {
            fail: Some(fallback),
            ..Self::default()
        }
    }
}

#[async_trait]
impl SettingsStore for ScriptedSettingsStore {
    async fn fetch(
        &self,
        keys: &[SettingKey],
        fallback: Fallback,
    ) -> Result<HashMap<String, Value>, LinkError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail == Some(fallback) {
            return Err(LinkError::api(503, "settings unavailable"));
        }
        let source = match fallback {
            Fallback::None => &self.explicit,
            Fallback::Default => &self.defaults,
        };
        Ok(keys
            .iter()
            .filter_map(|k| source.get(k.as_str()).map(|v| (k.as_str().to_string(), v.clone())))
            .collect())
    }

    async fn store(&self, updates: &[(SettingKey, Value)]) -> Result<(), LinkError> {
        self.stored
            .lock()
            .expect("stored lock poisoned")
            .extend(updates.iter().cloned());
        Ok(())
    }
}
