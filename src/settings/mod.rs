//! Two-pass settings resolution: explicit values merged over defaults.

pub mod keys;
pub mod store;

pub use keys::{SettingKey, SettingKind, BRANDING_KEYS};
pub use store::{Fallback, HttpSettingsStore, SettingsStore};

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde_json::Value;
use strum::IntoEnumIterator;
use tracing::{debug, warn};

use crate::error::{LinkError, SettingsPass};

/// One resolved setting.
#[derive(Debug, Clone, PartialEq)]
pub struct Setting {
    pub key: SettingKey,
    pub resolved_value: Value,
    pub default_value: Value,
}

impl Setting {
    /// Whether no administrator override is in effect.
    pub fn is_default(&self) -> bool {
        self.resolved_value == self.default_value
    }
}

/// Merged view of a set of settings.
///
/// Every requested key is present; callers never see "missing".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedSettings {
    settings: BTreeMap<SettingKey, Setting>,
}

impl ResolvedSettings {
    /// Merge the explicit pass over the defaults pass for `keys`.
    ///
    /// Order of precedence per key: explicit non-null value, store default,
    /// declared default. Keys absent from either map count as undefined.
    pub fn merge(
        keys: &[SettingKey],
        explicit: &HashMap<String, Value>,
        defaults: &HashMap<String, Value>,
    ) -> Self {
        let settings = keys
            .iter()
            .map(|&key| {
                let default_value = defaults
                    .get(key.as_str())
                    .filter(|v| !v.is_null())
                    .cloned()
                    .unwrap_or_else(|| key.declared_default());
                let resolved_value = explicit
                    .get(key.as_str())
                    .filter(|v| !v.is_null())
                    .cloned()
                    .unwrap_or_else(|| default_value.clone());
                (
                    key,
                    Setting {
                        key,
                        resolved_value,
                        default_value,
                    },
                )
            })
            .collect();
        Self { settings }
    }

    pub fn get(&self, key: SettingKey) -> Option<&Setting> {
        self.settings.get(&key)
    }

    pub fn keys(&self) -> impl Iterator<Item = SettingKey> + '_ {
        self.settings.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.settings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }

    /// Resolved value; `Null` for keys that were not requested.
    pub fn value(&self, key: SettingKey) -> &Value {
        static NULL: Value = Value::Null;
        self.settings
            .get(&key)
            .map(|s| &s.resolved_value)
            .unwrap_or(&NULL)
    }

    /// Non-empty string value, trimmed.
    pub fn text(&self, key: SettingKey) -> Option<&str> {
        self.value(key)
            .as_str()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn flag(&self, key: SettingKey) -> Option<bool> {
        self.value(key).as_bool()
    }

    pub fn integer(&self, key: SettingKey) -> Option<i64> {
        match self.value(key) {
            Value::Number(n) => n.as_i64(),
            // forms historically stored numbers as strings
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn list(&self, key: SettingKey) -> Option<&[Value]> {
        self.value(key).as_array().map(Vec::as_slice)
    }
}

/// Resolves settings against a [`SettingsStore`].
///
/// Holds no cache: every call goes back to the store so administrator edits
/// show up on the next view without any reload signal.
#[derive(Clone)]
pub struct SettingsResolver {
    store: Arc<dyn SettingsStore>,
}

impl SettingsResolver {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self { store }
    }

    /// Resolve `keys`, issuing the explicit and default queries concurrently.
    ///
    /// Either query failing fails the whole resolution.
    pub async fn resolve(&self, keys: &[SettingKey]) -> Result<ResolvedSettings, LinkError> {
        let mut ordered: Vec<SettingKey> = Vec::with_capacity(keys.len());
        for key in keys {
            if !ordered.contains(key) {
                ordered.push(*key);
            }
        }
        if ordered.is_empty() {
            return Ok(ResolvedSettings::default());
        }

        let explicit = async {
            self.store
                .fetch(&ordered, Fallback::None)
                .await
                .map_err(|e| LinkError::settings_pass(SettingsPass::Explicit, e))
        };
        let defaults = async {
            self.store
                .fetch(&ordered, Fallback::Default)
                .await
                .map_err(|e| LinkError::settings_pass(SettingsPass::Defaults, e))
        };
        let (explicit, defaults) = match tokio::try_join!(explicit, defaults) {
            Ok(passes) => passes,
            Err(e) => {
                warn!(error = %e, "Settings resolution failed");
                return Err(e);
            }
        };

        debug!(keys = ordered.len(), "Settings resolved");
        Ok(ResolvedSettings::merge(&ordered, &explicit, &defaults))
    }

    /// Resolve every known key.
    pub async fn resolve_all(&self) -> Result<ResolvedSettings, LinkError> {
        let keys: Vec<SettingKey> = SettingKey::iter().collect();
        self.resolve(&keys).await
    }

    /// Validate and write administrator values.
    ///
    /// Nothing is sent if any value fails validation.
    pub async fn save(&self, updates: &[(SettingKey, Value)]) -> Result<(), LinkError> {
        for (key, value) in updates {
            key.kind()
                .validate(value)
                .map_err(|e| LinkError::InvalidArgument(format!("{key}: {e}")))?;
        }
        if updates.is_empty() {
            return Ok(());
        }
        self.store.store(updates).await
    }
}
