//! Declarative catalog of external providers the UI knows how to link.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};
use tracing::warn;

/// How linking with a provider is started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LinkModality {
    /// Full navigation to the provider's OAuth authorize URL.
    #[strum(to_string = "redirect", serialize = "bearer", serialize = "oauth")]
    Redirect,
    /// The user pastes a key issued by the provider.
    #[strum(to_string = "api_key", serialize = "apikey")]
    ApiKey,
}

/// Presentation and linking metadata for one provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    pub id: String,
    pub display_name: String,
    pub link_modality: LinkModality,
    pub icon_id: String,
    /// Where users can create a key, for API-key providers.
    pub docs_href: Option<String>,
}

impl Provider {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        link_modality: LinkModality,
    ) -> Self {
        let id = id.into();
        Self {
            icon_id: id.clone(),
            id,
            display_name: display_name.into(),
            link_modality,
            docs_href: None,
        }
    }

    pub fn with_icon(mut self, icon_id: impl Into<String>) -> Self {
        self.icon_id = icon_id.into();
        self
    }

    pub fn with_docs_href(mut self, href: impl Into<String>) -> Self {
        self.docs_href = Some(href.into());
        self
    }
}

/// Immutable `provider id → Provider` table, kept in declaration order.
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    providers: Vec<Provider>,
    index: HashMap<String, usize>,
}

impl ProviderRegistry {
    /// Build a registry. Later duplicates of an id are ignored.
    pub fn new(providers: impl IntoIterator<Item = Provider>) -> Self {
        let mut list = Vec::new();
        let mut index = HashMap::new();
        for provider in providers {
            if index.contains_key(&provider.id) {
                warn!(provider = %provider.id, "Duplicate provider id ignored");
                continue;
            }
            index.insert(provider.id.clone(), list.len());
            list.push(provider);
        }
        Self {
            providers: list,
            index,
        }
    }

    /// Build from the administrator's provider list setting.
    ///
    /// Entries look like `{"name", "fullName", "type": "bearer"|"apikey",
    /// "logo"?, "docs_href"?}`. Malformed entries are skipped.
    pub fn from_setting(entries: &[Value]) -> Self {
        Self::new(entries.iter().filter_map(|entry| {
            let parsed = serde_json::from_value::<ProviderEntry>(entry.clone())
                .ok()
                .and_then(ProviderEntry::into_provider);
            if parsed.is_none() {
                warn!(entry = %entry, "Skipping malformed provider entry");
            }
            parsed
        }))
    }

    pub fn get(&self, id: &str) -> Option<&Provider> {
        self.index.get(id).map(|&i| &self.providers[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Providers in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Provider> {
        self.providers.iter()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new([
            Provider::new("orcid", "ORCID", LinkModality::Redirect),
            Provider::new("globus", "Globus", LinkModality::Redirect),
            Provider::new("box", "Box", LinkModality::Redirect),
            Provider::new("zenodo", "Zenodo", LinkModality::ApiKey),
            Provider::new("dataverse", "Dataverse", LinkModality::ApiKey),
        ])
    }
}

#[derive(Debug, Deserialize)]
struct ProviderEntry {
    name: String,
    #[serde(rename = "fullName")]
    full_name: Option<String>,
    #[serde(rename = "type")]
    kind: String,
    logo: Option<String>,
    docs_href: Option<String>,
}

impl ProviderEntry {
    fn into_provider(self) -> Option<Provider> {
        let name = self.name.trim();
        if name.is_empty() {
            return None;
        }
        let modality: LinkModality = self.kind.trim().to_ascii_lowercase().parse().ok()?;
        let mut provider = Provider::new(name, self.full_name.unwrap_or_else(|| name.to_string()), modality);
        if let Some(logo) = self.logo.filter(|l| !l.is_empty()) {
            provider = provider.with_icon(logo);
        }
        if let Some(href) = self.docs_href.filter(|h| !h.is_empty()) {
            provider = provider.with_docs_href(href);
        }
        Some(provider)
    }
}
