//! The closed schema of administrator settings this crate understands.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{json, Value};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// A known setting. The strum names are the keys used on the wire.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, EnumIter, IntoStaticStr,
)]
pub enum SettingKey {
    #[strum(serialize = "branding.brand_name")]
    BrandName,
    #[strum(serialize = "branding.banner_color")]
    BannerColor,
    /// File id of the uploaded logo asset.
    #[strum(serialize = "branding.logo")]
    Logo,
    #[strum(serialize = "links.dashboard_url")]
    DashboardUrl,
    #[strum(serialize = "links.dashboard_link_title")]
    DashboardLinkTitle,
    #[strum(serialize = "links.website_url")]
    WebsiteUrl,
    #[strum(serialize = "links.catalog_link_title")]
    CatalogLinkTitle,
    #[strum(serialize = "links.about_href")]
    AboutHref,
    #[strum(serialize = "links.contact_href")]
    ContactHref,
    #[strum(serialize = "links.bug_href")]
    BugHref,
    #[strum(serialize = "features.data_catalog")]
    EnableDataCatalog,
    #[strum(serialize = "features.dav_server")]
    DavServer,
    #[strum(serialize = "limits.instance_cap")]
    InstanceCap,
    #[strum(serialize = "storage.homes_root")]
    HomesRoot,
    #[strum(serialize = "storage.workspaces_root")]
    WorkspacesRoot,
    #[strum(serialize = "storage.versions_root")]
    VersionsRoot,
    #[strum(serialize = "storage.runs_root")]
    RunsRoot,
    /// Directory of known Dataverse installations.
    #[strum(serialize = "dataverse.installations_url")]
    DataverseUrl,
    /// Dataverse hosts accepted in addition to the directory.
    #[strum(serialize = "dataverse.extra_hosts")]
    DataverseExtraHosts,
    #[strum(serialize = "accounts.external_auth_providers")]
    ExternalAuthProviders,
    #[strum(serialize = "accounts.external_apikey_groups")]
    ExternalApiKeyGroups,
    #[strum(serialize = "accounts.publisher_repositories")]
    PublisherRepositories,
}

const DEFAULT_DATAVERSE_URL: &str =
    "https://iqss.github.io/dataverse-installations/data/data.json";

/// Keys the header and footer chrome consume.
pub const BRANDING_KEYS: &[SettingKey] = &[
    SettingKey::Logo,
    SettingKey::DashboardUrl,
    SettingKey::DashboardLinkTitle,
    SettingKey::BannerColor,
    SettingKey::AboutHref,
    SettingKey::ContactHref,
    SettingKey::BugHref,
];

/// Declared type of a setting's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum SettingKind {
    Text,
    Url,
    Color,
    Boolean,
    Integer,
    List,
}

impl SettingKey {
    /// Wire name, e.g. `"branding.logo"`.
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    pub fn kind(self) -> SettingKind {
        use SettingKey::*;
        match self {
            BrandName | Logo | DashboardLinkTitle | CatalogLinkTitle | HomesRoot
            | WorkspacesRoot | VersionsRoot | RunsRoot => SettingKind::Text,
            DashboardUrl | WebsiteUrl | AboutHref | ContactHref | BugHref | DataverseUrl => {
                SettingKind::Url
            }
            BannerColor => SettingKind::Color,
            EnableDataCatalog | DavServer => SettingKind::Boolean,
            InstanceCap => SettingKind::Integer,
            DataverseExtraHosts
            | ExternalAuthProviders
            | ExternalApiKeyGroups
            | PublisherRepositories => SettingKind::List,
        }
    }

    /// Value used when the store reports neither an override nor a default.
    pub fn declared_default(self) -> Value {
        use SettingKey::*;
        match self {
            BrandName => json!("Data Platform"),
            BannerColor => json!("#132f43"),
            DashboardLinkTitle => json!("Dashboard"),
            CatalogLinkTitle => json!("Data Catalog"),
            EnableDataCatalog | DavServer => json!(false),
            InstanceCap => json!(2),
            DataverseUrl => json!(DEFAULT_DATAVERSE_URL),
            DataverseExtraHosts
            | ExternalAuthProviders
            | ExternalApiKeyGroups
            | PublisherRepositories => json!([]),
            Logo | DashboardUrl | WebsiteUrl | AboutHref | ContactHref | BugHref | HomesRoot
            | WorkspacesRoot | VersionsRoot | RunsRoot => Value::Null,
        }
    }
}

impl SettingKind {
    /// Check a value before it is written. `null` resets to the default and
    /// is valid for every kind.
    pub fn validate(self, value: &Value) -> Result<(), String> {
        if value.is_null() {
            return Ok(());
        }
        match self {
            SettingKind::Text => value
                .as_str()
                .map(|_| ())
                .ok_or_else(|| "expected a string".to_string()),
            SettingKind::Url => {
                let s = value.as_str().ok_or_else(|| "expected a URL string".to_string())?;
                if s.trim().is_empty() {
                    return Ok(());
                }
                reqwest::Url::parse(s.trim())
                    .map(|_| ())
                    .map_err(|e| format!("invalid URL {s:?}: {e}"))
            }
            SettingKind::Color => {
                let s = value.as_str().ok_or_else(|| "expected a color string".to_string())?;
                if color_pattern().is_match(s) {
                    Ok(())
                } else {
                    Err(format!("invalid color {s:?}, expected #rgb or #rrggbb"))
                }
            }
            SettingKind::Boolean => value
                .as_bool()
                .map(|_| ())
                .ok_or_else(|| "expected true or false".to_string()),
            SettingKind::Integer => value
                .as_u64()
                .map(|_| ())
                .ok_or_else(|| "expected a non-negative integer".to_string()),
            SettingKind::List => value
                .as_array()
                .map(|_| ())
                .ok_or_else(|| "expected a list".to_string()),
        }
    }
}

fn color_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("static color pattern")
    })
}
