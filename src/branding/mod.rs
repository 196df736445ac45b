//! Branding derived from settings and pushed into chrome regions.

pub mod propagator;
pub mod region;

pub use propagator::{apply_branding, BrandingPropagator};
pub use region::{ChromeHook, ChromeRegion, MemoryRegion};

use tracing::warn;

use crate::settings::{ResolvedSettings, SettingKey};

/// Query parameter carrying the session token on the dashboard link.
pub const DEFAULT_TOKEN_PARAM: &str = "token";

/// An insertion point in a chrome region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BrandingSlot {
    Logo,
    DashboardLink,
    BannerColor,
    FooterLinks,
}

/// Something inserted into a region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrandingElement {
    Logo { url: String },
    DashboardLink { url: String, title: Option<String> },
    BannerColor(String),
    FooterLinks(FooterLinks),
}

impl BrandingElement {
    pub fn slot(&self) -> BrandingSlot {
        match self {
            Self::Logo { .. } => BrandingSlot::Logo,
            Self::DashboardLink { .. } => BrandingSlot::DashboardLink,
            Self::BannerColor(_) => BrandingSlot::BannerColor,
            Self::FooterLinks(_) => BrandingSlot::FooterLinks,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FooterLinks {
    pub about: Option<String>,
    pub contact: Option<String>,
    pub bug: Option<String>,
}

impl FooterLinks {
    pub fn is_empty(&self) -> bool {
        self.about.is_none() && self.contact.is_none() && self.bug.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardLink {
    pub url: String,
    pub title: Option<String>,
}

/// Inputs besides settings needed to derive branding.
#[derive(Debug, Clone)]
pub struct BrandingContext {
    pub api_root: String,
    pub token: Option<String>,
    pub token_param: String,
}

impl BrandingContext {
    pub fn new(api_root: impl Into<String>, token: Option<String>) -> Self {
        Self {
            api_root: api_root.into(),
            token,
            token_param: DEFAULT_TOKEN_PARAM.to_string(),
        }
    }

    pub fn with_token_param(mut self, param: impl Into<String>) -> Self {
        self.token_param = param.into();
        self
    }
}

/// Presentation values for every branding slot. `None` means "leave the
/// slot alone".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Branding {
    pub logo_url: Option<String>,
    pub dashboard_link: Option<DashboardLink>,
    pub banner_color: Option<String>,
    pub footer: FooterLinks,
}

impl Branding {
    pub fn derive(settings: &ResolvedSettings, ctx: &BrandingContext) -> Self {
        let dashboard_link = settings.text(SettingKey::DashboardUrl).and_then(|raw| {
            match dashboard_url(raw, ctx.token.as_deref(), &ctx.token_param) {
                Ok(url) => Some(DashboardLink {
                    url,
                    title: settings
                        .text(SettingKey::DashboardLinkTitle)
                        .map(str::to_string),
                }),
                Err(e) => {
                    warn!(url = raw, error = %e, "Ignoring unparsable dashboard URL");
                    None
                }
            }
        });

        Self {
            logo_url: settings
                .text(SettingKey::Logo)
                .map(|asset| logo_url(&ctx.api_root, asset)),
            dashboard_link,
            banner_color: settings.text(SettingKey::BannerColor).map(str::to_string),
            footer: FooterLinks {
                about: settings.text(SettingKey::AboutHref).map(str::to_string),
                contact: settings.text(SettingKey::ContactHref).map(str::to_string),
                bug: settings.text(SettingKey::BugHref).map(str::to_string),
            },
        }
    }

    /// Elements to insert, in insertion order.
    pub fn elements(&self) -> Vec<BrandingElement> {
        let mut out = Vec::with_capacity(4);
        if let Some(url) = &self.logo_url {
            out.push(BrandingElement::Logo { url: url.clone() });
        }
        if let Some(link) = &self.dashboard_link {
            out.push(BrandingElement::DashboardLink {
                url: link.url.clone(),
                title: link.title.clone(),
            });
        }
        if let Some(color) = &self.banner_color {
            out.push(BrandingElement::BannerColor(color.clone()));
        }
        if !self.footer.is_empty() {
            out.push(BrandingElement::FooterLinks(self.footer.clone()));
        }
        out
    }
}

/// `<apiRoot>/file/<assetId>/download?contentDisposition=inline`
pub fn logo_url(api_root: &str, asset_id: &str) -> String {
    format!(
        "{}/file/{}/download?contentDisposition=inline",
        api_root.trim_end_matches('/'),
        asset_id.trim()
    )
}

/// Set (not append) the token query parameter on the dashboard URL.
///
/// Without a token the URL is returned normalized but otherwise unchanged.
pub fn dashboard_url(raw: &str, token: Option<&str>, param: &str) -> Result<String, String> {
    let mut url = reqwest::Url::parse(raw.trim()).map_err(|e| e.to_string())?;
    if let Some(token) = token {
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(k, _)| &**k != param)
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        url.query_pairs_mut()
            .clear()
            .extend_pairs(kept)
            .append_pair(param, token);
    }
    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use std::collections::HashMap;

    fn settings(pairs: &[(SettingKey, Value)]) -> ResolvedSettings {
        let keys: Vec<SettingKey> = pairs.iter().map(|(k, _)| *k).collect();
        let explicit: HashMap<String, Value> = pairs
            .iter()
            .map(|(k, v)| (k.as_str().to_string(), v.clone()))
            .collect();
        ResolvedSettings::merge(&keys, &explicit, &HashMap::new())
    }

    #[test]
    fn logo_url_joins_api_root_and_asset() {
        assert_eq!(
            logo_url("/api/v1", "abc123"),
            "/api/v1/file/abc123/download?contentDisposition=inline"
        );
        assert_eq!(
            logo_url("/api/v1/", "abc123"),
            "/api/v1/file/abc123/download?contentDisposition=inline"
        );
    }

    #[test]
    fn dashboard_token_replaces_existing_param() {
        let url = dashboard_url("https://dash.example.org/?token=old&x=1", Some("new"), "token").unwrap();
        assert_eq!(url, "https://dash.example.org/?x=1&token=new");
        let url = dashboard_url("https://dash.example.org/mine", None, "token").unwrap();
        assert_eq!(url, "https://dash.example.org/mine");
        assert!(dashboard_url("not a url", Some("t"), "token").is_err());
    }

    #[test]
    fn derive_skips_empty_and_null_slots() {
        let resolved = settings(&[
            (SettingKey::Logo, json!("")),
            (SettingKey::DashboardUrl, Value::Null),
            (SettingKey::BannerColor, json!("#112233")),
            (SettingKey::AboutHref, json!("https://about")),
        ]);
        let branding = Branding::derive(&resolved, &BrandingContext::new("/api/v1", Some("t".into())));
        assert_eq!(branding.logo_url, None);
        assert_eq!(branding.dashboard_link, None);
        assert_eq!(branding.banner_color.as_deref(), Some("#112233"));
        assert_eq!(
            branding.elements(),
            vec![
                BrandingElement::BannerColor("#112233".into()),
                BrandingElement::FooterLinks(FooterLinks {
                    about: Some("https://about".into()),
                    contact: None,
                    bug: None,
                }),
            ]
        );
    }

    #[test]
    fn derive_builds_dashboard_link_with_title() {
        let resolved = settings(&[
            (SettingKey::Logo, json!("abc123")),
            (SettingKey::DashboardUrl, json!("https://dash.example.org/")),
            (SettingKey::DashboardLinkTitle, json!("Tale Dashboard")),
        ]);
        let ctx = BrandingContext::new("/api/v1", Some("tok".into())).with_token_param("sessionToken");
        let branding = Branding::derive(&resolved, &ctx);
        assert_eq!(
            branding.logo_url.as_deref(),
            Some("/api/v1/file/abc123/download?contentDisposition=inline")
        );
        assert_eq!(
            branding.dashboard_link,
            Some(DashboardLink {
                url: "https://dash.example.org/?sessionToken=tok".into(),
                title: Some("Tale Dashboard".into()),
            })
        );
    }
}
