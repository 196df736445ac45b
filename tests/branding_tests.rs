mod support;

use std::sync::Arc;

use extlink::branding::{
    apply_branding, BrandingContext, BrandingElement, BrandingPropagator, ChromeHook,
    ChromeRegion, FooterLinks, MemoryRegion,
};
use extlink::settings::{Fallback, SettingKey, SettingsResolver};
use pretty_assertions::assert_eq;
use serde_json::json;

use support::ScriptedSettingsStore;

fn resolver() -> SettingsResolver {
    SettingsResolver::new(Arc::new(ScriptedSettingsStore::new(
        &[
            (SettingKey::Logo, json!("abc123")),
            (SettingKey::DashboardUrl, json!("https://dash.example.org/?token=stale")),
            (SettingKey::AboutHref, json!("https://example.org/about")),
            (SettingKey::BugHref, json!("")),
        ],
        &[(SettingKey::BannerColor, json!("#3F3B3B"))],
    )))
}

fn ctx() -> BrandingContext {
    BrandingContext::new("/api/v1", Some("tok".into()))
}

#[tokio::test]
async fn logo_and_dashboard_land_in_the_header() {
    let propagator = BrandingPropagator::new();
    let header = Arc::new(MemoryRegion::header());
    let footer = Arc::new(MemoryRegion::footer());
    propagator.on_init(header.clone());
    propagator.on_init(footer.clone());
    assert!(header.elements().is_empty());

    let inserted = propagator
        .propagate(&resolver(), &ctx())
        .await
        .expect("propagate");
    assert_eq!(inserted, 4);

    assert_eq!(
        header.elements(),
        vec![
            BrandingElement::Logo {
                url: "/api/v1/file/abc123/download?contentDisposition=inline".into()
            },
            BrandingElement::DashboardLink {
                url: "https://dash.example.org/?token=tok".into(),
                title: Some("Dashboard".into()),
            },
            BrandingElement::BannerColor("#3F3B3B".into()),
        ]
    );
    assert_eq!(
        footer.elements(),
        vec![BrandingElement::FooterLinks(FooterLinks {
            about: Some("https://example.org/about".into()),
            contact: None,
            bug: None,
        })]
    );
}

#[tokio::test]
async fn settings_first_then_region() {
    let propagator = BrandingPropagator::new();
    propagator
        .propagate(&resolver(), &ctx())
        .await
        .expect("propagate");
    assert!(propagator.branding().is_some());

    let header = Arc::new(MemoryRegion::header());
    propagator.on_render(header.clone());
    assert_eq!(header.elements().len(), 3);
}

#[tokio::test]
async fn double_application_inserts_nothing_twice() {
    let propagator = BrandingPropagator::new();
    let header = Arc::new(MemoryRegion::header());
    propagator
        .propagate(&resolver(), &ctx())
        .await
        .expect("propagate");
    propagator.on_init(header.clone());
    propagator.on_render(header.clone());
    propagator
        .propagate(&resolver(), &ctx())
        .await
        .expect("propagate again");
    propagator.on_render(header.clone());

    let branding = propagator.branding().expect("published");
    assert_eq!(apply_branding(header.as_ref(), &branding), 0);
    assert_eq!(header.elements().len(), 3);
}

#[tokio::test]
async fn resolution_failure_applies_nothing() {
    let propagator = BrandingPropagator::new();
    let header = Arc::new(MemoryRegion::header());
    propagator.on_init(header.clone());

    let failing = SettingsResolver::new(Arc::new(ScriptedSettingsStore::failing(Fallback::Default)));
    assert!(propagator.propagate(&failing, &ctx()).await.is_err());
    assert!(propagator.branding().is_none());
    assert!(header.elements().is_empty());

    propagator
        .propagate(&resolver(), &ctx())
        .await
        .expect("later success");
    assert_eq!(header.elements().len(), 3);
}

#[tokio::test]
async fn anonymous_dashboard_link_has_no_token() {
    let propagator = BrandingPropagator::new();
    let header = Arc::new(MemoryRegion::header());
    propagator.on_init(header.clone());
    propagator
        .propagate(&resolver(), &BrandingContext::new("/api/v1", None))
        .await
        .expect("propagate");

    let link = header
        .elements()
        .into_iter()
        .find_map(|e| match e {
            BrandingElement::DashboardLink { url, .. } => Some(url),
            _ => None,
        })
        .expect("dashboard link");
    assert_eq!(link, "https://dash.example.org/?token=stale");
    assert!(header.has_slot(extlink::branding::BrandingSlot::DashboardLink));
}
