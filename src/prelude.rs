//! Convenience re-exports for common use.

pub use crate::accounts::{
    AccountLinkManager, AccountLinkView, AccountService, HttpAccountService, KeyCapture,
    LinkOutcome, LinkState, Navigator, ViewOptions,
};
pub use crate::branding::{
    Branding, BrandingContext, BrandingPropagator, ChromeHook, ChromeRegion,
};
pub use crate::config::PlatformConfig;
pub use crate::error::{LinkError, Result};
pub use crate::registry::{LinkModality, Provider, ProviderRegistry};
pub use crate::session::{decode_claims, MemorySession, SessionTokenAccessor, UnverifiedClaims};
pub use crate::settings::{
    HttpSettingsStore, ResolvedSettings, SettingKey, SettingsResolver, BRANDING_KEYS,
};
