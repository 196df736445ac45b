//! extlink: external account linking for hosted data platforms
//!
//! Resolves administrator settings, lists and classifies the user's linked
//! third-party accounts (redirect and API-key providers), starts and revokes
//! links, and pushes instance branding into host chrome regions.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use extlink::prelude::*;
//!
//! # async fn example() -> extlink::error::Result<()> {
//! let config = PlatformConfig::from_env();
//! let session = SessionTokenAccessor::from_config(Arc::new(MemorySession::new()), &config);
//! let settings = SettingsResolver::new(Arc::new(HttpSettingsStore::new(
//!     config.clone(),
//!     session.clone(),
//! )?));
//!
//! let resolved = settings.resolve(BRANDING_KEYS).await?;
//! let ctx = BrandingContext::new(config.api_root(), session.current_token());
//! let branding = Branding::derive(&resolved, &ctx);
//! println!("{:?}", branding.logo_url);
//! # Ok(())
//! # }
//! ```

pub mod accounts;
pub mod branding;
pub mod config;
pub mod error;
pub mod http;
pub mod prelude;
pub mod registry;
pub mod session;
pub mod settings;
