//! Session token lookup and display-only claim decoding.

pub mod claims;
pub mod store;

pub use claims::{decode_claims, UnverifiedClaims};
pub use store::{default_cookie_path, CookieHeader, CookieSource, FileCookieStore};

use std::sync::{Arc, RwLock};

use tracing::warn;

/// In-memory token of the active session.
#[derive(Debug, Default)]
pub struct MemorySession {
    token: RwLock<Option<String>>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        let session = Self::new();
        session.set(token);
        session
    }

    pub fn set(&self, token: impl Into<String>) {
        let mut guard = self.token.write().unwrap_or_else(|p| p.into_inner());
        *guard = Some(token.into());
    }

    pub fn clear(&self) {
        let mut guard = self.token.write().unwrap_or_else(|p| p.into_inner());
        *guard = None;
    }

    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
            .filter(|t| !t.is_empty())
    }
}

/// Resolves the bearer token for the current session.
///
/// Prefers the in-memory token and falls back to the persisted cookie, which
/// covers sessions established before the current process started.
#[derive(Clone)]
pub struct SessionTokenAccessor {
    memory: Arc<MemorySession>,
    cookies: Option<Arc<dyn CookieSource>>,
    cookie_name: String,
}

impl std::fmt::Debug for SessionTokenAccessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokenAccessor")
            .field("memory", &self.memory.token().map(|_| ".."))
            .field("cookies", &self.cookies.as_ref().map(|_| ".."))
            .field("cookie_name", &self.cookie_name)
            .finish()
    }
}

impl SessionTokenAccessor {
    pub fn new(memory: Arc<MemorySession>, cookie_name: impl Into<String>) -> Self {
        Self {
            memory,
            cookies: None,
            cookie_name: cookie_name.into(),
        }
    }

    /// Accessor wired from configuration: cookie name and persisted cookie file.
    pub fn from_config(memory: Arc<MemorySession>, config: &crate::config::PlatformConfig) -> Self {
        Self::new(memory, config.cookie_name())
            .with_cookies(Arc::new(FileCookieStore::new(config.cookie_path())))
    }

    pub fn with_cookies(mut self, cookies: Arc<dyn CookieSource>) -> Self {
        self.cookies = Some(cookies);
        self
    }

    /// Accessor with no token at all.
    pub fn anonymous() -> Self {
        Self::new(Arc::new(MemorySession::new()), "")
    }

    pub fn memory(&self) -> &Arc<MemorySession> {
        &self.memory
    }

    /// The current token, or `None` when there is no session.
    pub fn current_token(&self) -> Option<String> {
        if let Some(token) = self.memory.token() {
            return Some(token);
        }
        let cookies = self.cookies.as_ref()?;
        match cookies.read(&self.cookie_name) {
            Ok(token) => token,
            Err(e) => {
                warn!(cookie = %self.cookie_name, error = %e, "Cannot read session cookie");
                None
            }
        }
    }

    /// Claims of the current token for display purposes.
    ///
    /// See [`claims`] for why these must never gate an action.
    pub fn current_claims(&self) -> Option<UnverifiedClaims> {
        decode_claims(&self.current_token()?)
    }
}
