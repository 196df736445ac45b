use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use bon::Builder;
use tracing::{debug, warn};

use super::manager::AccountLinkManager;
use super::types::{LinkOutcome, LinkState};
use crate::error::LinkError;

/// Per-view options, owned by the view instance.
#[derive(Debug, Clone, Builder)]
pub struct ViewOptions {
    /// Where providers send the browser back to after authorizing.
    #[builder(into)]
    pub redirect: String,
    /// Verb shown on link buttons.
    #[builder(into, default = String::from("authorize"))]
    pub mode_text: String,
    #[builder(default = true)]
    pub enable_password_login: bool,
}

/// What happened to a render request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The listing was applied and is now displayed.
    Rendered(LinkState),
    /// A newer render started before this one finished; its result was dropped.
    Superseded,
    /// The preceding action went through but the listing could not be
    /// fetched afterwards. The previous state is still displayed.
    Stale { reason: String },
}

/// The account linking view.
///
/// Every render re-fetches from the account service. When renders overlap,
/// only the most recently started one is applied.
pub struct AccountLinkView {
    manager: AccountLinkManager,
    options: ViewOptions,
    rendered: Mutex<Option<LinkState>>,
    generation: AtomicU64,
}

impl AccountLinkView {
    pub fn new(manager: AccountLinkManager, options: ViewOptions) -> Self {
        Self {
            manager,
            options,
            rendered: Mutex::new(None),
            generation: AtomicU64::new(0),
        }
    }

    pub fn options(&self) -> &ViewOptions {
        &self.options
    }

    /// The state currently on screen.
    pub fn rendered(&self) -> Option<LinkState> {
        self.rendered
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    /// Fetch and display the current link state.
    ///
    /// On failure the previously displayed state stays as it was.
    pub async fn render(&self) -> Result<RenderOutcome, LinkError> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let result = self.manager.list_state(&self.options.redirect).await;

        if self.generation.load(Ordering::SeqCst) != ticket {
            debug!(ticket, "Dropping superseded render");
            return Ok(RenderOutcome::Superseded);
        }
        let state = result?;
        let mut rendered = self.rendered.lock().unwrap_or_else(|p| p.into_inner());
        *rendered = Some(state.clone());
        Ok(RenderOutcome::Rendered(state))
    }

    /// Revoke a grant, then re-render.
    ///
    /// A failed revoke returns the error and leaves the display untouched.
    /// Once the revoke went through, a failed refresh yields
    /// [`RenderOutcome::Stale`] rather than an error.
    pub async fn revoke(
        &self,
        provider_id: &str,
        resource_server: Option<&str>,
    ) -> Result<RenderOutcome, LinkError> {
        self.manager.revoke(provider_id, resource_server).await?;
        Ok(self.refresh_after_action().await)
    }

    /// Start linking a provider from the displayed state.
    ///
    /// Renders first if nothing is displayed yet, and re-renders after a key
    /// was submitted. A submitted key is reported as such even when that
    /// re-render fails.
    pub async fn begin_link(&self, provider_id: &str) -> Result<LinkOutcome, LinkError> {
        let state = match self.rendered() {
            Some(state) => state,
            None => match self.render().await? {
                RenderOutcome::Rendered(state) => state,
                RenderOutcome::Superseded | RenderOutcome::Stale { .. } => {
                    self.rendered().unwrap_or_default()
                }
            },
        };
        let outcome = self.manager.begin_link(&state, provider_id).await?;
        if matches!(outcome, LinkOutcome::KeySubmitted { .. }) {
            self.refresh_after_action().await;
        }
        Ok(outcome)
    }

    async fn refresh_after_action(&self) -> RenderOutcome {
        match self.render().await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "Refresh after account change failed");
                RenderOutcome::Stale {
                    reason: e.to_string(),
                }
            }
        }
    }
}
