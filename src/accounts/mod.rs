//! External account linking: list, classify, link and revoke.

pub mod manager;
pub mod service;
pub mod types;
pub mod view;

pub use manager::{classify, AccountLinkManager, KeyCapture, Navigator};
pub use service::{AccountService, HttpAccountService};
pub use types::{
    AccountEntry, ApiKeySubmission, Authorization, AuthorizationState, AuthorizedAccount,
    CapturedKey, LinkOutcome, LinkState, LinkableProvider,
};
pub use view::{AccountLinkView, RenderOutcome, ViewOptions};
