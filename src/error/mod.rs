//! Error types for extlink.

pub mod unified;

pub use unified::{ErrorCategory, RecoverySuggestion, SettingsPass};

use thiserror::Error;

/// Primary error type for all extlink operations.
#[derive(Error, Debug)]
pub enum LinkError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("Settings resolution failed during the {pass} pass: {source}")]
    SettingsResolution {
        pass: SettingsPass,
        #[source]
        source: Box<LinkError>,
    },

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("No authorize URL was listed for provider {0}")]
    MissingAuthorizeUrl(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl LinkError {
    /// Create an API error from a status code and response body.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Wrap a failure of one settings pass.
    pub fn settings_pass(pass: SettingsPass, source: LinkError) -> Self {
        Self::SettingsResolution {
            pass,
            source: Box::new(source),
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Authentication(_) => ErrorCategory::Authentication,
            Self::Network(_) => ErrorCategory::Network,
            Self::Timeout(_) => ErrorCategory::Timeout,
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::Serialization(_) => ErrorCategory::Serialization,
            Self::Api { status, .. } => match status {
                401 | 403 => ErrorCategory::Authentication,
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Api,
            },
            Self::SettingsResolution { source, .. } => source.category(),
            Self::UnknownProvider(_) | Self::MissingAuthorizeUrl(_) => ErrorCategory::Provider,
            Self::InvalidArgument(_) => ErrorCategory::Validation,
            Self::Io(_) => ErrorCategory::Unknown,
        }
    }

    /// Whether the external service failed or could not be reached.
    ///
    /// These are reported once to the action that triggered them; the
    /// crate never retries them on its own.
    pub fn is_transport_failure(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Network | ErrorCategory::Timeout | ErrorCategory::Server
        )
    }

    /// Suggest recovery actions.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self.category() {
            ErrorCategory::Authentication => RecoverySuggestion::SignInAgain,
            ErrorCategory::Network | ErrorCategory::Server => RecoverySuggestion::TryAgainLater,
            ErrorCategory::Timeout => RecoverySuggestion::IncreaseTimeout,
            ErrorCategory::Configuration => RecoverySuggestion::CheckConfiguration,
            ErrorCategory::Provider => RecoverySuggestion::RefreshAccounts,
            ErrorCategory::Validation => RecoverySuggestion::CorrectInput,
            _ => RecoverySuggestion::ContactSupport,
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, LinkError>;
