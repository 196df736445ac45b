//! Error classification and recovery.

use strum::Display;

/// Broad error category for routing user-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Authentication,
    Network,
    Timeout,
    Server,
    Api,
    Configuration,
    Serialization,
    Provider,
    Validation,
    Unknown,
}

/// Suggested recovery action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoverySuggestion {
    TryAgainLater,
    SignInAgain,
    CheckConfiguration,
    IncreaseTimeout,
    RefreshAccounts,
    CorrectInput,
    ContactSupport,
}

/// Which of the two settings queries failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum SettingsPass {
    /// Explicit administrator values, no fallback.
    Explicit,
    /// Declared system defaults.
    Defaults,
}
