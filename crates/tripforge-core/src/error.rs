use thiserror::Error;

/// Driver-level faults raised by a `Page` implementation.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("Page session not ready")]
    NotReady,

    #[error("Navigation error: {0}")]
    Navigation(String),

    #[error("Script error: {0}")]
    Script(String),

    #[error("Not supported: {0}")]
    NotSupported(String),

    #[error("{0}")]
    Other(String),
}

/// Failure taxonomy for one import step or item.
///
/// Every variant is terminal for its own step/item only; nothing in the
/// system retries. The orchestrator converts these to plain-text entries in
/// the run's error list.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Element not found for {role}: {selector} (waited {timeout_ms}ms)")]
    ElementNotFound {
        role: String,
        selector: String,
        timeout_ms: u64,
    },

    #[error("Option \"{text}\" not found in dropdown {selector}")]
    OptionNotFound { selector: String, text: String },

    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("{0}")]
    Validation(String),

    #[error("Confirmation never appeared: {0}")]
    ConfirmationTimeout(String),

    #[error(transparent)]
    Page(#[from] PageError),
}

impl ImportError {
    /// True when the step completed its actions but the expected
    /// post-condition marker never appeared, leaving the remote outcome
    /// unknown.
    pub fn is_unconfirmed(&self) -> bool {
        matches!(self, ImportError::ConfirmationTimeout(_))
    }
}
