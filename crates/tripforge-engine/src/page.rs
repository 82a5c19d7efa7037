use async_trait::async_trait;
pub use tripforge_core::error::PageError;

#[derive(Debug, Clone)]
pub struct NavigationResult {
    pub url: String,
    pub title: String,
    pub status: u16, // generic status code (e.g. 200)
}

/// The Page trait is the unified interface every browser driver implements.
/// One value represents one live, externally-owned page session; the
/// orchestrator holds it exclusively for the duration of a run.
#[async_trait]
pub trait Page: Send + Sync {
    /// Launch or connect the underlying session.
    async fn launch(&mut self) -> Result<(), PageError>;

    /// Close the session and clean up resources.
    async fn close(&mut self) -> Result<(), PageError>;

    /// Check if the session is ready to accept commands.
    async fn is_ready(&self) -> bool;

    /// Navigate to a specific URL.
    async fn navigate(&mut self, url: &str) -> Result<NavigationResult, PageError>;

    /// URL of the page currently displayed.
    async fn current_url(&mut self) -> Result<String, PageError>;

    /// Whether a visible element currently matches the selector. A single
    /// probe; polling lives in the primitives layer.
    async fn query(&mut self, selector: &str) -> Result<bool, PageError>;

    /// Set an input's value and synthesize input/change/blur notifications
    /// so the host page's reactive bindings observe the change.
    async fn set_value(&mut self, selector: &str, value: &str) -> Result<(), PageError>;

    /// Synthetic activation of the first element matching the selector.
    async fn click(&mut self, selector: &str) -> Result<(), PageError>;

    /// Visible labels of a select control's options, in document order.
    async fn option_labels(&mut self, selector: &str) -> Result<Vec<String>, PageError>;

    /// Choose a select option by its exact visible label and fire change.
    async fn select_by_label(&mut self, selector: &str, label: &str) -> Result<(), PageError>;

    /// Press a key while a given element is focused (typeahead commit).
    async fn press_key(&mut self, _selector: &str, _key: &str) -> Result<(), PageError> {
        Err(PageError::NotSupported("press_key".into()))
    }
}
