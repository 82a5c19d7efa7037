use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{Value, json};
use tracing::info;
use tripforge_engine::page::{NavigationResult, Page, PageError};

// All interactions go through injected scripts so the host page's reactive
// bindings see the same input/change/blur notifications a user would cause.
const QUERY_VISIBLE_JS: &str = r#"
    const el = document.querySelector(arguments[0]);
    if (!el) return false;
    const rect = el.getBoundingClientRect();
    const style = window.getComputedStyle(el);
    return rect.width > 0 && rect.height > 0
        && style.display !== 'none' && style.visibility !== 'hidden';
"#;

const SET_VALUE_JS: &str = r#"
    const el = document.querySelector(arguments[0]);
    if (!el) return false;
    el.value = arguments[1];
    el.dispatchEvent(new Event('input', { bubbles: true }));
    el.dispatchEvent(new Event('change', { bubbles: true }));
    el.dispatchEvent(new Event('blur', { bubbles: true }));
    return true;
"#;

const CLICK_JS: &str = r#"
    const el = document.querySelector(arguments[0]);
    if (!el) return false;
    el.click();
    return true;
"#;

const OPTION_LABELS_JS: &str = r#"
    const el = document.querySelector(arguments[0]);
    if (!el || !el.options) return null;
    return Array.from(el.options).map(o => o.text);
"#;

const SELECT_BY_LABEL_JS: &str = r#"
    const el = document.querySelector(arguments[0]);
    if (!el || !el.options) return false;
    const option = Array.from(el.options).find(o => o.text === arguments[1]);
    if (!option) return false;
    el.value = option.value;
    el.dispatchEvent(new Event('change', { bubbles: true }));
    return true;
"#;

/// Live page session over a W3C WebDriver endpoint.
pub struct WebDriverPage {
    client: Option<Client>,
    webdriver_url: String,
}

impl WebDriverPage {
    /// Create a page that will connect to an already-running WebDriver
    /// (chromedriver, geckodriver, ...) on launch.
    pub fn new(webdriver_url: impl Into<String>) -> Self {
        WebDriverPage {
            client: None,
            webdriver_url: webdriver_url.into(),
        }
    }

    fn client(&mut self) -> Result<&mut Client, PageError> {
        self.client.as_mut().ok_or(PageError::NotReady)
    }

    async fn execute(&mut self, script: &str, args: Vec<Value>) -> Result<Value, PageError> {
        self.client()?
            .execute(script, args)
            .await
            .map_err(|e| PageError::Script(e.to_string()))
    }

    /// Run a script that returns `true` when it found its element; a falsy
    /// return means the element vanished between the wait and the action.
    async fn execute_on_element(
        &mut self,
        script: &str,
        selector: &str,
        args: Vec<Value>,
    ) -> Result<(), PageError> {
        let mut all_args = vec![json!(selector)];
        all_args.extend(args);
        let result = self.execute(script, all_args).await?;
        if result.as_bool().unwrap_or(false) {
            Ok(())
        } else {
            Err(PageError::Script(format!(
                "Element disappeared before action: {selector}"
            )))
        }
    }
}

#[async_trait]
impl Page for WebDriverPage {
    async fn launch(&mut self) -> Result<(), PageError> {
        info!("Connecting to WebDriver at {}...", self.webdriver_url);
        let client = ClientBuilder::native()
            .capabilities(serde_json::Map::new())
            .connect(&self.webdriver_url)
            .await
            .map_err(|e| {
                PageError::Other(format!(
                    "Failed to connect to WebDriver at {}: {e}",
                    self.webdriver_url
                ))
            })?;
        self.client = Some(client);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), PageError> {
        if let Some(client) = self.client.take() {
            client
                .close()
                .await
                .map_err(|e| PageError::Other(format!("Failed to close session: {e}")))?;
        }
        Ok(())
    }

    async fn is_ready(&self) -> bool {
        self.client.is_some()
    }

    async fn navigate(&mut self, url: &str) -> Result<NavigationResult, PageError> {
        let client = self.client()?;

        info!("Navigating to: {}", url);
        client
            .goto(url)
            .await
            .map_err(|e| PageError::Navigation(e.to_string()))?;

        let title = client.title().await.unwrap_or_default();
        let url = client
            .current_url()
            .await
            .map(|u| u.to_string())
            .unwrap_or_default();
        Ok(NavigationResult {
            url,
            title,
            status: 200,
        })
    }

    async fn current_url(&mut self) -> Result<String, PageError> {
        self.client()?
            .current_url()
            .await
            .map(|u| u.to_string())
            .map_err(|e| PageError::Other(e.to_string()))
    }

    async fn query(&mut self, selector: &str) -> Result<bool, PageError> {
        let result = self.execute(QUERY_VISIBLE_JS, vec![json!(selector)]).await?;
        Ok(result.as_bool().unwrap_or(false))
    }

    async fn set_value(&mut self, selector: &str, value: &str) -> Result<(), PageError> {
        self.execute_on_element(SET_VALUE_JS, selector, vec![json!(value)])
            .await
    }

    async fn click(&mut self, selector: &str) -> Result<(), PageError> {
        self.execute_on_element(CLICK_JS, selector, vec![]).await
    }

    async fn option_labels(&mut self, selector: &str) -> Result<Vec<String>, PageError> {
        let result = self.execute(OPTION_LABELS_JS, vec![json!(selector)]).await?;
        match result {
            Value::Array(items) => Ok(items
                .into_iter()
                .filter_map(|v| v.as_str().map(|s| s.to_string()))
                .collect()),
            _ => Err(PageError::Script(format!(
                "Not a select control: {selector}"
            ))),
        }
    }

    async fn select_by_label(&mut self, selector: &str, label: &str) -> Result<(), PageError> {
        self.execute_on_element(SELECT_BY_LABEL_JS, selector, vec![json!(label)])
            .await
    }

    async fn press_key(&mut self, selector: &str, key: &str) -> Result<(), PageError> {
        // WebDriver encodes control keys as private-use codepoints.
        let encoded = match key {
            "Enter" => '\u{e007}',
            "Tab" => '\u{e004}',
            "Escape" => '\u{e00c}',
            other => return Err(PageError::NotSupported(format!("press_key: {other}"))),
        };

        let element = self
            .client()?
            .find(Locator::Css(selector))
            .await
            .map_err(|e| PageError::Other(format!("press_key find failed: {e}")))?;
        element
            .send_keys(&encoded.to_string())
            .await
            .map_err(|e| PageError::Other(format!("press_key failed: {e}")))
    }
}
