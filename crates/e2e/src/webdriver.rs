//! [`Driver`] over a real browser via the WebDriver protocol

use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder};
use parking_lot::Mutex;
use serde_json::json;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::config::BrowserConfig;
use crate::driver::{Driver, ElementHandle, Launcher};
use crate::error::{E2eError, E2eResult};
use crate::locator::Locator;

/// Connects to a WebDriver endpoint and opens a Chrome session
pub struct WebDriverLauncher {
    config: BrowserConfig,
    webdriver_url: String,
}

impl WebDriverLauncher {
    pub fn new(config: BrowserConfig) -> Self {
        let webdriver_url = config.webdriver_url.clone();
        Self {
            config,
            webdriver_url,
        }
    }

    /// Point at a different endpoint, e.g. a locally spawned chromedriver
    pub fn with_webdriver_url(mut self, url: impl Into<String>) -> Self {
        self.webdriver_url = url.into();
        self
    }

    fn capabilities(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut args = vec![
            format!(
                "--window-size={},{}",
                self.config.window_width, self.config.window_height
            ),
            "--no-sandbox".to_string(),
            "--disable-dev-shm-usage".to_string(),
        ];
        if self.config.headless {
            args.push("--headless=new".to_string());
        }

        let mut caps = serde_json::Map::new();
        caps.insert("browserName".to_string(), json!("chrome"));
        caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
        caps
    }
}

#[async_trait]
impl Launcher for WebDriverLauncher {
    async fn launch(&self) -> E2eResult<Box<dyn Driver>> {
        info!("Connecting to WebDriver at {}", self.webdriver_url);
        let client = ClientBuilder::rustls()
            .capabilities(self.capabilities())
            .connect(&self.webdriver_url)
            .await
            .map_err(|e| E2eError::SessionStartup(e.to_string()))?;
        Ok(Box::new(WebDriverSession::new(client)))
    }
}

/// Elements found so far, keyed by their WebDriver reference.
///
/// A re-found element reuses its entry, so polling the same page does not
/// grow the table. Navigation clears it.
struct ElementTable<T> {
    entries: HashMap<String, T>,
}

impl<T: Clone> ElementTable<T> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    fn remember(&mut self, reference: String, element: T) -> ElementHandle {
        self.entries.insert(reference.clone(), element);
        ElementHandle::new(reference)
    }

    fn get(&self, handle: &ElementHandle) -> Option<T> {
        self.entries.get(handle.id()).cloned()
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// One WebDriver session.
///
/// Handles stay valid until the next navigation or until the session closes.
pub struct WebDriverSession {
    client: Client,
    elements: Mutex<ElementTable<Element>>,
}

impl WebDriverSession {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            elements: Mutex::new(ElementTable::new()),
        }
    }

    fn element(&self, handle: &ElementHandle) -> E2eResult<Element> {
        self.elements
            .lock()
            .get(handle)
            .ok_or_else(|| E2eError::StaleElement(handle.to_string()))
    }

    fn remember(&self, element: Element) -> ElementHandle {
        let reference = element.element_id().to_string();
        self.elements.lock().remember(reference, element)
    }
}

/// Keep stale references distinguishable from other command failures
fn element_error(handle: &ElementHandle, e: CmdError) -> E2eError {
    if e.to_string().to_lowercase().contains("stale element") {
        E2eError::StaleElement(handle.to_string())
    } else {
        E2eError::WebDriver(e)
    }
}

#[async_trait]
impl Driver for WebDriverSession {
    async fn maximize_window(&self) -> E2eResult<()> {
        self.client.maximize_window().await?;
        Ok(())
    }

    async fn goto(&self, url: &str) -> E2eResult<()> {
        debug!("goto {}", url);
        self.elements.lock().clear();
        self.client.goto(url).await?;
        Ok(())
    }

    async fn current_url(&self) -> E2eResult<String> {
        Ok(self.client.current_url().await?.to_string())
    }

    async fn refresh(&self) -> E2eResult<()> {
        self.elements.lock().clear();
        self.client.refresh().await?;
        Ok(())
    }

    async fn find_all(&self, locator: &Locator) -> E2eResult<Vec<ElementHandle>> {
        let found = match locator {
            Locator::Css(css) => self.client.find_all(fantoccini::Locator::Css(css)).await?,
            Locator::XPath(xpath) => self.client.find_all(fantoccini::Locator::XPath(xpath)).await?,
        };
        Ok(found.into_iter().map(|el| self.remember(el)).collect())
    }

    async fn is_displayed(&self, element: &ElementHandle) -> E2eResult<bool> {
        self.element(element)?
            .is_displayed()
            .await
            .map_err(|e| element_error(element, e))
    }

    async fn is_enabled(&self, element: &ElementHandle) -> E2eResult<bool> {
        self.element(element)?
            .is_enabled()
            .await
            .map_err(|e| element_error(element, e))
    }

    async fn text(&self, element: &ElementHandle) -> E2eResult<String> {
        self.element(element)?
            .text()
            .await
            .map_err(|e| element_error(element, e))
    }

    async fn attr(&self, element: &ElementHandle, name: &str) -> E2eResult<Option<String>> {
        let el = self.element(element)?;
        // Inputs only reflect typed text in the live property
        let value = if name == "value" {
            el.prop(name).await
        } else {
            el.attr(name).await
        };
        value.map_err(|e| element_error(element, e))
    }

    async fn clear(&self, element: &ElementHandle) -> E2eResult<()> {
        self.element(element)?
            .clear()
            .await
            .map_err(|e| element_error(element, e))
    }

    async fn send_keys(&self, element: &ElementHandle, text: &str) -> E2eResult<()> {
        self.element(element)?
            .send_keys(text)
            .await
            .map_err(|e| element_error(element, e))
    }

    async fn click(&self, element: &ElementHandle) -> E2eResult<()> {
        self.element(element)?
            .click()
            .await
            .map_err(|e| element_error(element, e))
    }

    async fn close(&self) -> E2eResult<()> {
        self.elements.lock().clear();
        self.client.clone().close().await?;
        Ok(())
    }
}
