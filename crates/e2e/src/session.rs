//! Browser session lifecycle and synchronized interactions
//!
//! One [`Session`] lives for a whole suite run. Every interaction goes
//! through an explicit wait: presence before reading, clickability before
//! clicking.

use tracing::{debug, info, warn};

use crate::config::SuiteConfig;
use crate::driver::{Driver, ElementHandle, Launcher};
use crate::error::{E2eError, E2eResult};
use crate::locator::{selectors, Locator};
use crate::wait::{Probe, Waiter};

pub struct Session {
    driver: Box<dyn Driver>,
    config: SuiteConfig,
}

impl Session {
    /// Open the browser session. A driver that cannot start is fatal.
    pub async fn acquire(launcher: &dyn Launcher, config: SuiteConfig) -> E2eResult<Self> {
        info!("Opening browser session for {}", config.base_url);
        let driver = launcher.launch().await?;

        if let Err(e) = driver.maximize_window().await {
            // headless browsers commonly refuse; the configured size applies
            warn!("Could not maximize browser window: {}", e);
        }

        Ok(Self { driver, config })
    }

    /// Close the browser session
    pub async fn release(self) -> E2eResult<()> {
        info!("Closing browser session");
        self.driver.close().await
    }

    /// Navigate to the base URL and wait for the page to render.
    ///
    /// Cookies and storage are left alone, so authentication carries over
    /// from the previous case.
    pub async fn reset_to_home(&self) -> E2eResult<()> {
        debug!("Resetting to {}", self.config.base_url);
        self.driver.goto(&self.config.base_url).await?;
        self.wait().until_present(&selectors::page_root()).await?;
        Ok(())
    }

    pub fn config(&self) -> &SuiteConfig {
        &self.config
    }

    pub fn driver(&self) -> &dyn Driver {
        self.driver.as_ref()
    }

    pub fn wait(&self) -> Waiter<'_> {
        Waiter::new(self.driver.as_ref(), self.config.wait)
    }

    /// Wait until clickable, then click
    pub async fn click(&self, locator: &Locator) -> E2eResult<ElementHandle> {
        let element = self.wait().until_clickable(locator).await?;
        self.driver.click(&element).await?;
        Ok(element)
    }

    /// Click if the element becomes clickable in time, otherwise report why not
    pub async fn try_click(&self, locator: &Locator) -> E2eResult<Probe> {
        let probe = self.wait().probe_clickable(locator).await?;
        if let Probe::Found(element) = &probe {
            self.driver.click(element).await?;
        }
        Ok(probe)
    }

    /// Wait until present, clear, then type
    pub async fn fill(&self, locator: &Locator, text: &str) -> E2eResult<ElementHandle> {
        let element = self.wait().until_present(locator).await?;
        self.driver.clear(&element).await?;
        self.driver.send_keys(&element, text).await?;
        Ok(element)
    }

    pub async fn text_of(&self, locator: &Locator) -> E2eResult<String> {
        let element = self.wait().until_present(locator).await?;
        self.driver.text(&element).await
    }

    pub async fn attr_of(&self, locator: &Locator, name: &str) -> E2eResult<Option<String>> {
        let element = self.wait().until_present(locator).await?;
        self.driver.attr(&element, name).await
    }

    /// Immediate lookup without waiting
    pub async fn find_now(&self, locator: &Locator) -> E2eResult<ElementHandle> {
        self.driver
            .find_all(locator)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| E2eError::ElementNotFound(locator.to_string()))
    }

    /// Immediate count without waiting
    pub async fn count(&self, locator: &Locator) -> E2eResult<usize> {
        Ok(self.driver.find_all(locator).await?.len())
    }

    pub async fn current_url(&self) -> E2eResult<String> {
        self.driver.current_url().await
    }

    pub async fn refresh(&self) -> E2eResult<()> {
        self.driver.refresh().await?;
        self.wait().until_present(&selectors::page_root()).await?;
        Ok(())
    }

    /// Whether the browser is inside the authenticated area
    pub async fn is_authenticated(&self) -> E2eResult<bool> {
        let url = self.current_url().await?;
        let marker = self.config.dashboard_marker.to_lowercase();
        Ok(url.to_lowercase().contains(&marker))
    }
}
