//! The driver boundary: everything the suite asks of a browser

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::E2eResult;
use crate::locator::Locator;

/// Opaque handle to an element found by a driver.
///
/// Handles are only meaningful to the driver that returned them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle(String);

impl ElementHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A live browser session.
///
/// `find_all` never fails for "nothing matched"; it returns an empty list and
/// leaves the absence policy to the wait layer.
#[async_trait]
pub trait Driver: Send + Sync {
    async fn maximize_window(&self) -> E2eResult<()>;

    async fn goto(&self, url: &str) -> E2eResult<()>;

    async fn current_url(&self) -> E2eResult<String>;

    async fn refresh(&self) -> E2eResult<()>;

    async fn find_all(&self, locator: &Locator) -> E2eResult<Vec<ElementHandle>>;

    async fn is_displayed(&self, element: &ElementHandle) -> E2eResult<bool>;

    async fn is_enabled(&self, element: &ElementHandle) -> E2eResult<bool>;

    async fn text(&self, element: &ElementHandle) -> E2eResult<String>;

    async fn attr(&self, element: &ElementHandle, name: &str) -> E2eResult<Option<String>>;

    async fn clear(&self, element: &ElementHandle) -> E2eResult<()>;

    async fn send_keys(&self, element: &ElementHandle, text: &str) -> E2eResult<()>;

    async fn click(&self, element: &ElementHandle) -> E2eResult<()>;

    /// End the browser session. Called exactly once per session.
    async fn close(&self) -> E2eResult<()>;
}

/// Opens browser sessions. One launch per suite run.
#[async_trait]
pub trait Launcher: Send + Sync {
    async fn launch(&self) -> E2eResult<Box<dyn Driver>>;
}
