//! Error types for the admin panel suite

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Browser session failed to start: {0}")]
    SessionStartup(String),

    #[error("WebDriver health check failed after {0} attempts")]
    DriverHealthCheck(usize),

    #[error("Application at {url} not reachable after {attempts} attempts")]
    AppUnreachable { url: String, attempts: usize },

    #[error("chromedriver not found at {0}")]
    ChromedriverNotFound(String),

    #[error("Driver error: {0}")]
    Driver(String),

    #[error("Stale element handle: {0}")]
    StaleElement(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Timeout after {after:?} waiting for: {what}")]
    Timeout { what: String, after: Duration },

    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    #[error("Unknown case: {0}")]
    UnknownCase(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("WebDriver command failed: {0}")]
    WebDriver(#[from] fantoccini::error::CmdError),

    #[error("WebDriver session error: {0}")]
    NewSession(#[from] fantoccini::error::NewSessionError),
}

impl E2eError {
    /// True for the two kinds a case may tolerate on an optional step.
    pub fn is_absence(&self) -> bool {
        matches!(self, E2eError::Timeout { .. } | E2eError::ElementNotFound(_))
    }
}

pub type E2eResult<T> = Result<T, E2eError>;
