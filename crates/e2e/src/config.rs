//! Suite configuration
//!
//! Values are resolved in three layers: built-in defaults, an optional TOML
//! file, then `ADMIN_E2E_*` environment variables. The harness entry point
//! applies its command-line flags on top.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{E2eError, E2eResult};

/// Top-level suite configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Root URL of the admin panel under test
    pub base_url: String,

    /// URL fragment that identifies the authenticated area
    pub dashboard_marker: String,

    /// Login fixture
    pub credentials: Credentials,

    /// Explicit wait policy
    pub wait: WaitConfig,

    /// Browser / WebDriver settings
    pub browser: BrowserConfig,

    /// Append a per-run tag to product names created by the suite
    pub unique_fixture_names: bool,

    /// Poll the base URL before opening the browser
    pub preflight: bool,

    /// Output directory for results
    pub output_dir: PathBuf,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            dashboard_marker: "dashboard".to_string(),
            credentials: Credentials::default(),
            wait: WaitConfig::default(),
            browser: BrowserConfig::default(),
            unique_fixture_names: false,
            preflight: true,
            output_dir: PathBuf::from("test-results"),
        }
    }
}

/// Identity/secret pair used by the authentication helper
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::new("vivekjadhav", "vivek123")
    }
}

/// Bounded-wait policy shared by every explicit wait
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitConfig {
    /// Ceiling for a single wait
    #[serde(with = "duration_secs")]
    pub timeout: Duration,

    /// Delay between two condition checks
    #[serde(with = "duration_millis")]
    pub poll_interval: Duration,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            poll_interval: Duration::from_millis(250),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Remote WebDriver endpoint. Ignored when `chromedriver_path` is set.
    pub webdriver_url: String,

    /// Spawn this chromedriver binary instead of using `webdriver_url`
    pub chromedriver_path: Option<PathBuf>,

    /// Run Chrome without a visible window
    pub headless: bool,

    /// Window size used when the driver cannot maximize
    pub window_width: u32,
    pub window_height: u32,

    /// Timeout for a spawned chromedriver to report ready
    #[serde(with = "duration_secs")]
    pub startup_timeout: Duration,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:4444".to_string(),
            chromedriver_path: None,
            headless: true,
            window_width: 1280,
            window_height: 720,
            startup_timeout: Duration::from_secs(30),
        }
    }
}

impl SuiteConfig {
    /// Load configuration from file, falling back to defaults when the file
    /// does not exist. Environment overrides are applied afterwards.
    pub fn load(path: &Path) -> E2eResult<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `ADMIN_E2E_*` overrides using the given lookup.
    pub fn apply_env<F>(&mut self, lookup: F) -> E2eResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("ADMIN_E2E_BASE_URL") {
            self.base_url = v;
        }
        if let Some(v) = lookup("ADMIN_E2E_USERNAME") {
            self.credentials.username = v;
        }
        if let Some(v) = lookup("ADMIN_E2E_PASSWORD") {
            self.credentials.password = v;
        }
        if let Some(v) = lookup("ADMIN_E2E_WAIT_TIMEOUT_SECS") {
            let secs: u64 = v.parse().map_err(|_| {
                E2eError::InvalidConfig(format!("ADMIN_E2E_WAIT_TIMEOUT_SECS: not a number: {}", v))
            })?;
            self.wait.timeout = Duration::from_secs(secs);
        }
        if let Some(v) = lookup("ADMIN_E2E_WEBDRIVER_URL") {
            self.browser.webdriver_url = v;
        }
        Ok(())
    }

    /// Reject values that would make every case fail in a confusing way
    pub fn validate(&self) -> E2eResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(E2eError::InvalidConfig(format!(
                "base_url must be an http(s) URL, got {}",
                self.base_url
            )));
        }
        if self.wait.timeout.is_zero() {
            return Err(E2eError::InvalidConfig("wait.timeout must be non-zero".into()));
        }
        if self.wait.poll_interval.is_zero() || self.wait.poll_interval > self.wait.timeout {
            return Err(E2eError::InvalidConfig(
                "wait.poll_interval must be non-zero and not exceed wait.timeout".into(),
            ));
        }
        if self.dashboard_marker.is_empty() {
            return Err(E2eError::InvalidConfig("dashboard_marker must not be empty".into()));
        }
        Ok(())
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(d)?))
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_the_documented_fixture() {
        let config = SuiteConfig::default();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.credentials, Credentials::new("vivekjadhav", "vivek123"));
        assert_eq!(config.wait.timeout, Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_partial_toml() {
        let toml = r#"
base_url = "http://127.0.0.1:5173"
unique_fixture_names = true

[credentials]
username = "admin"
password = "hunter2"

[wait]
timeout = 3
poll_interval = 50
"#;
        let config: SuiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.base_url, "http://127.0.0.1:5173");
        assert!(config.unique_fixture_names);
        assert_eq!(config.credentials.username, "admin");
        assert_eq!(config.wait.timeout, Duration::from_secs(3));
        assert_eq!(config.wait.poll_interval, Duration::from_millis(50));
        // untouched sections keep defaults
        assert_eq!(config.browser.webdriver_url, "http://localhost:4444");
    }

    #[test]
    fn env_overrides_win() {
        let env: HashMap<&str, &str> = [
            ("ADMIN_E2E_BASE_URL", "https://staging.example.com"),
            ("ADMIN_E2E_PASSWORD", "s3cret"),
            ("ADMIN_E2E_WAIT_TIMEOUT_SECS", "4"),
        ]
        .into_iter()
        .collect();

        let mut config = SuiteConfig::default();
        config
            .apply_env(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.base_url, "https://staging.example.com");
        assert_eq!(config.credentials.username, "vivekjadhav");
        assert_eq!(config.credentials.password, "s3cret");
        assert_eq!(config.wait.timeout, Duration::from_secs(4));
    }

    #[test]
    fn bad_timeout_env_is_rejected() {
        let mut config = SuiteConfig::default();
        let err = config
            .apply_env(|k| (k == "ADMIN_E2E_WAIT_TIMEOUT_SECS").then(|| "ten".to_string()))
            .unwrap_err();
        assert!(matches!(err, E2eError::InvalidConfig(_)));
    }

    #[test]
    fn validate_rejects_non_http_base_url() {
        let config = SuiteConfig {
            base_url: "localhost:8080".into(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = SuiteConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.dashboard_marker, "dashboard");
    }
}
