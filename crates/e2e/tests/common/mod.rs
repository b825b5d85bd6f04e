//! Shared fixtures for tests against the in-memory admin panel
#![allow(dead_code)]

use admin_e2e::config::Credentials;
use admin_e2e::fake::FakeAdminPanel;
use admin_e2e::{Session, SuiteConfig, SuiteResult, SuiteRunner};

pub const BASE_URL: &str = "http://fake.test";

pub fn config() -> SuiteConfig {
    SuiteConfig {
        base_url: BASE_URL.to_string(),
        preflight: false,
        ..Default::default()
    }
}

pub fn panel() -> FakeAdminPanel {
    FakeAdminPanel::new(BASE_URL, Credentials::default())
}

/// Run the given case numbers against `app` in one session
pub async fn run_cases(app: &FakeAdminPanel, numbers: &[u32]) -> SuiteResult {
    run_with(app, config(), numbers).await
}

pub async fn run_with(app: &FakeAdminPanel, config: SuiteConfig, numbers: &[u32]) -> SuiteResult {
    SuiteRunner::new(config)
        .select(numbers, None)
        .unwrap()
        .run(&app.launcher())
        .await
        .unwrap()
}

/// A session parked on the login page
pub async fn session(app: &FakeAdminPanel) -> Session {
    let session = Session::acquire(&app.launcher(), config()).await.unwrap();
    session.reset_to_home().await.unwrap();
    session
}
