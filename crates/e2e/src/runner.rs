//! Suite runner: one session, every selected case in order, one report

use chrono::{DateTime, Utc};
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::cases::{self, Case, CaseContext};
use crate::config::SuiteConfig;
use crate::driver::Launcher;
use crate::error::E2eResult;
use crate::product::FixtureNames;
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    Passed,
    Failed,
}

/// Result of running a single case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseResult {
    pub number: u32,
    pub name: String,
    pub status: CaseStatus,
    pub duration_ms: u64,
    pub progress: Vec<String>,
    /// Optional steps that found nothing to act on
    pub skips: Vec<String>,
    pub error: Option<String>,
}

impl CaseResult {
    pub fn passed(&self) -> bool {
        self.status == CaseStatus::Passed
    }
}

/// Result of running the suite
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteResult {
    pub base_url: String,
    pub started_at: DateTime<Utc>,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub tolerated_skips: usize,
    pub duration_ms: u64,
    pub results: Vec<CaseResult>,
}

impl SuiteResult {
    pub fn success(&self) -> bool {
        self.failed == 0
    }

    pub fn result(&self, number: u32) -> Option<&CaseResult> {
        self.results.iter().find(|r| r.number == number)
    }
}

/// Runs a case list against one browser session
pub struct SuiteRunner {
    config: SuiteConfig,
    cases: Vec<Case>,
}

impl SuiteRunner {
    /// Runner for the full sequence
    pub fn new(config: SuiteConfig) -> Self {
        Self {
            config,
            cases: cases::all_cases(),
        }
    }

    /// Replace the case list
    pub fn with_cases(mut self, cases: Vec<Case>) -> Self {
        self.cases = cases;
        self
    }

    /// Keep only the given case numbers and/or names containing `name`
    pub fn select(mut self, numbers: &[u32], name: Option<&str>) -> E2eResult<Self> {
        self.cases = cases::select(self.cases, numbers, name)?;
        Ok(self)
    }

    pub fn cases(&self) -> &[Case] {
        &self.cases
    }

    pub fn config(&self) -> &SuiteConfig {
        &self.config
    }

    /// Acquire the session, run every case, release the session.
    ///
    /// Case failures (including panics) are recorded, never propagated; the
    /// only errors returned are an out-of-order case list and a browser that
    /// could not start.
    pub async fn run(&self, launcher: &dyn Launcher) -> E2eResult<SuiteResult> {
        cases::ensure_ordered(&self.cases)?;

        let started_at = Utc::now();
        let start = Instant::now();
        let fixtures = FixtureNames::new(self.config.unique_fixture_names);
        let session = Session::acquire(launcher, self.config.clone()).await?;

        info!("Running {} case(s)...", self.cases.len());
        let mut results = Vec::with_capacity(self.cases.len());
        for case in &self.cases {
            let result = self.run_case(&session, case, &fixtures).await;
            if result.passed() {
                info!("✓ {:02} {} ({} ms)", result.number, result.name, result.duration_ms);
            } else {
                error!(
                    "✗ {:02} {} - {}",
                    result.number,
                    result.name,
                    result.error.as_deref().unwrap_or("unknown error")
                );
            }
            results.push(result);
        }

        if let Err(e) = session.release().await {
            warn!("Failed to close browser session: {}", e);
        }

        let passed = results.iter().filter(|r| r.passed()).count();
        let failed = results.len() - passed;
        let tolerated_skips = results.iter().map(|r| r.skips.len()).sum();
        let duration_ms = start.elapsed().as_millis() as u64;

        info!("");
        info!(
            "Results: {} passed, {} failed, {} tolerated skip(s) ({} ms)",
            passed, failed, tolerated_skips, duration_ms
        );

        Ok(SuiteResult {
            base_url: self.config.base_url.clone(),
            started_at,
            total: results.len(),
            passed,
            failed,
            tolerated_skips,
            duration_ms,
            results,
        })
    }

    async fn run_case(&self, session: &Session, case: &Case, fixtures: &FixtureNames) -> CaseResult {
        let start = Instant::now();
        debug!("Running case {} {}", case.number, case.name);
        info!("Case {:02}: {}", case.number, case.name);

        let cx = CaseContext::new(fixtures.clone());
        let body = async {
            session.reset_to_home().await?;
            (case.run)(session, &cx).await
        };
        let error = match AssertUnwindSafe(body).catch_unwind().await {
            Ok(Ok(())) => None,
            Ok(Err(e)) => Some(e.to_string()),
            Err(panic) => Some(panic_message(panic.as_ref())),
        };

        let log = cx.into_log();
        CaseResult {
            number: case.number,
            name: case.name.to_string(),
            status: if error.is_none() {
                CaseStatus::Passed
            } else {
                CaseStatus::Failed
            },
            duration_ms: start.elapsed().as_millis() as u64,
            progress: log.progress,
            skips: log.skips,
            error,
        }
    }

    /// Write results to `test-results.json` under the output directory
    pub fn write_results(&self, results: &SuiteResult) -> E2eResult<PathBuf> {
        std::fs::create_dir_all(&self.config.output_dir)?;

        let path = self.config.output_dir.join("test-results.json");
        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("panicked: {}", s)
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("panicked: {}", s)
    } else {
        "panicked".to_string()
    }
}

/// Title and setup reminder printed before a live run
pub fn banner(config: &SuiteConfig) -> String {
    let rule = "=".repeat(70);
    format!(
        "{rule}\nE-Commerce Admin Panel - E2E Test Suite\n{rule}\n\
         Application: {}\nWebDriver:   {}\n\
         Make sure the application is running before starting.\n{rule}",
        config.base_url, config.browser.webdriver_url
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_names_the_target() {
        let text = banner(&SuiteConfig::default());
        assert!(text.contains("http://localhost:8080"));
        assert!(text.contains("http://localhost:4444"));
    }

    #[test]
    fn panic_payloads_are_readable() {
        let boxed: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(boxed.as_ref()), "panicked: boom");
        let boxed: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(boxed.as_ref()), "panicked: bang");
    }
}
