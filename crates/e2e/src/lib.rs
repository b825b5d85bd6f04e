//! Admin Panel E2E Suite
//!
//! This crate drives a browser through the e-commerce admin panel and
//! checks its behavior with an ordered sequence of cases:
//! - Opens one browser session per run and closes it exactly once
//! - Logs in and out through the real login form
//! - Waits explicitly for every element it touches, never sleeps blindly
//! - Records progress and tolerated skips per case in a JSON report
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Suite Runner (Rust)                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  SuiteRunner                                                │
//! │    ├── Session::acquire(launcher) -> Session                │
//! │    ├── for case: reset_to_home() + case body -> CaseResult  │
//! │    ├── Session::release()                                   │
//! │    └── write_results() -> test-results.json                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Case bodies                                                │
//! │    ├── auth:  login / logout -> LoginOutcome                │
//! │    ├── panel: tabs, add / update / delete / dispatch        │
//! │    └── wait:  until_* -> Timeout | probe_* -> Probe         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Driver (trait)                                             │
//! │    ├── WebDriverSession   (fantoccini, real browser)        │
//! │    └── FakeBrowser        (in-memory admin panel)           │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod cases;
pub mod chromedriver;
pub mod config;
pub mod driver;
pub mod error;
pub mod fake;
pub mod locator;
pub mod panel;
pub mod preflight;
pub mod product;
pub mod runner;
pub mod session;
pub mod wait;
pub mod webdriver;

pub use auth::LoginOutcome;
pub use config::SuiteConfig;
pub use driver::{Driver, ElementHandle, Launcher};
pub use error::{E2eError, E2eResult};
pub use runner::{SuiteResult, SuiteRunner};
pub use session::Session;
pub use wait::{Probe, Waiter};
