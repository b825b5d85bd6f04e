//! Login and logout helpers shared by the cases

use std::fmt;
use tracing::{info, warn};

use crate::config::Credentials;
use crate::error::{E2eError, E2eResult};
use crate::locator::selectors;
use crate::session::Session;
use crate::wait::Probe;

/// What a login attempt ended in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Redirected into the dashboard
    Success,
    /// The login form was not there
    NotFound(String),
    /// The form was submitted but no redirect happened in time
    TimedOut(String),
    /// The driver failed underneath the helper
    Error(String),
}

impl LoginOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, LoginOutcome::Success)
    }
}

impl fmt::Display for LoginOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoginOutcome::Success => write!(f, "logged in"),
            LoginOutcome::NotFound(what) => write!(f, "login form missing: {}", what),
            LoginOutcome::TimedOut(what) => write!(f, "login did not complete: {}", what),
            LoginOutcome::Error(e) => write!(f, "login errored: {}", e),
        }
    }
}

/// Fill the login form and submit it.
///
/// Never returns a driver error as `Err`: a failed login is an outcome the
/// caller logs, not a crash.
pub async fn login(session: &Session, credentials: &Credentials) -> LoginOutcome {
    let outcome = match try_login(session, credentials).await {
        Ok(()) => LoginOutcome::Success,
        Err(E2eError::ElementNotFound(what)) => LoginOutcome::NotFound(what),
        Err(E2eError::Timeout { what, .. }) => LoginOutcome::TimedOut(what),
        Err(e) => LoginOutcome::Error(e.to_string()),
    };
    if outcome.is_success() {
        info!("Logged in as {}", credentials.username);
    } else {
        warn!("Login failed: {}", outcome);
    }
    outcome
}

/// Log in with the configured credentials
pub async fn login_default(session: &Session) -> LoginOutcome {
    let credentials = session.config().credentials.clone();
    login(session, &credentials).await
}

async fn try_login(session: &Session, credentials: &Credentials) -> E2eResult<()> {
    let wait = session.wait();
    let username = match wait.probe_present(&selectors::username_input()).await? {
        Probe::Found(el) => el,
        other => {
            return Err(E2eError::ElementNotFound(
                other.reason().unwrap_or_default().to_string(),
            ))
        }
    };
    let password = session.find_now(&selectors::password_input()).await?;
    let submit = session.find_now(&selectors::submit_button()).await?;

    let driver = session.driver();
    driver.clear(&username).await?;
    driver.send_keys(&username, &credentials.username).await?;
    driver.clear(&password).await?;
    driver.send_keys(&password, &credentials.password).await?;
    driver.click(&submit).await?;

    wait.until_url_contains(&session.config().dashboard_marker).await?;
    Ok(())
}

/// Click the Logout control and wait for the login form.
///
/// Best effort: failures are logged and swallowed.
pub async fn logout(session: &Session) -> bool {
    let result = async {
        session.click(&selectors::logout_button()).await?;
        session.wait().until_present(&selectors::password_input()).await?;
        E2eResult::Ok(())
    }
    .await;

    match result {
        Ok(()) => {
            info!("Logged out");
            true
        }
        Err(e) => {
            warn!("Logout failed: {}", e);
            false
        }
    }
}
