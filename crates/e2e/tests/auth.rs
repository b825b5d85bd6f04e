//! Login reporting and the negative login cases

mod common;

use admin_e2e::auth::{self, LoginOutcome};
use admin_e2e::config::Credentials;
use admin_e2e::fake::FakeAdminPanel;
use admin_e2e::locator::selectors;
use admin_e2e::{Session, SuiteConfig};
use common::{config, panel, run_cases, run_with, session, BASE_URL};
use test_case::test_case;

#[tokio::test(start_paused = true)]
async fn correct_credentials_reach_the_dashboard() {
    let app = panel();
    let session = session(&app).await;

    let outcome = auth::login_default(&session).await;
    assert_eq!(outcome, LoginOutcome::Success);
    assert!(session.is_authenticated().await.unwrap());
}

#[test_case("invaliduser", "vivek123" ; "wrong username")]
#[test_case("vivekjadhav", "wrongpassword" ; "wrong password")]
#[test_case("", "" ; "empty credentials")]
#[tokio::test(start_paused = true)]
async fn bad_credentials_stay_unauthenticated(username: &str, password: &str) {
    let app = panel();
    let session = session(&app).await;

    let outcome = auth::login(&session, &Credentials::new(username, password)).await;
    assert!(matches!(outcome, LoginOutcome::TimedOut(_)), "{}", outcome);
    assert!(!session.is_authenticated().await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn missing_login_form_is_reported() {
    let app = panel();
    app.hide(selectors::username_input());
    let session = session(&app).await;

    let outcome = auth::login_default(&session).await;
    assert!(matches!(outcome, LoginOutcome::NotFound(_)), "{}", outcome);
}

#[tokio::test(start_paused = true)]
async fn logout_returns_to_login_form() {
    let app = panel();
    let session = session(&app).await;
    auth::login_default(&session).await;

    assert!(auth::logout(&session).await);
    assert!(!session.is_authenticated().await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn logout_without_button_is_swallowed() {
    let app = panel();
    app.hide(selectors::logout_button());
    let session = session(&app).await;
    auth::login_default(&session).await;

    assert!(!auth::logout(&session).await);
    assert!(session.is_authenticated().await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn negative_cases_pass_when_login_is_refused() {
    let app = panel();
    let result = run_cases(&app, &[1, 2, 3, 4, 5]).await;
    assert_eq!(result.failed, 0, "{:#?}", result.results);
}

#[tokio::test(start_paused = true)]
async fn negative_case_fails_when_login_is_wrongly_accepted() {
    // A panel that accepts the username the negative case types
    let app = FakeAdminPanel::new(BASE_URL, Credentials::new("invaliduser", "vivek123"));
    let result = run_cases(&app, &[2]).await;

    let case = result.result(2).unwrap();
    assert!(!case.passed());
    assert!(case.error.as_deref().unwrap().contains("login was accepted"));
}

#[test_case("dashboard" ; "lower case")]
#[test_case("Dashboard" ; "capitalized")]
#[test_case("DASHBOARD" ; "upper case")]
#[tokio::test(start_paused = true)]
async fn dashboard_marker_ignores_case(marker: &str) {
    let app = panel();
    let config = SuiteConfig {
        dashboard_marker: marker.to_string(),
        ..config()
    };
    let session = Session::acquire(&app.launcher(), config.clone()).await.unwrap();
    session.reset_to_home().await.unwrap();
    assert!(!session.is_authenticated().await.unwrap());

    assert_eq!(auth::login_default(&session).await, LoginOutcome::Success);
    assert!(session.is_authenticated().await.unwrap());
    session.release().await.unwrap();

    let result = run_with(&app, config, &[1, 2]).await;
    assert_eq!(result.failed, 0, "{:#?}", result.results);
}
