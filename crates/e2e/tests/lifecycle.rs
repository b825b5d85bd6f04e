//! One browser session per run, closed exactly once whatever the cases do

mod common;

use admin_e2e::cases::{Case, CaseContext};
use admin_e2e::{E2eError, E2eResult, Session, SuiteRunner};
use common::{config, panel, BASE_URL};

async fn fails(_: &Session, _: &CaseContext) -> E2eResult<()> {
    Err(E2eError::AssertionFailed("deliberate".into()))
}

async fn panics(_: &Session, _: &CaseContext) -> E2eResult<()> {
    panic!("case blew up")
}

async fn passes(_: &Session, cx: &CaseContext) -> E2eResult<()> {
    cx.progress("fine");
    Ok(())
}

fn scripted() -> Vec<Case> {
    vec![
        Case {
            number: 1,
            name: "fails",
            run: |s, cx| Box::pin(fails(s, cx)),
        },
        Case {
            number: 2,
            name: "panics",
            run: |s, cx| Box::pin(panics(s, cx)),
        },
        Case {
            number: 3,
            name: "passes",
            run: |s, cx| Box::pin(passes(s, cx)),
        },
    ]
}

#[tokio::test(start_paused = true)]
async fn full_sequence_uses_one_session() {
    let app = panel();
    let result = SuiteRunner::new(config()).run(&app.launcher()).await.unwrap();

    assert_eq!(result.total, 20);
    assert_eq!(result.failed, 0, "{:#?}", result.results);
    assert_eq!(app.launch_count(), 1);
    assert_eq!(app.close_count(), 1);

    let journal = app.journal();
    assert_eq!(journal.first().map(String::as_str), Some("launch"));
    assert_eq!(journal.last().map(String::as_str), Some("close"));
}

#[tokio::test(start_paused = true)]
async fn every_case_starts_from_home() {
    let app = panel();
    SuiteRunner::new(config()).run(&app.launcher()).await.unwrap();

    let home = format!("goto {}", BASE_URL);
    let resets = app.journal().iter().filter(|e| **e == home).count();
    assert_eq!(resets, 20);
}

#[tokio::test(start_paused = true)]
async fn failures_and_panics_still_release_once() {
    let app = panel();
    let result = SuiteRunner::new(config())
        .with_cases(scripted())
        .run(&app.launcher())
        .await
        .unwrap();

    assert_eq!(result.passed, 1);
    assert_eq!(result.failed, 2);
    assert!(result.result(1).unwrap().error.as_deref().unwrap().contains("deliberate"));
    assert!(result.result(2).unwrap().error.as_deref().unwrap().contains("case blew up"));
    assert_eq!(result.result(3).unwrap().progress, vec!["fine".to_string()]);

    assert_eq!(app.launch_count(), 1);
    assert_eq!(app.close_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn browser_start_failure_is_fatal() {
    let app = panel();
    app.fail_launches(true);

    let err = SuiteRunner::new(config()).run(&app.launcher()).await.unwrap_err();
    assert!(matches!(err, E2eError::SessionStartup(_)));
    assert_eq!(app.close_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn out_of_order_cases_never_open_a_browser() {
    let app = panel();
    let mut cases = scripted();
    cases.reverse();

    let err = SuiteRunner::new(config())
        .with_cases(cases)
        .run(&app.launcher())
        .await
        .unwrap_err();
    assert!(matches!(err, E2eError::InvalidConfig(_)));
    assert_eq!(app.launch_count(), 0);
}
