//! The add form's category field, typed or picked

mod common;

use admin_e2e::locator::selectors;
use common::{panel, run_cases};

#[tokio::test(start_paused = true)]
async fn category_is_typed_into_the_text_field() {
    let app = panel();
    // The add form has no select; a run that reached for one would time out
    app.hide(selectors::combobox());
    let result = run_cases(&app, &[6]).await;

    let case = result.result(6).unwrap();
    assert!(case.passed(), "{:?}", case.error);
    assert_eq!(app.product_named("Test Laptop").unwrap().category, "Electronics");
}

#[tokio::test(start_paused = true)]
async fn first_category_is_typed_when_no_category_is_named() {
    let app = panel();
    app.hide(selectors::row_action_for("Delete", "Workflow Test Product"));
    let result = run_cases(&app, &[20]).await;

    assert!(result.result(20).unwrap().passed());
    let product = app.product_named("Workflow Test Product").unwrap();
    assert_eq!(product.category, "Electronics");
}

#[tokio::test(start_paused = true)]
async fn category_select_is_used_when_there_is_no_text_field() {
    let app = panel();
    app.use_category_select(true);
    let result = run_cases(&app, &[6, 17]).await;
    assert_eq!(result.failed, 0, "{:#?}", result.results);
    assert_eq!(result.tolerated_skips, 0, "{:#?}", result.results);

    let categories: Vec<_> = app
        .products()
        .into_iter()
        .map(|p| (p.name, p.category))
        .collect();
    assert_eq!(
        categories,
        [
            ("Test Laptop".to_string(), "Electronics".to_string()),
            ("Smartphone".to_string(), "Electronics".to_string()),
            ("T-Shirt".to_string(), "Clothing".to_string()),
            ("Coffee Mug".to_string(), "Home".to_string()),
        ]
    );
}
