//! Later cases act on data earlier cases left in the application

mod common;

use common::{config, panel, run_cases, run_with};

#[tokio::test(start_paused = true)]
async fn update_case_modifies_the_product_added_before_it() {
    let app = panel();
    let result = run_cases(&app, &[9, 10]).await;
    assert_eq!(result.failed, 0, "{:#?}", result.results);
    assert_eq!(result.tolerated_skips, 0);

    let product = app.product_named("Product To Update").unwrap();
    assert_eq!(product.price, 2000.0);
    assert_eq!(product.category, "Clothing");
    assert!(result.result(10).unwrap().progress.iter().any(|l| l.contains("Product To Update")));
}

#[tokio::test(start_paused = true)]
async fn update_case_alone_has_nothing_to_update() {
    let app = panel();
    let result = run_cases(&app, &[10]).await;

    assert_eq!(result.failed, 0);
    assert_eq!(result.result(10).unwrap().skips.len(), 1);
    assert!(app.products().is_empty());
}

#[tokio::test(start_paused = true)]
async fn data_survives_across_runs_on_one_application() {
    let app = panel();
    run_cases(&app, &[6]).await;
    let result = run_cases(&app, &[8]).await;

    assert_eq!(app.launch_count(), 2);
    assert_eq!(result.tolerated_skips, 0);
    assert!(result.result(8).unwrap().progress.iter().any(|l| l.contains("1 row")));
}

#[tokio::test(start_paused = true)]
async fn tagged_fixture_names_keep_the_dependency() {
    let app = panel();
    let mut config = config();
    config.unique_fixture_names = true;
    let result = run_with(&app, config, &[9, 10]).await;
    assert_eq!(result.failed, 0, "{:#?}", result.results);

    let products = app.products();
    assert_eq!(products.len(), 1);
    assert!(products[0].name.starts_with("Product To Update "));
    assert_ne!(products[0].name, "Product To Update");
    assert_eq!(products[0].price, 2000.0);
}

#[tokio::test(start_paused = true)]
async fn incomplete_product_is_never_stored() {
    let app = panel();
    let result = run_cases(&app, &[6, 7]).await;

    assert_eq!(result.failed, 0, "{:#?}", result.results);
    let names: Vec<_> = app.products().into_iter().map(|p| p.name).collect();
    assert_eq!(names, vec!["Test Laptop".to_string()]);
}
