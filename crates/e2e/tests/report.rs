//! The JSON results file

mod common;

use admin_e2e::SuiteRunner;
use common::{config, panel};

#[tokio::test(start_paused = true)]
async fn results_are_written_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config();
    config.output_dir = dir.path().join("out");

    let app = panel();
    let runner = SuiteRunner::new(config).select(&[1, 8], None).unwrap();
    let result = runner.run(&app.launcher()).await.unwrap();
    let path = runner.write_results(&result).unwrap();

    assert_eq!(path, dir.path().join("out").join("test-results.json"));
    let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["total"], 2);
    assert_eq!(json["passed"], 2);
    assert_eq!(json["tolerated_skips"], 1);
    assert_eq!(json["base_url"], "http://fake.test");
    assert!(json["started_at"].is_string());
    assert_eq!(json["results"][0]["name"], "login_valid_credentials");
    assert_eq!(json["results"][0]["status"], "passed");
    assert_eq!(json["results"][1]["skips"][0], "inventory table: no products yet");
}
