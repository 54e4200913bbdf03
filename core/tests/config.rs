use routing_metrics_core::config::{MetricsConfig, DEFAULT_PAGE_SIZE, DEFAULT_REFRESH_INTERVAL_MS};
use std::fs;
use std::path::PathBuf;

fn repo_data_dir() -> String {
    format!("{}/../data", env!("CARGO_MANIFEST_DIR"))
}

fn scratch_data_dir(name: &str, config_json: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("routing-metrics-{name}-{}", std::process::id()));
    fs::create_dir_all(dir.join("metrics")).unwrap();
    fs::write(dir.join("metrics/metrics_config.json"), config_json).unwrap();
    dir
}

#[test]
fn shipped_config_matches_defaults() {
    let loaded = MetricsConfig::load(&repo_data_dir()).expect("shipped config loads");

    assert_eq!(loaded, MetricsConfig::default());
    assert_eq!(loaded.page_size, DEFAULT_PAGE_SIZE);
    assert_eq!(loaded.refresh.interval_ms, DEFAULT_REFRESH_INTERVAL_MS);
    assert_eq!(loaded.storage.view_state_namespace, "departmentTicketFilters");
}

#[test]
fn missing_directory_is_an_error() {
    assert!(MetricsConfig::load("/nonexistent/metrics-data").is_err());
}

#[test]
fn inverted_thresholds_are_rejected() {
    let mut config = serde_json::to_value(MetricsConfig::default()).unwrap();
    config["accuracy"]["ok_percent"] = serde_json::json!(95.0);
    let dir = scratch_data_dir("thresholds", &config.to_string());

    let err = MetricsConfig::load(dir.to_str().unwrap()).unwrap_err();

    assert!(err.to_string().contains("ok_percent"), "unexpected error: {err}");
    let _ = fs::remove_dir_all(dir);
}

#[test]
fn zero_page_size_is_rejected() {
    let mut config = serde_json::to_value(MetricsConfig::default()).unwrap();
    config["page_size"] = serde_json::json!(0);
    let dir = scratch_data_dir("page-size", &config.to_string());

    assert!(MetricsConfig::load(dir.to_str().unwrap()).is_err());
    let _ = fs::remove_dir_all(dir);
}

#[test]
fn interval_beyond_one_day_is_rejected() {
    let mut config = serde_json::to_value(MetricsConfig::default()).unwrap();
    config["refresh"]["interval_ms"] = serde_json::json!(u64::MAX);
    let dir = scratch_data_dir("interval", &config.to_string());

    let err = MetricsConfig::load(dir.to_str().unwrap()).unwrap_err();

    assert!(err.to_string().contains("interval_ms"), "unexpected error: {err}");
    let _ = fs::remove_dir_all(dir);
}
