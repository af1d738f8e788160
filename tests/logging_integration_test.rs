//! Integration tests for logging functionality
//!
//! A process can install only one global subscriber, so a single test
//! initializes logging.

use pharmacy::config::LoggingConfig;
use pharmacy::logging::init_logging;
use pharmacy::{log_access_denied, log_prescription_transition};
use tempfile::TempDir;

#[test]
fn test_logging_config_default() {
    let config = LoggingConfig::default();
    assert!(!config.local_enabled);
    assert_eq!(config.local_rotation, "daily");
}

#[test]
fn test_file_logging_writes_json_lines() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("logs");

    let config = LoggingConfig {
        local_enabled: true,
        local_path: log_path.to_string_lossy().to_string(),
        local_rotation: "hourly".to_string(),
    };

    // Events below are emitted under this test crate's target, not `pharmacy`
    std::env::set_var("RUST_LOG", "info");
    let guard = init_logging("info", &config).unwrap();
    log_prescription_transition!(7, "pending", "fulfilled");
    log_access_denied!("patient", 7, "not the prescription's patient");
    drop(guard);

    assert!(log_path.is_dir());
    let contents: String = std::fs::read_dir(&log_path)
        .unwrap()
        .map(|entry| std::fs::read_to_string(entry.unwrap().path()).unwrap())
        .collect();
    assert!(contents.contains("Prescription status changed"));
    assert!(contents.contains("\"prescription_id\":7"));
}
