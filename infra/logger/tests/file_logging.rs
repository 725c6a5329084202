use mkit_logger::{LevelFilter, Logger};
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn file_logging_creates_log_file() {
    let tmp = tempdir().expect("temp dir");
    let log_dir = tmp.path().join("logs");

    let logger = Logger::builder()
        .name("integration-file")
        .console(false)
        .path(&log_dir)
        .level(LevelFilter::INFO)
        .init()
        .expect("logger should initialize");

    tracing::info!("hello from the file logger");
    // Give the background worker a moment to flush.
    std::thread::sleep(Duration::from_millis(50));
    drop(logger);

    assert!(log_dir.exists(), "log directory should be created by logger init");

    let has_log = std::fs::read_dir(&log_dir)
        .expect("read log dir")
        .flatten()
        .any(|entry| entry.path().extension().and_then(|e| e.to_str()) == Some("log"));
    assert!(has_log, "at least one log file should be created");
}
