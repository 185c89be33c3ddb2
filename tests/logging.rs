use std::{fs, thread::sleep, time::Duration};

use serial_test::serial;
use tempfile::tempdir;

#[test]
#[serial]
fn writes_log_file_into_missing_directory() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("logs").join("trackball_scroll.log");

    trackball_scroll::logging::init(false, Some(path.clone()));
    tracing::info!(interval_ms = 20, "dispatcher started");
    tracing::debug!("filtered at info level");

    sleep(Duration::from_millis(100));

    assert!(path.exists(), "log file was not created");
    let contents = fs::read_to_string(path).unwrap();
    assert!(contents.contains("dispatcher started"));
    assert!(!contents.contains("filtered at info level"));
    assert!(!contents.contains("\u{1b}["), "file output must not carry ANSI codes");
}
