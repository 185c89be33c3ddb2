use std::{thread::sleep, time::Duration};

use serial_test::serial;
use tempfile::tempdir;

// Separate test binary: the global subscriber can only be installed once per
// process, so this must not share one with `writes_log_file`.
#[test]
#[serial]
fn init_without_file_creates_no_log() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("log.txt");

    trackball_scroll::logging::init(false, None);
    tracing::info!("test");

    sleep(Duration::from_millis(100));

    assert!(!path.exists(), "log file should not be created");
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
