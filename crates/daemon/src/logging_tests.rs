// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    empty = { "", LogTarget::Stderr },
    stderr = { "stderr", LogTarget::Stderr },
    stdout = { "stdout", LogTarget::Stdout },
    padded = { " stdout ", LogTarget::Stdout },
    file = { "/var/log/tpd.log", LogTarget::File(PathBuf::from("/var/log/tpd.log")) },
    relative = { "tpd.log", LogTarget::File(PathBuf::from("tpd.log")) },
)]
fn output_parsing(output: &str, expected: LogTarget) {
    assert_eq!(LogTarget::parse(output).unwrap(), expected);
}

#[test]
fn directory_is_not_a_log_file() {
    assert!(matches!(LogTarget::parse("/var/log/.."), Err(LogError::InvalidOutput(_))));
}

#[test]
fn file_appender_creates_missing_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("logs").join("tpd.log");

    file_appender(&path).unwrap();

    assert!(path.exists());
}
