// repolab: manifest diff and GitLab administration for repo checkouts
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{LogConfig, LogFormat, LogLevel, open_log_file};

#[test]
fn test_log_level_bounds() {
    assert!(LogLevel::new(0).is_ok());
    assert!(LogLevel::new(6).is_ok());
    assert!(LogLevel::new(7).is_err());
    assert_eq!(LogLevel::try_from(4).map(u8::from).ok(), Some(4));
}

#[test]
fn test_log_levels_are_ordered() {
    assert!(LogLevel::DEBUG > LogLevel::INFO);
    assert!(LogLevel::SILENT < LogLevel::ERROR);
}

#[test]
fn test_filter_strings_keep_libraries_quiet_below_dump() {
    let filters: Vec<_> = [LogLevel::INFO, LogLevel::TRACE, LogLevel::DUMP]
        .into_iter()
        .map(LogLevel::to_filter_string)
        .collect();
    insta::assert_debug_snapshot!(filters, @r#"
    [
        "warn,repolab=info",
        "warn,repolab=trace",
        "trace",
    ]
    "#);
}

#[test]
fn test_log_config_defaults() {
    let config = LogConfig::default();
    assert_eq!(config.console_level(), LogLevel::INFO);
    assert_eq!(config.file_level(), LogLevel::TRACE);
    assert!(config.log_file().is_none());
    assert_eq!(config.file_format(), LogFormat::Text);
    assert!(!config.show_target());
}

#[test]
fn test_log_format_from_config_value() {
    let format: LogFormat = serde_json::from_str("\"json\"").unwrap();
    assert_eq!(format, LogFormat::Json);
    assert!(serde_json::from_str::<LogFormat>("\"xml\"").is_err());
}

#[test]
fn test_log_file_is_appended() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("logs/repolab.log");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "earlier run\n").unwrap();

    let mut file = open_log_file(&path).unwrap();
    std::io::Write::write_all(&mut file, b"this run\n").unwrap();
    drop(file);

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "earlier run\nthis run\n");
}

#[test]
fn test_log_file_directory_is_created() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("nested/dir/repolab.log");
    open_log_file(&path).unwrap();
    assert!(path.is_file());
}
