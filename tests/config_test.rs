//! Tests for loading arena configuration from TOML.

use hex_arena::{ArenaConfig, GameOptions};
use hex_engine::TimeControlType;
use hex_engine::time_control::{ByoyomiOptions, FischerOptions};
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes()).expect("Failed to write config");
    file
}

#[test]
fn test_defaults_for_empty_file() {
    let file = write_config("");
    let config = ArenaConfig::from_file(file.path()).unwrap();

    assert_eq!(config, ArenaConfig::default());
    assert_eq!(*config.board_size(), 11);
    assert!(*config.allow_swap());
    assert_eq!(
        *config.time_control(),
        TimeControlType::Fischer(FischerOptions {
            initial_seconds: 600,
            increment_seconds: 5,
            max_seconds: None,
        })
    );
}

#[test]
fn test_full_config() {
    let file = write_config(
        r#"
board_size = 13
allow_swap = false

[time_control]
type = "byoyomi"
options = { initialSeconds = 300, periodsCount = 5, periodSeconds = 30 }
"#,
    );
    let config = ArenaConfig::from_file(file.path()).unwrap();
    let options = GameOptions::from(&config);

    assert_eq!(options.board_size, 13);
    assert!(!options.allow_swap);
    assert_eq!(
        options.time_control,
        TimeControlType::Byoyomi(ByoyomiOptions {
            initial_seconds: 300,
            periods_count: 5,
            period_seconds: 30,
        })
    );
}

#[test]
fn test_rejects_zero_board_size() {
    let file = write_config("board_size = 0\n");
    let err = ArenaConfig::from_file(file.path()).unwrap_err();
    assert!(err.message.contains("board_size"));
}

#[test]
fn test_rejects_oversized_board() {
    let file = write_config("board_size = 100000\n");
    let err = ArenaConfig::from_file(file.path()).unwrap_err();
    assert!(err.message.contains("board_size"));
}

#[test]
fn test_rejects_invalid_time_control() {
    let err = ArenaConfig::from_toml(
        r#"
[time_control]
type = "simple"
options = { secondsPerMove = 0 }
"#,
    )
    .unwrap_err();
    assert!(err.message.starts_with("Invalid time_control"));

    let err = ArenaConfig::from_toml(
        r#"
[time_control]
type = "sundial"
options = {}
"#,
    )
    .unwrap_err();
    assert!(err.message.starts_with("Failed to parse config"));
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = ArenaConfig::from_file(dir.path().join("absent.toml")).unwrap_err();
    assert!(err.message.starts_with("Failed to read config file"));
    assert!(err.to_string().starts_with("Config error: "));
}
