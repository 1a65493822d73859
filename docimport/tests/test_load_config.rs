use docimport::load_config::{load_config, DEFAULT_SNAPSHOT};
use std::fs::write;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::NamedTempFile;

fn config_file(yaml: &str) -> NamedTempFile {
    let file = NamedTempFile::new().expect("Failed to create temp config file");
    write(file.path(), yaml).expect("Failed to write temp config file");
    file
}

#[test]
fn test_load_config_empty_file_uses_defaults() {
    let file = config_file("");
    let config = load_config(file.path()).expect("empty config should load");

    assert_eq!(config.import.throttle_batch, 10);
    assert_eq!(config.import.throttle_pause, Duration::from_secs(3));
    assert!(!config.import.skip_throttle);
    assert!(!config.import.import_internal);
    assert_eq!(config.store.snapshot, PathBuf::from(DEFAULT_SNAPSHOT));
}

#[test]
fn test_load_config_applies_overrides() {
    let yaml = r#"
import:
  throttle_batch: 25
  throttle_pause_secs: 0.5
  skip_throttle: true
  import_internal: true
store:
  snapshot: ./docs-store.json
"#;
    let file = config_file(yaml);
    let config = load_config(file.path()).expect("config should load");

    assert_eq!(config.import.throttle_batch, 25);
    assert_eq!(config.import.throttle_pause, Duration::from_millis(500));
    assert!(config.import.skip_throttle);
    assert!(config.import.import_internal);
    assert_eq!(config.store.snapshot, PathBuf::from("./docs-store.json"));
}

#[test]
fn test_load_config_partial_section_keeps_other_defaults() {
    let file = config_file("import:\n  import_internal: true\n");
    let config = load_config(file.path()).expect("config should load");

    assert!(config.import.import_internal);
    assert_eq!(config.import.throttle_batch, 10);
    assert_eq!(config.store.snapshot, PathBuf::from(DEFAULT_SNAPSHOT));
}

#[test]
fn test_load_config_invalid_yaml() {
    let file = config_file("import: [not, a, map");
    let err = load_config(file.path()).expect_err("invalid YAML must fail");
    let msg = format!("{err:#}");
    assert!(
        msg.contains("parse") && msg.contains("YAML"),
        "unexpected error: {msg}"
    );
}

#[test]
fn test_load_config_rejects_zero_batch() {
    let file = config_file("import:\n  throttle_batch: 0\n");
    let err = load_config(file.path()).expect_err("zero batch must fail");
    assert!(format!("{err:#}").contains("throttle_batch"), "{err:#}");
}

#[test]
fn test_load_config_rejects_negative_pause() {
    let file = config_file("import:\n  throttle_pause_secs: -1\n");
    assert!(load_config(file.path()).is_err());
}

#[test]
fn test_load_config_missing_file() {
    let err = load_config("/definitely/not/here.yaml").expect_err("missing file must fail");
    assert!(format!("{err}").contains("Failed to read config file"));
}

#[test]
fn test_load_config_rejects_huge_pause() {
    let file = config_file("import:\n  throttle_pause_secs: 1.0e30\n");
    let err = load_config(file.path()).expect_err("an unrepresentable pause must fail");
    assert!(
        format!("{err:#}").contains("throttle_pause_secs"),
        "unexpected error: {err:#}"
    );
}
