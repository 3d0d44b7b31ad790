use std::time::Duration;

use assert_matches::assert_matches;
use camino::Utf8PathBuf;

use metaspace_export::config::{ConfigLoader, DEFAULT_ENDPOINT};
use metaspace_export::error::ExportError;

#[test]
fn resolve_config_file() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("metaspace-export.json");
    std::fs::write(
        &path,
        r#"{ "fdr": 0.2, "timeout_secs": 45, "output_dir": "exports" }"#,
    )
    .unwrap();

    let resolved = ConfigLoader::resolve(path.to_str()).unwrap();
    assert_eq!(resolved.endpoint, DEFAULT_ENDPOINT);
    assert_eq!(resolved.fdr, 0.2);
    assert_eq!(resolved.timeout, Some(Duration::from_secs(45)));
    assert_eq!(resolved.output_dir, Utf8PathBuf::from("exports"));
}

#[test]
fn explicit_missing_config_is_an_error() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("absent.json");
    let err = ConfigLoader::resolve(path.to_str()).unwrap_err();
    assert_matches!(err, ExportError::ConfigRead(_));
}

#[test]
fn malformed_config_is_reported() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("broken.json");
    std::fs::write(&path, r#"{ "fdr": "high" }"#).unwrap();
    let err = ConfigLoader::resolve(path.to_str()).unwrap_err();
    assert_matches!(err, ExportError::ConfigParse(_));
}
