//! End-to-end dumps written to a temporary output directory.

use repodex_core::io::{persist_includes, write_root};
use repodex_core::{BuildConfig, PackagesBuilder};
use repodex_schema::{HashAlgorithm, PackageRecord};
use serde_json::{Value, json};
use std::fs;
use tempfile::TempDir;

fn records(value: Value) -> Vec<PackageRecord> {
    serde_json::from_value(value).expect("valid records")
}

fn sample() -> Vec<PackageRecord> {
    records(json!([
        {"name": "acme/http", "version": "1.0.0", "require": {"acme/log": "^1.0"}},
        {"name": "acme/log", "version": "1.0.0", "description": "Logger ✓"},
        {"name": "acme/http", "version": "1.1.0"},
        {"name": "fork/log", "version": "1.0.0", "replace": {"acme/log": "self.version"}},
        {"name": "fork/log", "version": "2.0.0"},
        {"name": "acme/log", "version": "1.1.0"},
    ]))
}

/// Run a full build into `dir` and return the parsed root document.
fn build(dir: &TempDir, config: BuildConfig, input: Vec<PackageRecord>) -> Value {
    let builder = PackagesBuilder::new(dir.path(), config).expect("valid config");
    let outcome = builder.dump(input).expect("dump");
    persist_includes(&outcome).expect("persist");
    let root = write_root(&outcome.index, dir.path(), builder.writer().style()).expect("root");
    serde_json::from_slice(&fs::read(root).expect("read root")).expect("root json")
}

#[test]
fn test_mode_toggle_changes_root_shape() {
    let flat_dir = TempDir::new().unwrap();
    let flat = build(&flat_dir, BuildConfig::default(), sample());
    let flat = flat.as_object().unwrap();
    assert_eq!(flat.keys().collect::<Vec<_>>(), ["packages"]);
    assert!(flat["packages"]["acme/log"]["1.0.0"].get("uid").is_none());

    let providers_dir = TempDir::new().unwrap();
    let config = BuildConfig {
        providers: true,
        ..BuildConfig::default()
    };
    let providers = build(&providers_dir, config, sample());
    let providers = providers.as_object().unwrap();
    assert_eq!(
        providers.keys().collect::<Vec<_>>(),
        ["providers-url", "providers"]
    );
}

#[test]
fn test_provider_files_are_written_and_match_their_hash() {
    let dir = TempDir::new().unwrap();
    let config = BuildConfig {
        providers: true,
        homepage: Some("https://example.com/repo/".to_string()),
        ..BuildConfig::default()
    };
    let root = build(&dir, config, sample());
    assert_eq!(root["providers-url"], json!("/repo/p/%package%$%hash%.json"));

    let providers = root["providers"].as_object().unwrap();
    assert_eq!(providers.len(), 3);
    for (name, entry) in providers {
        let hash = entry["sha256"].as_str().unwrap();
        let path = dir.path().join(format!("p/{name}${hash}.json"));
        let content = fs::read(&path).unwrap();
        assert_eq!(HashAlgorithm::Sha256.digest(&content).as_str(), hash);
    }

    let log_hash = providers["acme/log"]["sha256"].as_str().unwrap();
    let log: Value = serde_json::from_slice(
        &fs::read(dir.path().join(format!("p/acme/log${log_hash}.json"))).unwrap(),
    )
    .unwrap();
    let packages = log["packages"].as_object().unwrap();
    assert_eq!(packages.keys().collect::<Vec<_>>(), ["fork/log", "acme/log"]);
    // versions of a replacer that do not replace are carried along
    assert!(packages["fork/log"].get("2.0.0").is_some());
    // uids follow first appearance: acme/http 1..2, acme/log 3..4, fork/log 5..6
    assert_eq!(packages["acme/log"]["1.1.0"]["uid"], json!(4));
    assert_eq!(packages["fork/log"]["2.0.0"]["uid"], json!(6));
}

#[test]
fn test_rerun_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let config = BuildConfig {
        providers: true,
        ..BuildConfig::default()
    };
    let builder = PackagesBuilder::new(dir.path(), config).unwrap();

    let first = builder.dump(sample()).unwrap();
    let summary = persist_includes(&first).unwrap();
    assert_eq!(summary.written, 3);

    let second = builder.dump(sample()).unwrap();
    assert_eq!(second.index, first.index);
    assert_eq!(second.pending().count(), 0);
    assert_eq!(persist_includes(&second).unwrap().skipped, 3);
}

#[test]
fn test_flat_include_written_once() {
    let dir = TempDir::new().unwrap();
    let builder = PackagesBuilder::new(dir.path(), BuildConfig::default()).unwrap();
    let outcome = builder.dump(sample()).unwrap();
    persist_includes(&outcome).unwrap();

    let include = &outcome.includes[0];
    assert!(include.filename.starts_with("include/all$"));
    let written = fs::read(dir.path().join(&include.filename)).unwrap();
    assert_eq!(written, include.content);
    assert_eq!(HashAlgorithm::Sha1.digest(&written), include.hash);

    let text = String::from_utf8(written).unwrap();
    assert!(text.contains("Logger ✓"));
    assert!(text.contains("\n    \"packages\": {"));
}

#[test]
fn test_preseeded_hash_file_is_not_rewritten() {
    let dir = TempDir::new().unwrap();
    let builder = PackagesBuilder::new(dir.path(), BuildConfig::default()).unwrap();
    let outcome = builder.dump(sample()).unwrap();
    let path = dir.path().join(&outcome.includes[0].filename);

    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, b"{\"packages\": {}}\n").unwrap();

    let again = builder.dump(sample()).unwrap();
    assert!(!again.includes[0].needs_write());
    persist_includes(&again).unwrap();
    assert_eq!(fs::read(&path).unwrap(), b"{\"packages\": {}}\n");
}
