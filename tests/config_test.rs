//! Tests for configuration loading.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;
use wiki_golf::{GolfConfig, InertReason, LinkClass};

#[test]
fn test_defaults() {
    let config = GolfConfig::default();
    assert_eq!(config.source().host(), "ja.wikipedia.org");
    assert_eq!(config.source().article_path(), "/wiki/");
    assert_eq!(config.source().api_path(), "/w/api.php");
    assert_eq!(*config.source().timeout_secs(), 15);
    assert!(config.source().user_agent().starts_with("wiki_golf/"));
    assert_eq!(config.game().route(), "game");
    assert!(config.game().goal_pool().is_none());
    assert_eq!(config.server().host(), "127.0.0.1");
    assert_eq!(*config.server().port(), 3000);
}

#[test]
fn test_empty_toml_is_default() {
    let config = GolfConfig::from_toml("").expect("Parse failed");
    assert_eq!(config, GolfConfig::default());
}

#[test]
fn test_partial_toml_overrides() {
    let config = GolfConfig::from_toml(
        r#"
[source]
host = "en.wikipedia.org"
reserved_namespaces = ["Portal"]

[game]
route = "play"
goal_pool = "top.json"

[server]
port = 8080
"#,
    )
    .expect("Parse failed");

    assert_eq!(config.source().host(), "en.wikipedia.org");
    assert_eq!(config.source().article_path(), "/wiki/");
    assert_eq!(config.game().route(), "play");
    assert_eq!(config.game().goal_pool(), &Some(PathBuf::from("top.json")));
    assert_eq!(config.server().host(), "127.0.0.1");
    assert_eq!(*config.server().port(), 8080);
}

#[test]
fn test_invalid_toml_is_error() {
    assert!(GolfConfig::from_toml("[server]\nport = \"many\"").is_err());
}

#[test]
fn test_load_falls_back_to_defaults() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let missing = dir.path().join("absent.toml");

    assert_eq!(GolfConfig::load(None).expect("Load failed"), GolfConfig::default());
    assert_eq!(
        GolfConfig::load(Some(&missing)).expect("Load failed"),
        GolfConfig::default()
    );
}

#[test]
fn test_load_reads_file() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("wiki_golf.toml");
    fs::write(&path, "[game]\nroute = \"play\"\n").expect("Failed to write config");

    let config = GolfConfig::load(Some(&path)).expect("Load failed");
    assert_eq!(config.codec().route(), "play");
}

#[test]
fn test_load_broken_file_is_error() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("wiki_golf.toml");
    fs::write(&path, "[game\nroute = ").expect("Failed to write config");

    assert!(GolfConfig::load(Some(&path)).is_err());
}

#[test]
fn test_server_overrides() {
    let config = GolfConfig::default().with_server(Some("0.0.0.0".to_string()), None);
    assert_eq!(config.server().host(), "0.0.0.0");
    assert_eq!(*config.server().port(), 3000);
}

#[test]
fn test_link_policy_uses_configured_namespaces() {
    let config = GolfConfig::from_toml("[source]\nreserved_namespaces = [\"Portal\"]\n")
        .expect("Parse failed");
    let policy = config.link_policy();

    assert_eq!(
        policy.classify("/wiki/Portal:Science"),
        LinkClass::Inert(InertReason::ReservedNamespace)
    );
    assert_eq!(
        policy.classify("/wiki/Category:Foo"),
        LinkClass::Article("Category:Foo".to_string())
    );
}

#[test]
fn test_default_policy_reserves_categories() {
    let policy = GolfConfig::default().link_policy();
    assert_eq!(
        policy.classify("/wiki/Category:Foo"),
        LinkClass::Inert(InertReason::ReservedNamespace)
    );
}
