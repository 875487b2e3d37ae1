//! Tests for goal pool loading, filtering and picking.

use std::fs;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tempfile::TempDir;
use wiki_golf::{EXCLUDED_TOP_TITLES, GoalPool, LinkPolicy, TopArticle};

const POOL_JSON: &str = r#"{
  "articles": [
    { "title": "東京都", "views": 5000, "rank": 1 },
    { "title": "富士山", "views": 4000, "rank": 2 },
    { "title": "大阪府", "views": 3000, "rank": 3 }
  ]
}"#;

fn policy() -> LinkPolicy {
    LinkPolicy::with_default_namespaces("ja.wikipedia.org", "/wiki/")
}

#[test]
fn test_from_json() {
    let pool = GoalPool::from_json(POOL_JSON).expect("Parse failed");
    assert_eq!(pool.len(), 3);
    assert_eq!(pool.articles()[1].title(), "富士山");
    assert_eq!(*pool.articles()[1].views(), 4000);
}

#[test]
fn test_from_file() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("top.json");
    fs::write(&path, POOL_JSON).expect("Failed to write pool");

    let pool = GoalPool::from_file(&path).expect("Load failed");
    assert_eq!(pool.len(), 3);
}

#[test]
fn test_missing_or_invalid_file_is_error() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    assert!(GoalPool::from_file(dir.path().join("missing.json")).is_err());

    let path = dir.path().join("bad.json");
    fs::write(&path, "{ not json").expect("Failed to write pool");
    assert!(GoalPool::from_file(&path).is_err());
}

#[test]
fn test_saved_pool_loads_back() {
    let pool = GoalPool::from_json(POOL_JSON).expect("Parse failed");
    let json = pool.to_json().expect("Serialize failed");
    assert_eq!(GoalPool::from_json(&json).expect("Parse failed"), pool);
}

#[test]
fn test_seeded_picks_are_deterministic() {
    let pool = GoalPool::from_json(POOL_JSON).expect("Parse failed");

    let picks = |seed| {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..10)
            .map(|_| pool.pick(&mut rng).expect("Empty pool").title().clone())
            .collect::<Vec<_>>()
    };

    let first = picks(42);
    assert_eq!(first, picks(42));
    assert!(first.iter().all(|title| pool.articles().iter().any(|a| a.title() == title)));
}

#[test]
fn test_empty_pool_picks_nothing() {
    let pool = GoalPool::default();
    let mut rng = StdRng::seed_from_u64(1);
    assert!(pool.is_empty());
    assert!(pool.pick(&mut rng).is_none());
}

#[test]
fn test_pageviews_filtered_and_ranked() {
    let entries = vec![
        ("メインページ".to_string(), 900_000),
        ("特別:検索".to_string(), 500_000),
        ("富士山".to_string(), 3_000),
        ("Wikipedia:Sandbox".to_string(), 2_500),
        ("東京_タワー".to_string(), 4_000),
        ("-".to_string(), 10_000),
        ("大阪府".to_string(), 1_000),
    ];

    let pool = GoalPool::from_pageviews(entries, &policy(), 10);

    assert_eq!(
        pool.articles(),
        &vec![
            TopArticle::new("東京 タワー".to_string(), 4_000, 1),
            TopArticle::new("富士山".to_string(), 3_000, 2),
            TopArticle::new("大阪府".to_string(), 1_000, 3),
        ]
    );
}

#[test]
fn test_pageviews_respect_limit() {
    let entries = (0..20).map(|n| (format!("Article {n}"), 100 - n as u64));
    let pool = GoalPool::from_pageviews(entries, &policy(), 5);
    assert_eq!(pool.len(), 5);
    assert_eq!(pool.articles()[0].title(), "Article 0");
    assert_eq!(*pool.articles()[4].rank(), 5);
}

#[test]
fn test_exclusions_cover_main_pages() {
    assert!(EXCLUDED_TOP_TITLES.contains(&"メインページ"));
    assert!(EXCLUDED_TOP_TITLES.contains(&"Main Page"));
}
