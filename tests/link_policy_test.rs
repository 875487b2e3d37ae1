//! Tests for deny-by-default link classification.

use wiki_golf::{InertReason, LinkClass, LinkPolicy};

fn policy() -> LinkPolicy {
    LinkPolicy::with_default_namespaces("ja.wikipedia.org", "/wiki/")
}

fn article(title: &str) -> LinkClass {
    LinkClass::Article(title.to_string())
}

#[test]
fn test_ordinary_article_links_are_live() {
    let policy = policy();
    assert_eq!(policy.classify("/wiki/Dog"), article("Dog"));
    assert_eq!(policy.classify("/wiki/New_York_City"), article("New York City"));
    assert_eq!(
        policy.classify("/wiki/%E6%9D%B1%E4%BA%AC%E9%83%BD"),
        article("東京都")
    );
    assert_eq!(policy.classify("/wiki/AC/DC"), article("AC/DC"));
}

#[test]
fn test_fragment_is_stripped_from_article_links() {
    assert_eq!(policy().classify("/wiki/Dog#History"), article("Dog"));
}

#[test]
fn test_same_page_anchors_are_inert() {
    let policy = policy();
    assert_eq!(
        policy.classify("#cite_note-1"),
        LinkClass::Inert(InertReason::Fragment)
    );
    assert_eq!(policy.classify(""), LinkClass::Inert(InertReason::Fragment));
}

#[test]
fn test_reserved_namespaces_are_inert() {
    let policy = policy();
    for href in [
        "/wiki/Category:Foo",
        "/wiki/category:foo",
        "/wiki/File:Example.jpg",
        "/wiki/Help:Contents",
        "/wiki/Special:Random",
        "/wiki/Template:Infobox",
        "/wiki/Talk:Dog",
        "/wiki/Portal:Science",
        "/wiki/Wikipedia_talk:Foo",
        "/wiki/Help_talk:Foo",
        "/wiki/File_talk:Foo",
        "/wiki/Portal_talk:Foo",
        "/wiki/Module_talk:Foo",
        "/wiki/Template‐ノート:Foo",
        "/wiki/Wikipedia‐ノート:Foo",
        "/wiki/Category‐ノート:Foo",
        "/wiki/Help‐ノート:Foo",
        "/wiki/%E3%83%97%E3%83%AD%E3%82%B8%E3%82%A7%E3%82%AF%E3%83%88%E2%80%90%E3%83%8E%E3%83%BC%E3%83%88:Foo",
        "/wiki/%E3%83%95%E3%82%A1%E3%82%A4%E3%83%AB:X.jpg",
        "/wiki/%E7%89%B9%E5%88%A5:%E6%A4%9C%E7%B4%A2",
        "https://ja.wikipedia.org/wiki/Category:Foo",
    ] {
        assert_eq!(
            policy.classify(href),
            LinkClass::Inert(InertReason::ReservedNamespace),
            "{href}"
        );
    }
}

#[test]
fn test_talk_of_configured_namespace_is_reserved() {
    let policy = LinkPolicy::new("ja.wikipedia.org", "/wiki/", ["Essay"]);
    assert_eq!(
        policy.classify("/wiki/Essay_talk:Foo"),
        LinkClass::Inert(InertReason::ReservedNamespace)
    );
    assert_eq!(
        policy.classify("/wiki/Pillow_talk:Foo"),
        article("Pillow talk:Foo")
    );
}

#[test]
fn test_ordinary_colon_titles_stay_live() {
    assert_eq!(
        policy().classify("/wiki/Star_Wars:_Episode_IV"),
        article("Star Wars: Episode IV")
    );
}

#[test]
fn test_off_site_links_are_inert() {
    let policy = policy();
    for href in [
        "https://en.wikipedia.org/wiki/Dog",
        "http://example.com/",
        "//upload.wikimedia.org/x.png",
        "mailto:someone@example.com",
        "javascript:alert(1)",
    ] {
        assert_eq!(
            policy.classify(href),
            LinkClass::Inert(InertReason::OffSite),
            "{href}"
        );
    }
}

#[test]
fn test_relative_links_outside_article_path_are_inert() {
    let policy = policy();
    for href in [
        "/w/index.php?title=Dog&action=edit",
        "Dog",
        "../wiki/Dog",
        "/wikipedia/Dog",
    ] {
        assert_eq!(
            policy.classify(href),
            LinkClass::Inert(InertReason::OutsideArticlePath),
            "{href}"
        );
    }
}

#[test]
fn test_near_misses_are_unmatched() {
    let policy = policy();
    for href in [
        "/wiki/Dog?action=edit",
        "/wiki/",
        "/wiki/%FF",
        "/wiki/A%7CB",
        "/wiki/_",
        "https://ja.wikipedia.org/wiki/Dog",
    ] {
        assert_eq!(
            policy.classify(href),
            LinkClass::Inert(InertReason::Unmatched),
            "{href}"
        );
    }
}

#[test]
fn test_classification_never_rewrites_non_article_inputs() {
    let policy = policy();
    let inputs = [
        "#",
        "?",
        "/",
        "//",
        "/wiki",
        "wiki/Dog",
        "https://",
        "ftp://ja.wikipedia.org/wiki/Dog",
        "data:text/html,<a>",
        "/wiki/Dog?",
        "/wiki/..",
        "/wiki/..%2Fw%2Findex.php",
        "/wiki/./Dog",
        "/wiki/A/../B",
        "   ",
        "/WIKI/Dog",
    ];
    for href in inputs {
        assert!(
            policy.classify(href).title().is_none(),
            "{href} should be inert"
        );
    }
}

#[test]
fn test_policy_normalizes_inputs() {
    let policy = LinkPolicy::new("JA.Wikipedia.ORG", "wiki", ["Portal"]);
    assert_eq!(policy.host(), "ja.wikipedia.org");
    assert_eq!(policy.article_path(), "/wiki/");
    assert_eq!(policy.reserved_namespaces(), &vec!["portal".to_string()]);
    assert_eq!(
        policy.classify("/wiki/Portal:Science"),
        LinkClass::Inert(InertReason::ReservedNamespace)
    );
    assert_eq!(policy.classify("/wiki/Category:Foo"), article("Category:Foo"));
}

#[test]
fn test_reserved_title_check() {
    let policy = policy();
    assert!(policy.is_reserved_title("特別:検索"));
    assert!(policy.is_reserved_title("File:X.jpg"));
    assert!(!policy.is_reserved_title("Dog"));
    assert!(!policy.is_reserved_title("Star Wars: Episode IV"));
}

mod properties {
    use proptest::prelude::*;
    use wiki_golf::{LinkClass, LinkPolicy, is_valid_title};

    fn policy() -> LinkPolicy {
        LinkPolicy::with_default_namespaces("ja.wikipedia.org", "/wiki/")
    }

    proptest! {
        #[test]
        fn prop_non_article_prefixes_are_never_live(
            prefix in prop_oneof![
                Just("#"),
                Just("//"),
                Just("https://example.com/"),
                Just("https://ja.wikipedia.org/wiki/"),
                Just("/w/"),
                Just("wiki/"),
                Just("/WIKI/"),
                Just("mailto:"),
                Just("javascript:"),
                Just("/wiki/Category:"),
                Just("/wiki/Help_talk:"),
                Just("/wiki/Template‐ノート:"),
                Just("/wiki/特別:"),
                Just("/wiki/../"),
            ],
            rest in "\\PC{0,30}",
        ) {
            let href = format!("{prefix}{rest}");
            let class = policy().classify(&href);
            prop_assert!(
                !matches!(class, LinkClass::Article(_)),
                "{} classified as {:?}",
                href,
                class
            );
        }

        #[test]
        fn prop_live_links_name_ordinary_titles(href in "\\PC{0,40}") {
            let policy = policy();
            if let LinkClass::Article(title) = policy.classify(&href) {
                prop_assert!(href.trim().starts_with("/wiki/"));
                prop_assert!(is_valid_title(&title));
                prop_assert!(!policy.is_reserved_title(&title));
            }
        }
    }
}
