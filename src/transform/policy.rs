//! Deny-by-default link classification.
//!
//! Denial rules run in order and the first match makes the link inert.
//! A link that survives them is live only if it also matches the single
//! positive rule: a relative path under the article prefix naming an
//! ordinary title. Everything else is inert by construction.

use derive_getters::Getters;
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

use crate::state::is_valid_title;

/// Namespaces whose pages are never part of the game.
///
/// English canonical names and their Japanese-wiki equivalents. Matching is
/// case-insensitive on the text before the first colon. The talk namespace
/// of any listed namespace (`<ns> talk`, `<ns>‐ノート`) is reserved as well.
pub const DEFAULT_RESERVED_NAMESPACES: &[&str] = &[
    "File",
    "Image",
    "Media",
    "Category",
    "Template",
    "Help",
    "Special",
    "Wikipedia",
    "Project",
    "WP",
    "Portal",
    "Talk",
    "User",
    "User talk",
    "MediaWiki",
    "Module",
    "Draft",
    "TimedText",
    "File talk",
    "Image talk",
    "Category talk",
    "Template talk",
    "Help talk",
    "Wikipedia talk",
    "Project talk",
    "Portal talk",
    "MediaWiki talk",
    "Module talk",
    "Draft talk",
    "TimedText talk",
    "ファイル",
    "画像",
    "メディア",
    "カテゴリ",
    "ヘルプ",
    "特別",
    "プロジェクト",
    "ポータル",
    "ノート",
    "利用者",
    "利用者‐会話",
    "モジュール",
    "Wikipedia‐ノート",
    "ファイル‐ノート",
    "Template‐ノート",
    "Help‐ノート",
    "Category‐ノート",
    "Portal‐ノート",
    "プロジェクト‐ノート",
    "モジュール‐ノート",
    "MediaWiki‐ノート",
];

/// Suffixes that turn a namespace into its talk namespace.
const TALK_SUFFIXES: &[&str] = &[" talk", "‐ノート", "-ノート"];

/// Why a link was made inert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InertReason {
    /// Same-page anchor.
    Fragment,
    /// File, category, template, help, special or project page.
    ReservedNamespace,
    /// Absolute URL on another host, or a non-web scheme.
    OffSite,
    /// Relative reference outside the article path.
    OutsideArticlePath,
    /// Matched no rule, including the positive one.
    Unmatched,
}

/// Outcome of classifying a single `href`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkClass {
    /// A live move to the named article.
    Article(String),
    /// Not navigable in the game.
    Inert(InertReason),
}

impl LinkClass {
    /// Returns the target title of a live link.
    pub fn title(&self) -> Option<&str> {
        match self {
            LinkClass::Article(title) => Some(title),
            LinkClass::Inert(_) => None,
        }
    }
}

type DenyRule = fn(&LinkPolicy, &str) -> bool;

/// The denial chain, in precedence order.
const DENY_RULES: &[(InertReason, DenyRule)] = &[
    (InertReason::Fragment, is_fragment),
    (InertReason::ReservedNamespace, is_reserved_namespace),
    (InertReason::OffSite, is_off_site),
    (InertReason::OutsideArticlePath, is_outside_article_path),
];

/// Where ordinary articles live on the content source.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct LinkPolicy {
    /// Host of the content source, e.g. `ja.wikipedia.org`.
    host: String,
    /// Canonical article path prefix, e.g. `/wiki/`.
    article_path: String,
    /// Namespace prefixes, lowercased.
    reserved_namespaces: Vec<String>,
}

impl LinkPolicy {
    /// Creates a policy for the given host and article path prefix.
    #[instrument(skip(reserved_namespaces))]
    pub fn new(
        host: impl Into<String> + std::fmt::Debug,
        article_path: impl Into<String> + std::fmt::Debug,
        reserved_namespaces: impl IntoIterator<Item = impl AsRef<str>>,
    ) -> Self {
        let mut article_path = article_path.into();
        if !article_path.starts_with('/') {
            article_path.insert(0, '/');
        }
        if !article_path.ends_with('/') {
            article_path.push('/');
        }
        Self {
            host: host.into().to_lowercase(),
            article_path,
            reserved_namespaces: reserved_namespaces
                .into_iter()
                .map(|ns| ns.as_ref().trim().to_lowercase())
                .collect(),
        }
    }

    /// Creates a policy with the default namespace list.
    #[instrument]
    pub fn with_default_namespaces(
        host: impl Into<String> + std::fmt::Debug,
        article_path: impl Into<String> + std::fmt::Debug,
    ) -> Self {
        Self::new(host, article_path, DEFAULT_RESERVED_NAMESPACES.iter())
    }

    /// Classifies an `href` value. Total: every input gets an answer.
    #[instrument(skip(self))]
    pub fn classify(&self, href: &str) -> LinkClass {
        let href = href.trim();
        for (reason, rule) in DENY_RULES {
            if rule(self, href) {
                debug!(?reason, "Link denied");
                return LinkClass::Inert(*reason);
            }
        }
        match self.article_title(href) {
            Some(title) => LinkClass::Article(title),
            None => LinkClass::Inert(InertReason::Unmatched),
        }
    }

    /// The positive rule: a relative path under the article prefix, with no
    /// query, naming a valid title.
    fn article_title(&self, href: &str) -> Option<String> {
        if is_absolute(href) {
            return None;
        }
        let title = self.title_under_article_path(href)?;
        (!self.has_reserved_namespace(&title)).then_some(title)
    }

    /// Extracts and decodes the title from `<article_path><title>[#frag]`.
    fn title_under_article_path(&self, path: &str) -> Option<String> {
        let raw = path.strip_prefix(self.article_path.as_str())?;
        let raw = raw.split_once('#').map_or(raw, |(before, _)| before);
        if raw.contains('?') {
            return None;
        }
        let decoded = percent_decode_str(raw).decode_utf8().ok()?;
        let title = decoded.replace('_', " ").trim().to_string();
        is_valid_title(&title).then_some(title)
    }

    /// Returns true if `title` lives in a reserved namespace.
    #[instrument(skip(self))]
    pub fn is_reserved_title(&self, title: &str) -> bool {
        self.has_reserved_namespace(title)
    }

    fn has_reserved_namespace(&self, title: &str) -> bool {
        title.split_once(':').is_some_and(|(prefix, _)| {
            let prefix = prefix.trim().to_lowercase();
            let stem = TALK_SUFFIXES
                .iter()
                .find_map(|suffix| prefix.strip_suffix(suffix))
                .map(str::trim);
            self.is_reserved_prefix(&prefix)
                || stem.is_some_and(|stem| self.is_reserved_prefix(stem))
        })
    }

    fn is_reserved_prefix(&self, prefix: &str) -> bool {
        self.reserved_namespaces.iter().any(|ns| ns == prefix)
    }

    /// Returns the path of an absolute URL on the source host.
    fn same_host_path(&self, href: &str) -> Option<String> {
        let url = parse_absolute(href)?;
        let host = url.host_str()?.to_lowercase();
        (host == self.host).then(|| url.path().to_string())
    }
}

fn is_fragment(_: &LinkPolicy, href: &str) -> bool {
    href.is_empty() || href.starts_with('#')
}

fn is_reserved_namespace(policy: &LinkPolicy, href: &str) -> bool {
    let path = if is_absolute(href) {
        match policy.same_host_path(href) {
            Some(path) => path,
            None => return false,
        }
    } else {
        href.to_string()
    };
    path.strip_prefix(policy.article_path.as_str())
        .map(|rest| {
            let rest = rest.split(['#', '?']).next().unwrap_or_default();
            let decoded = percent_decode_str(rest).decode_utf8_lossy().replace('_', " ");
            policy.has_reserved_namespace(&decoded)
        })
        .unwrap_or(false)
}

fn is_off_site(policy: &LinkPolicy, href: &str) -> bool {
    is_absolute(href) && policy.same_host_path(href).is_none()
}

fn is_outside_article_path(policy: &LinkPolicy, href: &str) -> bool {
    !is_absolute(href) && !href.starts_with(policy.article_path.as_str())
}

/// Scheme-qualified or protocol-relative.
fn is_absolute(href: &str) -> bool {
    href.starts_with("//") || Url::parse(href).is_ok()
}

fn parse_absolute(href: &str) -> Option<Url> {
    if href.starts_with("//") {
        Url::parse(&format!("https:{href}")).ok()
    } else {
        Url::parse(href).ok()
    }
}
