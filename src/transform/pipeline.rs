//! The transformation pipeline: parse once, walk the tree, serialize once.

use std::sync::LazyLock;

use derive_getters::Getters;
use kuchikiki::iter::NodeIterator;
use kuchikiki::traits::TendrilSink;
use kuchikiki::{Attribute, ElementData, ExpandedName, NodeDataRef, NodeRef};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use super::chrome::{ACTIVE_CONTENT, CHROME_SELECTORS};
use super::policy::{InertReason, LinkClass, LinkPolicy};
use super::TransformError;
use crate::state::{GameState, StateCodec};

/// Class carried by links that make a move.
pub const GOLF_LINK_CLASS: &str = "golf-link";

/// Class carried by neutralized link-like content.
pub const INERT_CLASS: &str = "golf-inert";

/// Bare URLs in text, with an optional sigil prefix (`@https://...`).
static BARE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[@＠]?https?://[^\s<>"]+"#).expect("bare URL pattern is valid")
});

/// `url(//...)` in CSS, with or without quotes.
static CSS_PROTOCOL_RELATIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"url\(\s*(['"]?)//"#).expect("CSS url() pattern is valid")
});

/// Protocol-relative candidates in a `srcset` list.
static SRCSET_PROTOCOL_RELATIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(^|,\s*)//").expect("srcset pattern is valid")
});

/// Sanitized article body and the stylesheet to present with it.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct TransformedContent {
    /// Rewritten article body markup.
    html: String,
    /// Stylesheet text with secure resource references.
    style_text: String,
}

/// Rewrites article markup against a game state.
#[derive(Debug, Clone)]
pub struct ContentTransformer {
    policy: LinkPolicy,
    codec: StateCodec,
}

/// Per-run tallies, logged once at the end.
#[derive(Debug, Default)]
struct Tally {
    removed: usize,
    unwrapped: usize,
    live: usize,
    inert: usize,
    neutralized: usize,
}

impl ContentTransformer {
    /// Creates a transformer using `policy` to classify links and `codec`
    /// to encode their targets.
    #[instrument]
    pub fn new(policy: LinkPolicy, codec: StateCodec) -> Self {
        Self { policy, codec }
    }

    /// Returns the link policy.
    pub fn policy(&self) -> &LinkPolicy {
        &self.policy
    }

    /// Returns the state codec.
    pub fn codec(&self) -> &StateCodec {
        &self.codec
    }

    /// Turns raw article markup into the game surface for `ctx`.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError`] if the input holds no element markup.
    #[instrument(skip(self, raw_html, stylesheet, ctx), fields(current = %ctx.current_title(), html_len = raw_html.len()))]
    pub fn transform(
        &self,
        raw_html: &str,
        stylesheet: &str,
        ctx: &GameState,
    ) -> Result<TransformedContent, TransformError> {
        let document = kuchikiki::parse_html().one(raw_html);
        let body = document
            .select_first("body")
            .map_err(|()| TransformError::new("Parsed document has no body"))?;
        let root = body.as_node();

        if !root.descendants().any(|node| node.as_element().is_some()) {
            return Err(TransformError::new("No element markup in article content"));
        }

        let mut tally = Tally::default();
        tally.removed = remove_matching(root, &CHROME_SELECTORS.join(", "))?
            + remove_matching(root, &ACTIVE_CONTENT.join(", "))?;
        strip_event_handlers(root);
        tally.unwrapped = unwrap_image_links(root)?;
        self.rewrite_links(&body, ctx, &mut tally)?;
        tally.neutralized = neutralize_bare_urls(&body);
        secure_media(root)?;

        let html: String = root.children().map(|child| child.to_string()).collect();
        let style_text = secure_css(stylesheet);

        info!(
            removed = tally.removed,
            unwrapped = tally.unwrapped,
            live = tally.live,
            inert = tally.inert,
            neutralized = tally.neutralized,
            "Article transformed"
        );
        Ok(TransformedContent { html, style_text })
    }

    /// Classifies every `a` and `area` and rewrites or neutralizes it.
    #[instrument(skip_all)]
    fn rewrite_links(
        &self,
        body: &NodeDataRef<ElementData>,
        ctx: &GameState,
        tally: &mut Tally,
    ) -> Result<(), TransformError> {
        let links = select_all(body.as_node(), "a, area")?;

        for link in links {
            let href = link.attributes.borrow().get("href").map(str::to_string);
            let class = href
                .as_deref()
                .map(|href| self.policy.classify(href))
                .unwrap_or(LinkClass::Inert(InertReason::Unmatched));

            match class {
                LinkClass::Article(title) => {
                    let target = self.codec.encode(&ctx.apply_move(&title));
                    let mut attributes = link.attributes.borrow_mut();
                    attributes.insert("href", target);
                    attributes.insert("class", GOLF_LINK_CLASS.to_string());
                    attributes.insert("data-title", title);
                    attributes.remove("rel");
                    attributes.remove("target");
                    tally.live += 1;
                }
                LinkClass::Inert(reason) => {
                    debug!(href = ?href, ?reason, "Neutralizing link");
                    if &*link.name.local == "area" {
                        link.as_node().detach();
                    } else {
                        make_inert(body, link.as_node());
                    }
                    tally.inert += 1;
                }
            }
        }
        Ok(())
    }
}

fn select_all(
    root: &NodeRef,
    selectors: &str,
) -> Result<Vec<NodeDataRef<ElementData>>, TransformError> {
    root.select(selectors)
        .map(|matches| matches.collect())
        .map_err(|()| TransformError::new(format!("Invalid selector list: {selectors}")))
}

/// Detaches every element matching `selectors`; returns how many matched.
#[instrument(skip(root))]
fn remove_matching(root: &NodeRef, selectors: &str) -> Result<usize, TransformError> {
    let matches = select_all(root, selectors)?;
    for element in &matches {
        element.as_node().detach();
    }
    Ok(matches.len())
}

fn strip_event_handlers(root: &NodeRef) {
    for element in root.descendants().elements() {
        element
            .attributes
            .borrow_mut()
            .map
            .retain(|name, _| !name.local.to_ascii_lowercase().starts_with("on"));
    }
}

/// Replaces image-wrapper anchors with their content.
fn unwrap_image_links(root: &NodeRef) -> Result<usize, TransformError> {
    let mut unwrapped = 0;
    for anchor in select_all(root, "a")? {
        let node = anchor.as_node();
        let has_image = node
            .select("img")
            .map(|mut images| images.next().is_some())
            .unwrap_or(false);
        let has_text = node
            .descendants()
            .text_nodes()
            .any(|text| !text.borrow().trim().is_empty());
        if has_image && !has_text {
            unwrap(node);
            unwrapped += 1;
        }
    }
    Ok(unwrapped)
}

/// Wraps bare URLs found in text outside links in inert spans.
fn neutralize_bare_urls(body: &NodeDataRef<ElementData>) -> usize {
    let root = body.as_node();
    let texts: Vec<_> = root.descendants().text_nodes().collect();
    let mut neutralized = 0;

    for text in texts {
        let node = text.as_node();
        if node.ancestors().any(|ancestor| is_protected(&ancestor)) {
            continue;
        }
        let content = text.borrow().clone();
        if !BARE_URL.is_match(&content) {
            continue;
        }

        let mut last = 0;
        for found in BARE_URL.find_iter(&content) {
            if found.start() > last {
                node.insert_before(NodeRef::new_text(&content[last..found.start()]));
            }
            let span = new_span(body, INERT_CLASS);
            span.append(NodeRef::new_text(found.as_str()));
            node.insert_before(span);
            last = found.end();
            neutralized += 1;
        }
        if last < content.len() {
            node.insert_before(NodeRef::new_text(&content[last..]));
        }
        node.detach();
    }
    neutralized
}

/// Rewrites protocol-relative image sources and inline style URLs to https.
fn secure_media(root: &NodeRef) -> Result<(), TransformError> {
    for media in select_all(root, "img, source")? {
        let mut attributes = media.attributes.borrow_mut();
        if let Some(src) = attributes.get_mut("src")
            && src.starts_with("//")
        {
            src.insert_str(0, "https:");
        }
        if let Some(srcset) = attributes.get_mut("srcset") {
            *srcset = SRCSET_PROTOCOL_RELATIVE
                .replace_all(srcset, "${1}https://")
                .into_owned();
        }
    }
    for styled in select_all(root, "[style]")? {
        let mut attributes = styled.attributes.borrow_mut();
        if let Some(style) = attributes.get_mut("style") {
            *style = secure_css(style);
        }
    }
    for sheet in select_all(root, "style")? {
        for text in sheet.as_node().children().text_nodes() {
            let secured = secure_css(&text.borrow());
            *text.borrow_mut() = secured;
        }
    }
    Ok(())
}

/// Rewrites `url(//...)` references to `url(https://...)`.
fn secure_css(css: &str) -> String {
    CSS_PROTOCOL_RELATIVE
        .replace_all(css, "url(${1}https://")
        .into_owned()
}

fn is_protected(node: &NodeRef) -> bool {
    node.as_element().is_some_and(|element| {
        matches!(&*element.name.local, "a" | "style" | "script" | "textarea")
            || has_class(element, INERT_CLASS)
    })
}

fn has_class(element: &ElementData, class: &str) -> bool {
    element
        .attributes
        .borrow()
        .get("class")
        .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
}

/// Builds an empty `span` in the same namespace as `template`.
fn new_span(template: &ElementData, class: &str) -> NodeRef {
    let mut name = template.name.clone();
    name.local = "span".into();
    let span = NodeRef::new_element(name, std::iter::empty::<(ExpandedName, Attribute)>());
    if let Some(element) = span.as_element() {
        element
            .attributes
            .borrow_mut()
            .insert("class", class.to_string());
    }
    span
}

/// Replaces `node` with an inert span holding its children.
fn make_inert(template: &ElementData, node: &NodeRef) {
    let span = new_span(template, INERT_CLASS);
    for child in node.children().collect::<Vec<_>>() {
        span.append(child);
    }
    node.insert_before(span);
    node.detach();
}

/// Replaces `node` with its children.
fn unwrap(node: &NodeRef) {
    for child in node.children().collect::<Vec<_>>() {
        node.insert_before(child);
    }
    node.detach();
}
