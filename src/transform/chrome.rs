//! Page chrome removed before links are classified.
//!
//! Adding an exclusion is a one-line change to one of these tables.

/// Presentational and navigational elements that are not part of the game.
pub const CHROME_SELECTORS: &[&str] = &[
    // Edit-section affordances
    ".mw-editsection",
    // Footnote markers and reference lists
    "sup.reference",
    ".mw-cite-backlink",
    // Table of contents
    "#toc",
    ".toc",
    // Geographic coordinate widgets
    "#coordinates",
    ".geo-nondefault",
    // Not-safe-to-search banners
    ".noprint",
    ".ambox",
    // Interlanguage and sister-project boxes
    ".interlanguage-link",
    ".sistersitebox",
    ".sister-project",
    ".side-box",
    // Navigation boxes
    ".navbox",
    ".vertical-navbox",
    ".mw-empty-elt",
];

/// Elements that can execute, embed, or submit anything.
pub const ACTIVE_CONTENT: &[&str] = &[
    "script", "noscript", "iframe", "object", "embed", "form", "link", "meta", "base",
];
