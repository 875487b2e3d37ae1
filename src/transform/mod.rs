//! Rewrites fetched article markup into the game surface.
//!
//! Only ordinary article links stay clickable, and those now point at the
//! game state reached by following them. Every other link-like construct is
//! made inert.

mod chrome;
mod error;
mod pipeline;
mod policy;

pub use chrome::{ACTIVE_CONTENT, CHROME_SELECTORS};
pub use error::TransformError;
pub use pipeline::{ContentTransformer, GOLF_LINK_CLASS, INERT_CLASS, TransformedContent};
pub use policy::{DEFAULT_RESERVED_NAMESPACES, InertReason, LinkClass, LinkPolicy};
