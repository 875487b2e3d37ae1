//! The capability the game core needs from an encyclopedia.

use async_trait::async_trait;

use super::SourceError;
use crate::state::ArticleRef;

/// Supplies titles, summaries, rendered markup, and the site stylesheet.
///
/// Implementations report missing titles as
/// [`SourceErrorKind::NotFound`](super::SourceErrorKind::NotFound) and every
/// other failure as
/// [`SourceErrorKind::Unavailable`](super::SourceErrorKind::Unavailable).
#[async_trait]
pub trait ArticleSource: Send + Sync + std::fmt::Debug {
    /// Returns the title of a random ordinary article.
    async fn random_title(&self) -> Result<String, SourceError>;

    /// Returns the summary card for `title`.
    async fn summary(&self, title: &str) -> Result<ArticleRef, SourceError>;

    /// Returns the rendered body markup of `title`.
    async fn rendered_html(&self, title: &str) -> Result<String, SourceError>;

    /// Returns the stylesheet articles are rendered with.
    async fn stylesheet(&self) -> Result<String, SourceError>;
}
