//! Cache-first decorator for article sources.
//!
//! Caches raw responses only: summaries and rendered markup per title, and
//! the stylesheet. Random titles and failures are never cached. Transformed
//! content is not cached either, since it depends on the game state.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::{ArticleSource, SourceError};
use crate::state::ArticleRef;

/// Wraps an [`ArticleSource`], remembering successful lookups.
#[derive(Debug)]
pub struct CachedSource<S> {
    inner: S,
    summaries: Mutex<HashMap<String, ArticleRef>>,
    html: Mutex<HashMap<String, String>>,
    stylesheet: Mutex<Option<String>>,
}

impl<S: ArticleSource> CachedSource<S> {
    /// Wraps `inner` with an empty cache.
    #[instrument(skip(inner))]
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            summaries: Mutex::new(HashMap::new()),
            html: Mutex::new(HashMap::new()),
            stylesheet: Mutex::new(None),
        }
    }

    /// Returns the wrapped source.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Returns how many titles have cached markup.
    #[instrument(skip(self))]
    pub fn cached_articles(&self) -> usize {
        self.html.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Drops every cached response.
    #[instrument(skip(self))]
    pub fn clear(&self) {
        self.summaries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.html.lock().unwrap_or_else(PoisonError::into_inner).clear();
        *self
            .stylesheet
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = None;
        debug!("Cache cleared");
    }
}

#[async_trait]
impl<S: ArticleSource> ArticleSource for CachedSource<S> {
    #[instrument(skip(self))]
    async fn random_title(&self) -> Result<String, SourceError> {
        self.inner.random_title().await
    }

    #[instrument(skip(self))]
    async fn summary(&self, title: &str) -> Result<ArticleRef, SourceError> {
        let cached = self
            .summaries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(title)
            .cloned();
        if let Some(summary) = cached {
            debug!(title, "Summary cache hit");
            return Ok(summary);
        }

        let summary = self.inner.summary(title).await?;
        self.summaries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(title.to_string(), summary.clone());
        Ok(summary)
    }

    #[instrument(skip(self))]
    async fn rendered_html(&self, title: &str) -> Result<String, SourceError> {
        let cached = self
            .html
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(title)
            .cloned();
        if let Some(html) = cached {
            debug!(title, "Markup cache hit");
            return Ok(html);
        }

        let html = self.inner.rendered_html(title).await?;
        self.html
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(title.to_string(), html.clone());
        Ok(html)
    }

    #[instrument(skip(self))]
    async fn stylesheet(&self) -> Result<String, SourceError> {
        let cached = self
            .stylesheet
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(css) = cached {
            debug!("Stylesheet cache hit");
            return Ok(css);
        }

        let css = self.inner.stylesheet().await?;
        *self
            .stylesheet
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(css.clone());
        Ok(css)
    }
}
