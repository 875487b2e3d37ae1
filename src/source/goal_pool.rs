//! Popular articles that goals are drawn from.
//!
//! Goals picked uniformly from the whole encyclopedia are mostly obscure,
//! so goals come from a list of yesterday's most-viewed articles instead.
//! The list is a JSON file of the form
//! `{ "articles": [{ "title": ..., "views": ..., "rank": ... }] }`.

use std::path::Path;

use chrono::{Datelike, NaiveDate};
use derive_getters::Getters;
use derive_new::new;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use super::SourceError;
use crate::config::ConfigError;
use crate::transform::LinkPolicy;

/// Titles that top the pageview charts without being articles.
pub const EXCLUDED_TOP_TITLES: &[&str] = &[
    "メインページ",
    "特別:検索",
    "特別:最近の更新",
    "Main Page",
    "Special:Search",
    "-",
];

const PAGEVIEWS_TOP: &str = "https://wikimedia.org/api/rest_v1/metrics/pageviews/top";

/// One entry of the popular-articles list.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize, new)]
pub struct TopArticle {
    /// Article title, with spaces rather than underscores.
    title: String,
    /// Views on the sampled day.
    views: u64,
    /// Position in the filtered list, starting at 1.
    rank: u32,
}

/// The list goals are drawn from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct GoalPool {
    articles: Vec<TopArticle>,
}

impl GoalPool {
    /// Creates a pool from a list of articles.
    #[instrument(skip(articles), fields(count = articles.len()))]
    pub fn new(articles: Vec<TopArticle>) -> Self {
        Self { articles }
    }

    /// Parses a pool from its JSON form.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the text is not a valid pool document.
    #[instrument(skip(json))]
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json)
            .map_err(|e| ConfigError::new(format!("Failed to parse goal pool: {}", e)))
    }

    /// Loads a pool from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ConfigError::new(format!("Failed to read goal pool: {}", e))
        })?;
        let pool = Self::from_json(&content)?;
        info!(count = pool.len(), "Goal pool loaded");
        Ok(pool)
    }

    /// Serializes the pool as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if serialization fails.
    #[instrument(skip(self))]
    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::new(format!("Failed to serialize goal pool: {}", e)))
    }

    /// Ranks raw pageview entries, most viewed first.
    ///
    /// Underscores in titles become spaces. Titles from
    /// [`EXCLUDED_TOP_TITLES`] and titles in a reserved namespace are
    /// dropped before ranking, and at most `limit` articles are kept.
    #[instrument(skip(entries, policy))]
    pub fn from_pageviews(
        entries: impl IntoIterator<Item = (String, u64)>,
        policy: &LinkPolicy,
        limit: usize,
    ) -> Self {
        let mut entries: Vec<(String, u64)> = entries
            .into_iter()
            .map(|(title, views)| (title.replace('_', " "), views))
            .filter(|(title, _)| !EXCLUDED_TOP_TITLES.contains(&title.as_str()))
            .filter(|(title, _)| !policy.is_reserved_title(title))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1));

        let articles = entries
            .into_iter()
            .take(limit)
            .enumerate()
            .map(|(index, (title, views))| TopArticle::new(title, views, index as u32 + 1))
            .collect();
        Self::new(articles)
    }

    /// Number of candidate goals.
    pub fn len(&self) -> usize {
        self.articles.len()
    }

    /// Returns true if there are no candidates.
    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    /// Picks a goal uniformly at random.
    #[instrument(skip(self, rng))]
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&TopArticle> {
        let picked = self.articles.choose(rng);
        if let Some(article) = picked {
            debug!(title = %article.title, rank = article.rank, "Picked goal");
        }
        picked
    }
}

#[derive(Debug, Deserialize)]
struct PageviewsResponse {
    items: Vec<PageviewsDay>,
}

#[derive(Debug, Deserialize)]
struct PageviewsDay {
    articles: Vec<PageviewsArticle>,
}

#[derive(Debug, Deserialize)]
struct PageviewsArticle {
    article: String,
    views: u64,
}

/// Builds a goal pool from the Wikimedia top-pageviews endpoint.
///
/// See [`GoalPool::from_pageviews`] for the filtering applied.
///
/// # Errors
///
/// Returns [`SourceError`] if the request fails or the response is not
/// the expected shape.
#[instrument(skip(client, policy))]
pub async fn fetch_top_articles(
    client: &reqwest::Client,
    policy: &LinkPolicy,
    project: &str,
    date: NaiveDate,
    limit: usize,
) -> Result<GoalPool, SourceError> {
    let url = format!(
        "{PAGEVIEWS_TOP}/{project}/all-access/{:04}/{:02}/{:02}",
        date.year(),
        date.month(),
        date.day()
    );
    info!(url = %url, "Fetching top articles");

    let response = client.get(&url).send().await?;
    let status = response.status();
    if !status.is_success() {
        warn!(status = %status, "Pageviews request failed");
        return Err(SourceError::unavailable(format!(
            "Pageviews API returned {}",
            status
        )));
    }
    let body: PageviewsResponse = response.json().await?;

    let day = body
        .items
        .into_iter()
        .next()
        .ok_or_else(|| SourceError::unavailable("Pageviews response had no items"))?;

    let entries = day
        .articles
        .into_iter()
        .map(|entry| (entry.article, entry.views));
    let pool = GoalPool::from_pageviews(entries, policy, limit);
    info!(count = pool.len(), "Top articles collected");
    Ok(pool)
}
