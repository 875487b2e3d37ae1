//! MediaWiki-backed article source.

use std::time::Duration;

use async_trait::async_trait;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use super::{ArticleSource, SourceError};
use crate::config::SourceConfig;
use crate::state::ArticleRef;

/// Characters kept verbatim in article URLs.
const ARTICLE_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b':')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    #[serde(default)]
    info: String,
}

#[derive(Debug, Deserialize)]
struct RandomResponse {
    query: Option<RandomQuery>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct RandomQuery {
    random: Vec<TitleOnly>,
}

#[derive(Debug, Deserialize)]
struct TitleOnly {
    title: String,
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    query: Option<SummaryQuery>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct SummaryQuery {
    #[serde(default)]
    pages: Vec<SummaryPage>,
}

#[derive(Debug, Deserialize)]
struct SummaryPage {
    title: String,
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    invalid: bool,
    extract: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ParseResponse {
    parse: Option<ParsedPage>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ParsedPage {
    text: String,
}

/// Talks to a MediaWiki Action API and its `load.php` stylesheet endpoint.
#[derive(Debug, Clone)]
pub struct WikipediaSource {
    client: reqwest::Client,
    origin: String,
    article_path: String,
    api_url: Url,
    stylesheet_url: Url,
}

impl WikipediaSource {
    /// Creates a client for the site described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the configured endpoints are not valid
    /// URLs or the HTTP client cannot be built.
    #[instrument(skip(config), fields(host = %config.host()))]
    pub fn new(config: &SourceConfig) -> Result<Self, SourceError> {
        let origin = format!("https://{}", config.host());
        let api_url = Url::parse(&format!("{origin}{}", config.api_path()))
            .map_err(|e| SourceError::unavailable(format!("Invalid API URL: {}", e)))?;
        let stylesheet_url = Url::parse_with_params(
            &format!("{origin}{}", config.stylesheet_path()),
            &[
                ("modules", config.stylesheet_modules().as_str()),
                ("only", "styles"),
                ("skin", config.skin().as_str()),
            ],
        )
        .map_err(|e| SourceError::unavailable(format!("Invalid stylesheet URL: {}", e)))?;

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent().as_str())
            .timeout(Duration::from_secs(*config.timeout_secs()))
            .build()?;

        info!(api = %api_url, "Created Wikipedia source");
        Ok(Self {
            client,
            origin,
            article_path: config.article_path().clone(),
            api_url,
            stylesheet_url,
        })
    }

    /// Returns the public URL of an article.
    #[instrument(skip(self))]
    pub fn article_url(&self, title: &str) -> String {
        format!(
            "{}{}{}",
            self.origin,
            self.article_path,
            utf8_percent_encode(&title.replace(' ', "_"), ARTICLE_SEGMENT)
        )
    }

    fn api(&self, params: &[(&str, &str)]) -> Result<Url, SourceError> {
        let base = [("format", "json"), ("formatversion", "2")];
        Url::parse_with_params(self.api_url.as_str(), base.iter().chain(params))
            .map_err(|e| SourceError::unavailable(format!("Invalid API query: {}", e)))
    }

    #[instrument(skip(self, url), fields(url = %url))]
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, SourceError> {
        debug!("Sending API request");
        let response = self.client.get(url).send().await.map_err(|e| {
            error!(error = ?e, "API request failed");
            SourceError::unavailable(format!("API request failed: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "API returned error status");
            return Err(SourceError::unavailable(format!("API returned {}", status)));
        }

        response.json::<T>().await.map_err(|e| {
            error!(error = ?e, "Failed to parse API response");
            SourceError::unavailable(format!("Failed to parse API response: {}", e))
        })
    }
}

/// Maps an API error object onto the source taxonomy.
fn api_failure(title: &str, error: ApiError) -> SourceError {
    match error.code.as_str() {
        "missingtitle" | "invalidtitle" | "nosuchpageid" => SourceError::not_found(title),
        _ => SourceError::unavailable(format!("API error {}: {}", error.code, error.info)),
    }
}

#[async_trait]
impl ArticleSource for WikipediaSource {
    #[instrument(skip(self))]
    async fn random_title(&self) -> Result<String, SourceError> {
        let url = self.api(&[
            ("action", "query"),
            ("list", "random"),
            ("rnnamespace", "0"),
            ("rnlimit", "1"),
        ])?;
        let response: RandomResponse = self.get_json(url).await?;
        if let Some(error) = response.error {
            return Err(api_failure("", error));
        }

        let title = response
            .query
            .and_then(|query| query.random.into_iter().next())
            .map(|page| page.title)
            .ok_or_else(|| SourceError::unavailable("Random list was empty"))?;
        debug!(title = %title, "Drew random title");
        Ok(title)
    }

    #[instrument(skip(self))]
    async fn summary(&self, title: &str) -> Result<ArticleRef, SourceError> {
        let url = self.api(&[
            ("action", "query"),
            ("prop", "extracts"),
            ("exintro", "1"),
            ("explaintext", "1"),
            ("redirects", "1"),
            ("titles", title),
        ])?;
        let response: SummaryResponse = self.get_json(url).await?;
        if let Some(error) = response.error {
            return Err(api_failure(title, error));
        }

        let page = response
            .query
            .and_then(|query| query.pages.into_iter().next())
            .ok_or_else(|| SourceError::not_found(title))?;
        if page.missing || page.invalid {
            debug!(title, "Title missing");
            return Err(SourceError::not_found(title));
        }

        let url = self.article_url(&page.title);
        Ok(ArticleRef::new(page.title, page.extract, url))
    }

    #[instrument(skip(self))]
    async fn rendered_html(&self, title: &str) -> Result<String, SourceError> {
        let url = self.api(&[
            ("action", "parse"),
            ("prop", "text"),
            ("redirects", "1"),
            ("page", title),
        ])?;
        let response: ParseResponse = self.get_json(url).await?;
        if let Some(error) = response.error {
            return Err(api_failure(title, error));
        }

        let html = response
            .parse
            .map(|page| page.text)
            .ok_or_else(|| SourceError::unavailable("Parse response had no text"))?;
        debug!(title, html_len = html.len(), "Fetched rendered article");
        Ok(html)
    }

    #[instrument(skip(self))]
    async fn stylesheet(&self) -> Result<String, SourceError> {
        let response = self
            .client
            .get(self.stylesheet_url.clone())
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "Stylesheet request failed");
            return Err(SourceError::unavailable(format!(
                "Stylesheet returned {}",
                status
            )));
        }
        let css = response.text().await?;
        debug!(css_len = css.len(), "Fetched stylesheet");
        Ok(css)
    }
}
