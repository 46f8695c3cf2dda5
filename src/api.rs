//! News service interaction over HTTP.
//!
//! This module provides the interface to a NewsAPI-compatible service. The
//! service exposes two listing endpoints, both paginated:
//!
//! | Endpoint | Used for | Extra parameters |
//! |----------|----------|------------------|
//! | `top-headlines` | front page and category pages | `country`, optional `category` |
//! | `everything` | free-text search | `q`, `sortBy` |
//!
//! Every request carries the API key as the `apiKey` query parameter and asks
//! for `pageSize` articles.
//!
//! # Architecture
//!
//! - [`NewsSource`]: trait describing the three listing queries; the query
//!   layer only depends on this
//! - [`NewsClient`]: the `reqwest` implementation talking to the real service
//!
//! No request is retried here. Retrying is a user decision made through the
//! query cache.

use crate::config::NewsApiConfig;
use crate::error::NewsError;
use crate::models::{ArticleList, NewsResponse, RemoteErrorBody};
use crate::utils::{truncate_for_log, upcase};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::time::Instant;
use tracing::{debug, instrument, warn};
use url::Url;

/// Ordering for search results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    #[default]
    PublishedAt,
    Relevancy,
    Popularity,
}

impl SortBy {
    pub fn as_str(self) -> &'static str {
        match self {
            SortBy::PublishedAt => "publishedAt",
            SortBy::Relevancy => "relevancy",
            SortBy::Popularity => "popularity",
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "publishedat" | "published-at" | "published_at" => Ok(SortBy::PublishedAt),
            "relevancy" => Ok(SortBy::Relevancy),
            "popularity" => Ok(SortBy::Popularity),
            other => Err(format!(
                "unknown sort order '{other}' (expected publishedAt, relevancy or popularity)"
            )),
        }
    }
}

/// A headline category understood by the `top-headlines` endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Business,
    Entertainment,
    General,
    Health,
    Science,
    Sports,
    Technology,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Business,
        Category::Entertainment,
        Category::General,
        Category::Health,
        Category::Science,
        Category::Sports,
        Category::Technology,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Business => "business",
            Category::Entertainment => "entertainment",
            Category::General => "general",
            Category::Health => "health",
            Category::Science => "science",
            Category::Sports => "sports",
            Category::Technology => "technology",
        }
    }

    /// Label for a filter button, e.g. `Technology`.
    pub fn label(self) -> String {
        upcase(self.as_str())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| format!("unknown category '{}'", s.trim()))
    }
}

/// A source of paginated article lists.
///
/// Futures must be `Send` because the query cache runs fetches on spawned tasks.
pub trait NewsSource: Send + Sync + 'static {
    /// Unfiltered top headlines for `country`.
    fn top_headlines(
        &self,
        country: &str,
        page: u32,
    ) -> impl Future<Output = Result<ArticleList, NewsError>> + Send;

    /// Top headlines for `country` restricted to `category`.
    fn category_headlines(
        &self,
        category: Category,
        country: &str,
        page: u32,
    ) -> impl Future<Output = Result<ArticleList, NewsError>> + Send;

    /// Free-text search across all articles.
    fn search(
        &self,
        query: &str,
        page: u32,
        sort_by: SortBy,
    ) -> impl Future<Output = Result<ArticleList, NewsError>> + Send;
}

/// HTTP client for a NewsAPI-compatible service.
#[derive(Debug, Clone)]
pub struct NewsClient {
    http: reqwest::Client,
    config: NewsApiConfig,
}

impl NewsClient {
    pub fn new(config: NewsApiConfig) -> Self {
        Self::with_http_client(reqwest::Client::new(), config)
    }

    /// Use a preconfigured `reqwest` client (timeouts, proxies, user agent).
    pub fn with_http_client(http: reqwest::Client, config: NewsApiConfig) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &NewsApiConfig {
        &self.config
    }

    /// Build the URL for `endpoint`, skipping parameters with empty values.
    ///
    /// The API key is always appended last.
    pub fn build_url(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Url, url::ParseError> {
        let base = self.config.base_url.as_str().trim_end_matches('/');
        let mut url = Url::parse(&format!("{base}/{}", endpoint.trim_start_matches('/')))?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params.iter().filter(|(_, v)| !v.is_empty()) {
                pairs.append_pair(key, value);
            }
            pairs.append_pair("apiKey", &self.config.api_key);
        }
        Ok(url)
    }

    /// Issue a GET and decode the article list.
    ///
    /// `fallback` is the message used when a failed response carries none.
    #[instrument(level = "info", skip_all, fields(endpoint = %endpoint))]
    async fn get_articles(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
        fallback: &str,
    ) -> Result<ArticleList, NewsError> {
        let url = self.build_url(endpoint, params).map_err(|e| NewsError::Remote {
            status: 0,
            code: Some("invalidUrl".to_string()),
            message: format!("{fallback}: {e}"),
        })?;

        let t0 = Instant::now();
        let response = self.http.get(url).send().await.map_err(|e| {
            warn!(elapsed_ms = t0.elapsed().as_millis() as u64, error = %e, "News request failed");
            NewsError::Network(e)
        })?;
        let status = response.status();
        let body = response.text().await?;
        let dt = t0.elapsed();

        if !status.is_success() {
            let parsed: RemoteErrorBody = serde_json::from_str(&body).unwrap_or_default();
            let message = parsed
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| fallback.to_string());
            warn!(
                status = status.as_u16(),
                code = ?parsed.code,
                elapsed_ms = dt.as_millis() as u64,
                body = %truncate_for_log(&body, 300),
                "News service rejected request"
            );
            return Err(NewsError::Remote {
                status: status.as_u16(),
                code: parsed.code,
                message,
            });
        }

        let response: NewsResponse = serde_json::from_str(&body).map_err(|e| {
            warn!(error = %e, body = %truncate_for_log(&body, 300), "Undecodable news response");
            NewsError::Decode(e)
        })?;
        let list = ArticleList::from(response);
        debug!(
            articles = list.articles.len(),
            total_results = list.total_results,
            elapsed_ms = dt.as_millis() as u64,
            "Fetched article page"
        );
        Ok(list)
    }
}

impl NewsSource for NewsClient {
    async fn top_headlines(&self, country: &str, page: u32) -> Result<ArticleList, NewsError> {
        let params = [
            ("country", country.to_string()),
            ("page", page.to_string()),
            ("pageSize", self.config.page_size.to_string()),
        ];
        self.get_articles("top-headlines", &params, "Failed to fetch top headlines")
            .await
    }

    async fn category_headlines(
        &self,
        category: Category,
        country: &str,
        page: u32,
    ) -> Result<ArticleList, NewsError> {
        let params = [
            ("category", category.as_str().to_string()),
            ("country", country.to_string()),
            ("page", page.to_string()),
            ("pageSize", self.config.page_size.to_string()),
        ];
        self.get_articles("top-headlines", &params, "Failed to fetch category headlines")
            .await
    }

    async fn search(&self, query: &str, page: u32, sort_by: SortBy) -> Result<ArticleList, NewsError> {
        let params = [
            ("q", query.to_string()),
            ("page", page.to_string()),
            ("pageSize", self.config.page_size.to_string()),
            ("sortBy", sort_by.as_str().to_string()),
        ];
        self.get_articles("everything", &params, "Failed to search news")
            .await
    }
}
