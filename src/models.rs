//! Data models for news articles as they arrive and as the application uses them.
//!
//! This module defines the core data structures used throughout the application:
//! - [`RawArticle`], [`RawSource`], [`NewsResponse`]: the wire shape returned by
//!   the news service
//! - [`RemoteErrorBody`]: the JSON body of a non-2xx response
//! - [`Article`]: the flattened article shape the rest of the crate works with
//! - [`ArticleList`]: one page of articles plus the total result count
//!
//! The wire models use camelCase field names to match the service's JSON,
//! mapped with `#[serde(rename_all = "camelCase")]`.

use crate::utils::format_published_date;
use serde::{Deserialize, Serialize};

/// The publisher of a raw article.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawSource {
    /// Publisher identifier; many sources have none.
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
}

/// A single article exactly as the news service returns it.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawArticle {
    #[serde(default)]
    pub source: RawSource,
    pub author: Option<String>,
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub url: String,
    pub url_to_image: Option<String>,
    #[serde(default)]
    pub published_at: String,
    pub content: Option<String>,
}

/// A successful response from any of the listing endpoints.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub total_results: u64,
    #[serde(default)]
    pub articles: Vec<RawArticle>,
}

/// The body the service sends alongside a non-2xx status.
///
/// Every field is optional: proxies and gateways in front of the service
/// routinely answer with partial or empty bodies.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoteErrorBody {
    pub status: Option<String>,
    pub code: Option<String>,
    pub message: Option<String>,
}

/// An article in the application's own shape.
///
/// `id` is the article's canonical URL because the service provides no
/// identifier. The same story republished at another URL therefore gets a
/// different id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub title: String,
    /// Empty when the service sent no description.
    pub description: String,
    pub image_url: Option<String>,
    /// Display name of the publisher.
    pub source: String,
    /// ISO 8601 timestamp as sent by the service.
    pub published_at: String,
    pub url: String,
    pub author: Option<String>,
    pub content: Option<String>,
}

impl From<RawArticle> for Article {
    fn from(raw: RawArticle) -> Self {
        Self {
            id: raw.url.clone(),
            title: raw.title,
            description: raw.description.unwrap_or_default(),
            image_url: raw.url_to_image.filter(|u| !u.trim().is_empty()),
            source: raw.source.name,
            published_at: raw.published_at,
            url: raw.url,
            author: raw.author,
            content: raw.content,
        }
    }
}

impl Article {
    /// Publication date formatted for a card, e.g. `Jan 15, 2024`.
    ///
    /// Falls back to the raw timestamp when it cannot be parsed.
    pub fn display_date(&self) -> String {
        format_published_date(&self.published_at).unwrap_or_else(|| self.published_at.clone())
    }
}

/// One page of articles.
///
/// `total_results` counts every match on the server, so it usually exceeds
/// `articles.len()`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleList {
    pub articles: Vec<Article>,
    pub total_results: u64,
}

impl ArticleList {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    /// Number of pages needed to show every result at `page_size` per page.
    pub fn total_pages(&self, page_size: u32) -> u32 {
        crate::pagination::total_pages(self.total_results, page_size)
    }
}

impl From<NewsResponse> for ArticleList {
    fn from(response: NewsResponse) -> Self {
        Self {
            articles: response.articles.into_iter().map(Article::from).collect(),
            total_results: response.total_results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(url: &str) -> RawArticle {
        RawArticle {
            source: RawSource {
                id: None,
                name: "Test Source".to_string(),
            },
            author: Some("Test Author".to_string()),
            title: "Test Article".to_string(),
            description: Some("Test description".to_string()),
            url: url.to_string(),
            url_to_image: Some("https://example.com/image.jpg".to_string()),
            published_at: "2024-01-15T10:30:00Z".to_string(),
            content: Some("Test content".to_string()),
        }
    }

    #[test]
    fn test_transform_uses_url_as_id() {
        let article = Article::from(raw("https://example.com/story"));

        assert_eq!(article.id, "https://example.com/story");
        assert_eq!(article.url, article.id);
        assert_eq!(article.source, "Test Source");
        assert_eq!(article.image_url.as_deref(), Some("https://example.com/image.jpg"));
        assert_eq!(article.author.as_deref(), Some("Test Author"));
    }

    #[test]
    fn test_transform_missing_description_and_image() {
        let mut r = raw("https://example.com/bare");
        r.description = None;
        r.url_to_image = None;
        let article = Article::from(r);

        assert_eq!(article.description, "");
        assert_eq!(article.image_url, None);
    }

    #[test]
    fn test_transform_blank_image_url_is_no_image() {
        let json = r#"{
            "source": {"id": null, "name": "Wire"},
            "title": "Headline",
            "url": "https://example.com/blank-image",
            "urlToImage": "",
            "publishedAt": "2024-01-15T10:30:00Z"
        }"#;
        let article = Article::from(serde_json::from_str::<RawArticle>(json).unwrap());

        assert_eq!(article.image_url, None);
        assert!(!serde_json::to_string(&article).unwrap().contains("\"imageUrl\":\"\""));
    }

    #[test]
    fn test_news_response_deserialization() {
        let json = r#"{
            "status": "ok",
            "totalResults": 42,
            "articles": [{
                "source": {"id": null, "name": "Tech News"},
                "author": null,
                "title": "Tech Article",
                "description": null,
                "url": "https://example.com/tech",
                "urlToImage": null,
                "publishedAt": "2024-01-15T10:30:00Z",
                "content": null
            }]
        }"#;

        let response: NewsResponse = serde_json::from_str(json).unwrap();
        let list = ArticleList::from(response);

        assert_eq!(list.total_results, 42);
        assert_eq!(list.articles.len(), 1);
        assert_eq!(list.articles[0].title, "Tech Article");
        assert_eq!(list.articles[0].source, "Tech News");
        assert_eq!(list.total_pages(20), 3);
    }

    #[test]
    fn test_sparse_article_still_decodes() {
        let json = r#"{"totalResults": 1, "articles": [{"title": "Only a title"}]}"#;
        let response: NewsResponse = serde_json::from_str(json).unwrap();

        assert_eq!(response.articles[0].title, "Only a title");
        assert_eq!(response.articles[0].source.name, "");
    }

    #[test]
    fn test_error_body_deserialization() {
        let json = r#"{"status":"error","code":"apiKeyDisabled","message":"Your API key has been disabled"}"#;
        let body: RemoteErrorBody = serde_json::from_str(json).unwrap();

        assert_eq!(body.code.as_deref(), Some("apiKeyDisabled"));
        assert_eq!(body.message.as_deref(), Some("Your API key has been disabled"));
    }

    #[test]
    fn test_article_serializes_camel_case() {
        let json = serde_json::to_string(&Article::from(raw("https://example.com/a"))).unwrap();
        assert!(json.contains("\"imageUrl\""));
        assert!(json.contains("\"publishedAt\""));
    }

    #[test]
    fn test_display_date() {
        let article = Article::from(raw("https://example.com/a"));
        assert_eq!(article.display_date(), "Jan 15, 2024");

        let mut odd = article.clone();
        odd.published_at = "yesterday".to_string();
        assert_eq!(odd.display_date(), "yesterday");
    }

    #[test]
    fn test_empty_list() {
        let list = ArticleList::empty();
        assert!(list.is_empty());
        assert_eq!(list.total_pages(20), 0);
    }
}
