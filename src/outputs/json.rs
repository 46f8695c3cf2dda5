//! JSON output of a result page.
//!
//! The written document carries the query it answers and the pagination
//! numbers alongside the articles, so it can be consumed without knowing the
//! page size that produced it.

use crate::models::{Article, ArticleList};
use crate::query::QueryKey;
use crate::utils::ensure_writable_dir;
use chrono::Utc;
use serde::Serialize;
use std::error::Error;
use std::path::PathBuf;
use tokio::fs;
use tracing::{error, info, instrument};

/// A single page of results as written to disk.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultPage<'a> {
    pub query: String,
    pub page: u32,
    pub total_pages: u32,
    pub total_results: u64,
    /// RFC 3339 UTC timestamp of when the file was written.
    pub generated_at: String,
    pub articles: &'a [Article],
}

impl<'a> ResultPage<'a> {
    pub fn new(key: &QueryKey, list: &'a ArticleList, page_size: u32) -> Self {
        Self {
            query: key.to_string(),
            page: key.page(),
            total_pages: list.total_pages(page_size),
            total_results: list.total_results,
            generated_at: Utc::now().to_rfc3339(),
            articles: &list.articles,
        }
    }
}

/// File name for `key`: `{kind}-page-{page}.json`.
pub fn file_name(key: &QueryKey) -> String {
    format!("{}-page-{}.json", key.kind(), key.page())
}

/// Write `list` to `{json_output_dir}/{kind}-page-{page}.json`.
///
/// # Returns
///
/// The path of the written file.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir, query = %key))]
pub async fn write_result_page(
    key: &QueryKey,
    list: &ArticleList,
    page_size: u32,
    json_output_dir: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    if let Err(e) = ensure_writable_dir(json_output_dir).await {
        error!(error = %e, "JSON output directory is not writable");
        return Err(e);
    }

    let json = serde_json::to_string_pretty(&ResultPage::new(key, list, page_size))?;
    let path = PathBuf::from(json_output_dir).join(file_name(key));

    fs::write(&path, json).await?;
    info!(path = %path.display(), articles = list.articles.len(), "Wrote JSON result page");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Category, SortBy};

    fn sample() -> ArticleList {
        ArticleList {
            articles: vec![Article {
                id: "https://example.com/a".to_string(),
                title: "A".to_string(),
                description: "desc".to_string(),
                image_url: None,
                source: "Example".to_string(),
                published_at: "2024-01-15T10:30:00Z".to_string(),
                url: "https://example.com/a".to_string(),
                author: None,
                content: None,
            }],
            total_results: 45,
        }
    }

    #[test]
    fn test_file_names() {
        let key = QueryKey::CategoryHeadlines {
            category: Category::Health,
            country: "us".to_string(),
            page: 2,
        };
        assert_eq!(file_name(&key), "category-headlines-page-2.json");

        let key = QueryKey::Search {
            query: "anything".to_string(),
            sort_by: SortBy::PublishedAt,
            page: 7,
        };
        assert_eq!(file_name(&key), "search-news-page-7.json");
    }

    #[tokio::test]
    async fn test_write_result_page() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("json");
        let key = QueryKey::TopHeadlines {
            country: "us".to_string(),
            page: 1,
        };

        let path = write_result_page(&key, &sample(), 20, dir.to_str().unwrap())
            .await
            .unwrap();

        assert_eq!(path, dir.join("top-headlines-page-1.json"));
        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["query"], "top-headlines:us:1");
        assert_eq!(written["totalPages"], 3);
        assert_eq!(written["totalResults"], 45);
        assert_eq!(written["articles"][0]["id"], "https://example.com/a");
    }
}
