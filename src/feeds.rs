//! Headline feeds: the front page, category pages and search.
//!
//! [`Headlines`] turns "what the reader asked for" into a [`QueryKey`] and a
//! fetcher bound to a [`NewsSource`], then subscribes through the shared
//! [`QueryCache`].
//!
//! # Routing
//!
//! | Request | Key |
//! |---------|-----|
//! | front page | `TopHeadlines` |
//! | category `all` | `TopHeadlines` (same entry as the front page) |
//! | a known category | `CategoryHeadlines` |
//! | empty or unknown category | none, nothing is fetched |
//! | search with a non-blank query | `Search` |
//! | blank search | none, nothing is fetched |

use crate::api::{Category, NewsSource, SortBy};
use crate::config::NewsApiConfig;
use crate::query::{FetchFuture, QueryCache, QueryKey, Subscription};
use crate::utils::upcase;
use futures::FutureExt;
use std::sync::Arc;
use tracing::debug;

/// Category value that means "no category filter".
pub const ALL_CATEGORIES: &str = "all";

/// Category filter options in display order, `all` first, as `(value, label)`.
pub fn category_options() -> Vec<(&'static str, String)> {
    std::iter::once((ALL_CATEGORIES, upcase(ALL_CATEGORIES)))
        .chain(Category::ALL.into_iter().map(|c| (c.as_str(), c.label())))
        .collect()
}

/// What the reader is looking at, independent of the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feed {
    TopHeadlines,
    /// Raw category value as chosen by the reader; validated when keyed.
    Category(String),
    Search { query: String, sort_by: SortBy },
}

/// The hook family: builds keys and fetchers for each feed.
pub struct Headlines<S> {
    cache: QueryCache,
    source: Arc<S>,
    country: String,
    page_size: u32,
}

impl<S> Headlines<S>
where
    S: NewsSource,
{
    pub fn new(source: S, cache: QueryCache, config: &NewsApiConfig) -> Self {
        Self {
            cache,
            source: Arc::new(source),
            country: config.country.clone(),
            page_size: config.page_size,
        }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn top_headlines_key(&self, page: u32) -> QueryKey {
        QueryKey::TopHeadlines {
            country: self.country.clone(),
            page: page.max(1),
        }
    }

    /// Key for a category page; `None` for an empty or unknown category.
    pub fn category_key(&self, category: &str, page: u32) -> Option<QueryKey> {
        let category = category.trim();
        if category.eq_ignore_ascii_case(ALL_CATEGORIES) {
            return Some(self.top_headlines_key(page));
        }
        match category.parse::<Category>() {
            Ok(category) => Some(QueryKey::CategoryHeadlines {
                category,
                country: self.country.clone(),
                page: page.max(1),
            }),
            Err(reason) => {
                debug!(%reason, "Suppressing category query");
                None
            }
        }
    }

    /// Key for a search page; `None` for a blank query.
    pub fn search_key(&self, query: &str, page: u32, sort_by: SortBy) -> Option<QueryKey> {
        let query = query.trim();
        (!query.is_empty()).then(|| QueryKey::Search {
            query: query.to_string(),
            sort_by,
            page: page.max(1),
        })
    }

    pub fn key_for(&self, feed: &Feed, page: u32) -> Option<QueryKey> {
        match feed {
            Feed::TopHeadlines => Some(self.top_headlines_key(page)),
            Feed::Category(category) => self.category_key(category, page),
            Feed::Search { query, sort_by } => self.search_key(query, page, *sort_by),
        }
    }

    pub fn top_headlines(&self, page: u32) -> Subscription {
        self.subscribe_key(Some(self.top_headlines_key(page)))
    }

    pub fn category_headlines(&self, category: &str, page: u32) -> Subscription {
        self.subscribe_key(self.category_key(category, page))
    }

    pub fn search_news(&self, query: &str, page: u32, sort_by: SortBy) -> Subscription {
        self.subscribe_key(self.search_key(query, page, sort_by))
    }

    pub fn subscribe(&self, feed: &Feed, page: u32) -> Subscription {
        self.subscribe_key(self.key_for(feed, page))
    }

    /// Move an existing subscription to another feed or page.
    pub fn rebind(&self, subscription: &mut Subscription, feed: &Feed, page: u32) {
        let key = self.key_for(feed, page);
        match &key {
            Some(k) => subscription.rebind(key.clone(), self.fetcher_for(k)),
            None => subscription.rebind(None, || futures::future::pending()),
        }
    }

    fn subscribe_key(&self, key: Option<QueryKey>) -> Subscription {
        match &key {
            Some(k) => {
                let fetch = self.fetcher_for(k);
                self.cache.subscribe(key, fetch)
            }
            // Never called for a `None` key.
            None => self.cache.subscribe(None, || futures::future::pending()),
        }
    }

    fn fetcher_for(&self, key: &QueryKey) -> impl Fn() -> FetchFuture + Send + Sync + 'static + use<S> {
        let source = Arc::clone(&self.source);
        let key = key.clone();
        move || {
            let source = Arc::clone(&source);
            let key = key.clone();
            async move {
                match key {
                    QueryKey::TopHeadlines { country, page } => {
                        source.top_headlines(&country, page).await
                    }
                    QueryKey::CategoryHeadlines {
                        category,
                        country,
                        page,
                    } => source.category_headlines(category, &country, page).await,
                    QueryKey::Search {
                        query,
                        sort_by,
                        page,
                    } => source.search(&query, page, sort_by).await,
                }
            }
            .boxed()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NewsError;
    use crate::models::{Article, ArticleList};
    use std::sync::Mutex;

    /// Records every call and answers with one article titled after the call.
    #[derive(Default)]
    struct RecordingSource {
        calls: Mutex<Vec<String>>,
    }

    impl RecordingSource {
        fn answer(&self, call: String) -> Result<ArticleList, NewsError> {
            self.calls.lock().unwrap().push(call.clone());
            Ok(ArticleList {
                articles: vec![Article {
                    id: format!("https://example.com/{call}"),
                    title: call,
                    description: String::new(),
                    image_url: None,
                    source: "Recorder".to_string(),
                    published_at: "2024-01-15T10:30:00Z".to_string(),
                    url: "https://example.com".to_string(),
                    author: None,
                    content: None,
                }],
                total_results: 1,
            })
        }
    }

    impl NewsSource for Arc<RecordingSource> {
        async fn top_headlines(&self, country: &str, page: u32) -> Result<ArticleList, NewsError> {
            self.answer(format!("top:{country}:{page}"))
        }

        async fn category_headlines(
            &self,
            category: Category,
            country: &str,
            page: u32,
        ) -> Result<ArticleList, NewsError> {
            self.answer(format!("category:{category}:{country}:{page}"))
        }

        async fn search(&self, query: &str, page: u32, sort_by: SortBy) -> Result<ArticleList, NewsError> {
            self.answer(format!("search:{query}:{sort_by}:{page}"))
        }
    }

    fn headlines() -> (Headlines<Arc<RecordingSource>>, Arc<RecordingSource>) {
        let source = Arc::new(RecordingSource::default());
        let config = NewsApiConfig::new(Some("test-api-key"), None).unwrap();
        (
            Headlines::new(Arc::clone(&source), QueryCache::default(), &config),
            source,
        )
    }

    fn calls(source: &RecordingSource) -> Vec<String> {
        source.calls.lock().unwrap().clone()
    }

    #[test]
    fn test_category_options() {
        let options = category_options();
        assert_eq!(options[0], ("all", "All".to_string()));
        assert!(options.contains(&("technology", "Technology".to_string())));
        assert_eq!(options.len(), 8);
    }

    #[test]
    fn test_all_routes_to_top_headlines() {
        let (h, _) = headlines();
        assert_eq!(h.category_key("all", 2), Some(h.top_headlines_key(2)));
        assert_eq!(h.category_key(" All ", 2), Some(h.top_headlines_key(2)));
    }

    #[test]
    fn test_invalid_categories_are_suppressed() {
        let (h, _) = headlines();
        assert_eq!(h.category_key("", 1), None);
        assert_eq!(h.category_key("weather", 1), None);
        assert_eq!(
            h.category_key("Sports", 1),
            Some(QueryKey::CategoryHeadlines {
                category: Category::Sports,
                country: "us".to_string(),
                page: 1,
            })
        );
    }

    #[test]
    fn test_blank_search_is_suppressed() {
        let (h, _) = headlines();
        assert_eq!(h.search_key("", 1, SortBy::PublishedAt), None);
        assert_eq!(h.search_key("   ", 1, SortBy::PublishedAt), None);
        assert_eq!(
            h.search_key("  mars rover ", 0, SortBy::Relevancy),
            Some(QueryKey::Search {
                query: "mars rover".to_string(),
                sort_by: SortBy::Relevancy,
                page: 1,
            })
        );
    }

    #[tokio::test]
    async fn test_top_headlines_fetches_through_source() {
        let (h, source) = headlines();

        let state = h.top_headlines(3).settled().await;

        assert_eq!(state.articles()[0].title, "top:us:3");
        assert_eq!(calls(&source), vec!["top:us:3"]);
    }

    #[tokio::test]
    async fn test_all_category_shares_front_page_entry() {
        let (h, source) = headlines();

        h.top_headlines(1).settled().await;
        let state = h.category_headlines("all", 1).settled().await;

        assert_eq!(state.articles()[0].title, "top:us:1");
        assert_eq!(calls(&source).len(), 1);
    }

    #[tokio::test]
    async fn test_category_and_search_fetch() {
        let (h, _) = headlines();

        let tech = h.category_headlines("technology", 2).settled().await;
        let search = h.search_news("rust", 1, SortBy::Popularity).settled().await;

        assert_eq!(tech.articles()[0].title, "category:technology:us:2");
        assert_eq!(search.articles()[0].title, "search:rust:popularity:1");
    }

    #[tokio::test]
    async fn test_suppressed_queries_never_call_source() {
        let (h, source) = headlines();

        let empty_search = h.search_news("", 1, SortBy::PublishedAt).settled().await;
        let bad_category = h.category_headlines("", 1).settled().await;

        assert!(!empty_search.is_loading);
        assert!(empty_search.articles().is_empty());
        assert!(!bad_category.is_loading);
        assert!(calls(&source).is_empty());
        assert!(h.cache().is_empty());
    }

    #[tokio::test]
    async fn test_rebind_between_feeds() {
        let (h, source) = headlines();

        let mut sub = h.subscribe(&Feed::TopHeadlines, 1);
        sub.settled().await;

        let search = Feed::Search {
            query: "climate".to_string(),
            sort_by: SortBy::PublishedAt,
        };
        h.rebind(&mut sub, &search, 2);
        let state = sub.settled().await;

        assert_eq!(state.articles()[0].title, "search:climate:publishedAt:2");
        assert_eq!(calls(&source).len(), 2);

        h.rebind(&mut sub, &Feed::Search { query: String::new(), sort_by: SortBy::PublishedAt }, 1);
        assert_eq!(sub.key(), None);
    }
}
