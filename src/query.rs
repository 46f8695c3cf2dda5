//! Request-keyed article cache with deduplication.
//!
//! Every remote listing request is identified by a [`QueryKey`]. The cache
//! keeps one entry per key holding the last settled [`QueryState`], and hands
//! out [`Subscription`]s that observe that state through a `tokio::sync::watch`
//! channel.
//!
//! # Request lifecycle
//!
//! ```text
//! Idle ──subscribe──▶ Loading ──ok──▶ Success
//!                        │              │
//!                        └──err──▶ Failure
//!      Success / Failure ──retry, dedupe expiry, focus, reconnect──▶ Loading
//! ```
//!
//! # Deduplication
//!
//! A request for a key is only issued when no request for that key was issued
//! within [`CacheOptions::deduping_interval`]. Inside the window, subscribers
//! share the in-flight request or its settled result, so the fetcher runs at
//! most once per key per interval. [`Subscription::retry`] bypasses the window.
//!
//! # Ordering
//!
//! Each issued request takes the next per-key generation number. A result is
//! only applied if its generation is still the latest for the key; anything
//! older is discarded, whatever order the responses arrive in.
//!
//! Fetches run on spawned tokio tasks, so [`QueryCache::subscribe`] must be
//! called from inside a runtime. Dropping a subscription does not cancel the
//! network call.

use crate::api::{Category, SortBy};
use crate::config::CacheOptions;
use crate::error::{ErrorInfo, NewsError};
use crate::models::{Article, ArticleList};
use futures::FutureExt;
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Future produced by a fetcher.
pub type FetchFuture = BoxFuture<'static, Result<ArticleList, NewsError>>;

type Fetcher = Arc<dyn Fn() -> FetchFuture + Send + Sync>;

/// Identity of one logical remote request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    TopHeadlines {
        country: String,
        page: u32,
    },
    CategoryHeadlines {
        category: Category,
        country: String,
        page: u32,
    },
    Search {
        query: String,
        sort_by: SortBy,
        page: u32,
    },
}

impl QueryKey {
    pub fn kind(&self) -> &'static str {
        match self {
            QueryKey::TopHeadlines { .. } => "top-headlines",
            QueryKey::CategoryHeadlines { .. } => "category-headlines",
            QueryKey::Search { .. } => "search-news",
        }
    }

    pub fn page(&self) -> u32 {
        match self {
            QueryKey::TopHeadlines { page, .. }
            | QueryKey::CategoryHeadlines { page, .. }
            | QueryKey::Search { page, .. } => *page,
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKey::TopHeadlines { country, page } => {
                write!(f, "{}:{country}:{page}", self.kind())
            }
            QueryKey::CategoryHeadlines {
                category,
                country,
                page,
            } => write!(f, "{}:{category}:{country}:{page}", self.kind()),
            QueryKey::Search {
                query,
                sort_by,
                page,
            } => write!(f, "{}:{query}:{sort_by}:{page}", self.kind()),
        }
    }
}

/// Coarse status derived from a [`QueryState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    Idle,
    Loading,
    Success,
    Failure,
}

/// What a subscriber sees for one key.
///
/// - `is_loading`: a request is in flight and there is nothing current to show
///   (first load, or an explicit retry)
/// - `is_validating`: any request for the key is in flight
///
/// Once `is_loading` is false, `error` is set if the latest request failed;
/// `data` then still holds the last successful page, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryState {
    pub data: Option<ArticleList>,
    pub error: Option<ErrorInfo>,
    pub is_loading: bool,
    pub is_validating: bool,
}

impl QueryState {
    /// State reported for a suppressed (`None`) key.
    pub fn idle() -> Self {
        Self {
            data: Some(ArticleList::empty()),
            ..Self::default()
        }
    }

    pub fn articles(&self) -> &[Article] {
        self.data.as_ref().map_or(&[], |d| d.articles.as_slice())
    }

    pub fn total_results(&self) -> u64 {
        self.data.as_ref().map_or(0, |d| d.total_results)
    }

    pub fn status(&self) -> QueryStatus {
        if self.is_loading {
            QueryStatus::Loading
        } else if self.error.is_some() {
            QueryStatus::Failure
        } else if self.data.is_some() {
            QueryStatus::Success
        } else {
            QueryStatus::Idle
        }
    }
}

struct Entry {
    state: watch::Sender<QueryState>,
    /// Latest issued request; results from older ones are dropped.
    generation: u64,
    last_request: Option<Instant>,
    /// Most recently registered fetcher, used for focus/reconnect revalidation.
    fetcher: Fetcher,
}

struct Inner {
    options: CacheOptions,
    entries: Mutex<HashMap<QueryKey, Entry>>,
    online: AtomicBool,
}

/// Shared, cloneable handle to the cache.
///
/// Entries are never evicted: one is kept for every distinct key ever
/// subscribed until [`QueryCache::clear`] is called. Long-lived processes that
/// browse many pages or search terms should clear the cache periodically.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<Inner>,
}

impl fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryCache")
            .field("options", &self.inner.options)
            .field("entries", &self.len())
            .field("online", &self.inner.online.load(Ordering::Relaxed))
            .finish()
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(CacheOptions::default())
    }
}

impl QueryCache {
    /// Empty cache. It grows by one entry per distinct key; see [`QueryCache::clear`].
    pub fn new(options: CacheOptions) -> Self {
        Self {
            inner: Arc::new(Inner {
                options,
                entries: Mutex::new(HashMap::new()),
                online: AtomicBool::new(true),
            }),
        }
    }

    pub fn options(&self) -> CacheOptions {
        self.inner.options
    }

    // The map is never left half-updated, so a poisoned lock is still usable.
    fn entries(&self) -> MutexGuard<'_, HashMap<QueryKey, Entry>> {
        self.inner
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Subscribe to `key`, fetching with `fetch` if the key is not fresh.
    ///
    /// A `None` key never fetches and reports an empty, settled result.
    pub fn subscribe<F, Fut>(&self, key: Option<QueryKey>, fetch: F) -> Subscription
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ArticleList, NewsError>> + Send + 'static,
    {
        let fetcher: Fetcher = Arc::new(move || fetch().boxed());
        self.subscribe_with(key, fetcher)
    }

    fn subscribe_with(&self, key: Option<QueryKey>, fetcher: Fetcher) -> Subscription {
        let Some(key) = key else {
            debug!("Subscribed with empty key; nothing to fetch");
            return Subscription {
                cache: self.clone(),
                binding: None,
            };
        };

        let mut rx = {
            let mut entries = self.entries();
            let entry = entries.entry(key.clone()).or_insert_with(|| Entry {
                state: watch::channel(QueryState::default()).0,
                generation: 0,
                last_request: None,
                fetcher: Arc::clone(&fetcher),
            });
            entry.fetcher = Arc::clone(&fetcher);
            entry.state.subscribe()
        };

        self.revalidate(&key, &fetcher, false);
        // `changed` reports transitions after this point, not the loading flag
        // set just above.
        drop(rx.borrow_and_update());

        Subscription {
            cache: self.clone(),
            binding: Some(Binding { key, fetcher, rx }),
        }
    }

    /// Issue a request for `key` unless one was issued within the deduping
    /// interval. `force` skips the interval check and marks the key loading.
    ///
    /// Returns whether a request was issued.
    fn revalidate(&self, key: &QueryKey, fetcher: &Fetcher, force: bool) -> bool {
        let generation = {
            let mut entries = self.entries();
            let Some(entry) = entries.get_mut(key) else {
                return false;
            };

            let now = Instant::now();
            let fresh = entry
                .last_request
                .is_some_and(|at| now.duration_since(at) < self.inner.options.deduping_interval);
            if fresh && !force {
                debug!(%key, "Deduplicated query");
                return false;
            }

            entry.generation += 1;
            entry.last_request = Some(now);
            entry.state.send_modify(|s| {
                s.is_validating = true;
                s.is_loading = force || s.data.is_none();
            });
            entry.generation
        };

        debug!(%key, generation, force, "Issuing query");
        let fut = fetcher();
        let cache = self.clone();
        let key = key.clone();
        tokio::spawn(async move {
            let result = fut.await;
            cache.settle(&key, generation, result);
        });
        true
    }

    fn settle(&self, key: &QueryKey, generation: u64, result: Result<ArticleList, NewsError>) {
        let mut entries = self.entries();
        let Some(entry) = entries.get_mut(key) else {
            debug!(%key, "Entry cleared before response arrived; dropping it");
            return;
        };
        if entry.generation != generation {
            debug!(
                %key,
                generation,
                latest = entry.generation,
                "Discarding stale response"
            );
            return;
        }

        match result {
            Ok(list) => {
                info!(
                    %key,
                    articles = list.articles.len(),
                    total_results = list.total_results,
                    "Query settled"
                );
                entry.state.send_modify(|s| {
                    s.data = Some(list);
                    s.error = None;
                    s.is_loading = false;
                    s.is_validating = false;
                });
            }
            Err(e) => {
                warn!(%key, error = %e, "Query failed");
                let info = ErrorInfo::from(&e);
                entry.state.send_modify(|s| {
                    s.error = Some(info);
                    s.is_loading = false;
                    s.is_validating = false;
                });
            }
        }
    }

    fn revalidate_all(&self, reason: &str) -> usize {
        let targets: Vec<(QueryKey, Fetcher)> = self
            .entries()
            .iter()
            .map(|(k, e)| (k.clone(), Arc::clone(&e.fetcher)))
            .collect();

        let issued = targets
            .iter()
            .filter(|(key, fetcher)| self.revalidate(key, fetcher, false))
            .count();
        info!(reason, keys = targets.len(), issued, "Revalidated cached queries");
        issued
    }

    /// Signal that the application regained focus.
    ///
    /// Revalidates every known key when `revalidate_on_focus` is set. Returns
    /// the number of requests issued.
    pub fn focus(&self) -> usize {
        if !self.inner.options.revalidate_on_focus {
            return 0;
        }
        self.revalidate_all("focus")
    }

    /// Record connectivity changes.
    ///
    /// An offline → online transition revalidates every known key when
    /// `revalidate_on_reconnect` is set. Returns the number of requests issued.
    pub fn set_online(&self, online: bool) -> usize {
        let was_online = self.inner.online.swap(online, Ordering::SeqCst);
        if was_online || !online {
            if !online {
                debug!("Connectivity lost");
            }
            return 0;
        }
        if !self.inner.options.revalidate_on_reconnect {
            return 0;
        }
        self.revalidate_all("reconnect")
    }

    pub fn is_online(&self) -> bool {
        self.inner.online.load(Ordering::SeqCst)
    }

    /// Snapshot of the state cached for `key`, if any.
    pub fn state(&self, key: &QueryKey) -> Option<QueryState> {
        self.entries().get(key).map(|e| e.state.borrow().clone())
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry. In-flight responses are discarded when they arrive.
    pub fn clear(&self) {
        let dropped = {
            let mut entries = self.entries();
            let n = entries.len();
            entries.clear();
            n
        };
        debug!(dropped, "Cleared query cache");
    }
}

struct Binding {
    key: QueryKey,
    fetcher: Fetcher,
    rx: watch::Receiver<QueryState>,
}

/// A caller's view of one key in a [`QueryCache`].
pub struct Subscription {
    cache: QueryCache,
    binding: Option<Binding>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("key", &self.key())
            .field("state", &self.state())
            .finish()
    }
}

impl Subscription {
    /// The bound key; `None` for a suppressed query.
    pub fn key(&self) -> Option<&QueryKey> {
        self.binding.as_ref().map(|b| &b.key)
    }

    /// Current state without waiting.
    pub fn state(&self) -> QueryState {
        self.binding
            .as_ref()
            .map_or_else(QueryState::idle, |b| b.rx.borrow().clone())
    }

    /// Wait until no request for the key is in flight and return the state.
    pub async fn settled(&mut self) -> QueryState {
        let Some(binding) = self.binding.as_mut() else {
            return QueryState::idle();
        };
        let settled = binding
            .rx
            .wait_for(|s| !s.is_validating)
            .await
            .map(|s| s.clone());
        match settled {
            Ok(state) => state,
            // Entry was cleared; the last value is all there is.
            Err(_) => binding.rx.borrow().clone(),
        }
    }

    /// Wait for the next state change. `None` once the entry is gone or for a
    /// suppressed query.
    pub async fn changed(&mut self) -> Option<QueryState> {
        let binding = self.binding.as_mut()?;
        binding.rx.changed().await.ok()?;
        Some(binding.rx.borrow_and_update().clone())
    }

    /// Force a fresh request, ignoring the deduping interval.
    ///
    /// Returns `false` for a suppressed query or a cleared entry.
    pub fn retry(&self) -> bool {
        match &self.binding {
            Some(b) => {
                info!(key = %b.key, "Retrying query");
                self.cache.revalidate(&b.key, &b.fetcher, true)
            }
            None => false,
        }
    }

    /// Switch to another key. Responses for the previous key no longer reach
    /// this subscription.
    pub fn rebind<F, Fut>(&mut self, key: Option<QueryKey>, fetch: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ArticleList, NewsError>> + Send + 'static,
    {
        if self.key() == key.as_ref() {
            return;
        }
        *self = self.cache.subscribe(key, fetch);
    }
}
