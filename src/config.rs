//! Runtime configuration for the news client and the query cache.
//!
//! Values come from three layers, lowest priority first:
//! 1. Built-in defaults
//! 2. An optional YAML file (`--config`)
//! 3. Command-line flags and environment variables (resolved by `clap`)
//!
//! The API key has no default. Building a [`NewsApiConfig`] without one fails
//! with [`ConfigError::MissingApiKey`] so the binary can stop before issuing
//! any request.

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://newsapi.org/v2";
pub const DEFAULT_COUNTRY: &str = "us";
pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const DEFAULT_DEDUPING_INTERVAL: Duration = Duration::from_millis(60_000);

/// Connection settings for the news service.
#[derive(Clone)]
pub struct NewsApiConfig {
    pub api_key: String,
    /// Base URL without a trailing slash, e.g. `https://newsapi.org/v2`.
    pub base_url: Url,
    /// Two-letter country code used for headline queries.
    pub country: String,
    pub page_size: u32,
}

impl NewsApiConfig {
    /// Build a config with default country and page size.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MissingApiKey`] if `api_key` is absent or blank
    /// - [`ConfigError::InvalidBaseUrl`] if `base_url` does not parse
    pub fn new(api_key: Option<&str>, base_url: Option<&str>) -> Result<Self, ConfigError> {
        let api_key = api_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;
        let base = base_url.unwrap_or(DEFAULT_BASE_URL).trim_end_matches('/');

        Ok(Self {
            api_key: api_key.to_string(),
            base_url: Url::parse(base)?,
            country: DEFAULT_COUNTRY.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        })
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }
}

// The key never goes to logs.
impl std::fmt::Debug for NewsApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewsApiConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url.as_str())
            .field("country", &self.country)
            .field("page_size", &self.page_size)
            .finish()
    }
}

/// Policy knobs for [`QueryCache`](crate::query::QueryCache).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheOptions {
    /// Requests for an equal key within this window share one fetch.
    pub deduping_interval: Duration,
    /// Revalidate every known key when the application regains focus.
    pub revalidate_on_focus: bool,
    /// Revalidate every known key when connectivity returns after being offline.
    pub revalidate_on_reconnect: bool,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            deduping_interval: DEFAULT_DEDUPING_INTERVAL,
            revalidate_on_focus: false,
            revalidate_on_reconnect: true,
        }
    }
}

/// Optional settings read from a YAML file.
///
/// ```yaml
/// base_url: https://newsapi.org/v2
/// country: gb
/// page_size: 20
/// deduping_interval_ms: 60000
/// revalidate_on_focus: false
/// revalidate_on_reconnect: true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub base_url: Option<String>,
    pub country: Option<String>,
    pub page_size: Option<u32>,
    pub deduping_interval_ms: Option<u64>,
    pub revalidate_on_focus: Option<bool>,
    pub revalidate_on_reconnect: Option<bool>,
}

impl FileConfig {
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes as unit, not as an empty map.
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    #[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.display().to_string(),
                source,
            })?;
        let config = Self::from_yaml(&text)?;
        debug!(?config, "Loaded config file");
        Ok(config)
    }

    /// Apply the file's cache settings on top of `base`.
    pub fn cache_options(&self, base: CacheOptions) -> CacheOptions {
        CacheOptions {
            deduping_interval: self
                .deduping_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(base.deduping_interval),
            revalidate_on_focus: self.revalidate_on_focus.unwrap_or(base.revalidate_on_focus),
            revalidate_on_reconnect: self
                .revalidate_on_reconnect
                .unwrap_or(base.revalidate_on_reconnect),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_api_key_is_rejected() {
        assert!(matches!(
            NewsApiConfig::new(None, None),
            Err(ConfigError::MissingApiKey)
        ));
        assert!(matches!(
            NewsApiConfig::new(Some("   "), None),
            Err(ConfigError::MissingApiKey)
        ));
    }

    #[test]
    fn test_defaults() {
        let config = NewsApiConfig::new(Some("test-api-key"), None).unwrap();

        assert_eq!(config.api_key, "test-api-key");
        assert_eq!(config.base_url.as_str(), "https://newsapi.org/v2");
        assert_eq!(config.country, "us");
        assert_eq!(config.page_size, 20);
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let config = NewsApiConfig::new(Some("k"), Some("http://localhost:1234/v2/")).unwrap();
        assert_eq!(config.base_url.as_str(), "http://localhost:1234/v2");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            NewsApiConfig::new(Some("k"), Some("not a url")),
            Err(ConfigError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = NewsApiConfig::new(Some("super-secret"), None).unwrap();
        let dbg = format!("{config:?}");
        assert!(!dbg.contains("super-secret"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn test_cache_option_defaults() {
        let options = CacheOptions::default();
        assert_eq!(options.deduping_interval, Duration::from_secs(60));
        assert!(!options.revalidate_on_focus);
        assert!(options.revalidate_on_reconnect);
    }

    #[test]
    fn test_file_config_overrides_cache_options() {
        let file = FileConfig::from_yaml(
            "country: gb\ndeduping_interval_ms: 5000\nrevalidate_on_focus: true\n",
        )
        .unwrap();
        let options = file.cache_options(CacheOptions::default());

        assert_eq!(file.country.as_deref(), Some("gb"));
        assert_eq!(options.deduping_interval, Duration::from_millis(5000));
        assert!(options.revalidate_on_focus);
        assert!(options.revalidate_on_reconnect);
    }

    #[test]
    fn test_empty_file_config() {
        assert_eq!(FileConfig::from_yaml("").unwrap(), FileConfig::default());
    }

    #[test]
    fn test_unknown_file_key_is_an_error() {
        assert!(matches!(
            FileConfig::from_yaml("colour: blue\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let err = FileConfig::load("/definitely/not/here.yaml").await.unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
