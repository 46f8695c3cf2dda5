//! # Headline Desk
//!
//! Terminal front end for a NewsAPI-style service. Shows one page of top
//! headlines, a category, or search results, followed by a pagination bar.
//!
//! ## Usage
//!
//! ```sh
//! NEWS_API_KEY=... headline_desk headlines --category science --page 2
//! headline_desk search "mars rover" -j ./json
//! ```
//!
//! ## Flow
//!
//! 1. **Configuration**: YAML file, then environment and flags on top
//! 2. **Query**: subscribe to the feed through the deduplicating cache
//! 3. **Retry**: re-issue a failed query up to `--retries` times
//! 4. **Output**: print the page and optionally write it as JSON

use clap::Parser;
use headline_desk::api::NewsClient;
use headline_desk::config::{CacheOptions, FileConfig, NewsApiConfig};
use headline_desk::feeds::{Feed, Headlines};
use headline_desk::outputs::{json, text};
use headline_desk::query::{QueryCache, QueryKey};
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;

use cli::{Cli, Command};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("headline_desk starting up");

    let args = Cli::parse();
    debug!(command = ?args.command, ?args.json_output_dir, retries = args.retries, "Parsed CLI arguments");

    let Some((feed, page)) = args.command.feed() else {
        // `categories`
        println!("{}", text::render_category_filter(""));
        return Ok(());
    };
    if let Command::Headlines { category, .. } = &args.command {
        println!("{}\n", text::render_category_filter(category));
    }

    // ---- Configuration ----
    let file_config = match &args.config {
        Some(path) => FileConfig::load(path).await.inspect_err(|e| {
            error!(path = %path, error = %e, "Failed to load config file");
        })?,
        None => FileConfig::default(),
    };

    let base_url = args.base_url.as_deref().or(file_config.base_url.as_deref());
    let mut config = NewsApiConfig::new(args.api_key.as_deref(), base_url).inspect_err(|e| {
        error!(error = %e, "Invalid news service configuration");
    })?;
    if let Some(country) = args.country.clone().or_else(|| file_config.country.clone()) {
        config = config.with_country(country);
    }
    if let Some(page_size) = file_config.page_size {
        config = config.with_page_size(page_size);
    }
    let cache_options = file_config.cache_options(CacheOptions::default());
    info!(?config, ?cache_options, "Loaded configuration");

    // ---- Query ----
    let headlines = Headlines::new(
        NewsClient::new(config.clone()),
        QueryCache::new(cache_options),
        &config,
    );
    if headlines.key_for(&feed, page).is_none() {
        if let Feed::Category(category) = &feed {
            error!(%category, "Unknown category");
            return Err(format!("unknown category '{category}'").into());
        }
    }
    let mut subscription = headlines.subscribe(&feed, page);
    let mut state = subscription.settled().await;

    let mut attempt = 0;
    while state.error.is_some() && attempt < args.retries {
        attempt += 1;
        warn!(attempt, max = args.retries, key = ?subscription.key(), "Query failed; retrying");
        subscription.retry();
        state = subscription.settled().await;
    }

    // ---- Output ----
    // Show the page that was actually requested, not the raw flag value.
    let page = subscription.key().map_or(page.max(1), QueryKey::page);
    println!("{}", text::render_state(&feed, &state, page, headlines.page_size()));

    if let (Some(dir), Some(key), Some(list)) =
        (&args.json_output_dir, subscription.key(), state.data.as_ref())
    {
        if state.error.is_none() {
            if let Err(e) = json::write_result_page(key, list, headlines.page_size(), dir).await {
                error!(error = %e, "Failed to write JSON output");
            }
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    if let Some(e) = state.error {
        error!(kind = ?e.kind, status = ?e.status, code = ?e.code, message = %e.message, "Query failed");
        std::process::exit(1);
    }
    Ok(())
}
