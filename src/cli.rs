//! Command-line interface definitions for Headline Desk.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Connection settings can be provided via command-line flags or environment
//! variables.

use clap::{Parser, Subcommand};
use headline_desk::api::SortBy;
use headline_desk::feeds::{ALL_CATEGORIES, Feed, category_options};

/// Command-line arguments for the Headline Desk application.
///
/// # Examples
///
/// ```sh
/// # Front page
/// NEWS_API_KEY=... headline_desk headlines
///
/// # Second page of technology headlines, also written as JSON
/// headline_desk --api-key KEY -j ./json headlines --category technology --page 2
///
/// # Search sorted by popularity
/// headline_desk search "mars rover" --sort-by popularity
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// News API key
    #[arg(long, env = "NEWS_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Base URL of the news API
    #[arg(long, env = "NEWS_API_BASE_URL")]
    pub base_url: Option<String>,

    /// Optional path to a config.yaml file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Two-letter country code for headlines
    #[arg(long, env = "NEWS_COUNTRY")]
    pub country: Option<String>,

    /// Also write the result page as JSON into this directory
    #[arg(short, long)]
    pub json_output_dir: Option<String>,

    /// How many times to retry a failed query before giving up
    #[arg(long, default_value_t = 0)]
    pub retries: u32,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Top headlines, optionally filtered to one category
    Headlines {
        /// Category name, or "all" for the unfiltered front page
        #[arg(long, default_value = ALL_CATEGORIES, value_parser = parse_category)]
        category: String,

        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },

    /// Search all articles
    Search {
        query: String,

        #[arg(short, long, default_value_t = 1)]
        page: u32,

        /// publishedAt, relevancy or popularity
        #[arg(long, default_value_t = SortBy::PublishedAt)]
        sort_by: SortBy,
    },

    /// List the available categories
    Categories,
}

/// Accept `all` or a known category, case-insensitively.
fn parse_category(s: &str) -> Result<String, String> {
    let wanted = s.trim().to_ascii_lowercase();
    let options = category_options();
    if options.iter().any(|(value, _)| *value == wanted) {
        return Ok(wanted);
    }
    Err(format!(
        "unknown category '{}' (expected one of: {})",
        s.trim(),
        options.iter().map(|(value, _)| *value).collect::<Vec<_>>().join(", ")
    ))
}

impl Command {
    /// The feed and page to show, or `None` for commands that fetch nothing.
    pub fn feed(&self) -> Option<(Feed, u32)> {
        match self {
            Command::Headlines { category, page } => Some((Feed::Category(category.clone()), *page)),
            Command::Search {
                query,
                page,
                sort_by,
            } => Some((
                Feed::Search {
                    query: query.clone(),
                    sort_by: *sort_by,
                },
                *page,
            )),
            Command::Categories => None,
        }
    }
}
