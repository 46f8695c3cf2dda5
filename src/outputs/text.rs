//! Plain-text rendering for a terminal.
//!
//! A result page renders as a stack of article cards followed by the
//! pagination bar:
//!
//! ```text
//! Markets rally on rate hopes
//! Reuters · Jan 15, 2024
//! Stocks climbed after ...
//! https://example.com/markets
//!
//! « Prev  1 ... 9 [10] 11 ... 20  Next »
//! ```

use crate::feeds::{Feed, category_options};
use crate::models::Article;
use crate::pagination::{PageNav, PageToken, clamp_page, compute_page_window, total_pages};
use crate::query::{QueryState, QueryStatus};
use itertools::Itertools;
use std::fmt::Write;

pub fn render_card(article: &Article) -> String {
    let mut card = String::new();
    let _ = writeln!(card, "{}", article.title);
    let _ = writeln!(card, "{} · {}", article.source, article.display_date());
    if !article.description.is_empty() {
        let _ = writeln!(card, "{}", article.description);
    }
    let _ = write!(card, "{}", article.url);
    card
}

pub fn render_articles(articles: &[Article]) -> String {
    articles.iter().map(render_card).join("\n\n")
}

/// Pagination bar for `current_page` of `total_pages`.
///
/// `None` when there is nothing to paginate. Disabled navigation is left out.
/// An out-of-range `current_page` is highlighted as the nearest valid page.
pub fn render_pagination(current_page: u32, total_pages: u32) -> Option<String> {
    let current_page = clamp_page(current_page, total_pages);
    let window = compute_page_window(current_page, total_pages);
    if window.is_empty() {
        return None;
    }

    let pages = window
        .iter()
        .map(|token| match token {
            PageToken::Page(p) if *p == current_page => format!("[{p}]"),
            other => other.to_string(),
        })
        .join(" ");

    let nav = PageNav::new(current_page, total_pages);
    let bar = [
        nav.has_previous().then(|| "« Prev".to_string()),
        Some(pages),
        nav.has_next().then(|| "Next »".to_string()),
    ]
    .into_iter()
    .flatten()
    .join("  ");
    Some(bar)
}

/// Category filter row with the active category bracketed.
pub fn render_category_filter(active: &str) -> String {
    category_options()
        .into_iter()
        .map(|(value, label)| {
            if value.eq_ignore_ascii_case(active.trim()) {
                format!("[{label}]")
            } else {
                label
            }
        })
        .join(" ")
}

fn heading(feed: &Feed) -> String {
    match feed {
        Feed::TopHeadlines => "Top Headlines".to_string(),
        Feed::Category(category) => format!("{} Headlines", crate::utils::upcase(category.trim())),
        Feed::Search { query, .. } => format!("Search Results for \"{}\"", query.trim()),
    }
}

/// Everything shown for one feed page: heading, results or message, pagination.
pub fn render_state(feed: &Feed, state: &QueryState, page: u32, page_size: u32) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}\n", heading(feed));

    match state.status() {
        QueryStatus::Loading => {
            let _ = write!(out, "Loading...");
            return out;
        }
        QueryStatus::Failure if state.articles().is_empty() => {
            let message = state.error.as_ref().map_or("", |e| e.message.as_str());
            let _ = write!(out, "Error: {message}");
            return out;
        }
        _ => {}
    }

    if matches!(feed, Feed::Search { query, .. } if query.trim().is_empty()) {
        let _ = write!(out, "Enter a search term to find news articles.");
        return out;
    }

    if state.articles().is_empty() {
        let _ = match feed {
            Feed::Search { query, .. } => write!(
                out,
                "No articles found for \"{}\". Try a different search term.",
                query.trim()
            ),
            _ => write!(out, "No articles available right now."),
        };
        return out;
    }

    if let Some(error) = &state.error {
        let _ = writeln!(out, "Showing earlier results; refresh failed: {}\n", error.message);
    }
    let _ = write!(out, "{}", render_articles(state.articles()));

    if let Some(bar) = render_pagination(page, total_pages(state.total_results(), page_size)) {
        let _ = write!(out, "\n\n{bar}");
    }
    out
}
