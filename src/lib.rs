//! # Headline Desk
//!
//! Core of a news portal: a page-window algorithm for pagination bars, and a
//! request-keyed article cache that deduplicates identical listing requests
//! against a NewsAPI-style backend.
//!
//! ## Modules
//!
//! - [`pagination`]: which page buttons and ellipses a pagination bar shows
//! - [`query`]: the deduplicating cache and its subscriptions
//! - [`feeds`]: front page, category and search feeds built on the cache
//! - [`api`]: the HTTP client for the news service
//! - [`outputs`]: terminal and JSON rendering of result pages

pub mod api;
pub mod config;
pub mod error;
pub mod feeds;
pub mod models;
pub mod outputs;
pub mod pagination;
pub mod query;
pub mod utils;
