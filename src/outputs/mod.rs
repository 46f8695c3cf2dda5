//! Output generation for fetched result pages.
//!
//! # Submodules
//!
//! - [`text`]: Renders article cards and the pagination bar for a terminal
//! - [`json`]: Writes a settled result page to a JSON file
//!
//! # Output Structure
//!
//! ```text
//! json_output_dir/
//! ├── top-headlines-page-1.json
//! ├── category-headlines-page-2.json
//! └── search-news-page-1.json
//! ```

pub mod json;
pub mod text;
