//! Page-number windowing for pagination controls.
//!
//! A result list with many pages cannot show a button per page, so the control
//! shows a compact window: the first page, the last page, the neighbourhood of
//! the current page, and ellipsis markers for the gaps.
//!
//! ```text
//! total ≤ 5         1 2 3 4 5
//! near the start    1 2 3 4 … 20
//! in the middle     1 … 9 10 11 … 20
//! near the end      1 … 17 18 19 20
//! ```

use std::fmt;

/// Pages at or below this count are all shown without ellipses.
pub const MAX_UNWINDOWED_PAGES: u32 = 5;

/// One slot in a pagination control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageToken {
    /// A selectable page number (1-indexed).
    Page(u32),
    /// A non-selectable gap marker.
    Ellipsis,
}

impl PageToken {
    /// Activate this token.
    ///
    /// Calls `on_change` with the page number for [`PageToken::Page`]; an
    /// ellipsis never invokes it. Returns whether the callback ran.
    pub fn select<F>(self, on_change: F) -> bool
    where
        F: FnOnce(u32),
    {
        match self {
            PageToken::Page(page) => {
                on_change(page);
                true
            }
            PageToken::Ellipsis => false,
        }
    }

    pub fn page(self) -> Option<u32> {
        match self {
            PageToken::Page(page) => Some(page),
            PageToken::Ellipsis => None,
        }
    }
}

impl fmt::Display for PageToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageToken::Page(page) => write!(f, "{page}"),
            PageToken::Ellipsis => f.write_str("..."),
        }
    }
}

/// Compute the tokens of the pagination control for `current_page` of `total_pages`.
///
/// A `current_page` outside `1..=total_pages` is clamped into range. An empty
/// vector means there is nothing to paginate and the control should not be
/// rendered at all.
///
/// # Examples
///
/// ```
/// use headline_desk::pagination::{compute_page_window, PageToken::{Ellipsis, Page}};
///
/// assert_eq!(
///     compute_page_window(10, 20),
///     vec![Page(1), Ellipsis, Page(9), Page(10), Page(11), Ellipsis, Page(20)]
/// );
/// ```
pub fn compute_page_window(current_page: u32, total_pages: u32) -> Vec<PageToken> {
    use PageToken::{Ellipsis, Page};

    if total_pages <= MAX_UNWINDOWED_PAGES {
        return (1..=total_pages).map(Page).collect();
    }

    let current = clamp_page(current_page, total_pages);
    let last = total_pages;

    if current <= 3 {
        vec![Page(1), Page(2), Page(3), Page(4), Ellipsis, Page(last)]
    } else if current >= last - 2 {
        vec![
            Page(1),
            Ellipsis,
            Page(last - 3),
            Page(last - 2),
            Page(last - 1),
            Page(last),
        ]
    } else {
        vec![
            Page(1),
            Ellipsis,
            Page(current - 1),
            Page(current),
            Page(current + 1),
            Ellipsis,
            Page(last),
        ]
    }
}

/// `current_page` moved into `1..=total_pages`; page 1 when there are no pages.
pub fn clamp_page(current_page: u32, total_pages: u32) -> u32 {
    current_page.clamp(1, total_pages.max(1))
}

/// Number of pages needed for `total_results` at `page_size` per page.
pub fn total_pages(total_results: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    let pages = total_results.div_ceil(u64::from(page_size));
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Targets of the "previous" and "next" controls.
///
/// `None` means the control is disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageNav {
    pub previous: Option<u32>,
    pub next: Option<u32>,
}

impl PageNav {
    /// A `current_page` outside `1..=total_pages` is clamped into range first.
    pub fn new(current_page: u32, total_pages: u32) -> Self {
        let current = clamp_page(current_page, total_pages);
        let previous = (current > 1).then(|| current - 1);
        let next = (current < total_pages).then(|| current + 1);
        Self { previous, next }
    }

    pub fn has_previous(&self) -> bool {
        self.previous.is_some()
    }

    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}
