//! # Pagination Controller
//!
//! Holds the ordered result set of a session and decides how much of it is
//! visible. Two strategies share one state machine:
//!
//! - **Remote cursor**: every load-more asks the source for the page after
//!   the stored cursor. A short page or a missing cursor means exhausted.
//! - **Window**: one large batch is held locally and load-more reveals the
//!   next `page_size` listings of it without any fetch.
//!
//! ```text
//! Idle -> LoadingFirstPage -> Ready <-> LoadingMore
//!               |               |
//!             Error         Exhausted
//! ```
//!
//! The paginator does no I/O. The session performs the fetches and feeds
//! the outcomes back in, so every transition here is synchronous.

use catalog::{JobListing, ListingId};
use serde::Serialize;
use sources::SearchPage;
use std::collections::HashSet;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageState {
    Idle,
    LoadingFirstPage,
    Ready,
    LoadingMore,
    Exhausted,
    Error,
}

/// Which pagination strategy a session uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    RemoteCursor,
    Window,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Strategy {
    RemoteCursor { cursor: Option<String> },
    Window { visible: usize },
}

/// What the session has to do after asking for more
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadMore {
    /// Fetch the page after this cursor and hand it to `apply_next_page`
    Fetch { cursor: String },
    /// More of the held batch is now visible; nothing to fetch
    Revealed,
}

#[derive(Debug, Clone)]
pub struct Paginator {
    page_size: usize,
    strategy: Strategy,
    state: PageState,
    results: Vec<JobListing>,
    seen: HashSet<ListingId>,
    /// Listings received (remote) or revealed (window); never decreases
    /// until the next reset
    position: usize,
    load_more_error: Option<String>,
}

impl Paginator {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size,
            strategy: Strategy::RemoteCursor { cursor: None },
            state: PageState::Idle,
            results: Vec::new(),
            seen: HashSet::new(),
            position: 0,
            load_more_error: None,
        }
    }

    /// Drop everything held and wait for a first page
    pub fn reset(&mut self, kind: StrategyKind) {
        self.strategy = match kind {
            StrategyKind::RemoteCursor => Strategy::RemoteCursor { cursor: None },
            StrategyKind::Window => Strategy::Window { visible: 0 },
        };
        self.state = PageState::LoadingFirstPage;
        self.results.clear();
        self.seen.clear();
        self.position = 0;
        self.load_more_error = None;
    }

    /// Apply the first remote page
    pub fn apply_first_page(&mut self, page: SearchPage) {
        self.apply_remote_page(page);
    }

    /// Apply the single batch a window session works from
    pub fn apply_batch(&mut self, listings: Vec<JobListing>) {
        self.append(listings);
        let visible = self.page_size.min(self.results.len());
        self.strategy = Strategy::Window { visible };
        self.position = visible;
        self.state = if visible >= self.results.len() {
            PageState::Exhausted
        } else {
            PageState::Ready
        };
        debug!("Window batch of {} listings, {} visible", self.results.len(), visible);
    }

    /// The first page could not be loaded; nothing stays visible
    pub fn fail_first_page(&mut self) {
        self.results.clear();
        self.seen.clear();
        self.position = 0;
        self.state = PageState::Error;
    }

    /// Start a load-more. `None` unless the paginator is `Ready`, which
    /// keeps at most one load-more in flight.
    pub fn begin_load_more(&mut self) -> Option<LoadMore> {
        if self.state != PageState::Ready {
            return None;
        }
        match &mut self.strategy {
            Strategy::RemoteCursor { cursor } => {
                let cursor = cursor.clone()?;
                self.state = PageState::LoadingMore;
                Some(LoadMore::Fetch { cursor })
            }
            Strategy::Window { visible } => {
                *visible = (*visible + self.page_size).min(self.results.len());
                self.position = *visible;
                if *visible >= self.results.len() {
                    self.state = PageState::Exhausted;
                }
                self.load_more_error = None;
                Some(LoadMore::Revealed)
            }
        }
    }

    /// Apply the page fetched for a `LoadMore::Fetch`
    pub fn apply_next_page(&mut self, page: SearchPage) {
        if self.state != PageState::LoadingMore {
            return;
        }
        self.load_more_error = None;
        self.apply_remote_page(page);
    }

    /// A load-more failed: back to `Ready` with what was already visible
    pub fn fail_load_more(&mut self, message: impl Into<String>) {
        if self.state == PageState::LoadingMore {
            self.state = PageState::Ready;
        }
        self.load_more_error = Some(message.into());
    }

    fn apply_remote_page(&mut self, page: SearchPage) {
        // Exhaustion is judged on what the source sent, before dedup
        let received = page.listings.len();
        self.position += received;
        self.append(page.listings);

        let exhausted = received < self.page_size || page.next_cursor.is_none();
        self.strategy = Strategy::RemoteCursor {
            cursor: page.next_cursor,
        };
        self.state = if exhausted {
            PageState::Exhausted
        } else {
            PageState::Ready
        };
        debug!(
            "Remote page of {} listings, {} held, exhausted: {}",
            received,
            self.results.len(),
            exhausted
        );
    }

    /// Append listings, dropping ids already held (first occurrence keeps
    /// its rank)
    fn append(&mut self, listings: Vec<JobListing>) {
        let before = self.results.len();
        for listing in listings {
            if self.seen.insert(listing.id.clone()) {
                self.results.push(listing);
            }
        }
        debug!("Appended {} new listings", self.results.len() - before);
    }

    pub fn state(&self) -> PageState {
        self.state
    }

    pub fn strategy_kind(&self) -> StrategyKind {
        match self.strategy {
            Strategy::RemoteCursor { .. } => StrategyKind::RemoteCursor,
            Strategy::Window { .. } => StrategyKind::Window,
        }
    }

    /// Everything held, including listings a window has not revealed yet
    pub fn results(&self) -> &[JobListing] {
        &self.results
    }

    pub fn visible(&self) -> &[JobListing] {
        match self.strategy {
            Strategy::RemoteCursor { .. } => &self.results,
            Strategy::Window { visible } => &self.results[..visible.min(self.results.len())],
        }
    }

    pub fn has_more(&self) -> bool {
        matches!(self.state, PageState::Ready | PageState::LoadingMore)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, PageState::LoadingFirstPage | PageState::LoadingMore)
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn cursor(&self) -> Option<&str> {
        match &self.strategy {
            Strategy::RemoteCursor { cursor } => cursor.as_deref(),
            Strategy::Window { .. } => None,
        }
    }

    pub fn load_more_error(&self) -> Option<&str> {
        self.load_more_error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listings(range: std::ops::Range<usize>) -> Vec<JobListing> {
        range
            .map(|i| JobListing::new(format!("j{}", i), "Job", "Acme", i as i64))
            .collect()
    }

    fn page(range: std::ops::Range<usize>, cursor: Option<&str>) -> SearchPage {
        SearchPage::new(listings(range), cursor.map(str::to_string))
    }

    #[test]
    fn test_remote_cursor_until_short_page() {
        let mut paginator = Paginator::new(20);
        assert_eq!(paginator.state(), PageState::Idle);

        paginator.reset(StrategyKind::RemoteCursor);
        assert!(paginator.is_loading());
        paginator.apply_first_page(page(0..20, Some("c1")));
        assert_eq!(paginator.state(), PageState::Ready);
        assert!(paginator.has_more());
        assert_eq!(paginator.visible().len(), 20);

        let action = paginator.begin_load_more().unwrap();
        assert_eq!(action, LoadMore::Fetch { cursor: "c1".to_string() });
        assert_eq!(paginator.state(), PageState::LoadingMore);
        // Only one load-more in flight
        assert!(paginator.begin_load_more().is_none());

        paginator.apply_next_page(page(20..27, None));
        assert_eq!(paginator.state(), PageState::Exhausted);
        assert!(!paginator.has_more());
        assert_eq!(paginator.visible().len(), 27);
        assert_eq!(paginator.position(), 27);
    }

    #[test]
    fn test_full_page_without_cursor_is_exhausted() {
        let mut paginator = Paginator::new(5);
        paginator.reset(StrategyKind::RemoteCursor);
        paginator.apply_first_page(page(0..5, None));
        assert_eq!(paginator.state(), PageState::Exhausted);
        assert!(paginator.begin_load_more().is_none());
    }

    #[test]
    fn test_duplicates_dropped_without_early_exhaustion() {
        let mut paginator = Paginator::new(3);
        paginator.reset(StrategyKind::RemoteCursor);
        paginator.apply_first_page(page(0..3, Some("c1")));

        paginator.begin_load_more();
        // The source shifted: j2 shows up again on the next page
        paginator.apply_next_page(page(2..5, Some("c2")));

        let ids: Vec<_> = paginator.visible().iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["j0", "j1", "j2", "j3", "j4"]);
        assert_eq!(paginator.state(), PageState::Ready);
        assert_eq!(paginator.position(), 6);
    }

    #[test]
    fn test_window_reveals_page_by_page() {
        let mut paginator = Paginator::new(20);
        paginator.reset(StrategyKind::Window);
        paginator.apply_batch(listings(0..45));
        assert_eq!(paginator.visible().len(), 20);
        assert_eq!(paginator.results().len(), 45);

        assert_eq!(paginator.begin_load_more(), Some(LoadMore::Revealed));
        assert_eq!(paginator.visible().len(), 40);
        assert!(paginator.has_more());

        paginator.begin_load_more();
        assert_eq!(paginator.visible().len(), 45);
        assert_eq!(paginator.state(), PageState::Exhausted);
        assert!(paginator.begin_load_more().is_none());
    }

    #[test]
    fn test_empty_batch_is_exhausted() {
        let mut paginator = Paginator::new(20);
        paginator.reset(StrategyKind::Window);
        paginator.apply_batch(Vec::new());
        assert_eq!(paginator.state(), PageState::Exhausted);
        assert!(paginator.visible().is_empty());
    }

    #[test]
    fn test_failed_load_more_keeps_listings() {
        let mut paginator = Paginator::new(20);
        paginator.reset(StrategyKind::RemoteCursor);
        paginator.apply_first_page(page(0..20, Some("c1")));
        paginator.begin_load_more();

        paginator.fail_load_more("timeout");
        assert_eq!(paginator.state(), PageState::Ready);
        assert_eq!(paginator.visible().len(), 20);
        assert!(paginator.has_more());
        assert_eq!(paginator.load_more_error(), Some("timeout"));

        // Retrying reuses the same cursor
        assert_eq!(
            paginator.begin_load_more(),
            Some(LoadMore::Fetch { cursor: "c1".to_string() })
        );
        paginator.apply_next_page(page(20..25, None));
        assert!(paginator.load_more_error().is_none());
    }

    #[test]
    fn test_failed_first_page_and_reset() {
        let mut paginator = Paginator::new(20);
        paginator.reset(StrategyKind::RemoteCursor);
        paginator.fail_first_page();
        assert_eq!(paginator.state(), PageState::Error);
        assert!(paginator.visible().is_empty());
        assert!(!paginator.has_more());

        paginator.reset(StrategyKind::Window);
        assert_eq!(paginator.state(), PageState::LoadingFirstPage);
        assert_eq!(paginator.strategy_kind(), StrategyKind::Window);
        assert!(paginator.cursor().is_none());
    }
}
