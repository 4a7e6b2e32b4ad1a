//! Contracts of the external collaborators.
//!
//! The engine only ever talks to these traits. Implementations translate
//! their transport failures into `SourceError` before returning, and own
//! their own timeouts.

use crate::error::SourceError;
use crate::types::{InteractionEvent, MatchesOutcome, SearchPage, SearchRequest, UserInteractions};
use async_trait::async_trait;

/// Remote keyword/facet search over listings.
#[async_trait]
pub trait SearchService: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> Result<SearchPage, SourceError>;
}

/// Remote personalized-matches service.
#[async_trait]
pub trait MatchesService: Send + Sync {
    async fn get_matches(&self, user_id: &str) -> Result<MatchesOutcome, SourceError>;
}

/// Remote document store: the default feed and per-user interaction lists.
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Page of the default feed, newest first
    async fn fetch_feed(&self, cursor: Option<&str>, page_size: usize) -> Result<SearchPage, SourceError>;

    async fn load_interactions(&self, user_id: &str) -> Result<UserInteractions, SourceError>;

    async fn set_saved(&self, user_id: &str, listing_id: &str, saved: bool) -> Result<(), SourceError>;

    async fn set_dismissed(&self, user_id: &str, listing_id: &str, dismissed: bool) -> Result<(), SourceError>;
}

/// Analytics endpoint; callers rely on no response beyond success/failure.
#[async_trait]
pub trait InteractionTracker: Send + Sync {
    async fn record(&self, event: InteractionEvent) -> Result<(), SourceError>;
}
