//! # Sources Crate
//!
//! Contracts and in-memory implementations of the engine's external
//! collaborators.
//!
//! ## Components
//!
//! ### Contracts (`traits`)
//! - `SearchService`: keyword/facet search, cursor paginated
//! - `MatchesService`: personalized matches or "profile incomplete"
//! - `ListingStore`: default feed plus per-user save/dismiss lists
//! - `InteractionTracker`: best-effort analytics events
//!
//! ### In-memory backends
//! - `CatalogSearch`: filters and ranks a `CatalogIndex`
//! - `CatalogMatches`: scores the catalog against candidate profiles
//! - `MemoryStore`: feed, interaction lists and event log
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog::CatalogIndex;
//! use sources::{CatalogSearch, SearchRequest, SearchService};
//! use std::sync::Arc;
//!
//! let index = Arc::new(CatalogIndex::load_from_file(path)?);
//! let search = CatalogSearch::new(index.clone());
//! let page = search.search(&SearchRequest::first_page(effective, 20)).await?;
//! ```

pub mod catalog_matches;
pub mod catalog_search;
mod cursor;
pub mod error;
pub mod memory_store;
pub mod traits;
pub mod types;

pub use catalog_matches::CatalogMatches;
pub use catalog_search::CatalogSearch;
pub use error::SourceError;
pub use memory_store::MemoryStore;
pub use traits::{InteractionTracker, ListingStore, MatchesService, SearchService};
pub use types::{
    CandidateProfile, InteractionEvent, InteractionKind, MatchesOutcome, SearchPage, SearchRequest,
    UserInteractions, unix_now,
};

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::{CatalogIndex, JobListing};
    use query::EffectiveQuery;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_backends_share_one_catalog() {
        let mut listing = JobListing::new("j1", "Rust Engineer", "Ferrous", 10);
        listing.skills = vec!["rust".to_string()];
        let index = Arc::new(CatalogIndex::from_listings(vec![listing]).unwrap());

        let search: Arc<dyn SearchService> = Arc::new(CatalogSearch::new(index.clone()).with_now(100));
        let store: Arc<dyn ListingStore> = Arc::new(MemoryStore::new(index.clone()));
        let matches: Arc<dyn MatchesService> = Arc::new(CatalogMatches::new(index).with_profile(
            "u1",
            CandidateProfile {
                skills: ["rust".to_string()].into_iter().collect(),
                ..Default::default()
            },
        ));

        let searched = search
            .search(&SearchRequest::first_page(EffectiveQuery::default(), 5))
            .await
            .unwrap();
        let feed = store.fetch_feed(None, 5).await.unwrap();
        assert_eq!(searched.listings, feed.listings);

        match matches.get_matches("u1").await.unwrap() {
            MatchesOutcome::Matches(found) => assert_eq!(found[0].id, "j1"),
            MatchesOutcome::ProfileIncomplete => panic!("profile should be complete"),
        }
    }
}
