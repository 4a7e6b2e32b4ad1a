//! Catalog Search - in-memory stand-in for the remote search service
//!
//! Serves keyword/facet searches straight from a `CatalogIndex`.
//!
//! ## Algorithm
//! 1. Start from every listing in recency order
//! 2. Run the standard filter pipeline (keywords, facets, date window)
//! 3. Rank: listings whose title contains more keyword words come first;
//!    the sort is stable, so ties stay newest-first
//! 4. Cut the requested page and hand back an offset cursor

use crate::cursor::paginate;
use crate::error::SourceError;
use crate::traits::SearchService;
use crate::types::{SearchPage, SearchRequest, unix_now};
use async_trait::async_trait;
use catalog::{CatalogIndex, JobListing};
use query::{EffectiveQuery, FilterPipeline};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Search service backed by the local listing catalog
#[derive(Clone)]
pub struct CatalogSearch {
    /// Shared reference to the catalog (read-only, so no Mutex needed)
    catalog: Arc<CatalogIndex>,

    /// Fixed reference time for date windows; `None` means wall clock
    now: Option<i64>,
}

impl CatalogSearch {
    pub fn new(catalog: Arc<CatalogIndex>) -> Self {
        Self { catalog, now: None }
    }

    /// Pin the reference time used for date-posted windows
    pub fn with_now(mut self, now: i64) -> Self {
        self.now = Some(now);
        self
    }

    /// All matching listings in rank order, before paging
    pub fn ranked(&self, query: &EffectiveQuery) -> Result<Vec<JobListing>, SourceError> {
        let pipeline = FilterPipeline::standard(self.now.unwrap_or_else(unix_now));
        let mut matched = pipeline
            .apply(self.catalog.listings_by_recency(), query)
            .map_err(|e| SourceError::Rejected(e.to_string()))?;

        let words: Vec<String> = query
            .keywords
            .iter()
            .flat_map(|k| k.split_whitespace())
            .map(|w| w.to_lowercase())
            .collect();
        if !words.is_empty() {
            matched.sort_by_cached_key(|listing| {
                let title = listing.title.to_lowercase();
                let hits = words.iter().filter(|w| title.contains(w.as_str())).count();
                std::cmp::Reverse(hits)
            });
        }
        Ok(matched)
    }
}

#[async_trait]
impl SearchService for CatalogSearch {
    #[instrument(skip(self, request), fields(page_size = request.page_size))]
    async fn search(&self, request: &SearchRequest) -> Result<SearchPage, SourceError> {
        let ranked = self.ranked(&request.query)?;
        debug!("Catalog search matched {} listings", ranked.len());
        paginate(ranked, request.cursor.as_deref(), request.page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::WorkLocation;
    use query::{FilterState, QueryParser, merge};

    fn create_test_catalog() -> Arc<CatalogIndex> {
        let mut a = JobListing::new("a", "Platform Engineer (Rust)", "Ferrous", 100);
        a.technologies = vec!["Rust".to_string()];
        a.work_location = Some(WorkLocation::Remote);
        let mut b = JobListing::new("b", "Rust Engineer", "Oxide", 300);
        b.technologies = vec!["Rust".to_string()];
        b.work_location = Some(WorkLocation::OnSite);
        let mut c = JobListing::new("c", "Engineering Manager", "Acme", 200);
        c.description = "Lead a team writing rust services".to_string();
        Arc::new(CatalogIndex::from_listings(vec![a, b, c]).unwrap())
    }

    #[tokio::test]
    async fn test_search_filters_by_facets() {
        let search = CatalogSearch::new(create_test_catalog()).with_now(1_000);
        let effective = merge(
            &QueryParser::new().parse("rust"),
            &FilterState::new().with_work_location(WorkLocation::Remote),
        );

        let page = search
            .search(&SearchRequest::first_page(effective, 10))
            .await
            .unwrap();
        assert_eq!(page.listings.len(), 1);
        assert_eq!(page.listings[0].id, "a");
        assert!(page.next_cursor.is_none());
    }

    #[tokio::test]
    async fn test_title_hits_rank_first_then_recency() {
        let search = CatalogSearch::new(create_test_catalog()).with_now(1_000);
        let effective = EffectiveQuery {
            keywords: vec!["rust".to_string(), "engineer".to_string()],
            ..Default::default()
        };

        let ranked = search.ranked(&effective).unwrap();
        let ids: Vec<_> = ranked.iter().map(|l| l.id.as_str()).collect();
        // "c" only matches through its description and "engineering"
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[tokio::test]
    async fn test_search_pages_with_cursor() {
        let search = CatalogSearch::new(create_test_catalog()).with_now(1_000);
        let request = SearchRequest::first_page(EffectiveQuery::default(), 2);

        let first = search.search(&request).await.unwrap();
        assert_eq!(first.listings.len(), 2);
        assert_eq!(first.listings[0].id, "b");

        let next = SearchRequest {
            cursor: first.next_cursor.clone(),
            ..request
        };
        let second = search.search(&next).await.unwrap();
        assert_eq!(second.listings.len(), 1);
        assert_eq!(second.listings[0].id, "a");
        assert!(second.next_cursor.is_none());
    }
}
