//! The FilterPipeline orchestrates multiple listing filters.
//!
//! This module provides the FilterPipeline struct that chains
//! filters together using the builder pattern.

use crate::effective::EffectiveQuery;
use crate::filters::{DatePostedFilter, FacetFilter, KeywordFilter};
use crate::traits::ListingFilter;
use anyhow::Result;
use catalog::JobListing;

/// Chains multiple filters together into a processing pipeline.
///
/// ## Usage
/// ```ignore
/// let pipeline = FilterPipeline::new()
///     .add_filter(KeywordFilter)
///     .add_filter(FacetFilter)
///     .add_filter(DatePostedFilter::new(now));
///
/// let kept = pipeline.apply(listings, &effective_query)?;
/// ```
pub struct FilterPipeline {
    filters: Vec<Box<dyn ListingFilter>>,
}

impl FilterPipeline {
    /// Create a new empty FilterPipeline.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// The pipeline every effective query needs: keywords, facets, date window.
    pub fn standard(now: i64) -> Self {
        Self::new()
            .add_filter(KeywordFilter)
            .add_filter(FacetFilter)
            .add_filter(DatePostedFilter::new(now))
    }

    /// Add a filter to the pipeline (builder pattern).
    pub fn add_filter(mut self, filter: impl ListingFilter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Number of filters in the pipeline
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Apply all filters in sequence to the listings.
    ///
    /// Order is preserved, so a ranked input stays ranked.
    pub fn apply(&self, listings: Vec<JobListing>, query: &EffectiveQuery) -> Result<Vec<JobListing>> {
        let mut current = listings;
        for filter in &self.filters {
            tracing::debug!(
                "Applying filter: {} (input count: {})",
                filter.name(),
                current.len()
            );
            current = filter.apply(current, query)?;
            tracing::debug!(
                "Filter applied: {} (output count: {})",
                filter.name(),
                current.len()
            );
        }
        Ok(current)
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::WorkLocation;
    use std::collections::BTreeSet;

    fn listings() -> Vec<JobListing> {
        let mut a = JobListing::new("a", "Rust Engineer", "Ferrous", 30);
        a.work_location = Some(WorkLocation::Remote);
        let mut b = JobListing::new("b", "Rust Engineer", "Oxide", 20);
        b.work_location = Some(WorkLocation::OnSite);
        let c = JobListing::new("c", "Designer", "Pixel", 10);
        vec![a, b, c]
    }

    #[test]
    fn test_empty_pipeline() {
        let pipeline = FilterPipeline::new();
        let query = EffectiveQuery {
            keywords: vec!["nothing-matches".to_string()],
            ..Default::default()
        };

        let filtered = pipeline.apply(listings(), &query).unwrap();
        assert_eq!(filtered.len(), 3);
    }

    #[test]
    fn test_standard_pipeline_preserves_rank_order() {
        let pipeline = FilterPipeline::standard(100);
        assert_eq!(pipeline.len(), 3);

        let query = EffectiveQuery {
            keywords: vec!["rust".to_string()],
            ..Default::default()
        };
        let filtered = pipeline.apply(listings(), &query).unwrap();
        let ids: Vec<_> = filtered.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_single_filter() {
        let pipeline = FilterPipeline::new().add_filter(FacetFilter);
        let query = EffectiveQuery {
            work_locations: BTreeSet::from([WorkLocation::Remote]),
            ..Default::default()
        };

        let filtered = pipeline.apply(listings(), &query).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "a");
    }
}
