//! CatalogIndex building and indexing logic.
//!
//! Builds the secondary orderings from parsed listings:
//! - recency order (newest first, ties by id so paging is deterministic)
//! - technology → listing ids

use crate::error::Result;
use crate::parser;
use crate::types::*;
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

impl CatalogIndex {
    /// Load a catalog file and build every index.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading listing catalog from {}", path.display());
        let listings = parser::parse_listings_file(path)?;
        let index = Self::from_listings(listings)?;
        info!("Catalog loaded: {} listings", index.len());
        Ok(index)
    }

    /// Build an index from already-parsed listings.
    pub fn from_listings(listings: Vec<JobListing>) -> Result<Self> {
        let mut index = Self::new();
        for listing in listings {
            index.insert_listing(listing)?;
        }
        index.rebuild_indices();
        Ok(index)
    }

    /// Recompute the recency order and technology index.
    pub fn rebuild_indices(&mut self) {
        let mut by_recency: Vec<(i64, ListingId)> = self
            .listings
            .values()
            .map(|l| (l.posted_at, l.id.clone()))
            .collect();
        // Newest first; equal timestamps fall back to id order
        by_recency.par_sort_unstable_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
        self.by_recency = by_recency.into_iter().map(|(_, id)| id).collect();

        let mut technology_index: HashMap<String, Vec<ListingId>> = HashMap::new();
        for id in &self.by_recency {
            if let Some(listing) = self.listings.get(id) {
                for tech in &listing.technologies {
                    technology_index
                        .entry(tech.to_lowercase())
                        .or_default()
                        .push(id.clone());
                }
            }
        }
        self.technology_index = technology_index;
    }
}
