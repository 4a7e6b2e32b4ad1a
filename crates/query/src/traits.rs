//! Core traits for the listing filter pipeline.
//!
//! A `ListingFilter` narrows a set of listings by one aspect of an
//! `EffectiveQuery`. Filters are composed by `FilterPipeline`.

use crate::effective::EffectiveQuery;
use anyhow::Result;
use catalog::JobListing;

/// Core trait for filtering listings.
///
/// ## Design Note
/// - `Send + Sync` lets a pipeline be shared behind an `Arc` by async sources
/// - Filters take ownership of the Vec and return the kept listings
/// - Implementations must keep the input order (it is the rank order)
pub trait ListingFilter: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    /// Apply this filter to a set of listings.
    fn apply(&self, listings: Vec<JobListing>, query: &EffectiveQuery) -> Result<Vec<JobListing>>;
}
