//! Filter implementations for the listing pipeline.
//!
//! This module contains all the concrete filter implementations
//! that can be composed into a FilterPipeline.

pub mod date_posted;
pub mod facet;
pub mod keyword;

// Re-export for convenience
pub use date_posted::DatePostedFilter;
pub use facet::{FacetFilter, listing_matches_facets};
pub use keyword::KeywordFilter;
