//! # Catalog Crate
//!
//! Job listing data model and the in-memory listing catalog.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (JobListing, facet enums, CatalogIndex)
//! - **parser**: Parse catalog files (JSON array or JSON lines) into listings
//! - **index**: Build the recency and technology orderings
//! - **error**: Error types for catalog loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog::CatalogIndex;
//! use std::path::Path;
//!
//! let index = CatalogIndex::load_from_file(Path::new("data/sample_listings.json"))?;
//! let newest = index.listings_by_recency();
//! ```

pub mod error;
pub mod index;
pub mod parser;
pub mod types;

pub use error::{CatalogError, Result};
pub use types::{
    // Type aliases
    ListingId,
    UserId,
    // Listing types
    CatalogIndex,
    Compensation,
    JobListing,
    MatchBreakdown,
    PayPeriod,
    // Facet enums
    DatePosted,
    EmploymentType,
    ExperienceLevel,
    WorkLocation,
    SECONDS_PER_DAY,
};
