//! Search intent for the job board: filters, free-text parsing and merging.
//!
//! This crate provides:
//! - `FilterState`, the explicit facet selections made in the UI
//! - `QueryParser`, which turns free text into structured hints
//! - `merge`, which combines both into an `EffectiveQuery`
//! - `ListingFilter` implementations and a `FilterPipeline` that apply an
//!   effective query to a set of listings
//!
//! ## Example Usage
//! ```ignore
//! use query::{merge, FilterPipeline, FilterState, QueryParser};
//!
//! let parser = QueryParser::new();
//! let explicit = FilterState::new().with_technology("kafka");
//! let effective = merge(&parser.parse("senior rust engineer remote"), &explicit);
//!
//! let kept = FilterPipeline::standard(now).apply(listings, &effective)?;
//! ```

pub mod effective;
pub mod filter_pipeline;
pub mod filter_state;
pub mod filters;
pub mod parser;
pub mod traits;

// Re-export main types
pub use effective::{EffectiveQuery, merge};
pub use filter_pipeline::FilterPipeline;
pub use filter_state::{FilterState, normalize_tag};
pub use parser::{ParsedQuery, QueryParser};
pub use traits::ListingFilter;
