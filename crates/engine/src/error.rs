//! Error types for the discovery engine.

use catalog::ListingId;
use sources::SourceError;
use thiserror::Error;

/// Errors surfaced by the discovery engine.
///
/// None of these are fatal: the session keeps its last good results and
/// every variant is retryable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The first page for a query could not be fetched; the query is kept
    /// so a retry reissues it
    #[error("Failed to load results for '{query}': {message}")]
    FirstPage { query: String, message: String },

    /// Fetching more results failed; already visible results stay
    #[error("Failed to load more results: {message}")]
    LoadMore { message: String },

    /// A save/dismiss did not reach the store and was rolled back
    #[error("Could not {action} listing {listing_id}: {message}")]
    Interaction {
        listing_id: ListingId,
        action: String,
        message: String,
    },

    /// The store's saved/dismissed lists could not be loaded
    #[error("Failed to restore saved and dismissed listings: {0}")]
    Rehydrate(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl EngineError {
    pub(crate) fn first_page(query: &str, source: SourceError) -> Self {
        EngineError::FirstPage {
            query: query.to_string(),
            message: source.to_string(),
        }
    }

    pub(crate) fn interaction(listing_id: &str, action: &str, source: SourceError) -> Self {
        EngineError::Interaction {
            listing_id: listing_id.to_string(),
            action: action.to_string(),
            message: source.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
