//! Boundary error type for the external collaborators.
//!
//! Whatever transport a collaborator uses, its failures reach the engine as
//! one of these variants.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The collaborator could not be reached
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// The call did not finish in time
    #[error("Request timed out after {millis}ms")]
    Timeout { millis: u64 },

    /// The collaborator refused the request
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// A pagination token the collaborator does not recognize
    #[error("Invalid cursor: {0}")]
    InvalidCursor(String),

    /// The referenced listing does not exist
    #[error("Listing not found: {0}")]
    ListingNotFound(String),
}
