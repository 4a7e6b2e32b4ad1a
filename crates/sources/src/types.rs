//! Request and response types exchanged with the external collaborators.

use catalog::{ExperienceLevel, JobListing, ListingId, UserId, WorkLocation};
use query::EffectiveQuery;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::{SystemTime, UNIX_EPOCH};

/// Current unix time in seconds (0 if the clock is before the epoch)
pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// A keyword/facet search for one page of results
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: EffectiveQuery,
    /// Opaque token from the previous page, `None` for the first page
    pub cursor: Option<String>,
    pub page_size: usize,
}

impl SearchRequest {
    pub fn first_page(query: EffectiveQuery, page_size: usize) -> Self {
        Self {
            query,
            cursor: None,
            page_size,
        }
    }
}

/// One page of listings plus the token for the next one
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchPage {
    pub listings: Vec<JobListing>,
    /// `None` when the source has nothing after this page
    pub next_cursor: Option<String>,
}

impl SearchPage {
    pub fn new(listings: Vec<JobListing>, next_cursor: Option<String>) -> Self {
        Self {
            listings,
            next_cursor,
        }
    }
}

/// Result of asking the matching service for a user's matches
#[derive(Debug, Clone, PartialEq)]
pub enum MatchesOutcome {
    /// Ranked listings, each carrying a match score
    Matches(Vec<JobListing>),
    /// The user has not filled in enough of their profile to be matched
    ProfileIncomplete,
}

/// What the matcher knows about a candidate
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub skills: BTreeSet<String>,
    pub experience_level: Option<ExperienceLevel>,
    pub preferred_work_location: Option<WorkLocation>,
}

impl CandidateProfile {
    /// A profile needs at least one skill to be matched
    pub fn is_complete(&self) -> bool {
        !self.skills.is_empty()
    }
}

/// Authoritative per-user save/dismiss lists held by the document store
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserInteractions {
    pub saved: BTreeSet<ListingId>,
    pub dismissed: BTreeSet<ListingId>,
}

/// Kinds of interaction signal sent to the analytics endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    View,
    Click,
    Apply,
    Save,
    Unsave,
    Dismiss,
    Undismiss,
}

/// A best-effort analytics event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionEvent {
    pub user_id: UserId,
    pub listing_id: ListingId,
    pub kind: InteractionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    pub timestamp: i64,
}

impl InteractionEvent {
    pub fn new(user_id: impl Into<UserId>, listing_id: impl Into<ListingId>, kind: InteractionKind) -> Self {
        Self {
            user_id: user_id.into(),
            listing_id: listing_id.into(),
            kind,
            duration_ms: None,
            timestamp: unix_now(),
        }
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }
}
