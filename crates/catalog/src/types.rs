//! Core domain types for job listings.
//!
//! This module defines the fundamental data structures shared by every other
//! crate in the workspace:
//! - Type aliases for domain clarity (ListingId, UserId)
//! - The `JobListing` snapshot and its compensation / match metadata
//! - Facet enums with a fixed set of values
//! - `CatalogIndex`, the in-memory listing catalog

use crate::error::{CatalogError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Type Aliases
// =============================================================================

/// Stable identifier of a listing in the store of record (e.g. "j1")
pub type ListingId = String;

/// Identifier of the user whose session and interactions we track
pub type UserId = String;

/// Seconds in a day, used by the date-posted windows
pub const SECONDS_PER_DAY: i64 = 86_400;

// =============================================================================
// Facet Enums
// =============================================================================

/// Employment type facet
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentType {
    FullTime,
    PartTime,
    Contract,
    Internship,
    Temporary,
}

/// Work-location facet (where the work happens)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkLocation {
    Remote,
    Hybrid,
    OnSite,
}

/// Seniority facet
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    Entry,
    Mid,
    Senior,
    Lead,
    Executive,
}

/// How recently a listing must have been posted.
///
/// Exactly one value is active at a time; `Any` means no restriction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatePosted {
    #[default]
    Any,
    PastDay,
    PastWeek,
    PastMonth,
}

impl DatePosted {
    /// Maximum listing age in seconds, `None` for `Any`
    pub fn max_age_secs(&self) -> Option<i64> {
        match self {
            DatePosted::Any => None,
            DatePosted::PastDay => Some(SECONDS_PER_DAY),
            DatePosted::PastWeek => Some(7 * SECONDS_PER_DAY),
            DatePosted::PastMonth => Some(30 * SECONDS_PER_DAY),
        }
    }

    /// Whether a listing posted at `posted_at` is inside this window at `now`
    pub fn admits(&self, posted_at: i64, now: i64) -> bool {
        match self.max_age_secs() {
            Some(max_age) => now.saturating_sub(posted_at) <= max_age,
            None => true,
        }
    }
}

fn invalid(field: &str, value: &str) -> CatalogError {
    CatalogError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    }
}

/// Lowercase and collapse `-`, `_` and spaces so "Full-Time", "full_time"
/// and "full time" all compare equal.
fn facet_key(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .collect()
}

impl FromStr for EmploymentType {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        match facet_key(s).as_str() {
            "fulltime" => Ok(EmploymentType::FullTime),
            "parttime" => Ok(EmploymentType::PartTime),
            "contract" | "contractor" | "freelance" => Ok(EmploymentType::Contract),
            "internship" | "intern" => Ok(EmploymentType::Internship),
            "temporary" | "temp" => Ok(EmploymentType::Temporary),
            _ => Err(invalid("employment_type", s)),
        }
    }
}

impl FromStr for WorkLocation {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        match facet_key(s).as_str() {
            "remote" | "wfh" => Ok(WorkLocation::Remote),
            "hybrid" => Ok(WorkLocation::Hybrid),
            "onsite" | "inoffice" => Ok(WorkLocation::OnSite),
            _ => Err(invalid("work_location", s)),
        }
    }
}

impl FromStr for ExperienceLevel {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        match facet_key(s).as_str() {
            "entry" | "entrylevel" | "junior" | "jr" | "graduate" => Ok(ExperienceLevel::Entry),
            "mid" | "midlevel" | "intermediate" => Ok(ExperienceLevel::Mid),
            "senior" | "sr" => Ok(ExperienceLevel::Senior),
            "lead" | "staff" | "principal" => Ok(ExperienceLevel::Lead),
            "executive" | "director" | "vp" | "head" => Ok(ExperienceLevel::Executive),
            _ => Err(invalid("experience_level", s)),
        }
    }
}

impl FromStr for DatePosted {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        match facet_key(s).as_str() {
            "any" | "anytime" => Ok(DatePosted::Any),
            "pastday" | "day" | "24h" => Ok(DatePosted::PastDay),
            "pastweek" | "week" | "7d" => Ok(DatePosted::PastWeek),
            "pastmonth" | "month" | "30d" => Ok(DatePosted::PastMonth),
            _ => Err(invalid("date_posted", s)),
        }
    }
}

impl fmt::Display for EmploymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EmploymentType::FullTime => "full-time",
            EmploymentType::PartTime => "part-time",
            EmploymentType::Contract => "contract",
            EmploymentType::Internship => "internship",
            EmploymentType::Temporary => "temporary",
        };
        f.write_str(label)
    }
}

impl fmt::Display for WorkLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            WorkLocation::Remote => "remote",
            WorkLocation::Hybrid => "hybrid",
            WorkLocation::OnSite => "on-site",
        };
        f.write_str(label)
    }
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ExperienceLevel::Entry => "entry",
            ExperienceLevel::Mid => "mid",
            ExperienceLevel::Senior => "senior",
            ExperienceLevel::Lead => "lead",
            ExperienceLevel::Executive => "executive",
        };
        f.write_str(label)
    }
}

// =============================================================================
// Listing Types
// =============================================================================

/// Pay period of a compensation range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayPeriod {
    Hourly,
    Monthly,
    #[default]
    Yearly,
}

/// Advertised compensation range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Compensation {
    pub min: Option<u32>,
    pub max: Option<u32>,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub period: PayPeriod,
}

fn default_currency() -> String {
    "USD".to_string()
}

/// Per-dimension explanation of a personalized match score
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MatchBreakdown {
    pub skills_score: f32,
    pub experience_score: f32,
    pub location_score: f32,
    #[serde(default)]
    pub matched_skills: Vec<String>,
    #[serde(default)]
    pub missing_skills: Vec<String>,
}

/// A job listing as fetched from a source.
///
/// Listings are immutable snapshots: a re-fetch replaces a listing as a
/// whole, nothing in the engine edits one in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobListing {
    pub id: ListingId,
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub compensation: Option<Compensation>,
    #[serde(default)]
    pub employment_type: Option<EmploymentType>,
    #[serde(default)]
    pub experience_level: Option<ExperienceLevel>,
    #[serde(default)]
    pub work_location: Option<WorkLocation>,
    #[serde(default)]
    pub industries: Vec<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub description: String,
    /// Unix timestamp (seconds) when the listing was posted
    pub posted_at: i64,
    /// Only present in personalized mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_score: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_breakdown: Option<MatchBreakdown>,
}

impl JobListing {
    /// Minimal listing, mostly useful for fixtures and tests
    pub fn new(
        id: impl Into<ListingId>,
        title: impl Into<String>,
        company: impl Into<String>,
        posted_at: i64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            company: company.into(),
            location: String::new(),
            compensation: None,
            employment_type: None,
            experience_level: None,
            work_location: None,
            industries: Vec::new(),
            technologies: Vec::new(),
            skills: Vec::new(),
            description: String::new(),
            posted_at,
            match_score: None,
            match_breakdown: None,
        }
    }

    /// Same listing annotated with a match score, as the matcher returns it
    pub fn with_match(mut self, score: f32, breakdown: MatchBreakdown) -> Self {
        self.match_score = Some(score);
        self.match_breakdown = Some(breakdown);
        self
    }

    /// Lowercased text that keyword search runs against
    pub fn searchable_text(&self) -> String {
        let mut text = String::with_capacity(
            self.title.len() + self.company.len() + self.description.len() + 64,
        );
        for part in [&self.title, &self.company, &self.location, &self.description] {
            text.push_str(&part.to_lowercase());
            text.push(' ');
        }
        for tag in self.technologies.iter().chain(&self.skills).chain(&self.industries) {
            text.push_str(&tag.to_lowercase());
            text.push(' ');
        }
        text
    }
}

// =============================================================================
// CatalogIndex - In-Memory Listing Catalog
// =============================================================================

/// Holds every known listing plus the orderings the in-memory sources need.
#[derive(Debug, Default)]
pub struct CatalogIndex {
    pub(crate) listings: HashMap<ListingId, JobListing>,

    /// Listing ids, newest first (ties broken by id)
    pub(crate) by_recency: Vec<ListingId>,

    /// Lowercased technology → listing ids
    pub(crate) technology_index: HashMap<String, Vec<ListingId>>,
}

impl CatalogIndex {
    /// Creates a new, empty CatalogIndex
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a listing by id
    pub fn get_listing(&self, id: &str) -> Option<&JobListing> {
        self.listings.get(id)
    }

    /// Listing ids, newest first
    pub fn recency_order(&self) -> &[ListingId] {
        &self.by_recency
    }

    /// Listings in recency order (cloned snapshots)
    pub fn listings_by_recency(&self) -> Vec<JobListing> {
        self.by_recency
            .iter()
            .filter_map(|id| self.listings.get(id))
            .cloned()
            .collect()
    }

    /// Ids of listings that mention a technology (case-insensitive)
    pub fn listings_with_technology(&self, technology: &str) -> &[ListingId] {
        self.technology_index
            .get(&technology.to_lowercase())
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Number of listings in the catalog
    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    /// Insert a listing; rejects a second listing with the same id.
    ///
    /// Secondary indices are rebuilt by `rebuild_indices` once loading is done.
    pub fn insert_listing(&mut self, listing: JobListing) -> Result<()> {
        if self.listings.contains_key(&listing.id) {
            return Err(CatalogError::DuplicateListing { id: listing.id });
        }
        self.listings.insert(listing.id.clone(), listing);
        Ok(())
    }
}
