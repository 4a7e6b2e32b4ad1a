//! Catalog Matches - in-memory stand-in for the personalized-matches service
//!
//! Scores every catalog listing against a candidate profile.
//!
//! ## Algorithm
//! 1. Look up the user's profile; no profile or no skills means the user
//!    cannot be matched yet (`ProfileIncomplete`)
//! 2. For each listing, compare its skill/technology tags with the profile
//! 3. Blend three component scores:
//!    - skills: share of the listing's tags the candidate has (weight 0.6)
//!    - experience: distance between seniority levels (weight 0.25)
//!    - location: preferred work arrangement (weight 0.15)
//! 4. Drop listings without any skill overlap, sort by score, limit

use crate::error::SourceError;
use crate::traits::MatchesService;
use crate::types::{CandidateProfile, MatchesOutcome};
use async_trait::async_trait;
use catalog::{CatalogIndex, ExperienceLevel, JobListing, MatchBreakdown, UserId, WorkLocation};
use query::normalize_tag;
use rayon::prelude::*;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, instrument};

const SKILLS_WEIGHT: f32 = 0.6;
const EXPERIENCE_WEIGHT: f32 = 0.25;
const LOCATION_WEIGHT: f32 = 0.15;

/// Matches service backed by the local catalog and a set of known profiles
#[derive(Clone)]
pub struct CatalogMatches {
    catalog: Arc<CatalogIndex>,
    profiles: HashMap<UserId, CandidateProfile>,
    /// Maximum number of matches returned (default: 50)
    limit: usize,
}

impl CatalogMatches {
    pub fn new(catalog: Arc<CatalogIndex>) -> Self {
        Self {
            catalog,
            profiles: HashMap::new(),
            limit: 50,
        }
    }

    /// Register the profile the matcher uses for `user_id`
    pub fn with_profile(mut self, user_id: impl Into<UserId>, profile: CandidateProfile) -> Self {
        self.profiles.insert(user_id.into(), profile);
        self
    }

    /// Configure the maximum number of matches (default: 50)
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Score one listing against a profile; `None` when no skill overlaps
    fn score_listing(
        profile_skills: &BTreeSet<String>,
        profile: &CandidateProfile,
        listing: &JobListing,
    ) -> Option<(f32, MatchBreakdown)> {
        let wanted: BTreeSet<String> = listing
            .skills
            .iter()
            .chain(listing.technologies.iter())
            .filter_map(|t| normalize_tag(t))
            .collect();
        if wanted.is_empty() {
            return None;
        }

        let (matched, missing): (Vec<String>, Vec<String>) =
            wanted.into_iter().partition(|t| profile_skills.contains(t));
        if matched.is_empty() {
            return None;
        }

        let skills_score = matched.len() as f32 / (matched.len() + missing.len()) as f32;
        let experience_score = experience_score(profile.experience_level, listing.experience_level);
        let location_score = location_score(profile.preferred_work_location, listing.work_location);
        let score = SKILLS_WEIGHT * skills_score
            + EXPERIENCE_WEIGHT * experience_score
            + LOCATION_WEIGHT * location_score;

        Some((
            score,
            MatchBreakdown {
                skills_score,
                experience_score,
                location_score,
                matched_skills: matched,
                missing_skills: missing,
            },
        ))
    }
}

fn level_rank(level: ExperienceLevel) -> i32 {
    match level {
        ExperienceLevel::Entry => 0,
        ExperienceLevel::Mid => 1,
        ExperienceLevel::Senior => 2,
        ExperienceLevel::Lead => 3,
        ExperienceLevel::Executive => 4,
    }
}

fn experience_score(candidate: Option<ExperienceLevel>, listing: Option<ExperienceLevel>) -> f32 {
    match (candidate, listing) {
        (Some(c), Some(l)) => {
            let distance = (level_rank(c) - level_rank(l)).abs() as f32;
            (1.0 - distance / 4.0).max(0.0)
        }
        // Unknown on either side: neutral
        _ => 0.5,
    }
}

fn location_score(preferred: Option<WorkLocation>, listing: Option<WorkLocation>) -> f32 {
    match (preferred, listing) {
        (Some(p), Some(l)) if p == l => 1.0,
        (Some(WorkLocation::Remote), Some(WorkLocation::Hybrid))
        | (Some(WorkLocation::Hybrid), Some(WorkLocation::Remote)) => 0.5,
        (Some(_), Some(_)) => 0.0,
        _ => 0.5,
    }
}

#[async_trait]
impl MatchesService for CatalogMatches {
    #[instrument(skip(self))]
    async fn get_matches(&self, user_id: &str) -> Result<MatchesOutcome, SourceError> {
        let profile = match self.profiles.get(user_id) {
            Some(profile) if profile.is_complete() => profile,
            _ => {
                debug!("No complete profile for user {}", user_id);
                return Ok(MatchesOutcome::ProfileIncomplete);
            }
        };

        let profile_skills: BTreeSet<String> =
            profile.skills.iter().filter_map(|s| normalize_tag(s)).collect();

        let mut scored: Vec<(f32, JobListing)> = self
            .catalog
            .listings_by_recency()
            .into_par_iter()
            .filter_map(|listing| {
                Self::score_listing(&profile_skills, profile, &listing)
                    .map(|(score, breakdown)| (score, listing.with_match(score, breakdown)))
            })
            .collect();

        // Stable sort keeps newest-first among equal scores
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored.truncate(self.limit);

        debug!("Matched {} listings for user {}", scored.len(), user_id);
        Ok(MatchesOutcome::Matches(
            scored.into_iter().map(|(_, listing)| listing).collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_catalog() -> Arc<CatalogIndex> {
        let mut rust = JobListing::new("rust", "Rust Engineer", "Ferrous", 300);
        rust.skills = vec!["Rust".to_string(), "SQL".to_string()];
        rust.experience_level = Some(ExperienceLevel::Senior);
        rust.work_location = Some(WorkLocation::Remote);

        let mut go = JobListing::new("go", "Go Engineer", "Gopher", 200);
        go.technologies = vec!["go".to_string(), "sql".to_string()];
        go.experience_level = Some(ExperienceLevel::Entry);
        go.work_location = Some(WorkLocation::OnSite);

        let mut chef = JobListing::new("chef", "Line Cook", "Bistro", 100);
        chef.skills = vec!["cooking".to_string()];

        Arc::new(CatalogIndex::from_listings(vec![rust, go, chef]).unwrap())
    }

    fn profile() -> CandidateProfile {
        CandidateProfile {
            skills: ["rust", "sql"].iter().map(|s| s.to_string()).collect(),
            experience_level: Some(ExperienceLevel::Senior),
            preferred_work_location: Some(WorkLocation::Remote),
        }
    }

    #[tokio::test]
    async fn test_missing_or_empty_profile_is_incomplete() {
        let matcher = CatalogMatches::new(create_test_catalog())
            .with_profile("empty", CandidateProfile::default());

        assert_eq!(matcher.get_matches("nobody").await.unwrap(), MatchesOutcome::ProfileIncomplete);
        assert_eq!(matcher.get_matches("empty").await.unwrap(), MatchesOutcome::ProfileIncomplete);
    }

    #[tokio::test]
    async fn test_matches_ranked_with_breakdown() {
        let matcher = CatalogMatches::new(create_test_catalog()).with_profile("u1", profile());

        let MatchesOutcome::Matches(listings) = matcher.get_matches("u1").await.unwrap() else {
            panic!("expected matches");
        };
        let ids: Vec<_> = listings.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["rust", "go"]);

        let top = &listings[0];
        assert!((top.match_score.unwrap() - 1.0).abs() < 1e-6);
        let breakdown = top.match_breakdown.as_ref().unwrap();
        assert_eq!(breakdown.matched_skills, vec!["rust", "sql"]);
        assert!(breakdown.missing_skills.is_empty());

        let go = listings[1].match_breakdown.as_ref().unwrap();
        assert_eq!(go.missing_skills, vec!["go"]);
    }

    #[tokio::test]
    async fn test_limit() {
        let matcher = CatalogMatches::new(create_test_catalog())
            .with_profile("u1", profile())
            .with_limit(1);
        let MatchesOutcome::Matches(listings) = matcher.get_matches("u1").await.unwrap() else {
            panic!("expected matches");
        };
        assert_eq!(listings.len(), 1);
    }
}
