//! Structured facet matching.

use crate::effective::EffectiveQuery;
use crate::traits::ListingFilter;
use anyhow::Result;
use catalog::JobListing;
use rayon::prelude::*;
use std::collections::BTreeSet;

/// Keeps listings that satisfy every active facet of the query.
///
/// Within one facet the selected values are alternatives (any-of); across
/// facets all must hold. A listing with no value for an active
/// single-valued facet (e.g. unknown employment type) is dropped.
pub struct FacetFilter;

fn single_matches<T: Ord>(selected: &BTreeSet<T>, value: Option<&T>) -> bool {
    selected.is_empty() || value.is_some_and(|v| selected.contains(v))
}

fn tags_match(selected: &BTreeSet<String>, tags: &[&String]) -> bool {
    selected.is_empty()
        || tags
            .iter()
            .any(|tag| selected.contains(&tag.trim().to_lowercase()))
}

/// Whether one listing satisfies the query's facets
pub fn listing_matches_facets(listing: &JobListing, query: &EffectiveQuery) -> bool {
    if !single_matches(&query.employment_types, listing.employment_type.as_ref())
        || !single_matches(&query.work_locations, listing.work_location.as_ref())
        || !single_matches(&query.experience_levels, listing.experience_level.as_ref())
    {
        return false;
    }

    let industries: Vec<&String> = listing.industries.iter().collect();
    if !tags_match(&query.industries, &industries) {
        return false;
    }

    // A technology picked in the UI may be listed as a skill and vice versa
    let tags: Vec<&String> = listing.technologies.iter().chain(&listing.skills).collect();
    if !tags_match(&query.technologies, &tags) || !tags_match(&query.skills, &tags) {
        return false;
    }

    if !query.locations.is_empty() {
        let location = listing.location.to_lowercase();
        if !query.locations.iter().any(|l| location.contains(l.as_str())) {
            return false;
        }
    }
    true
}

impl ListingFilter for FacetFilter {
    fn name(&self) -> &str {
        "FacetFilter"
    }

    fn apply(&self, listings: Vec<JobListing>, query: &EffectiveQuery) -> Result<Vec<JobListing>> {
        if !query.has_facets() {
            return Ok(listings);
        }
        let filtered: Vec<JobListing> = listings
            .into_par_iter()
            .filter(|listing| listing_matches_facets(listing, query))
            .collect();
        Ok(filtered)
    }
}
