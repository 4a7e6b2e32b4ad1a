//! Keyword matching against a listing's searchable text.

use crate::effective::EffectiveQuery;
use crate::traits::ListingFilter;
use anyhow::Result;
use catalog::JobListing;
use rayon::prelude::*;

/// Keeps listings whose text contains every word of every keyword.
///
/// ## Algorithm
/// 1. Split each keyword on whitespace ("barista with latte art" is 4 words)
/// 2. Lowercase the listing's title, company, location, description and tags
/// 3. Keep the listing only if every word is a substring of that text
///
/// With no keywords every listing passes.
pub struct KeywordFilter;

fn keyword_words(query: &EffectiveQuery) -> Vec<String> {
    query
        .keywords
        .iter()
        .flat_map(|k| k.split_whitespace())
        .map(|w| w.to_lowercase())
        .collect()
}

impl ListingFilter for KeywordFilter {
    fn name(&self) -> &str {
        "KeywordFilter"
    }

    fn apply(&self, listings: Vec<JobListing>, query: &EffectiveQuery) -> Result<Vec<JobListing>> {
        let words = keyword_words(query);
        if words.is_empty() {
            return Ok(listings);
        }
        let filtered: Vec<JobListing> = listings
            .into_par_iter()
            .filter(|listing| {
                let text = listing.searchable_text();
                words.iter().all(|w| text.contains(w.as_str()))
            })
            .collect();
        Ok(filtered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listings() -> Vec<JobListing> {
        let mut a = JobListing::new("a", "Senior Backend Engineer", "Ferrous", 1);
        a.technologies = vec!["Rust".to_string()];
        let b = JobListing::new("b", "Frontend Engineer", "Pixel", 2);
        let mut c = JobListing::new("c", "Data Analyst", "Numbers", 3);
        c.description = "SQL and dashboards for the backend team".to_string();
        vec![a, b, c]
    }

    #[test]
    fn test_keyword_filter_all_words_must_match() {
        let query = EffectiveQuery {
            keywords: vec!["backend".to_string(), "engineer".to_string()],
            ..Default::default()
        };
        let filtered = KeywordFilter.apply(listings(), &query).unwrap();

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "a");
    }

    #[test]
    fn test_keyword_filter_searches_description_and_tags() {
        let query = EffectiveQuery {
            keywords: vec!["BACKEND".to_string()],
            ..Default::default()
        };
        let filtered = KeywordFilter.apply(listings(), &query).unwrap();
        let ids: Vec<_> = filtered.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);

        let query = EffectiveQuery {
            keywords: vec!["rust".to_string()],
            ..Default::default()
        };
        assert_eq!(KeywordFilter.apply(listings(), &query).unwrap().len(), 1);
    }

    #[test]
    fn test_no_keywords_keeps_everything() {
        let filtered = KeywordFilter
            .apply(listings(), &EffectiveQuery::default())
            .unwrap();
        assert_eq!(filtered.len(), 3);
    }
}
