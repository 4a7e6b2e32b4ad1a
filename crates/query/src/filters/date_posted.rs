//! Filter on how recently a listing was posted.

use crate::effective::EffectiveQuery;
use crate::traits::ListingFilter;
use anyhow::Result;
use catalog::JobListing;

/// Drops listings older than the query's `date_posted` window.
///
/// `now` is fixed at construction so a pipeline run is deterministic.
pub struct DatePostedFilter {
    now: i64,
}

impl DatePostedFilter {
    /// # Arguments
    /// * `now` - Reference time as a unix timestamp (seconds)
    pub fn new(now: i64) -> Self {
        Self { now }
    }
}

impl ListingFilter for DatePostedFilter {
    fn name(&self) -> &str {
        "DatePostedFilter"
    }

    fn apply(&self, listings: Vec<JobListing>, query: &EffectiveQuery) -> Result<Vec<JobListing>> {
        let window = query.date_posted;
        Ok(listings
            .into_iter()
            .filter(|listing| window.admits(listing.posted_at, self.now))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::{DatePosted, SECONDS_PER_DAY};

    #[test]
    fn test_date_posted_filter() {
        let now = 100 * SECONDS_PER_DAY;
        let listings = vec![
            JobListing::new("today", "A", "X", now - 3600),
            JobListing::new("last-week", "B", "X", now - 5 * SECONDS_PER_DAY),
            JobListing::new("ancient", "C", "X", now - 90 * SECONDS_PER_DAY),
        ];

        let query = EffectiveQuery {
            date_posted: DatePosted::PastWeek,
            ..Default::default()
        };
        let filtered = DatePostedFilter::new(now).apply(listings.clone(), &query).unwrap();
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[1].id, "last-week");

        let any = DatePostedFilter::new(now)
            .apply(listings, &EffectiveQuery::default())
            .unwrap();
        assert_eq!(any.len(), 3);
    }
}
