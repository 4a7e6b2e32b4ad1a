//! Offset cursors used by the in-memory collaborators.
//!
//! Callers must treat the token as opaque; only this module knows it is an
//! offset.

use crate::error::SourceError;
use crate::types::SearchPage;
use catalog::JobListing;

const PREFIX: &str = "off:";

pub(crate) fn encode_offset(offset: usize) -> String {
    format!("{}{}", PREFIX, offset)
}

pub(crate) fn decode_offset(cursor: Option<&str>) -> Result<usize, SourceError> {
    match cursor {
        None => Ok(0),
        Some(token) => token
            .strip_prefix(PREFIX)
            .and_then(|n| n.parse::<usize>().ok())
            .ok_or_else(|| SourceError::InvalidCursor(token.to_string())),
    }
}

/// Cut one page out of an ordered result set.
///
/// The next cursor is only handed out when something follows this page.
pub(crate) fn paginate(
    ordered: Vec<JobListing>,
    cursor: Option<&str>,
    page_size: usize,
) -> Result<SearchPage, SourceError> {
    if page_size == 0 {
        return Err(SourceError::Rejected("page size must be positive".to_string()));
    }
    let offset = decode_offset(cursor)?;
    let total = ordered.len();
    let end = offset.saturating_add(page_size).min(total);
    let listings: Vec<JobListing> = ordered
        .into_iter()
        .skip(offset)
        .take(page_size)
        .collect();
    let next_cursor = (end < total).then(|| encode_offset(end));
    Ok(SearchPage::new(listings, next_cursor))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listings(n: usize) -> Vec<JobListing> {
        (0..n)
            .map(|i| JobListing::new(format!("j{}", i), "Job", "Acme", i as i64))
            .collect()
    }

    #[test]
    fn test_paginate_hands_out_cursor_until_end() {
        let first = paginate(listings(5), None, 2).unwrap();
        assert_eq!(first.listings.len(), 2);
        let cursor = first.next_cursor.unwrap();

        let second = paginate(listings(5), Some(&cursor), 2).unwrap();
        assert_eq!(second.listings[0].id, "j2");

        let third = paginate(listings(5), second.next_cursor.as_deref(), 2).unwrap();
        assert_eq!(third.listings.len(), 1);
        assert!(third.next_cursor.is_none());
    }

    #[test]
    fn test_exact_fit_has_no_next_cursor() {
        let page = paginate(listings(4), None, 4).unwrap();
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn test_invalid_cursor() {
        assert!(matches!(
            paginate(listings(3), Some("garbage"), 2),
            Err(SourceError::InvalidCursor(_))
        ));
        assert!(paginate(listings(3), None, 0).is_err());
    }
}
