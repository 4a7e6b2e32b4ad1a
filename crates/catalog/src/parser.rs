//! Parser for listing catalog files.
//!
//! Two layouts are accepted:
//! - a JSON array of listings (`[{...}, {...}]`)
//! - JSON lines, one listing object per line (blank lines and `#` comments skipped)
//!
//! Every parsed listing is validated before it is handed to the index.

use crate::error::{CatalogError, Result};
use crate::types::JobListing;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Parse a catalog file from disk
pub fn parse_listings_file(path: &Path) -> Result<Vec<JobListing>> {
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => CatalogError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => CatalogError::IoError(e),
    })?;
    parse_listings_str(&content, &path.display().to_string())
}

/// Parse catalog content; `file` is only used in error messages
pub fn parse_listings_str(content: &str, file: &str) -> Result<Vec<JobListing>> {
    let listings = if content.trim_start().starts_with('[') {
        serde_json::from_str::<Vec<JobListing>>(content).map_err(|e| CatalogError::ParseError {
            file: file.to_string(),
            line: e.line(),
            reason: e.to_string(),
        })?
    } else {
        parse_json_lines(content, file)?
    };

    for listing in &listings {
        validate_listing(listing)?;
    }
    Ok(listings)
}

fn parse_json_lines(content: &str, file: &str) -> Result<Vec<JobListing>> {
    let mut listings = Vec::new();
    for (line_num, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let listing: JobListing =
            serde_json::from_str(trimmed).map_err(|e| CatalogError::ParseError {
                file: file.to_string(),
                line: line_num + 1,
                reason: e.to_string(),
            })?;
        listings.push(listing);
    }
    Ok(listings)
}

/// Reject listings the engine cannot key or order
pub fn validate_listing(listing: &JobListing) -> Result<()> {
    if listing.id.trim().is_empty() {
        return Err(CatalogError::ValidationError(format!(
            "listing '{}' has an empty id",
            listing.title
        )));
    }
    if listing.title.trim().is_empty() {
        return Err(CatalogError::ValidationError(format!(
            "listing {} has an empty title",
            listing.id
        )));
    }
    if let Some(comp) = &listing.compensation
        && let (Some(min), Some(max)) = (comp.min, comp.max)
        && min > max
    {
        return Err(CatalogError::ValidationError(format!(
            "listing {} has compensation min {} above max {}",
            listing.id, min, max
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EmploymentType, WorkLocation};

    #[test]
    fn test_parse_json_array() {
        let content = r#"[
            {"id": "j1", "title": "Rust Engineer", "company": "Ferrous", "posted_at": 100,
             "employment_type": "full_time", "work_location": "remote",
             "technologies": ["Rust", "Tokio"]},
            {"id": "j2", "title": "Data Analyst", "company": "Numbers", "posted_at": 200}
        ]"#;

        let listings = parse_listings_str(content, "inline").unwrap();
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].employment_type, Some(EmploymentType::FullTime));
        assert_eq!(listings[0].work_location, Some(WorkLocation::Remote));
        assert_eq!(listings[0].technologies, vec!["Rust", "Tokio"]);
        assert!(listings[1].technologies.is_empty());
    }

    #[test]
    fn test_parse_json_lines_skips_comments() {
        let content = "# catalog\n\
            {\"id\": \"j1\", \"title\": \"A\", \"company\": \"X\", \"posted_at\": 1}\n\
            \n\
            {\"id\": \"j2\", \"title\": \"B\", \"company\": \"Y\", \"posted_at\": 2}\n";

        let listings = parse_listings_str(content, "inline").unwrap();
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[1].id, "j2");
    }

    #[test]
    fn test_parse_error_reports_line() {
        let content = "{\"id\": \"j1\", \"title\": \"A\", \"company\": \"X\", \"posted_at\": 1}\nnot json\n";

        match parse_listings_str(content, "inline") {
            Err(CatalogError::ParseError { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_validation_rejects_empty_id() {
        let content = r#"[{"id": " ", "title": "A", "company": "X", "posted_at": 1}]"#;
        assert!(matches!(
            parse_listings_str(content, "inline"),
            Err(CatalogError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validation_rejects_inverted_compensation() {
        let content = r#"[{"id": "j1", "title": "A", "company": "X", "posted_at": 1,
                          "compensation": {"min": 200000, "max": 100000}}]"#;
        assert!(parse_listings_str(content, "inline").is_err());
    }

    #[test]
    fn test_missing_file() {
        let result = parse_listings_file(Path::new("does/not/exist.json"));
        assert!(matches!(result, Err(CatalogError::FileNotFound { .. })));
    }
}
