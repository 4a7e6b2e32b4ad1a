//! Recent searches and type-ahead suggestions.

use query::FilterState;
use serde::{Deserialize, Serialize};
use sources::unix_now;
use std::collections::{HashSet, VecDeque};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentSearchEntry {
    pub query: String,
    /// Facet selections active when the search ran
    pub filters: FilterState,
    pub timestamp: i64,
}

/// Bounded most-recent-first list of submitted searches.
///
/// Queries are deduplicated case-insensitively: re-adding one moves it to
/// the front instead of growing the list. Once full, adding evicts the
/// oldest entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentSearches {
    capacity: usize,
    entries: VecDeque<RecentSearchEntry>,
}

impl RecentSearches {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: VecDeque::new(),
        }
    }

    /// Record a search. Blank queries are ignored and return `false`.
    pub fn add(&mut self, query: &str, filters: &FilterState) -> bool {
        let query = query.trim();
        if query.is_empty() {
            return false;
        }
        self.remove(query);
        self.entries.push_front(RecentSearchEntry {
            query: query.to_string(),
            filters: filters.clone(),
            timestamp: unix_now(),
        });
        self.entries.truncate(self.capacity);
        true
    }

    /// Remove a query (case-insensitive); `true` if it was present
    pub fn remove(&mut self, query: &str) -> bool {
        let key = query.trim().to_lowercase();
        let before = self.entries.len();
        self.entries.retain(|e| e.query.to_lowercase() != key);
        self.entries.len() != before
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> impl Iterator<Item = &RecentSearchEntry> {
        self.entries.iter()
    }

    pub fn queries(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.query.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Type-ahead for `prefix`: recent queries first, then vocabulary terms.
    ///
    /// Matching is a case-insensitive prefix match. A blank prefix yields
    /// the recent queries only.
    pub fn suggestions<'a>(
        &self,
        prefix: &str,
        vocabulary: impl IntoIterator<Item = &'a str>,
        limit: usize,
    ) -> Vec<String> {
        let prefix = prefix.trim().to_lowercase();
        let mut seen = HashSet::new();
        let mut out = Vec::new();

        for entry in &self.entries {
            let key = entry.query.to_lowercase();
            if key.starts_with(&prefix) && seen.insert(key) {
                out.push(entry.query.clone());
            }
        }
        if !prefix.is_empty() {
            for term in vocabulary {
                let key = term.to_lowercase();
                if key.starts_with(&prefix) && seen.insert(key) {
                    out.push(term.to_string());
                }
            }
        }
        out.truncate(limit);
        out
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Restore a cache saved with `to_json`
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let mut recent: RecentSearches = serde_json::from_str(json)?;
        recent.capacity = recent.capacity.max(1);
        recent.entries.truncate(recent.capacity);
        Ok(recent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(queries: &[&str]) -> RecentSearches {
        let mut recent = RecentSearches::new(5);
        for q in queries {
            recent.add(q, &FilterState::default());
        }
        recent
    }

    #[test]
    fn test_readd_moves_to_front_without_growing() {
        let mut recent = filled(&["rust", "go", "python"]);
        assert!(recent.add("RUST", &FilterState::default()));
        assert_eq!(recent.len(), 3);
        assert_eq!(recent.queries(), vec!["RUST", "python", "go"]);
    }

    #[test]
    fn test_overflow_evicts_oldest() {
        let recent = filled(&["a", "b", "c", "d", "e", "f"]);
        assert_eq!(recent.len(), 5);
        assert_eq!(recent.queries(), vec!["f", "e", "d", "c", "b"]);
    }

    #[test]
    fn test_blank_ignored_and_remove() {
        let mut recent = filled(&["rust"]);
        assert!(!recent.add("   ", &FilterState::default()));
        assert_eq!(recent.len(), 1);

        assert!(recent.remove("Rust"));
        assert!(!recent.remove("rust"));
        assert!(recent.is_empty());

        let mut recent = filled(&["a", "b"]);
        recent.clear();
        assert!(recent.is_empty());
    }

    #[test]
    fn test_entry_keeps_filter_snapshot() {
        let mut recent = RecentSearches::new(5);
        let filters = FilterState::new().with_technology("kafka");
        recent.add("data engineer", &filters);
        let entry = recent.entries().next().unwrap();
        assert_eq!(entry.filters, filters);
        assert!(entry.timestamp > 0);
    }

    #[test]
    fn test_suggestions_recent_then_vocabulary() {
        let recent = filled(&["python developer", "rust remote", "react"]);
        let suggestions = recent.suggestions("r", ["rust", "react", "ruby"], 10);
        assert_eq!(suggestions, vec!["react", "rust remote", "rust", "ruby"]);

        assert_eq!(recent.suggestions("r", ["rust", "ruby"], 2).len(), 2);
        assert_eq!(recent.suggestions("", ["rust"], 10).len(), 3);
    }

    #[test]
    fn test_json_restore() {
        let recent = filled(&["rust", "go"]);
        let json = recent.to_json().unwrap();
        assert_eq!(RecentSearches::from_json(&json).unwrap(), recent);
        assert!(RecentSearches::from_json("not json").is_err());
    }
}
