//! Best-effort parser from free-text search input to structured hints.
//!
//! ## Algorithm
//! 1. Lowercase the input and split it on whitespace, commas and semicolons
//! 2. Walk the tokens, trying the longest phrase first (up to 3 words):
//!    work location, employment type, experience level, technology, location
//! 3. Connector words ("in", "for", "jobs", ...) are dropped; an unknown
//!    word right after "in"/"at"/"near" is taken as a location
//! 4. Whatever is left becomes role keywords
//!
//! The parser never fails. If nothing structured is found, or the input
//! carries two conflicting hints for one single-valued facet (e.g.
//! "remote on-site"), the trimmed original text comes back as one generic
//! keyword and every structured field stays empty.

use catalog::{EmploymentType, ExperienceLevel, WorkLocation};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use tracing::debug;

const MAX_PHRASE_WORDS: usize = 3;

const CONNECTORS: &[&str] = &[
    "a", "an", "and", "or", "the", "in", "at", "near", "for", "with", "of", "job", "jobs", "role",
    "roles", "position", "positions", "opening", "openings",
];

const LOCATION_PREPOSITIONS: &[&str] = &["in", "at", "near"];

const DEFAULT_TECHNOLOGIES: &[&str] = &[
    "rust", "go", "golang", "python", "java", "javascript", "typescript", "react", "node",
    "node.js", "c", "c++", "c#", ".net", "kotlin", "swift", "ruby", "rails", "php", "scala",
    "elixir", "haskell", "sql", "postgres", "postgresql", "mysql", "mongodb", "redis", "kafka",
    "aws", "gcp", "azure", "docker", "kubernetes", "terraform", "graphql", "django", "flask",
    "spring", "vue", "angular", "svelte", "tokio", "pytorch", "tensorflow", "spark", "linux",
    "machine learning", "deep learning", "react native",
];

const DEFAULT_LOCATIONS: &[&str] = &[
    "new york", "san francisco", "los angeles", "seattle", "austin", "boston", "chicago",
    "denver", "toronto", "vancouver", "london", "berlin", "paris", "amsterdam", "dublin",
    "lisbon", "madrid", "stockholm", "zurich", "singapore", "tokyo", "sydney", "bangalore",
    "usa", "uk", "canada", "germany", "india", "europe",
];

/// Phrases that only make sense as work-location hints
const WORK_LOCATION_PHRASES: &[(&str, WorkLocation)] = &[
    ("work from home", WorkLocation::Remote),
    ("in office", WorkLocation::OnSite),
    ("in-office", WorkLocation::OnSite),
];

/// Structured hints extracted from free text
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ParsedQuery {
    /// Role keywords (or the whole input as one keyword on fallback)
    pub keywords: Vec<String>,
    pub locations: BTreeSet<String>,
    pub technologies: BTreeSet<String>,
    pub work_location: Option<WorkLocation>,
    pub employment_type: Option<EmploymentType>,
    pub experience_level: Option<ExperienceLevel>,
}

impl ParsedQuery {
    /// Whole text treated as one generic keyword
    pub fn keyword_only(text: &str) -> Self {
        let trimmed = text.trim();
        let mut parsed = Self::default();
        if !trimmed.is_empty() {
            parsed.keywords.push(trimmed.to_string());
        }
        parsed
    }

    /// Whether any structured field was recognized
    pub fn has_structure(&self) -> bool {
        !self.locations.is_empty()
            || !self.technologies.is_empty()
            || self.work_location.is_some()
            || self.employment_type.is_some()
            || self.experience_level.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty() && !self.has_structure()
    }
}

/// Recognizes facet hints in free text using configurable vocabularies.
#[derive(Debug, Clone)]
pub struct QueryParser {
    technologies: HashSet<String>,
    locations: HashSet<String>,
}

/// A single-valued slot; a second, different hint marks the input ambiguous
fn set_hint<T: PartialEq + Copy>(slot: &mut Option<T>, value: T) -> bool {
    match slot {
        Some(existing) if *existing != value => false,
        _ => {
            *slot = Some(value);
            true
        }
    }
}

/// Strip punctuation a user might type around a word ("rust," "(remote)")
fn clean_token(raw: &str) -> &str {
    raw.trim_matches(|c: char| matches!(c, '(' | ')' | '"' | '\'' | '!' | '?' | ':'))
        .trim_end_matches('.')
}

enum Hint {
    Work(WorkLocation),
    Employment(EmploymentType),
    Experience(ExperienceLevel),
    Technology(String),
    Location(String),
}

impl QueryParser {
    /// Parser with the built-in technology and location vocabularies
    pub fn new() -> Self {
        Self {
            technologies: DEFAULT_TECHNOLOGIES.iter().map(|s| s.to_string()).collect(),
            locations: DEFAULT_LOCATIONS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Add technology terms to the vocabulary (builder pattern)
    pub fn with_technologies<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.technologies
            .extend(terms.into_iter().map(|t| t.as_ref().trim().to_lowercase()));
        self
    }

    /// Add location terms to the vocabulary (builder pattern)
    pub fn with_locations<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.locations
            .extend(terms.into_iter().map(|t| t.as_ref().trim().to_lowercase()));
        self
    }

    /// Vocabulary terms, sorted, used for autocomplete suggestions
    pub fn vocabulary(&self) -> Vec<&str> {
        let mut terms: Vec<&str> = self
            .technologies
            .iter()
            .chain(self.locations.iter())
            .map(|s| s.as_str())
            .collect();
        terms.sort_unstable();
        terms.dedup();
        terms
    }

    /// Parse free text into hints. Never fails.
    pub fn parse(&self, text: &str) -> ParsedQuery {
        let lowered = text.to_lowercase();
        let tokens: Vec<&str> = lowered
            .split(|c: char| c.is_whitespace() || c == ',' || c == ';')
            .filter(|t| !t.is_empty())
            .map(|raw| {
                // Vocabulary terms like ".net" or "c++" keep their punctuation
                if self.technologies.contains(raw) {
                    raw
                } else {
                    clean_token(raw)
                }
            })
            .filter(|t| !t.is_empty())
            .collect();

        if tokens.is_empty() {
            return ParsedQuery::default();
        }

        let mut parsed = ParsedQuery::default();
        let mut keywords: Vec<String> = Vec::new();
        let mut after_preposition = false;
        let mut i = 0;

        while i < tokens.len() {
            let max_len = MAX_PHRASE_WORDS.min(tokens.len() - i);
            let mut matched = None;
            for len in (1..=max_len).rev() {
                let phrase = tokens[i..i + len].join(" ");
                if let Some(hint) = self.recognize(&phrase) {
                    matched = Some((hint, len));
                    break;
                }
            }

            if let Some((hint, len)) = matched {
                let consistent = match hint {
                    Hint::Work(v) => set_hint(&mut parsed.work_location, v),
                    Hint::Employment(v) => set_hint(&mut parsed.employment_type, v),
                    Hint::Experience(v) => set_hint(&mut parsed.experience_level, v),
                    Hint::Technology(t) => {
                        parsed.technologies.insert(t);
                        true
                    }
                    Hint::Location(l) => {
                        parsed.locations.insert(l);
                        true
                    }
                };
                if !consistent {
                    debug!("Conflicting hints in query '{}', treating as keyword", text);
                    return ParsedQuery::keyword_only(text);
                }
                after_preposition = false;
                i += len;
                continue;
            }

            let token = tokens[i];
            if CONNECTORS.contains(&token) {
                after_preposition = LOCATION_PREPOSITIONS.contains(&token);
            } else if after_preposition {
                parsed.locations.insert(token.to_string());
                after_preposition = false;
            } else {
                keywords.push(token.to_string());
            }
            i += 1;
        }

        if !parsed.has_structure() {
            return ParsedQuery::keyword_only(text);
        }

        parsed.keywords = keywords;
        debug!(
            "Parsed query '{}': {} keywords, {} technologies, {} locations",
            text,
            parsed.keywords.len(),
            parsed.technologies.len(),
            parsed.locations.len()
        );
        parsed
    }

    fn recognize(&self, phrase: &str) -> Option<Hint> {
        if let Some((_, v)) = WORK_LOCATION_PHRASES.iter().find(|(p, _)| *p == phrase) {
            return Some(Hint::Work(*v));
        }
        // Facet enums already accept the common spellings ("full-time", "on site", "sr")
        if let Ok(v) = phrase.parse::<WorkLocation>() {
            return Some(Hint::Work(v));
        }
        if let Ok(v) = phrase.parse::<EmploymentType>() {
            return Some(Hint::Employment(v));
        }
        if let Ok(v) = phrase.parse::<ExperienceLevel>() {
            return Some(Hint::Experience(v));
        }
        if self.technologies.contains(phrase) {
            return Some(Hint::Technology(phrase.to_string()));
        }
        if self.locations.contains(phrase) {
            return Some(Hint::Location(phrase.to_string()));
        }
        None
    }
}

impl Default for QueryParser {
    fn default() -> Self {
        Self::new()
    }
}
