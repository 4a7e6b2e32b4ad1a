//! The user's explicit search intent: free-text plus facet selections.
//!
//! `FilterState` is an immutable value object. Every `with_*` / `without_*`
//! call consumes the state and returns a new one, so a session can compare
//! the old and new values structurally to decide whether anything changed.

use catalog::{DatePosted, EmploymentType, ExperienceLevel, WorkLocation};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Trim and lowercase a free-form facet value; blank values are dropped.
pub fn normalize_tag(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Explicit filter selections made in the UI.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterState {
    query: String,
    employment_types: BTreeSet<EmploymentType>,
    work_locations: BTreeSet<WorkLocation>,
    experience_levels: BTreeSet<ExperienceLevel>,
    industries: BTreeSet<String>,
    technologies: BTreeSet<String>,
    skills: BTreeSet<String>,
    date_posted: DatePosted,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn employment_types(&self) -> &BTreeSet<EmploymentType> {
        &self.employment_types
    }

    pub fn work_locations(&self) -> &BTreeSet<WorkLocation> {
        &self.work_locations
    }

    pub fn experience_levels(&self) -> &BTreeSet<ExperienceLevel> {
        &self.experience_levels
    }

    pub fn industries(&self) -> &BTreeSet<String> {
        &self.industries
    }

    pub fn technologies(&self) -> &BTreeSet<String> {
        &self.technologies
    }

    pub fn skills(&self) -> &BTreeSet<String> {
        &self.skills
    }

    pub fn date_posted(&self) -> DatePosted {
        self.date_posted
    }

    /// True when any facet or the date window differs from the default.
    ///
    /// The free-text query is not a facet and is ignored here.
    pub fn has_active_filters(&self) -> bool {
        let mut facets_only = self.clone();
        facets_only.query.clear();
        facets_only != FilterState::default()
    }

    /// True when neither facets nor free text are set
    pub fn is_empty(&self) -> bool {
        !self.has_active_filters() && self.query.trim().is_empty()
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn with_employment_type(mut self, value: EmploymentType) -> Self {
        self.employment_types.insert(value);
        self
    }

    pub fn without_employment_type(mut self, value: EmploymentType) -> Self {
        self.employment_types.remove(&value);
        self
    }

    pub fn with_work_location(mut self, value: WorkLocation) -> Self {
        self.work_locations.insert(value);
        self
    }

    pub fn without_work_location(mut self, value: WorkLocation) -> Self {
        self.work_locations.remove(&value);
        self
    }

    pub fn with_experience_level(mut self, value: ExperienceLevel) -> Self {
        self.experience_levels.insert(value);
        self
    }

    pub fn without_experience_level(mut self, value: ExperienceLevel) -> Self {
        self.experience_levels.remove(&value);
        self
    }

    pub fn with_industry(mut self, value: &str) -> Self {
        if let Some(tag) = normalize_tag(value) {
            self.industries.insert(tag);
        }
        self
    }

    pub fn without_industry(mut self, value: &str) -> Self {
        if let Some(tag) = normalize_tag(value) {
            self.industries.remove(&tag);
        }
        self
    }

    pub fn with_technology(mut self, value: &str) -> Self {
        if let Some(tag) = normalize_tag(value) {
            self.technologies.insert(tag);
        }
        self
    }

    pub fn without_technology(mut self, value: &str) -> Self {
        if let Some(tag) = normalize_tag(value) {
            self.technologies.remove(&tag);
        }
        self
    }

    pub fn with_skill(mut self, value: &str) -> Self {
        if let Some(tag) = normalize_tag(value) {
            self.skills.insert(tag);
        }
        self
    }

    pub fn without_skill(mut self, value: &str) -> Self {
        if let Some(tag) = normalize_tag(value) {
            self.skills.remove(&tag);
        }
        self
    }

    pub fn with_date_posted(mut self, value: DatePosted) -> Self {
        self.date_posted = value;
        self
    }

    /// Drop every facet but keep the free-text query
    pub fn cleared_facets(self) -> Self {
        FilterState::default().with_query(self.query)
    }
}
