//! Merging parser hints with explicit filter selections.
//!
//! Single-valued facets (work location, employment type, experience level)
//! are overridden by explicit selections: a non-empty explicit set is used
//! as-is and the parser's hint is only used when the user picked nothing.
//! Multi-valued facets (technologies, skills, industries, locations) are
//! unioned so neither channel erases the other.

use crate::filter_state::FilterState;
use crate::parser::ParsedQuery;
use catalog::{DatePosted, EmploymentType, ExperienceLevel, WorkLocation};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The query a session actually sends to its data source.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EffectiveQuery {
    pub keywords: Vec<String>,
    pub locations: BTreeSet<String>,
    pub employment_types: BTreeSet<EmploymentType>,
    pub work_locations: BTreeSet<WorkLocation>,
    pub experience_levels: BTreeSet<ExperienceLevel>,
    pub industries: BTreeSet<String>,
    pub technologies: BTreeSet<String>,
    pub skills: BTreeSet<String>,
    pub date_posted: DatePosted,
}

impl EffectiveQuery {
    /// True for the default feed: no keywords, no facets, any date
    pub fn is_unfiltered(&self) -> bool {
        self == &EffectiveQuery::default()
    }

    /// True when any facet (not keyword) restricts the results
    pub fn has_facets(&self) -> bool {
        !self.locations.is_empty()
            || !self.employment_types.is_empty()
            || !self.work_locations.is_empty()
            || !self.experience_levels.is_empty()
            || !self.industries.is_empty()
            || !self.technologies.is_empty()
            || !self.skills.is_empty()
            || self.date_posted != DatePosted::Any
    }
}

/// Explicit set wins when non-empty, otherwise the parser hint (if any)
fn override_single<T: Ord + Copy>(explicit: &BTreeSet<T>, hint: Option<T>) -> BTreeSet<T> {
    if explicit.is_empty() {
        hint.into_iter().collect()
    } else {
        explicit.clone()
    }
}

/// Merge parser-derived hints with explicit UI selections.
pub fn merge(parsed: &ParsedQuery, explicit: &FilterState) -> EffectiveQuery {
    EffectiveQuery {
        keywords: parsed.keywords.clone(),
        locations: parsed.locations.clone(),
        employment_types: override_single(explicit.employment_types(), parsed.employment_type),
        work_locations: override_single(explicit.work_locations(), parsed.work_location),
        experience_levels: override_single(explicit.experience_levels(), parsed.experience_level),
        industries: explicit.industries().clone(),
        technologies: explicit
            .technologies()
            .union(&parsed.technologies)
            .cloned()
            .collect(),
        skills: explicit.skills().clone(),
        date_posted: explicit.date_posted(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::QueryParser;

    #[test]
    fn test_empty_inputs_are_unfiltered() {
        let effective = merge(&ParsedQuery::default(), &FilterState::new());
        assert!(effective.is_unfiltered());
        assert!(!effective.has_facets());
    }

    #[test]
    fn test_explicit_single_valued_facet_overrides_hint() {
        let parsed = QueryParser::new().parse("remote rust engineer");
        let explicit = FilterState::new()
            .with_work_location(WorkLocation::Hybrid)
            .with_work_location(WorkLocation::OnSite);

        let effective = merge(&parsed, &explicit);
        assert_eq!(
            effective.work_locations,
            BTreeSet::from([WorkLocation::Hybrid, WorkLocation::OnSite])
        );
    }

    #[test]
    fn test_hint_used_when_no_explicit_selection() {
        let parsed = QueryParser::new().parse("senior contract designer");
        let effective = merge(&parsed, &FilterState::new());

        assert_eq!(effective.experience_levels, BTreeSet::from([ExperienceLevel::Senior]));
        assert_eq!(effective.employment_types, BTreeSet::from([EmploymentType::Contract]));
        assert_eq!(effective.keywords, vec!["designer"]);
    }

    #[test]
    fn test_technologies_are_unioned() {
        let parsed = QueryParser::new().parse("rust kafka engineer");
        let explicit = FilterState::new().with_technology("Go").with_technology("rust");

        let effective = merge(&parsed, &explicit);
        let expected: BTreeSet<String> =
            ["go", "kafka", "rust"].iter().map(|s| s.to_string()).collect();
        assert_eq!(effective.technologies, expected);
    }

    #[test]
    fn test_date_posted_and_skills_come_from_explicit_state() {
        let explicit = FilterState::new()
            .with_date_posted(DatePosted::PastDay)
            .with_skill("Negotiation");
        let effective = merge(&ParsedQuery::default(), &explicit);

        assert_eq!(effective.date_posted, DatePosted::PastDay);
        assert!(effective.skills.contains("negotiation"));
        assert!(!effective.is_unfiltered());
    }
}
