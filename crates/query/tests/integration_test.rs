//! Integration tests for parsing, merging and filtering.
//!
//! These tests drive free text and explicit selections through the whole
//! crate the way a discovery session does.

use catalog::{EmploymentType, ExperienceLevel, JobListing, WorkLocation};
use proptest::prelude::*;
use query::{FilterPipeline, FilterState, ParsedQuery, QueryParser, merge};
use std::collections::BTreeSet;

const TECH: &[&str] = &["rust", "go", "python", "kafka", "sql", "react", "aws"];
const WORDS: &[&str] = &[
    "engineer", "senior", "remote", "hybrid", "contract", "in", "berlin", "designer", "lead",
    "full-time", "rust", "python", "data",
];

fn create_listings() -> Vec<JobListing> {
    let mut a = JobListing::new("a", "Senior Rust Engineer", "Ferrous", 300);
    a.work_location = Some(WorkLocation::Remote);
    a.experience_level = Some(ExperienceLevel::Senior);
    a.technologies = vec!["Rust".to_string(), "Kafka".to_string()];
    a.location = "Berlin".to_string();

    let mut b = JobListing::new("b", "Python Engineer", "Snake", 200);
    b.work_location = Some(WorkLocation::Remote);
    b.experience_level = Some(ExperienceLevel::Mid);
    b.technologies = vec!["Python".to_string()];

    let mut c = JobListing::new("c", "Staff Rust Engineer", "Oxide", 100);
    c.work_location = Some(WorkLocation::OnSite);
    c.experience_level = Some(ExperienceLevel::Lead);
    c.employment_type = Some(EmploymentType::FullTime);
    c.technologies = vec!["Rust".to_string()];

    vec![a, b, c]
}

#[test]
fn test_free_text_search_end_to_end() {
    let parser = QueryParser::new();
    let effective = merge(&parser.parse("remote rust engineer"), &FilterState::new());

    let kept = FilterPipeline::standard(1_000)
        .apply(create_listings(), &effective)
        .unwrap();
    let ids: Vec<_> = kept.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec!["a"]);
}

#[test]
fn test_checkbox_refines_free_text_without_erasing_it() {
    let parser = QueryParser::new();
    // Text asks for rust, the checkbox adds python: both survive the merge
    let explicit = FilterState::new().with_technology("python");
    let effective = merge(&parser.parse("rust engineer"), &explicit);

    let kept = FilterPipeline::standard(1_000)
        .apply(create_listings(), &effective)
        .unwrap();
    assert_eq!(kept.len(), 3);
}

#[test]
fn test_explicit_work_location_overrides_text() {
    let parser = QueryParser::new();
    let explicit = FilterState::new().with_work_location(WorkLocation::OnSite);
    let effective = merge(&parser.parse("remote rust engineer"), &explicit);

    let kept = FilterPipeline::standard(1_000)
        .apply(create_listings(), &effective)
        .unwrap();
    let ids: Vec<_> = kept.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec!["c"]);
}

fn explicit_strategy() -> impl Strategy<Value = FilterState> {
    (
        proptest::sample::subsequence(TECH, 0..=TECH.len()),
        proptest::option::of(prop_oneof![
            Just(WorkLocation::Remote),
            Just(WorkLocation::Hybrid),
            Just(WorkLocation::OnSite),
        ]),
        proptest::option::of(prop_oneof![
            Just(ExperienceLevel::Entry),
            Just(ExperienceLevel::Senior),
            Just(ExperienceLevel::Lead),
        ]),
    )
        .prop_map(|(tech, work, level)| {
            let mut state = FilterState::new();
            for t in tech {
                state = state.with_technology(t);
            }
            if let Some(w) = work {
                state = state.with_work_location(w);
            }
            if let Some(l) = level {
                state = state.with_experience_level(l);
            }
            state
        })
}

fn text_strategy() -> impl Strategy<Value = String> {
    proptest::collection::vec(proptest::sample::select(WORDS), 0..6).prop_map(|w| w.join(" "))
}

proptest! {
    #[test]
    fn prop_merge_unions_technologies(text in text_strategy(), explicit in explicit_strategy()) {
        let parsed = QueryParser::new().parse(&text);
        let effective = merge(&parsed, &explicit);

        let expected: BTreeSet<String> = explicit
            .technologies()
            .union(&parsed.technologies)
            .cloned()
            .collect();
        prop_assert!(effective.technologies.is_superset(&expected));
    }

    #[test]
    fn prop_explicit_single_valued_facets_win(text in text_strategy(), explicit in explicit_strategy()) {
        let parsed = QueryParser::new().parse(&text);
        let effective = merge(&parsed, &explicit);

        if !explicit.work_locations().is_empty() {
            prop_assert_eq!(&effective.work_locations, explicit.work_locations());
        } else {
            let hinted: BTreeSet<WorkLocation> = parsed.work_location.into_iter().collect();
            prop_assert_eq!(&effective.work_locations, &hinted);
        }
        if !explicit.experience_levels().is_empty() {
            prop_assert_eq!(&effective.experience_levels, explicit.experience_levels());
        }
    }

    #[test]
    fn prop_parser_never_panics_and_keeps_text(text in "\\PC{0,40}") {
        let parsed: ParsedQuery = QueryParser::new().parse(&text);
        if !parsed.has_structure() && !parsed.keywords.is_empty() {
            prop_assert_eq!(parsed.keywords, vec![text.trim().to_string()]);
        }
    }
}
