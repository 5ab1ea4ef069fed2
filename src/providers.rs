//! Collaborator contracts at the solver boundary.
//!
//! Requirement lookup, catalog retrieval and preference parsing live outside
//! this crate. The traits here are what the service consumes; the static
//! implementations back development setups and tests.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use thiserror::Error;

use crate::models::{ChooseFrom, ConstraintDelta, Prereq, RequirementSet, Section};

/// Collaborator failures.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("unavailable: {0}")]
    Unavailable(String),

    #[error("invalid response: {0}")]
    Invalid(String),
}

/// Degree requirements for a school/major.
pub trait RequirementsProvider: Send + Sync {
    fn get(&self, school: &str, major: &str, term: &str) -> Result<RequirementSet, ProviderError>;
}

/// Offered sections for a term.
pub trait CatalogProvider: Send + Sync {
    /// Sections per requested course code. A course with no live sections
    /// maps to an empty list.
    fn sections(
        &self,
        term: &str,
        codes: &BTreeSet<String>,
    ) -> Result<BTreeMap<String, Vec<Section>>, ProviderError>;
}

/// Turns a user utterance into a structured constraint delta.
pub trait PreferenceParser: Send + Sync {
    fn parse(&self, utterance: &str) -> Result<ConstraintDelta, ProviderError>;
}

impl<F> PreferenceParser for F
where
    F: Fn(&str) -> Result<ConstraintDelta, ProviderError> + Send + Sync,
{
    fn parse(&self, utterance: &str) -> Result<ConstraintDelta, ProviderError> {
        self(utterance)
    }
}

/// Requirement sets keyed by case-insensitive (school, major).
#[derive(Debug, Clone, Default)]
pub struct StaticRequirements {
    sets: HashMap<(String, String), RequirementSet>,
}

impl StaticRequirements {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, school: &str, major: &str, set: RequirementSet) {
        self.sets.insert(key(school, major), set);
    }

    pub fn with(mut self, school: &str, major: &str, set: RequirementSet) -> Self {
        self.insert(school, major, set);
        self
    }

    /// Curated sets shipped with the crate.
    pub fn curated() -> Self {
        Self::new().with("pitt", "computer science", pitt_computer_science())
    }
}

impl RequirementsProvider for StaticRequirements {
    fn get(&self, school: &str, major: &str, _term: &str) -> Result<RequirementSet, ProviderError> {
        self.sets
            .get(&key(school, major))
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(format!("{major} at {school}")))
    }
}

fn key(school: &str, major: &str) -> (String, String) {
    (school.trim().to_lowercase(), major.trim().to_lowercase())
}

/// University of Pittsburgh, B.S. Computer Science.
fn pitt_computer_science() -> RequirementSet {
    let mut set = RequirementSet::new()
        .with_gen_ed(ChooseFrom::new(
            "Writing Intensive",
            1,
            &["ENGCMP0200", "ENGCMP0205", "ENGCMP0207"],
        ))
        .with_gen_ed(ChooseFrom::new(
            "Literature",
            1,
            &["ENGLIT0200", "ENGLIT0400", "ENGLIT0500"],
        ))
        .with_gen_ed(ChooseFrom::new(
            "History",
            1,
            &["HIST0100", "HIST0600", "HIST0700"],
        ))
        .with_gen_ed(ChooseFrom::new(
            "Social Science",
            1,
            &["PSY0010", "SOC0010", "ANTH0780"],
        ))
        .with_gen_ed(ChooseFrom::new(
            "Natural Science",
            1,
            &["BIOSC0150", "CHEM0110", "PHYS0174"],
        ))
        .with_gen_ed(ChooseFrom::new(
            "Arts",
            1,
            &["MUSIC0211", "THEA0800", "ARTSC0100"],
        ))
        .with_gen_ed(ChooseFrom::new(
            "Philosophy",
            1,
            &["PHIL0080", "PHIL0300", "PHIL0400"],
        ))
        .with_choose_from(ChooseFrom::new(
            "Upper Level CS Electives",
            2,
            &["CS1621", "CS1653", "CS1674", "CS1699", "CS1695", "CS1690"],
        ))
        .with_choose_from(ChooseFrom::new(
            "Math Requirements",
            3,
            &["MATH0220", "MATH0230", "MATH1180", "STAT1151"],
        ))
        .with_credit_bounds(12, 18)
        .with_multi_semester_prereq(Prereq::new("CS1502", &["CS1501"]));
    for course in ["CS0401", "CS0441", "CS0445", "CS1501", "CS1502", "CS1550"] {
        set = set.with_required(course);
    }
    for course in ["CS1621", "CS1653", "CS1674", "CS1699"] {
        set = set.with_multi_semester_prereq(Prereq::new(course, &["CS0445"]));
    }
    set.catalog_year = Some("2025-2026".to_string());
    set
}

/// Sections keyed by term, then course.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    terms: HashMap<String, BTreeMap<String, Vec<Section>>>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, term: &str, section: Section) {
        self.terms
            .entry(term.to_string())
            .or_default()
            .entry(section.course.clone())
            .or_default()
            .push(section);
    }

    pub fn with_section(mut self, term: &str, section: Section) -> Self {
        self.insert(term, section);
        self
    }

    /// Removes a section by CRN. Returns whether it was present.
    pub fn remove(&mut self, term: &str, crn: &str) -> bool {
        let Some(courses) = self.terms.get_mut(term) else {
            return false;
        };
        let mut removed = false;
        for sections in courses.values_mut() {
            let before = sections.len();
            sections.retain(|s| s.crn != crn);
            removed |= sections.len() != before;
        }
        removed
    }
}

impl CatalogProvider for StaticCatalog {
    fn sections(
        &self,
        term: &str,
        codes: &BTreeSet<String>,
    ) -> Result<BTreeMap<String, Vec<Section>>, ProviderError> {
        let offered = self.terms.get(term);
        Ok(codes
            .iter()
            .map(|code| {
                let sections = offered
                    .and_then(|courses| courses.get(code))
                    .cloned()
                    .unwrap_or_default();
                (code.clone(), sections)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Weekday;
    use crate::validation::validate_requirements;

    #[test]
    fn test_curated_lookup_is_case_insensitive() {
        let provider = StaticRequirements::curated();
        let set = provider.get("Pitt", "Computer Science", "2251").unwrap();
        assert_eq!(set.required.len(), 6);
        assert_eq!(set.gen_eds.len(), 7);
        assert_eq!(set.choose_from.len(), 2);
        assert_eq!((set.min_credits, set.max_credits), (Some(12), Some(18)));
        assert_eq!(set.multi_semester_prereqs.len(), 5);
        assert!(validate_requirements(&set).is_ok());
    }

    #[test]
    fn test_unknown_major() {
        let provider = StaticRequirements::curated();
        let err = provider.get("Pitt", "Basket Weaving", "2251").unwrap_err();
        assert!(matches!(err, ProviderError::NotFound(_)));
    }

    #[test]
    fn test_catalog_missing_course_is_empty() {
        let catalog = StaticCatalog::new().with_section(
            "2251",
            Section::new("CS0445", "45678").with_meetings(&[Weekday::Tue, Weekday::Thu], 660, 735),
        );
        let codes: BTreeSet<String> = ["CS0445", "CS1501"].iter().map(|s| s.to_string()).collect();

        let found = catalog.sections("2251", &codes).unwrap();
        assert_eq!(found["CS0445"].len(), 1);
        assert!(found["CS1501"].is_empty());

        let other_term = catalog.sections("2254", &codes).unwrap();
        assert!(other_term.values().all(Vec::is_empty));
    }

    #[test]
    fn test_catalog_remove() {
        let mut catalog = StaticCatalog::new()
            .with_section("2251", Section::new("CS1550", "45678"))
            .with_section("2251", Section::new("CS1550", "45679"));
        assert!(catalog.remove("2251", "45678"));
        assert!(!catalog.remove("2251", "45678"));
        assert!(!catalog.remove("2254", "45679"));

        let codes = BTreeSet::from(["CS1550".to_string()]);
        let found = catalog.sections("2251", &codes).unwrap();
        assert_eq!(found["CS1550"][0].crn, "45679");
    }

    #[test]
    fn test_closure_parser() {
        let parser = |text: &str| -> Result<ConstraintDelta, ProviderError> {
            if text.contains("friday") {
                Ok(ConstraintDelta::new().exclude_day(Weekday::Fri))
            } else {
                Err(ProviderError::Invalid(text.to_string()))
            }
        };
        assert!(!parser.parse("no friday classes").unwrap().is_empty());
        assert!(parser.parse("hmm").is_err());
    }
}
