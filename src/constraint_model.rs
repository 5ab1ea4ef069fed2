//! Normalized constraint set.
//!
//! Folds already-parsed user preferences and requirement data into the one
//! structure the planner and scheduler read. Course codes are normalized,
//! credit bounds resolved, and malformed preferences dropped with a note.
//!
//! # Credit bound precedence
//! 1. `Constraints::target_credits`
//! 2. `RequirementSet::min_credits` / `max_credits`
//! 3. `SolverConfig::default_min_credits` / `default_max_credits`

use std::collections::{BTreeMap, BTreeSet};

use crate::config::SolverConfig;
use crate::models::{
    normalize_course_code, ConstraintType, Constraints, CreditTarget, Issue, IssueKind,
    RequirementSet, Section, TimeWindow, Weekday,
};
use crate::prereq::PrerequisiteGraph;

/// Everything one solve needs to know about requirements and preferences.
#[derive(Debug, Clone)]
pub struct ConstraintModel {
    /// Requirement set with normalized course codes.
    pub requirements: RequirementSet,
    pub excluded_days: BTreeSet<Weekday>,
    pub window: Option<TimeWindow>,
    pub day_rule: ConstraintType,
    pub window_rule: ConstraintType,
    /// Course → CRN.
    pub pins: BTreeMap<String, String>,
    /// Pinned courses, newest last. Pins with no recorded order come first,
    /// by code.
    pub pin_order: Vec<String>,
    pub skipped: BTreeSet<String>,
    pub completed: BTreeSet<String>,
    /// Resolved credit bounds.
    pub credits: CreditTarget,
    pub max_courses: Option<usize>,
    pub graph: PrerequisiteGraph,
    /// Adjustments made while normalizing.
    pub notes: Vec<Issue>,
}

impl ConstraintModel {
    /// Builds the model.
    pub fn build(
        requirements: &RequirementSet,
        constraints: &Constraints,
        config: &SolverConfig,
    ) -> Self {
        let requirements = requirements.normalized();
        let mut notes = Vec::new();

        let window = match constraints.window() {
            Some(w) if w.start >= w.end => {
                notes.push(Issue::general(
                    IssueKind::ConstraintRelaxed,
                    format!("Ignored empty time window {w}"),
                ));
                None
            }
            other => other,
        };

        let mut pins = BTreeMap::new();
        for (course, crn) in &constraints.pins {
            match normalize_course_code(course) {
                Some(code) => {
                    pins.insert(code, crn.trim().to_string());
                }
                None => notes.push(Issue::course(
                    IssueKind::PinInvalidated,
                    course.clone(),
                    format!("Ignored pin for unrecognized course code {course:?}"),
                )),
            }
        }

        let mut pin_order: Vec<String> = pins.keys().cloned().collect();
        for code in constraints.pin_order.iter().filter_map(|c| normalize_course_code(c)) {
            if pins.contains_key(&code) {
                pin_order.retain(|c| *c != code);
                pin_order.push(code);
            }
        }

        let credits = match constraints.target_credits {
            Some(target) => target,
            None => CreditTarget::range(
                requirements.min_credits.unwrap_or(config.default_min_credits),
                requirements.max_credits.unwrap_or(config.default_max_credits),
            ),
        };

        let graph = PrerequisiteGraph::from_requirements(&requirements);

        Self {
            requirements,
            excluded_days: constraints.excluded_days.clone(),
            window,
            day_rule: constraints.day_rule,
            window_rule: constraints.window_rule,
            pins,
            pin_order,
            skipped: normalize_set(&constraints.skipped),
            completed: normalize_set(&constraints.completed),
            credits,
            max_courses: config.max_courses,
            graph,
            notes,
        }
    }

    /// Whether `section` avoids every excluded day.
    pub fn allows_days(&self, section: &Section) -> bool {
        !section.meets_on_any(&self.excluded_days)
    }

    /// Whether `section` lies inside the allowed window.
    pub fn allows_window(&self, section: &Section) -> bool {
        self.window.map_or(true, |w| section.fits_window(&w))
    }

    /// Whether `section` satisfies both preference families.
    pub fn allows(&self, section: &Section) -> bool {
        self.allows_days(section) && self.allows_window(section)
    }

    pub fn pin_for(&self, course: &str) -> Option<&str> {
        self.pins.get(course).map(String::as_str)
    }

    pub fn is_skipped(&self, course: &str) -> bool {
        self.skipped.contains(course)
    }

    /// Every course code the catalog must be asked about.
    pub fn catalog_codes(&self) -> BTreeSet<String> {
        let mut codes = self.requirements.candidate_codes();
        codes.extend(self.pins.keys().cloned());
        codes.retain(|c| !self.skipped.contains(c));
        codes
    }

    /// Human-readable day exclusion (`Mon/Fri`).
    pub fn describe_days(&self) -> String {
        self.excluded_days
            .iter()
            .map(|d| d.as_str())
            .collect::<Vec<_>>()
            .join("/")
    }
}

fn normalize_set(codes: &BTreeSet<String>) -> BTreeSet<String> {
    codes.iter().filter_map(|c| normalize_course_code(c)).collect()
}
