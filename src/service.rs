//! Build / optimize entry points.
//!
//! [`ScheduleService`] does the blocking work at the edges (requirement
//! lookup, catalog fetch, session load and save) and runs the pure
//! [`solve`] pipeline in between:
//!
//! ```text
//! ConstraintModel → CourseSelectionPlanner → SectionScheduler → Explainer
//! ```
//!
//! Nothing is written to the session store until a plan is complete, so a
//! caller may abandon a request at any point.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::SolverConfig;
use crate::constraint_model::ConstraintModel;
use crate::error::{Result, ScheduleError};
use crate::explain::Explainer;
use crate::models::term::is_valid_term;
use crate::models::{
    normalize_course_code, ConstraintDelta, Constraints, Course, Issue, RequirementSet,
    SchedulePlan, Section, SolveStatus,
};
use crate::planner::{Category, CourseSelectionPlanner};
use crate::providers::{
    CatalogProvider, PreferenceParser, ProviderError, RequirementsProvider,
};
use crate::scheduler::{SectionScheduler, UnassignableReason};
use crate::session::{SessionLocks, SessionState, SessionStore};
use crate::validation::validate_requirements;

/// Runs the solver pipeline over already-fetched catalog data.
///
/// Deterministic: identical inputs give identical plans.
pub fn solve(
    term: &str,
    requirements: &RequirementSet,
    constraints: &Constraints,
    catalog: &BTreeMap<String, Vec<Section>>,
    config: &SolverConfig,
) -> SchedulePlan {
    let model = ConstraintModel::build(requirements, constraints, config);
    solve_model(term, &model, catalog, config)
}

fn solve_model(
    term: &str,
    model: &ConstraintModel,
    catalog: &BTreeMap<String, Vec<Section>>,
    config: &SolverConfig,
) -> SchedulePlan {
    let offered: BTreeMap<String, Course> = catalog
        .iter()
        .filter_map(|(code, sections)| {
            Course::from_sections(code.as_str(), sections).map(|c| (code.clone(), c))
        })
        .collect();

    let planner = CourseSelectionPlanner::from_config(config);
    let scheduler = SectionScheduler::from_config(config);

    // A group member that gets no section is passed over and its group
    // refilled from the remaining options until none is left.
    let mut passed_over: BTreeMap<String, (String, UnassignableReason)> = BTreeMap::new();
    let (mut selection, outcome) = loop {
        let excluded: BTreeSet<String> = passed_over.keys().cloned().collect();
        let selection = planner.plan_excluding(model, &offered, &excluded);
        let courses: Vec<String> = selection.courses.iter().map(|c| c.code.clone()).collect();
        let outcome = scheduler.schedule(model, &courses, catalog);

        let retry: Vec<(String, String, UnassignableReason)> = outcome
            .unassigned
            .iter()
            .filter(|u| !model.pins.contains_key(&u.course))
            .filter_map(|u| match selection.category_of(&u.course) {
                Some(Category::Group(label)) => Some((u.course.clone(), label.clone(), u.reason)),
                _ => None,
            })
            .collect();
        if retry.is_empty() {
            break (selection, outcome);
        }
        for (course, label, reason) in retry {
            debug!(course = %course, group = %label, "group member passed over; re-planning");
            passed_over.insert(course, (label, reason));
        }
    };
    for (course, (label, reason)) in &passed_over {
        selection.issues.push(Issue::course(
            reason.issue_kind(),
            course.as_str(),
            format!("{course} passed over for {label}: {reason}"),
        ));
    }

    let explanation =
        Explainer::new(config.alternatives_per_course).explain(model, &selection, &outcome);

    let mut plan = SchedulePlan::new(term);
    for section in outcome.sections() {
        plan.add_section(section.clone());
    }
    plan.explanations = explanation.explanations;
    plan.alternatives = explanation.alternatives;
    plan.issues = explanation.issues;
    plan.status = outcome.status;
    let group_left_short = passed_over.values().any(|(label, _)| {
        model.requirements.groups().any(|(_, group)| {
            group.label == *label
                && group
                    .options
                    .iter()
                    .filter(|o| selection.contains(o) || model.completed.contains(*o))
                    .count()
                    < group.count
        })
    });
    if group_left_short && plan.status == SolveStatus::Complete {
        plan.status = SolveStatus::Partial;
    }

    debug!(
        term = %term,
        sections = plan.sections.len(),
        credits = plan.total_credits,
        attempts = outcome.attempts,
        "solve finished"
    );
    plan
}

/// Session-aware scheduling service.
///
/// # Example
/// ```
/// use u_course_schedule::models::{Constraints, RequirementSet, Section, Weekday};
/// use u_course_schedule::providers::{StaticCatalog, StaticRequirements};
/// use u_course_schedule::service::ScheduleService;
/// use u_course_schedule::session::InMemorySessionStore;
///
/// let requirements = StaticRequirements::new().with(
///     "Pitt",
///     "Computer Science",
///     RequirementSet::new().with_required("CS0445").with_credit_bounds(0, 18),
/// );
/// let catalog = StaticCatalog::new().with_section(
///     "2251",
///     Section::new("CS0445", "45678").with_meetings(&[Weekday::Tue, Weekday::Thu], 660, 735),
/// );
/// let service = ScheduleService::new(requirements, catalog, InMemorySessionStore::new());
///
/// let (session_id, _, plan) = service
///     .build("Pitt", "Computer Science", "2251", Constraints::new())
///     .unwrap();
/// assert_eq!(plan.sections[0].crn, "45678");
/// assert!(!session_id.is_empty());
/// ```
pub struct ScheduleService<R, C, S> {
    requirements: R,
    catalog: C,
    store: S,
    parser: Option<Box<dyn PreferenceParser>>,
    config: SolverConfig,
    locks: SessionLocks,
}

impl<R, C, S> ScheduleService<R, C, S>
where
    R: RequirementsProvider,
    C: CatalogProvider,
    S: SessionStore,
{
    /// Creates a service with the default configuration.
    pub fn new(requirements: R, catalog: C, store: S) -> Self {
        Self {
            requirements,
            catalog,
            store,
            parser: None,
            config: SolverConfig::default(),
            locks: SessionLocks::new(),
        }
    }

    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the parser used by [`Self::optimize_utterance`].
    pub fn with_parser(mut self, parser: impl PreferenceParser + 'static) -> Self {
        self.parser = Some(Box::new(parser));
        self
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn catalog_mut(&mut self) -> &mut C {
        &mut self.catalog
    }

    /// Builds a first plan and opens a session for it.
    ///
    /// # Errors
    /// `InvalidTerm`, `RequirementsNotFound`, `InvalidRequirements`, or a
    /// collaborator/store failure. An infeasible schedule is not an error.
    pub fn build(
        &self,
        school: &str,
        major: &str,
        term: &str,
        constraints: Constraints,
    ) -> Result<(String, RequirementSet, SchedulePlan)> {
        if !is_valid_term(term) {
            return Err(ScheduleError::InvalidTerm(term.to_string()));
        }
        let requirements = self
            .requirements
            .get(school, major, term)
            .map_err(|e| match e {
                ProviderError::NotFound(_) => ScheduleError::RequirementsNotFound {
                    school: school.to_string(),
                    major: major.to_string(),
                },
                other => ScheduleError::Requirements(other),
            })?;
        validate_requirements(&requirements).map_err(ScheduleError::InvalidRequirements)?;

        let plan = self.solve_for(term, &requirements, &constraints)?;

        let session_id = Uuid::new_v4().to_string();
        let mut state = SessionState::new(
            session_id.as_str(),
            school,
            major,
            term,
            requirements.clone(),
            constraints,
        );
        state.record(plan.clone());
        self.store.save(&state)?;

        info!(
            session_id = %session_id,
            term = %term,
            credits = plan.total_credits,
            status = ?plan.status,
            "schedule built"
        );
        Ok((session_id, requirements, plan))
    }

    /// Merges `delta` into the session's constraints and re-solves.
    ///
    /// Pins survive unless the delta unpins them; a pin whose section has
    /// disappeared is reported on the plan and its course is re-scheduled.
    ///
    /// # Errors
    /// `SessionNotFound` for unknown or expired ids (the caller must
    /// rebuild), `SessionBusy` while another solve holds the same id.
    pub fn optimize(&self, session_id: &str, delta: &ConstraintDelta) -> Result<SchedulePlan> {
        let _guard = self
            .locks
            .try_acquire(session_id)
            .ok_or_else(|| ScheduleError::SessionBusy(session_id.to_string()))?;

        let Some(mut state) = self.store.load(session_id)? else {
            warn!(session_id = %session_id, "session not found or expired");
            return Err(ScheduleError::SessionNotFound(session_id.to_string()));
        };

        state.apply(delta);
        let plan = self.solve_for(&state.term, &state.requirements, &state.constraints)?;
        state.record(plan.clone());
        self.store.save(&state)?;

        info!(
            session_id = %session_id,
            term = %state.term,
            revision = state.revision,
            credits = plan.total_credits,
            status = ?plan.status,
            "schedule optimized"
        );
        Ok(plan)
    }

    /// Parses `utterance` with the configured parser, then optimizes.
    pub fn optimize_utterance(&self, session_id: &str, utterance: &str) -> Result<SchedulePlan> {
        let parser = self.parser.as_ref().ok_or_else(|| {
            ScheduleError::Preferences(ProviderError::Unavailable(
                "no preference parser configured".to_string(),
            ))
        })?;
        let delta = parser.parse(utterance).map_err(ScheduleError::Preferences)?;
        debug!(session_id = %session_id, empty = delta.is_empty(), "utterance parsed");
        self.optimize(session_id, &delta)
    }

    /// Catalog pass-through. Codes are normalized; unrecognized codes are
    /// skipped.
    pub fn fetch_sections<I, T>(&self, term: &str, codes: I) -> Result<BTreeMap<String, Vec<Section>>>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        if !is_valid_term(term) {
            return Err(ScheduleError::InvalidTerm(term.to_string()));
        }
        let codes: BTreeSet<String> = codes
            .into_iter()
            .filter_map(|c| normalize_course_code(c.as_ref()))
            .collect();
        self.catalog
            .sections(term, &codes)
            .map_err(ScheduleError::Catalog)
    }

    /// Ends a session. Returns whether it existed.
    pub fn end_session(&self, session_id: &str) -> Result<bool> {
        Ok(self.store.delete(session_id)?)
    }

    fn solve_for(
        &self,
        term: &str,
        requirements: &RequirementSet,
        constraints: &Constraints,
    ) -> Result<SchedulePlan> {
        let model = ConstraintModel::build(requirements, constraints, &self.config);
        let catalog = self
            .catalog
            .sections(term, &model.catalog_codes())
            .map_err(ScheduleError::Catalog)?;
        Ok(solve_model(term, &model, &catalog, &self.config))
    }
}
