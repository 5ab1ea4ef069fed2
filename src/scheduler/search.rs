//! Section assignment by bounded backtracking.
//!
//! # Algorithm
//!
//! 1. Pinned sections are committed first, newest pin first. A pin whose CRN
//!    is gone, or that overlaps a newer pin, is invalidated and its course
//!    re-enters search.
//! 2. Every other course gets a candidate pool (see [`super::filter`]) minus
//!    sections overlapping the pins. Courses are ordered by ascending pool
//!    size (most constrained first), then by code.
//! 3. Depth-first search over an explicit stack of decision frames. A frame
//!    holds the conflict-free candidates for its course, ordered by the total
//!    daily spread they produce (then CRN), and a cursor. After each pick a
//!    forward check rejects it if some later course is left without a
//!    conflict-free candidate.
//! 4. The number of picks is capped at
//!    `max(min_budget, factor × courses × average pool size)`. When the cap is
//!    hit or the search space is exhausted, the deepest prefix found is kept
//!    and the remaining courses are filled greedily; courses that still fit
//!    nowhere are reported unassignable.
//! 5. A placed course whose same-term prerequisite ended up without a section
//!    is removed again, unless it is pinned.
//!
//! # Complexity
//! Bounded by the attempt budget; each pick costs O(n · m) overlap checks
//! for n courses with m meetings.
//!
//! # Reference
//! Haralick & Elliott (1980), "Increasing Tree Search Efficiency for
//! Constraint Satisfaction Problems"

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use super::filter::{filter_candidates, CandidatePool, Relaxed, UnassignableReason};
use super::kpi::spread_with;
use crate::config::SolverConfig;
use crate::constraint_model::ConstraintModel;
use crate::models::{Issue, IssueKind, Section, SolveStatus};

/// A course's chosen section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub section: Section,
    /// Committed from a user pin.
    pub pinned: bool,
    /// Soft family relaxed to find this section.
    pub relaxed: Option<Relaxed>,
}

impl Placement {
    pub fn course(&self) -> &str {
        &self.section.course
    }
}

/// A course left without a section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unassigned {
    pub course: String,
    pub reason: UnassignableReason,
}

/// Scheduler result.
#[derive(Debug, Clone, Default)]
pub struct ScheduleOutcome {
    /// Chosen sections in input course order.
    pub placements: Vec<Placement>,
    pub unassigned: Vec<Unassigned>,
    /// Pin invalidations, relaxations, and unassignable notices.
    pub issues: Vec<Issue>,
    /// Filtered candidate sections per course, ordered by CRN.
    pub pools: BTreeMap<String, Vec<Section>>,
    pub status: SolveStatus,
    /// Picks made by the search.
    pub attempts: usize,
    /// The search stopped at its attempt cap.
    pub budget_exhausted: bool,
}

impl ScheduleOutcome {
    pub fn total_credits(&self) -> u32 {
        self.placements.iter().map(|p| p.section.credits).sum()
    }

    pub fn placement_for(&self, course: &str) -> Option<&Placement> {
        self.placements.iter().find(|p| p.course() == course)
    }

    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.placements.iter().map(|p| &p.section)
    }
}

/// Assigns one section per course.
#[derive(Debug, Clone)]
pub struct SectionScheduler {
    budget_factor: usize,
    min_budget: usize,
}

impl SectionScheduler {
    /// Creates a scheduler with the default attempt budget.
    pub fn new() -> Self {
        Self::from_config(&SolverConfig::default())
    }

    pub fn from_config(config: &SolverConfig) -> Self {
        Self {
            budget_factor: config.search_budget_factor,
            min_budget: config.min_search_budget,
        }
    }

    /// Overrides the attempt budget.
    pub fn with_budget(mut self, factor: usize, min_budget: usize) -> Self {
        self.budget_factor = factor;
        self.min_budget = min_budget;
        self
    }

    /// Attempt cap for `courses` courses with `candidates` pooled sections.
    pub fn budget_for(&self, courses: usize, candidates: usize) -> usize {
        if courses == 0 {
            return self.min_budget;
        }
        let average = (candidates + courses - 1) / courses;
        self.min_budget
            .max(self.budget_factor.saturating_mul(courses).saturating_mul(average))
    }

    /// Schedules `courses` against `catalog` (course → offered sections).
    pub fn schedule(
        &self,
        model: &ConstraintModel,
        courses: &[String],
        catalog: &BTreeMap<String, Vec<Section>>,
    ) -> ScheduleOutcome {
        let mut out = ScheduleOutcome::default();
        let offered = |course: &str| catalog.get(course).map(Vec::as_slice).unwrap_or(&[]);

        let filtered: BTreeMap<&str, Result<CandidatePool, UnassignableReason>> = courses
            .iter()
            .map(|c| (c.as_str(), filter_candidates(model, offered(c.as_str()))))
            .collect();
        for (course, pool) in &filtered {
            if let Ok(pool) = pool {
                out.pools.insert(course.to_string(), pool.sections.clone());
            }
        }

        // Pins, newest first
        let mut open: Vec<&str> = courses
            .iter()
            .map(String::as_str)
            .filter(|c| model.pin_for(c).is_none())
            .collect();
        for code in model.pin_order.iter().rev() {
            let Some(course) = courses.iter().find(|c| *c == code) else {
                continue;
            };
            let Some(crn) = model.pin_for(course) else {
                continue;
            };
            let Some(section) = offered(course.as_str()).iter().find(|s| s.crn == crn) else {
                warn!(course = %course, crn = %crn, "pinned section no longer offered");
                out.issues.push(Issue::course(
                    IssueKind::PinInvalidated,
                    course.as_str(),
                    format!(
                        "Pinned section CRN {crn} for {course} is no longer offered; {course} re-entered search"
                    ),
                ));
                open.push(course);
                continue;
            };
            if let Some(other) = out
                .placements
                .iter()
                .find(|p| p.section.conflicts_with(section))
            {
                warn!(course = %course, crn = %crn, "pinned section conflicts with a newer pin");
                out.issues.push(Issue::course(
                    IssueKind::PinInvalidated,
                    course.as_str(),
                    format!(
                        "Pinned section CRN {crn} for {course} conflicts with newer pin {}; {course} re-entered search",
                        other.section.describe()
                    ),
                ));
                open.push(course);
                continue;
            }
            if !model.allows(section) {
                out.issues.push(Issue::course(
                    IssueKind::ConstraintRelaxed,
                    course.as_str(),
                    format!(
                        "Pinned {} kept outside the preferred days or times",
                        section.describe()
                    ),
                ));
            }
            out.placements.push(Placement {
                section: section.clone(),
                pinned: true,
                relaxed: None,
            });
        }

        // Pools for the remaining courses
        let pinned: Vec<&Section> = out.placements.iter().map(|p| &p.section).collect();
        let mut slots: Vec<Slot<'_>> = Vec::new();
        let mut unassigned: Vec<Unassigned> = Vec::new();
        for course in open {
            match filtered.get(course) {
                Some(Ok(pool)) => {
                    let sections: Vec<&Section> = pool
                        .sections
                        .iter()
                        .filter(|s| !pinned.iter().any(|p| p.conflicts_with(s)))
                        .collect();
                    if sections.is_empty() {
                        unassigned.push(Unassigned {
                            course: course.to_string(),
                            reason: UnassignableReason::AllSectionsConflict,
                        });
                    } else {
                        slots.push(Slot {
                            course,
                            sections,
                            relaxed: pool.relaxed,
                        });
                    }
                }
                Some(Err(reason)) => unassigned.push(Unassigned {
                    course: course.to_string(),
                    reason: *reason,
                }),
                None => unassigned.push(Unassigned {
                    course: course.to_string(),
                    reason: UnassignableReason::NoOfferedSection,
                }),
            }
        }
        slots.sort_by(|a, b| {
            a.sections
                .len()
                .cmp(&b.sections.len())
                .then_with(|| a.course.cmp(b.course))
        });

        let budget = self.budget_for(slots.len(), slots.iter().map(|s| s.sections.len()).sum());
        let result = search(&slots, &pinned, budget);
        if result.exhausted_budget {
            warn!(budget, attempts = result.attempts, "search budget exhausted; keeping best partial assignment");
        }
        debug!(
            courses = slots.len(),
            attempts = result.attempts,
            complete = result.complete,
            "section search finished"
        );

        let mut found: Vec<Placement> = Vec::new();
        for (slot, pick) in slots.iter().zip(&result.picks) {
            match pick {
                Some(i) => found.push(Placement {
                    section: slot.sections[*i].clone(),
                    pinned: false,
                    relaxed: slot.relaxed,
                }),
                None => unassigned.push(Unassigned {
                    course: slot.course.to_string(),
                    reason: UnassignableReason::AllSectionsConflict,
                }),
            }
        }
        out.placements.extend(found);
        out.attempts = result.attempts;
        out.budget_exhausted = result.exhausted_budget;

        let position = |course: &str| courses.iter().position(|c| c == course);
        out.placements.sort_by_key(|p| position(p.course()));

        // Same-term prerequisites must hold over what was actually placed.
        // Pinned placements stay and count as satisfied for their dependents.
        let placed: BTreeSet<String> = out.placements.iter().map(|p| p.course().to_string()).collect();
        let mut satisfied = model.completed.clone();
        satisfied.extend(out.placements.iter().filter(|p| p.pinned).map(|p| p.course().to_string()));
        let mut stranded_issues = Vec::new();
        for (course, missing) in model.graph.unsatisfied_concurrent(&placed, &satisfied) {
            if satisfied.contains(&course) {
                continue;
            }
            debug!(course = %course, "placement dropped: prerequisite unplaced");
            out.placements.retain(|p| p.course() != course);
            stranded_issues.push(Issue::course(
                IssueKind::PrerequisiteUnmet,
                course.as_str(),
                format!(
                    "{course} unassignable: prerequisite {} could not be scheduled this term",
                    missing.join(", ")
                ),
            ));
            unassigned.push(Unassigned {
                course,
                reason: UnassignableReason::PrerequisiteUnplaced,
            });
        }
        unassigned.sort_by_key(|u| position(&u.course));

        for p in &out.placements {
            if let Some(relaxed) = p.relaxed {
                out.issues.push(Issue::course(
                    IssueKind::ConstraintRelaxed,
                    p.course(),
                    format!(
                        "Relaxed the {relaxed} preference to place {}",
                        p.section.describe()
                    ),
                ));
            }
        }
        for u in unassigned
            .iter()
            .filter(|u| u.reason != UnassignableReason::PrerequisiteUnplaced)
        {
            out.issues.push(Issue::course(
                u.reason.issue_kind(),
                u.course.as_str(),
                format!("{} unassignable: {}", u.course, u.reason),
            ));
        }
        out.issues.extend(stranded_issues);
        out.unassigned = unassigned;

        out.status = if out.placements.is_empty() {
            SolveStatus::InfeasibleEmpty
        } else if out.unassigned.is_empty() {
            SolveStatus::Complete
        } else {
            SolveStatus::Partial
        };
        out
    }
}

impl Default for SectionScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// One course in the search.
struct Slot<'a> {
    course: &'a str,
    /// Pool sections not overlapping any pin, ordered by CRN.
    sections: Vec<&'a Section>,
    relaxed: Option<Relaxed>,
}

/// Decision frame: candidate indices into the slot's sections and a cursor.
struct Frame {
    candidates: Vec<usize>,
    cursor: usize,
    picked: Option<usize>,
}

impl Frame {
    fn new(candidates: Vec<usize>) -> Self {
        Self {
            candidates,
            cursor: 0,
            picked: None,
        }
    }
}

struct SearchResult {
    /// Chosen index per slot.
    picks: Vec<Option<usize>>,
    attempts: usize,
    complete: bool,
    exhausted_budget: bool,
}

/// Conflict-free candidates of `slot`, ordered by resulting spread then CRN.
fn ordered_candidates(slot: &Slot<'_>, committed: &[&Section]) -> Vec<usize> {
    let mut ranked: Vec<(u32, &str, usize)> = slot
        .sections
        .iter()
        .enumerate()
        .filter(|(_, s)| !committed.iter().any(|c| c.conflicts_with(s)))
        .map(|(i, s)| (spread_with(committed.iter().copied(), s), s.crn.as_str(), i))
        .collect();
    ranked.sort_unstable();
    ranked.into_iter().map(|(_, _, i)| i).collect()
}

fn committed_for<'a>(pins: &[&'a Section], slots: &[Slot<'a>], path: &[usize]) -> Vec<&'a Section> {
    let mut committed = pins.to_vec();
    committed.extend(path.iter().enumerate().map(|(d, &i)| slots[d].sections[i]));
    committed
}

fn search(slots: &[Slot<'_>], pins: &[&Section], budget: usize) -> SearchResult {
    let n = slots.len();
    let mut result = SearchResult {
        picks: vec![None; n],
        attempts: 0,
        complete: n == 0,
        exhausted_budget: false,
    };
    if n == 0 {
        return result;
    }

    let mut best: Vec<usize> = Vec::new();
    let mut stack = vec![Frame::new(ordered_candidates(&slots[0], pins))];

    while let Some(top) = stack.last_mut() {
        if top.cursor == top.candidates.len() {
            stack.pop();
            continue;
        }
        if result.attempts >= budget {
            result.exhausted_budget = true;
            break;
        }
        top.picked = Some(top.candidates[top.cursor]);
        top.cursor += 1;
        result.attempts += 1;

        let path: Vec<usize> = stack.iter().filter_map(|f| f.picked).collect();
        if path.len() > best.len() {
            best = path.clone();
        }
        let depth = path.len();
        if depth == n {
            result.complete = true;
            break;
        }

        let committed = committed_for(pins, slots, &path);
        let dead_end = slots[depth..]
            .iter()
            .any(|s| !s.sections.iter().any(|x| !committed.iter().any(|c| c.conflicts_with(x))));
        if dead_end {
            continue;
        }
        stack.push(Frame::new(ordered_candidates(&slots[depth], &committed)));
    }

    // Keep the deepest prefix, then fill what is left greedily.
    let mut committed = committed_for(pins, slots, &best);
    for (d, &i) in best.iter().enumerate() {
        result.picks[d] = Some(i);
    }
    for d in best.len()..n {
        if let Some(&i) = ordered_candidates(&slots[d], &committed).first() {
            result.picks[d] = Some(i);
            committed.push(slots[d].sections[i]);
        }
    }
    result
}
