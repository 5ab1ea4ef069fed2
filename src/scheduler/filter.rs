//! Candidate section filtering.
//!
//! Sections are first filtered by every preference family. When that empties
//! the pool, soft families are relaxed one at a time (time window first,
//! then days, then both) and the relaxation is recorded. Hard families are
//! never relaxed; an empty pool then carries the reason.

use std::fmt;

use crate::constraint_model::ConstraintModel;
use crate::models::{ConstraintType, IssueKind, Section};

/// Why a course received no section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnassignableReason {
    /// The catalog lists no section for the course this term.
    NoOfferedSection,
    /// Every section meets on an excluded day.
    DayExclusion,
    /// Every section falls outside the allowed time window.
    TimeWindow,
    /// Every section violates one of the two hard preference families.
    DayOrTimeWindow,
    /// Every remaining section overlaps committed meetings.
    AllSectionsConflict,
    /// Placed, then dropped because a same-term prerequisite got no section.
    PrerequisiteUnplaced,
}

impl UnassignableReason {
    /// Issue category reported for this reason.
    pub fn issue_kind(self) -> IssueKind {
        match self {
            Self::NoOfferedSection => IssueKind::DataUnavailable,
            Self::AllSectionsConflict => IssueKind::ConflictUnresolvable,
            Self::PrerequisiteUnplaced => IssueKind::PrerequisiteUnmet,
            Self::DayExclusion | Self::TimeWindow | Self::DayOrTimeWindow => {
                IssueKind::PreferenceViolated
            }
        }
    }
}

impl fmt::Display for UnassignableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NoOfferedSection => "no offered section",
            Self::DayExclusion => "all sections violate day exclusion",
            Self::TimeWindow => "all sections violate time window",
            Self::DayOrTimeWindow => "all sections violate day exclusion or time window",
            Self::AllSectionsConflict => "all sections conflict with committed sections",
            Self::PrerequisiteUnplaced => "a same-term prerequisite could not be scheduled",
        };
        f.write_str(text)
    }
}

/// Preference family relaxed to build a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relaxed {
    TimeWindow,
    Days,
    Both,
}

impl fmt::Display for Relaxed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::TimeWindow => "time window",
            Self::Days => "day exclusion",
            Self::Both => "day exclusion and time window",
        };
        f.write_str(text)
    }
}

/// Sections eligible for one course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidatePool {
    /// Ordered by CRN.
    pub sections: Vec<Section>,
    /// Set when a soft family had to be dropped.
    pub relaxed: Option<Relaxed>,
}

/// Filters `sections` by the model's day and time preferences.
pub fn filter_candidates(
    model: &ConstraintModel,
    sections: &[Section],
) -> Result<CandidatePool, UnassignableReason> {
    if sections.is_empty() {
        return Err(UnassignableReason::NoOfferedSection);
    }

    let pick = |keep: &dyn Fn(&Section) -> bool| -> Vec<Section> {
        let mut kept: Vec<Section> = sections.iter().filter(|&s| keep(s)).cloned().collect();
        kept.sort_by(|a, b| a.crn.cmp(&b.crn));
        kept
    };

    let strict = pick(&|s: &Section| model.allows(s));
    if !strict.is_empty() {
        return Ok(CandidatePool {
            sections: strict,
            relaxed: None,
        });
    }

    let window_soft = model.window_rule == ConstraintType::Soft;
    let days_soft = model.day_rule == ConstraintType::Soft;

    let mut attempts: Vec<(Relaxed, Box<dyn Fn(&Section) -> bool + '_>)> = Vec::new();
    if window_soft {
        attempts.push((Relaxed::TimeWindow, Box::new(|s: &Section| model.allows_days(s))));
    }
    if days_soft {
        attempts.push((Relaxed::Days, Box::new(|s: &Section| model.allows_window(s))));
    }
    if window_soft && days_soft {
        attempts.push((Relaxed::Both, Box::new(|_: &Section| true)));
    }

    for (relaxed, keep) in attempts {
        let pool = pick(&*keep);
        if !pool.is_empty() {
            return Ok(CandidatePool {
                sections: pool,
                relaxed: Some(relaxed),
            });
        }
    }

    let days_block = !days_soft && sections.iter().all(|s| !model.allows_days(s));
    let window_block = !window_soft && sections.iter().all(|s| !model.allows_window(s));
    Err(match (days_block, window_block) {
        (true, false) => UnassignableReason::DayExclusion,
        (false, true) => UnassignableReason::TimeWindow,
        _ => UnassignableReason::DayOrTimeWindow,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SolverConfig;
    use crate::models::{Constraints, RequirementSet, Weekday::*};

    fn model(c: Constraints) -> ConstraintModel {
        ConstraintModel::build(&RequirementSet::new(), &c, &SolverConfig::default())
    }

    fn sections() -> Vec<Section> {
        vec![
            Section::new("CS1501", "300").with_meetings(&[Mon, Wed, Fri], 480, 530),
            Section::new("CS1501", "100").with_meetings(&[Tue, Thu], 600, 675),
            Section::new("CS1501", "200").with_meetings(&[Fri], 600, 750),
        ]
    }

    fn crns(pool: &CandidatePool) -> Vec<&str> {
        pool.sections.iter().map(|s| s.crn.as_str()).collect()
    }

    #[test]
    fn test_no_sections() {
        assert_eq!(
            filter_candidates(&model(Constraints::new()), &[]),
            Err(UnassignableReason::NoOfferedSection)
        );
    }

    #[test]
    fn test_strict_pool_sorted() {
        let pool = filter_candidates(&model(Constraints::new()), &sections()).unwrap();
        assert_eq!(crns(&pool), vec!["100", "200", "300"]);
        assert!(pool.relaxed.is_none());

        let pool =
            filter_candidates(&model(Constraints::new().exclude_day(Fri)), &sections()).unwrap();
        assert_eq!(crns(&pool), vec!["100"]);
    }

    #[test]
    fn test_hard_day_exclusion() {
        let only_friday = vec![Section::new("CS1550", "1").with_meeting(Fri, 600, 650)];
        let err = filter_candidates(&model(Constraints::new().exclude_day(Fri)), &only_friday)
            .unwrap_err();
        assert_eq!(err, UnassignableReason::DayExclusion);
        assert_eq!(err.to_string(), "all sections violate day exclusion");
    }

    #[test]
    fn test_soft_window_relaxed() {
        // Nothing off Friday fits 07:00-09:00
        let c = Constraints::new().exclude_day(Fri).with_window(420, 540);
        let pool = filter_candidates(&model(c), &sections()).unwrap();
        assert_eq!(pool.relaxed, Some(Relaxed::TimeWindow));
        assert_eq!(crns(&pool), vec!["100"]);
    }

    #[test]
    fn test_hard_window() {
        let c = Constraints::new()
            .with_window(1080, 1200)
            .with_window_rule(ConstraintType::Hard);
        let err = filter_candidates(&model(c), &sections()).unwrap_err();
        assert_eq!(err, UnassignableReason::TimeWindow);
    }

    #[test]
    fn test_soft_days_relaxed() {
        let only_friday = vec![Section::new("CS1550", "1").with_meeting(Fri, 600, 650)];
        let c = Constraints::new()
            .exclude_day(Fri)
            .with_day_rule(ConstraintType::Soft);
        let pool = filter_candidates(&model(c), &only_friday).unwrap();
        assert_eq!(pool.relaxed, Some(Relaxed::Days));
    }

    #[test]
    fn test_both_hard_mixed_violations() {
        let c = Constraints::new()
            .exclude_day(Fri)
            .with_window(540, 720)
            .with_window_rule(ConstraintType::Hard);
        // 300 too early, 200 on Friday, 100 fits: pool is non-empty
        assert!(filter_candidates(&model(c.clone()), &sections()).is_ok());

        let mixed = vec![sections()[0].clone(), sections()[2].clone()];
        // Both remaining sections break both families
        assert_eq!(
            filter_candidates(&model(c), &mixed),
            Err(UnassignableReason::DayOrTimeWindow)
        );
    }
}
