//! Section scheduling and weekly schedule metrics.
//!
//! Assigns one concrete section per selected course so that no two chosen
//! sections overlap, honoring pins and day/time preferences.
//!
//! # Algorithm
//!
//! `SectionScheduler` runs a bounded depth-first search over an explicit
//! stack with most-constrained-first course ordering and forward checking.
//! Soft preferences are relaxed per course only when nothing else fits.
//!
//! # KPI
//!
//! `PlanKpi` computes compactness metrics: days on campus, daily spread,
//! idle gaps, and the earliest and latest meeting.
//!
//! # References
//!
//! - Haralick & Elliott (1980), "Increasing Tree Search Efficiency for
//!   Constraint Satisfaction Problems"
//! - Russell & Norvig (2021), "Artificial Intelligence: A Modern Approach", Ch. 6

mod filter;
mod kpi;
mod search;

pub use filter::{filter_candidates, CandidatePool, Relaxed, UnassignableReason};
pub use kpi::{spread_with, PlanKpi};
pub use search::{Placement, ScheduleOutcome, SectionScheduler, Unassigned};
