//! Term schedule builder for degree planning.
//!
//! Selects which courses fill a student's degree requirements for a term,
//! assigns one conflict-free section per course under day, time-window and
//! credit preferences, and re-optimizes incrementally as preferences change
//! while keeping pinned sections in place.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Section`, `Meeting`, `Course`,
//!   `RequirementSet`, `Constraints`, `ConstraintDelta`, `SchedulePlan`
//! - **`prereq`**: Prerequisite graph (same-term and prior-term edges)
//! - **`validation`**: Requirement set integrity checks (duplicates, groups, cycles)
//! - **`constraint_model`**: Normalized constraint set shared by the solver stages
//! - **`planner`**: Course selection with a configurable rule policy
//! - **`scheduler`**: Section assignment by bounded backtracking, plan KPIs
//! - **`explain`**: Ordered explanations and alternative sections
//! - **`session`**: Session state, stores and per-session locking
//! - **`providers`**: Requirement, catalog and preference collaborators
//! - **`service`**: `build` / `optimize` entry points
//!
//! # Architecture
//!
//! The solver stages are pure functions over immutable inputs. All I/O
//! (requirement lookup, catalog fetch, session load/save) happens in
//! [`service::ScheduleService`] before and after a solve. Infeasibility is
//! reported through [`models::Issue`]s on a partial plan, never as an error.
//!
//! # References
//!
//! - Haralick & Elliott (1980), "Increasing Tree Search Efficiency for
//!   Constraint Satisfaction Problems"
//! - Schaerf (1999), "A Survey of Automated Timetabling"

pub mod config;
pub mod constraint_model;
pub mod error;
pub mod explain;
pub mod models;
pub mod planner;
pub mod prereq;
pub mod providers;
pub mod scheduler;
pub mod service;
pub mod session;
pub mod validation;

pub use config::SolverConfig;
pub use error::{Result, ScheduleError};
pub use service::{solve, ScheduleService};
