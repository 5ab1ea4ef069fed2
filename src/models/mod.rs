//! Course scheduling domain models.
//!
//! Provides the data types shared by the planner, the section scheduler and
//! the session layer.
//!
//! # Domain Mappings
//!
//! | u-course-schedule | Registrar | Degree audit |
//! |-------------------|-----------|--------------|
//! | Course | Catalog course | Requirement line |
//! | Section | Class (CRN) | - |
//! | Meeting | Meeting pattern | - |
//! | RequirementSet | - | Program requirements |
//! | SchedulePlan | Enrollment cart | Term plan |

mod constraints;
mod course;
mod meeting;
mod plan;
mod requirement;
mod section;
pub mod term;

pub use constraints::{ConstraintDelta, ConstraintType, Constraints, CreditTarget};
pub use course::{normalize_course_code, split_course_code, Course};
pub use meeting::{
    format_clock, meetings_conflict, parse_clock, FormatError, Meeting, Minute, TimeWindow,
    Weekday, END_OF_DAY,
};
pub use plan::{Alternative, Issue, IssueKind, SchedulePlan, SolveStatus};
pub use requirement::{ChooseFrom, GroupKind, Prereq, RequirementSet};
pub use section::{Section, DEFAULT_SECTION_CREDITS};
