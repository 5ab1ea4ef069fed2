//! Course model and course-code normalization.
//!
//! A course is identified by its code (`CS0445`) and carries a credit value
//! and the set of courses it requires. Courses are immutable once loaded
//! for a term.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::Section;

/// A course as seen by the planner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Unique course code.
    pub code: String,
    /// Credit value.
    pub credits: u32,
    /// Codes of prerequisite courses (possibly empty).
    pub prerequisites: BTreeSet<String>,
}

impl Course {
    /// Creates a course with no prerequisites.
    pub fn new(code: impl Into<String>, credits: u32) -> Self {
        Self {
            code: code.into(),
            credits,
            prerequisites: BTreeSet::new(),
        }
    }

    /// Adds a prerequisite.
    pub fn with_prerequisite(mut self, code: impl Into<String>) -> Self {
        self.prerequisites.insert(code.into());
        self
    }

    /// Derives a course from its offered sections.
    ///
    /// Credits come from the highest-credit section (lab/lecture pairs are
    /// listed with the lecture's value). Returns `None` when no section is
    /// offered.
    pub fn from_sections(code: impl Into<String>, sections: &[Section]) -> Option<Self> {
        let credits = sections.iter().map(|s| s.credits).max()?;
        Some(Self::new(code, credits))
    }
}

/// Normalizes a free-form course code.
///
/// Strips trailing descriptions (`"PHYS 0475 - Intro to Physics"`), removes
/// whitespace and uppercases. Returns `None` unless the result is 3-10
/// alphanumeric characters.
///
/// ```
/// use u_course_schedule::models::normalize_course_code;
///
/// assert_eq!(normalize_course_code("cs 0445 - Data Structures"), Some("CS0445".into()));
/// assert_eq!(normalize_course_code("??"), None);
/// ```
pub fn normalize_course_code(raw: &str) -> Option<String> {
    let head = raw.split('-').next().unwrap_or_default();
    let code: String = head
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect();

    let valid = (3..=10).contains(&code.len()) && code.chars().all(|c| c.is_ascii_alphanumeric());
    valid.then_some(code)
}

/// Splits a normalized code into subject and zero-padded 4-digit number.
///
/// `CS445` becomes `("CS", "0445")`. Returns `None` without a subject or
/// number part, or when the number exceeds four digits.
pub fn split_course_code(code: &str) -> Option<(String, String)> {
    let subject: String = code.chars().filter(|c| c.is_ascii_alphabetic()).collect();
    let number: String = code.chars().filter(|c| c.is_ascii_digit()).collect();
    if subject.is_empty() || number.is_empty() || number.len() > 4 {
        return None;
    }
    Some((subject, format!("{number:0>4}")))
}
