//! Section (course offering) model.
//!
//! A section is one concrete offering of a course in a term: a registrar
//! reference number (CRN), a label such as `LEC-1020`, and its weekly
//! meetings. Sections are read-only input to a solve.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{meetings_conflict, Meeting, Minute, TimeWindow, Weekday};

/// Default credit value when a catalog feed omits it.
pub const DEFAULT_SECTION_CREDITS: u32 = 3;

/// One offering of a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Course code this section belongs to (e.g., `CS0445`).
    pub course: String,
    /// Registrar reference number, unique within the term.
    pub crn: String,
    /// Human-readable section label (e.g., `LEC-1020`).
    #[serde(rename = "section")]
    pub label: String,
    /// Weekly meetings, ordered by day then start.
    pub meetings: Vec<Meeting>,
    /// Credit value.
    pub credits: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl Section {
    /// Creates a section with no meetings and the default credit value.
    pub fn new(course: impl Into<String>, crn: impl Into<String>) -> Self {
        Self {
            course: course.into(),
            crn: crn.into(),
            label: String::new(),
            meetings: Vec::new(),
            credits: DEFAULT_SECTION_CREDITS,
            instructor: None,
            location: None,
        }
    }

    /// Sets the section label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Adds a single meeting.
    pub fn with_meeting(mut self, day: Weekday, start: Minute, end: Minute) -> Self {
        self.meetings.push(Meeting::new(day, start, end));
        self.meetings.sort_by_key(|m| (m.day, m.start));
        self
    }

    /// Adds the same time block on each of `days`.
    pub fn with_meetings(mut self, days: &[Weekday], start: Minute, end: Minute) -> Self {
        for &day in days {
            self = self.with_meeting(day, start, end);
        }
        self
    }

    /// Sets the credit value.
    pub fn with_credits(mut self, credits: u32) -> Self {
        self.credits = credits;
        self
    }

    /// Sets the instructor.
    pub fn with_instructor(mut self, instructor: impl Into<String>) -> Self {
        self.instructor = Some(instructor.into());
        self
    }

    /// Sets the room.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Whether any meeting of `self` overlaps any meeting of `other`.
    pub fn conflicts_with(&self, other: &Section) -> bool {
        meetings_conflict(&self.meetings, &other.meetings)
    }

    /// Distinct days this section meets on.
    pub fn days(&self) -> BTreeSet<Weekday> {
        self.meetings.iter().map(|m| m.day).collect()
    }

    /// Whether the section meets on any of `days`.
    pub fn meets_on_any(&self, days: &BTreeSet<Weekday>) -> bool {
        self.meetings.iter().any(|m| days.contains(&m.day))
    }

    /// Whether every meeting lies inside `window`.
    pub fn fits_window(&self, window: &TimeWindow) -> bool {
        self.meetings.iter().all(|m| window.covers(&m.window()))
    }

    /// Compact schedule summary (`Mon/Wed 10:00-11:15`).
    ///
    /// Meetings sharing a time range are grouped.
    pub fn schedule_summary(&self) -> String {
        if self.meetings.is_empty() {
            return "no scheduled meetings".to_string();
        }
        let mut groups: Vec<(TimeWindow, Vec<Weekday>)> = Vec::new();
        for m in &self.meetings {
            match groups.iter_mut().find(|(w, _)| *w == m.window()) {
                Some((_, days)) => days.push(m.day),
                None => groups.push((m.window(), vec![m.day])),
            }
        }
        groups
            .iter()
            .map(|(w, days)| {
                let names: Vec<&str> = days.iter().map(|d| d.as_str()).collect();
                format!("{} {}", names.join("/"), w)
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `COURSE LABEL (CRN n)` display form.
    pub fn describe(&self) -> String {
        if self.label.is_empty() {
            format!("{} (CRN {})", self.course, self.crn)
        } else {
            format!("{} {} (CRN {})", self.course, self.label, self.crn)
        }
    }
}
