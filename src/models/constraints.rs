//! User scheduling constraints and their incremental deltas.
//!
//! [`Constraints`] is the cumulative preference state of a session: day
//! exclusions, a time window, pinned sections, skipped and completed
//! courses, and a credit target. [`ConstraintDelta`] is what a later
//! optimize call brings; [`Constraints::merge`] folds it in without
//! silently dropping earlier exclusions.
//!
//! # Merge Rules
//! - Day exclusions accumulate; only `include_days` removes one.
//! - Time bounds tighten (later earliest start, earlier latest end) unless
//!   `replace_window` is set.
//! - A pin overwrites only the same course's earlier pin; `unpin` removes.
//! - Skips accumulate; `unskip` removes. Skipping a course drops its pin and
//!   pinning a course clears its skip.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::{Minute, TimeWindow, Weekday, END_OF_DAY};

/// Whether a preference family may be relaxed.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintType {
    /// Must be satisfied; violating sections are never chosen.
    Hard,
    /// Should be satisfied; relaxed (and reported) when nothing else fits.
    #[default]
    Soft,
}

/// Target credit load for a term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditTarget {
    pub min: u32,
    pub max: u32,
}

impl CreditTarget {
    /// A `[min, max]` range. Bounds are swapped if given inverted.
    pub fn range(min: u32, max: u32) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// An exact credit count.
    pub fn exact(credits: u32) -> Self {
        Self::range(credits, credits)
    }

    /// Whether `credits` lies within the target.
    pub fn contains(&self, credits: u32) -> bool {
        credits >= self.min && credits <= self.max
    }
}

/// Cumulative scheduling constraints for a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Constraints {
    /// Days no section may meet on.
    pub excluded_days: BTreeSet<Weekday>,
    /// No meeting may start before this minute.
    pub earliest_start: Option<Minute>,
    /// No meeting may end after this minute.
    pub latest_end: Option<Minute>,
    /// Strictness of day exclusions.
    pub day_rule: ConstraintType,
    /// Strictness of the time window.
    pub window_rule: ConstraintType,
    /// Pinned sections: course code → CRN.
    pub pins: BTreeMap<String, String>,
    /// Pinned courses, oldest pin first.
    pub pin_order: Vec<String>,
    /// Courses excluded from consideration.
    pub skipped: BTreeSet<String>,
    /// Courses already completed in earlier terms.
    pub completed: BTreeSet<String>,
    /// Credit load target; overrides requirement bounds when set.
    pub target_credits: Option<CreditTarget>,
}

impl Default for Constraints {
    fn default() -> Self {
        Self {
            excluded_days: BTreeSet::new(),
            earliest_start: None,
            latest_end: None,
            day_rule: ConstraintType::Hard,
            window_rule: ConstraintType::Soft,
            pins: BTreeMap::new(),
            pin_order: Vec::new(),
            skipped: BTreeSet::new(),
            completed: BTreeSet::new(),
            target_credits: None,
        }
    }
}

impl Constraints {
    /// Creates an unconstrained set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Excludes a day.
    pub fn exclude_day(mut self, day: Weekday) -> Self {
        self.excluded_days.insert(day);
        self
    }

    /// Sets the allowed time window.
    pub fn with_window(mut self, earliest_start: Minute, latest_end: Minute) -> Self {
        self.earliest_start = Some(earliest_start);
        self.latest_end = Some(latest_end);
        self
    }

    /// Sets day-exclusion strictness.
    pub fn with_day_rule(mut self, rule: ConstraintType) -> Self {
        self.day_rule = rule;
        self
    }

    /// Sets time-window strictness.
    pub fn with_window_rule(mut self, rule: ConstraintType) -> Self {
        self.window_rule = rule;
        self
    }

    /// Pins `course` to section `crn`.
    pub fn pin(mut self, course: impl Into<String>, crn: impl Into<String>) -> Self {
        let course = course.into();
        self.skipped.remove(&course);
        self.set_pin(course, crn.into());
        self
    }

    /// Skips a course.
    pub fn skip(mut self, course: impl Into<String>) -> Self {
        let course = course.into();
        self.remove_pin(&course);
        self.skipped.insert(course);
        self
    }

    /// Marks a course completed.
    pub fn complete(mut self, course: impl Into<String>) -> Self {
        self.completed.insert(course.into());
        self
    }

    /// Sets the credit target.
    pub fn with_target(mut self, target: CreditTarget) -> Self {
        self.target_credits = Some(target);
        self
    }

    /// The allowed window, if any bound is set.
    pub fn window(&self) -> Option<TimeWindow> {
        if self.earliest_start.is_none() && self.latest_end.is_none() {
            return None;
        }
        Some(TimeWindow::new(
            self.earliest_start.unwrap_or(0),
            self.latest_end.unwrap_or(END_OF_DAY),
        ))
    }

    /// Pinned CRN for `course`.
    pub fn pin_for(&self, course: &str) -> Option<&str> {
        self.pins.get(course).map(String::as_str)
    }

    /// Records a pin as the newest one, replacing any earlier pin of `course`.
    fn set_pin(&mut self, course: String, crn: String) {
        self.pin_order.retain(|c| *c != course);
        self.pin_order.push(course.clone());
        self.pins.insert(course, crn);
    }

    fn remove_pin(&mut self, course: &str) {
        self.pin_order.retain(|c| c != course);
        self.pins.remove(course);
    }

    /// Folds a delta into the cumulative constraints.
    pub fn merge(&mut self, delta: &ConstraintDelta) {
        for day in &delta.include_days {
            self.excluded_days.remove(day);
        }
        self.excluded_days.extend(delta.exclude_days.iter().copied());

        if delta.replace_window {
            self.earliest_start = delta.earliest_start;
            self.latest_end = delta.latest_end;
        } else {
            self.earliest_start = tighten(self.earliest_start, delta.earliest_start, Minute::max);
            self.latest_end = tighten(self.latest_end, delta.latest_end, Minute::min);
        }

        if let Some(rule) = delta.day_rule {
            self.day_rule = rule;
        }
        if let Some(rule) = delta.window_rule {
            self.window_rule = rule;
        }

        for course in &delta.unpin {
            self.remove_pin(course);
        }
        for course in &delta.unskip {
            self.skipped.remove(course);
        }
        for course in &delta.skip {
            self.remove_pin(course);
            self.skipped.insert(course.clone());
        }
        for (course, crn) in &delta.pin {
            self.skipped.remove(course);
            self.set_pin(course.clone(), crn.clone());
        }

        self.completed.extend(delta.completed.iter().cloned());

        if delta.target_credits.is_some() {
            self.target_credits = delta.target_credits;
        }
    }
}

fn tighten(
    current: Option<Minute>,
    incoming: Option<Minute>,
    pick: fn(Minute, Minute) -> Minute,
) -> Option<Minute> {
    match (current, incoming) {
        (Some(a), Some(b)) => Some(pick(a, b)),
        (a, b) => a.or(b),
    }
}

/// Changes requested by one optimize call.
///
/// Every field is additive; an empty delta leaves [`Constraints`] unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConstraintDelta {
    pub exclude_days: BTreeSet<Weekday>,
    /// Explicitly lifts earlier day exclusions.
    pub include_days: BTreeSet<Weekday>,
    pub earliest_start: Option<Minute>,
    pub latest_end: Option<Minute>,
    /// Replace the window instead of tightening it.
    pub replace_window: bool,
    pub day_rule: Option<ConstraintType>,
    pub window_rule: Option<ConstraintType>,
    pub pin: BTreeMap<String, String>,
    pub unpin: BTreeSet<String>,
    pub skip: BTreeSet<String>,
    pub unskip: BTreeSet<String>,
    pub completed: BTreeSet<String>,
    pub target_credits: Option<CreditTarget>,
}

impl ConstraintDelta {
    /// Creates an empty delta.
    pub fn new() -> Self {
        Self::default()
    }

    /// Excludes a day.
    pub fn exclude_day(mut self, day: Weekday) -> Self {
        self.exclude_days.insert(day);
        self
    }

    /// Lifts a day exclusion.
    pub fn include_day(mut self, day: Weekday) -> Self {
        self.include_days.insert(day);
        self
    }

    /// Requests a time window (tightening the current one).
    pub fn with_window(mut self, earliest_start: Minute, latest_end: Minute) -> Self {
        self.earliest_start = Some(earliest_start);
        self.latest_end = Some(latest_end);
        self
    }

    /// Replaces the current window outright.
    pub fn replacing_window(mut self, earliest_start: Option<Minute>, latest_end: Option<Minute>) -> Self {
        self.earliest_start = earliest_start;
        self.latest_end = latest_end;
        self.replace_window = true;
        self
    }

    /// Pins a section.
    pub fn pin(mut self, course: impl Into<String>, crn: impl Into<String>) -> Self {
        self.pin.insert(course.into(), crn.into());
        self
    }

    /// Removes a pin.
    pub fn unpin(mut self, course: impl Into<String>) -> Self {
        self.unpin.insert(course.into());
        self
    }

    /// Skips a course.
    pub fn skip(mut self, course: impl Into<String>) -> Self {
        self.skip.insert(course.into());
        self
    }

    /// Lifts a skip.
    pub fn unskip(mut self, course: impl Into<String>) -> Self {
        self.unskip.insert(course.into());
        self
    }

    /// Marks a course completed.
    pub fn complete(mut self, course: impl Into<String>) -> Self {
        self.completed.insert(course.into());
        self
    }

    /// Sets the credit target.
    pub fn with_target(mut self, target: CreditTarget) -> Self {
        self.target_credits = Some(target);
        self
    }

    /// Whether the delta touches pins at all.
    pub fn changes_pins(&self) -> bool {
        !self.pin.is_empty() || !self.unpin.is_empty() || !self.skip.is_empty()
    }

    /// Whether applying the delta would change nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
