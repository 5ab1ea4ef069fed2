//! Selection state passed to selection rules.

/// A course eligible for a choose-from group.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateCourse {
    pub code: String,
    pub credits: u32,
    /// Every prerequisite is already completed.
    pub prerequisites_satisfied: bool,
}

impl CandidateCourse {
    /// Creates a candidate with unsatisfied prerequisites.
    pub fn new(code: impl Into<String>, credits: u32) -> Self {
        Self {
            code: code.into(),
            credits,
            prerequisites_satisfied: false,
        }
    }

    pub fn satisfied(mut self) -> Self {
        self.prerequisites_satisfied = true;
        self
    }
}

/// Running totals at the moment a group member is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SelectionContext {
    /// Credits left before the maximum is reached.
    pub remaining_credits: u32,
    /// Courses the current group still needs.
    pub remaining_slots: usize,
}

impl SelectionContext {
    pub fn new(remaining_credits: u32, remaining_slots: usize) -> Self {
        Self {
            remaining_credits,
            remaining_slots,
        }
    }

    /// Credits per remaining slot if the budget were split evenly.
    pub fn credits_per_slot(&self) -> f64 {
        self.remaining_credits as f64 / self.remaining_slots.max(1) as f64
    }
}
