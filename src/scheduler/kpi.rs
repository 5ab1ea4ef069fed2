//! Weekly schedule quality metrics (KPIs).
//!
//! Computes compactness indicators from a set of chosen sections.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Days on campus | Weekdays with at least one meeting |
//! | Total daily spread | Sum over days of (last end - first start) |
//! | Total gap | Sum over days of idle minutes between meetings |
//! | Earliest start | First meeting start across the week |
//! | Latest end | Last meeting end across the week |
//!
//! Total daily spread is the scheduler's first tie-break between
//! conflict-free candidate sections.

use std::collections::BTreeMap;

use crate::models::{Minute, Section, Weekday};

/// Weekly schedule indicators. All times are minutes since midnight.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanKpi {
    pub days_on_campus: usize,
    pub total_daily_spread: u32,
    pub total_gap_minutes: u32,
    pub earliest_start: Option<Minute>,
    pub latest_end: Option<Minute>,
    pub total_credits: u32,
}

impl PlanKpi {
    /// Computes KPIs for a set of sections.
    pub fn calculate<'a, I>(sections: I) -> Self
    where
        I: IntoIterator<Item = &'a Section>,
    {
        let mut by_day: BTreeMap<Weekday, Vec<(Minute, Minute)>> = BTreeMap::new();
        let mut total_credits = 0;
        for section in sections {
            total_credits += section.credits;
            for m in &section.meetings {
                by_day.entry(m.day).or_default().push((m.start, m.end));
            }
        }

        let mut kpi = Self {
            days_on_campus: by_day.len(),
            total_credits,
            ..Self::default()
        };

        for blocks in by_day.values_mut() {
            blocks.sort_unstable();
            let first = blocks[0].0;
            let mut last_end = blocks[0].1;
            let mut gap = 0u32;
            for &(start, end) in &blocks[1..] {
                if start > last_end {
                    gap += u32::from(start - last_end);
                }
                last_end = last_end.max(end);
            }

            kpi.total_daily_spread += u32::from(last_end - first);
            kpi.total_gap_minutes += gap;
            kpi.earliest_start = Some(kpi.earliest_start.map_or(first, |e| e.min(first)));
            kpi.latest_end = Some(kpi.latest_end.map_or(last_end, |l| l.max(last_end)));
        }

        kpi
    }
}

/// Total daily spread of `committed` plus `candidate`.
pub fn spread_with<'a, I>(committed: I, candidate: &'a Section) -> u32
where
    I: IntoIterator<Item = &'a Section>,
{
    PlanKpi::calculate(committed.into_iter().chain(std::iter::once(candidate))).total_daily_spread
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Weekday::*;

    #[test]
    fn test_kpi_basic() {
        let sections = vec![
            Section::new("CS0445", "1")
                .with_credits(4)
                .with_meetings(&[Mon, Wed], 600, 675),
            Section::new("CS1501", "2").with_meetings(&[Mon], 780, 830),
            Section::new("CS1550", "3").with_meetings(&[Tue, Thu], 540, 615),
        ];
        let kpi = PlanKpi::calculate(&sections);

        assert_eq!(kpi.days_on_campus, 4);
        // Mon 600..830 = 230, Wed 75, Tue 75, Thu 75
        assert_eq!(kpi.total_daily_spread, 230 + 75 * 3);
        // Mon idle 675..780
        assert_eq!(kpi.total_gap_minutes, 105);
        assert_eq!(kpi.earliest_start, Some(540));
        assert_eq!(kpi.latest_end, Some(830));
        assert_eq!(kpi.total_credits, 10);
    }

    #[test]
    fn test_empty() {
        let kpi = PlanKpi::calculate(std::iter::empty());
        assert_eq!(kpi, PlanKpi::default());
    }

    #[test]
    fn test_spread_with_prefers_compact() {
        let committed = vec![Section::new("CS0445", "1").with_meetings(&[Mon, Wed], 600, 675)];
        let adjacent = Section::new("CS1501", "2").with_meetings(&[Mon, Wed], 690, 765);
        let far = Section::new("CS1501", "3").with_meetings(&[Mon, Wed], 900, 975);
        assert!(spread_with(&committed, &adjacent) < spread_with(&committed, &far));
    }
}
