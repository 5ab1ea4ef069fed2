//! Weekly meeting times.
//!
//! A section meets on one or more weekdays, each meeting occupying a
//! half-open `[start, end)` range of minutes since midnight.
//!
//! # Registrar Formats
//! Catalog feeds describe days compactly (`MoWeFr`) and clock times in
//! several shapes (`09:30`, `9.30`, `0930`). [`Weekday::parse_compact`] and
//! [`parse_clock`] accept all of them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Minutes since midnight.
pub type Minute = u16;

/// Last minute of the day (exclusive bound for windows).
pub const END_OF_DAY: Minute = 24 * 60;

/// Errors raised when parsing registrar day/time notation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("unknown weekday: {0:?}")]
    Weekday(String),

    #[error("invalid clock time: {0:?}")]
    Clock(String),
}

/// A teaching day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
}

impl Weekday {
    /// All teaching days, Monday first.
    pub const ALL: [Weekday; 5] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
    ];

    /// Three-letter name (`Mon`, `Tue`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Weekday::Mon => "Mon",
            Weekday::Tue => "Tue",
            Weekday::Wed => "Wed",
            Weekday::Thu => "Thu",
            Weekday::Fri => "Fri",
        }
    }

    /// Parses two-letter compact notation such as `MoWeFr` or `TuTh`.
    ///
    /// Duplicates are collapsed; order of first appearance is kept.
    pub fn parse_compact(raw: &str) -> Result<Vec<Weekday>, FormatError> {
        let chars: Vec<char> = raw.chars().filter(|c| !c.is_whitespace()).collect();
        if chars.len() % 2 != 0 {
            return Err(FormatError::Weekday(raw.to_string()));
        }

        let mut days = Vec::new();
        for pair in chars.chunks(2) {
            let token: String = pair.iter().collect();
            let day = match token.as_str() {
                "Mo" => Weekday::Mon,
                "Tu" => Weekday::Tue,
                "We" => Weekday::Wed,
                "Th" => Weekday::Thu,
                "Fr" => Weekday::Fri,
                _ => return Err(FormatError::Weekday(token)),
            };
            if !days.contains(&day) {
                days.push(day);
            }
        }
        Ok(days)
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Weekday {
    type Err = FormatError;

    /// Accepts full or abbreviated names, case-insensitive (`fri`, `Friday`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let day = match lower.get(..3).unwrap_or(lower.as_str()) {
            "mon" => Weekday::Mon,
            "tue" => Weekday::Tue,
            "wed" => Weekday::Wed,
            "thu" => Weekday::Thu,
            "fri" => Weekday::Fri,
            _ => return Err(FormatError::Weekday(s.to_string())),
        };
        Ok(day)
    }
}

/// Parses a clock time into minutes since midnight.
///
/// Accepts `HH:MM`, `H:MM`, `HH.MM` and `HHMM`.
pub fn parse_clock(raw: &str) -> Result<Minute, FormatError> {
    let t = raw.trim();
    let err = || FormatError::Clock(raw.to_string());

    let (hh, mm) = if let Some((h, m)) = t.split_once(':').or_else(|| t.split_once('.')) {
        (h, m)
    } else if t.len() == 4 && t.chars().all(|c| c.is_ascii_digit()) {
        t.split_at(2)
    } else {
        return Err(err());
    };

    let hours: u16 = hh.parse().map_err(|_| err())?;
    // "15.3" means 15:30 in some feeds
    let minutes: u16 = match mm.len() {
        1 => mm.parse::<u16>().map_err(|_| err())? * 10,
        2 => mm.parse().map_err(|_| err())?,
        _ => return Err(err()),
    };

    if hours > 23 || minutes > 59 {
        return Err(err());
    }
    Ok(hours * 60 + minutes)
}

/// Formats minutes since midnight as `HH:MM`.
pub fn format_clock(minute: Minute) -> String {
    format!("{:02}:{:02}", minute / 60, minute % 60)
}

/// A minute-of-day interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Interval start (inclusive).
    pub start: Minute,
    /// Interval end (exclusive).
    pub end: Minute,
}

impl TimeWindow {
    /// Creates a new window.
    pub fn new(start: Minute, end: Minute) -> Self {
        Self { start, end }
    }

    /// The whole day.
    pub fn all_day() -> Self {
        Self::new(0, END_OF_DAY)
    }

    /// Window length in minutes.
    #[inline]
    pub fn duration(&self) -> Minute {
        self.end.saturating_sub(self.start)
    }

    /// Whether `other` lies entirely inside this window.
    #[inline]
    pub fn covers(&self, other: &TimeWindow) -> bool {
        other.start >= self.start && other.end <= self.end
    }

    /// Whether two windows overlap. Touching windows do not.
    #[inline]
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", format_clock(self.start), format_clock(self.end))
    }
}

/// A single weekly time block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meeting {
    pub day: Weekday,
    pub start: Minute,
    pub end: Minute,
}

impl Meeting {
    /// Creates a meeting on `day` over `[start, end)`.
    pub fn new(day: Weekday, start: Minute, end: Minute) -> Self {
        Self { day, start, end }
    }

    /// The meeting's time range, ignoring the day.
    #[inline]
    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.start, self.end)
    }

    /// Same day and overlapping minute ranges.
    #[inline]
    pub fn conflicts_with(&self, other: &Meeting) -> bool {
        self.day == other.day && self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for Meeting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.day, self.window())
    }
}

/// Whether any meeting in `a` conflicts with any meeting in `b`.
pub fn meetings_conflict(a: &[Meeting], b: &[Meeting]) -> bool {
    a.iter().any(|x| b.iter().any(|y| x.conflicts_with(y)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_clock_formats() {
        assert_eq!(parse_clock("09:30"), Ok(570));
        assert_eq!(parse_clock("9:30"), Ok(570));
        assert_eq!(parse_clock("15.00"), Ok(900));
        assert_eq!(parse_clock("15.3"), Ok(930));
        assert_eq!(parse_clock("1015"), Ok(615));
        assert!(parse_clock("25:00").is_err());
        assert!(parse_clock("noon").is_err());
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(570), "09:30");
        assert_eq!(format_clock(0), "00:00");
    }

    #[test]
    fn test_weekday_parse() {
        assert_eq!("fri".parse::<Weekday>(), Ok(Weekday::Fri));
        assert_eq!("Thursday".parse::<Weekday>(), Ok(Weekday::Thu));
        assert!("Sat".parse::<Weekday>().is_err());
    }

    #[test]
    fn test_parse_compact_days() {
        assert_eq!(
            Weekday::parse_compact("MoWeFr").unwrap(),
            vec![Weekday::Mon, Weekday::Wed, Weekday::Fri]
        );
        assert_eq!(
            Weekday::parse_compact("TuTh").unwrap(),
            vec![Weekday::Tue, Weekday::Thu]
        );
        assert!(Weekday::parse_compact("MoW").is_err());
        assert!(Weekday::parse_compact("SaSu").is_err());
    }

    #[test]
    fn test_meeting_conflict() {
        let a = Meeting::new(Weekday::Mon, 600, 675);
        let b = Meeting::new(Weekday::Mon, 630, 705);
        let c = Meeting::new(Weekday::Tue, 630, 705);
        let d = Meeting::new(Weekday::Mon, 675, 750); // touches a

        assert!(a.conflicts_with(&b));
        assert!(b.conflicts_with(&a));
        assert!(!a.conflicts_with(&c));
        assert!(!a.conflicts_with(&d));
    }

    #[test]
    fn test_window_covers() {
        let w = TimeWindow::new(540, 1020);
        assert!(w.covers(&TimeWindow::new(540, 615)));
        assert!(!w.covers(&TimeWindow::new(500, 615)));
        assert!(!w.covers(&TimeWindow::new(1000, 1050)));
        assert_eq!(w.to_string(), "09:00-17:00");
    }
}
