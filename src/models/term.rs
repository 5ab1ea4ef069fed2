//! Registrar term codes.
//!
//! Terms are four-digit codes `2YYS`: a leading `2`, the two-digit
//! academic year, and a season digit (1 = fall, 4 = spring, 7 = summer).
//! Spring belongs to the academic year that started the previous fall, so
//! Spring 2025 is `2244`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Academic season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Fall,
    Spring,
    Summer,
}

impl Season {
    fn digit(self) -> char {
        match self {
            Season::Fall => '1',
            Season::Spring => '4',
            Season::Summer => '7',
        }
    }

    fn from_digit(digit: char) -> Option<Self> {
        match digit {
            '1' => Some(Season::Fall),
            '4' => Some(Season::Spring),
            '7' => Some(Season::Summer),
            _ => None,
        }
    }
}

impl FromStr for Season {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fall" => Ok(Season::Fall),
            "spring" => Ok(Season::Spring),
            "summer" => Ok(Season::Summer),
            other => Err(format!("invalid season {other:?} (expected fall, spring, or summer)")),
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Season::Fall => "Fall",
            Season::Spring => "Spring",
            Season::Summer => "Summer",
        };
        f.write_str(name)
    }
}

/// Term code for a season and calendar year.
///
/// ```
/// use u_course_schedule::models::term::{term_code, Season};
///
/// assert_eq!(term_code(Season::Fall, 2025), "2251");
/// assert_eq!(term_code(Season::Spring, 2025), "2244");
/// ```
pub fn term_code(season: Season, year: i32) -> String {
    let academic_year = match season {
        Season::Spring => year - 1,
        Season::Fall | Season::Summer => year,
    };
    format!("2{:02}{}", academic_year.rem_euclid(100), season.digit())
}

/// Decodes a term code into season and calendar year (2000s).
pub fn parse_term(code: &str) -> Option<(Season, i32)> {
    if !is_valid_term(code) {
        return None;
    }
    let yy: i32 = code.get(1..3)?.parse().ok()?;
    let season = Season::from_digit(code.chars().nth(3)?)?;
    let year = match season {
        Season::Spring => 2000 + yy + 1,
        Season::Fall | Season::Summer => 2000 + yy,
    };
    Some((season, year))
}

/// Whether `code` is a well-formed term code.
pub fn is_valid_term(code: &str) -> bool {
    let chars: Vec<char> = code.chars().collect();
    chars.len() == 4
        && chars.iter().all(|c| c.is_ascii_digit())
        && chars[0] == '2'
        && Season::from_digit(chars[3]).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_codes() {
        assert_eq!(term_code(Season::Fall, 2025), "2251");
        assert_eq!(term_code(Season::Spring, 2025), "2244");
        assert_eq!(term_code(Season::Summer, 2025), "2257");
    }

    #[test]
    fn test_parse_term_inverts_term_code() {
        for (season, year) in [
            (Season::Fall, 2025),
            (Season::Spring, 2026),
            (Season::Summer, 2024),
        ] {
            assert_eq!(parse_term(&term_code(season, year)), Some((season, year)));
        }
    }

    #[test]
    fn test_is_valid_term() {
        assert!(is_valid_term("2251"));
        assert!(!is_valid_term("2252"));
        assert!(!is_valid_term("1251"));
        assert!(!is_valid_term("225"));
        assert!(!is_valid_term("22a1"));
    }

    #[test]
    fn test_season_parse() {
        assert_eq!("FALL".parse::<Season>(), Ok(Season::Fall));
        assert!("winter".parse::<Season>().is_err());
        assert_eq!(Season::Spring.to_string(), "Spring");
    }
}
