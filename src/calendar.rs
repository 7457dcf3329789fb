//! Layer 0: Calendar atoms
//!
//! Year: one annual AoC event (2015+).
//! Day: one puzzle within an event, 1-based.
//! Part: one scored half of a day. The final day of an event has no part two.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::{Month, OffsetDateTime};

use crate::error::CalendarError;

/// The first AoC event.
pub const FIRST_YEAR: u16 = 2015;

/// Events from this year on run 12 days instead of 25.
const SHORT_EVENT_CUTOFF: u16 = 2025;

/// An Advent of Code event year.
///
/// Total order matches the calendar; the day universe is a property of
/// the year (see [`Year::num_days`]), not of the caller.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Year(u16);

impl Year {
    pub fn new(raw: u16) -> Result<Self, CalendarError> {
        if raw < FIRST_YEAR {
            return Err(CalendarError::Year {
                raw: raw.to_string(),
                reason: format!("AoC started in {FIRST_YEAR}"),
            });
        }
        Ok(Self(raw))
    }

    pub fn as_u16(self) -> u16 {
        self.0
    }

    /// Number of puzzle days in this event.
    pub fn num_days(self) -> u8 {
        if self.0 >= SHORT_EVENT_CUTOFF { 12 } else { 25 }
    }

    /// The last day of this event. It has only one part.
    pub fn final_day(self) -> Day {
        Day(self.num_days())
    }

    /// Single source of truth for the final-day special case.
    pub fn is_final_day(self, day: Day) -> bool {
        day == self.final_day()
    }

    pub fn contains(self, day: Day) -> bool {
        day.0 <= self.num_days()
    }

    /// All days of this event, in order.
    pub fn days(self) -> impl Iterator<Item = Day> {
        (1..=self.num_days()).map(Day)
    }

    /// Years whose event has started as of `now`: every past year, plus
    /// the current year once December begins.
    pub fn started_by(now: OffsetDateTime) -> Vec<Year> {
        let mut latest = now.year() as u16;
        if now.month() == Month::December {
            latest += 1;
        }
        (FIRST_YEAR..latest).map(Year).collect()
    }
}

impl fmt::Debug for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Year({})", self.0)
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Year {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.parse::<u16>().map_err(|_| CalendarError::Year {
            raw: s.to_string(),
            reason: "not a year number".into(),
        })?;
        Year::new(raw)
    }
}

/// A puzzle day, 1-based. Valid range is bounded by the longest event
/// (25 days); whether a day exists in a given year is [`Year::contains`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Day(u8);

impl Day {
    pub fn new(raw: u8) -> Result<Self, CalendarError> {
        if raw == 0 || raw > 25 {
            return Err(CalendarError::Day {
                raw: raw.to_string(),
                reason: "must be 1..=25".into(),
            });
        }
        Ok(Self(raw))
    }

    pub fn as_u8(self) -> u8 {
        self.0
    }
}

impl fmt::Debug for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Day({})", self.0)
    }
}

impl fmt::Display for Day {
    /// Two-digit form; input paths and lockfile keys sort lexically.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

impl FromStr for Day {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.parse::<u8>().map_err(|_| CalendarError::Day {
            raw: s.to_string(),
            reason: "not a day number".into(),
        })?;
        Day::new(raw)
    }
}

/// One scored half of a day's puzzle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Part {
    One,
    Two,
}

impl Part {
    pub fn from_number(raw: u8) -> Result<Self, CalendarError> {
        match raw {
            1 => Ok(Part::One),
            2 => Ok(Part::Two),
            _ => Err(CalendarError::Part {
                raw: raw.to_string(),
                reason: "must be 1 or 2".into(),
            }),
        }
    }
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Part::One => write!(f, "1"),
            Part::Two => write!(f, "2"),
        }
    }
}
