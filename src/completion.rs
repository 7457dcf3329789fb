//! Completion state derived from test evidence.
//!
//! Solve state is recomputed each run from the evidence file; it is never
//! persisted on its own. One malformed record fails the whole aggregation
//! rather than silently under-counting.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::calendar::{Day, Part, Year};

/// Suite names look like `aoc-2024::integration`.
const SUITE_PREFIX: &str = "aoc-";
pub(crate) const SUITE_SUFFIX: &str = "::integration";

/// Case names look like `day07::part1`.
const CASE_DELIMITER: &str = "::";
const DAY_PREFIX: &str = "day";
const PART_PREFIX: &str = "part";

/// Errors from evidence aggregation.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CompletionError {
    #[error("malformed evidence in suite `{suite}`: {reason}")]
    MalformedEvidence { suite: String, reason: String },

    #[error("evidence file unreadable: {reason}")]
    EvidenceUnreadable { reason: String },
}

/// One test outcome from the evidence file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvidenceRecord {
    /// Suite name, e.g. `aoc-2024::integration`.
    pub suite: String,
    /// Case name, e.g. `day07::part1`.
    pub case: String,
    pub passed: bool,
}

/// Three-valued solve status for one day.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SolveState {
    #[default]
    Unsolved,
    /// Only part one has passed.
    PartiallySolved,
    /// Both parts passed, or part one on the final day (which has no
    /// part two).
    Solved,
}

impl SolveState {
    /// Transition on a passing test outcome.
    pub fn observe_pass(self, part: Part, final_day: bool) -> SolveState {
        match (part, self) {
            (Part::One, SolveState::Unsolved) if final_day => SolveState::Solved,
            (Part::One, SolveState::Unsolved) => SolveState::PartiallySolved,
            // A part-two pass implies part one passed.
            (Part::Two, _) => SolveState::Solved,
            (Part::One, state) => state,
        }
    }

    /// Stars this state is worth.
    fn stars(self, final_day: bool) -> u32 {
        match self {
            SolveState::Unsolved => 0,
            SolveState::PartiallySolved => 1,
            SolveState::Solved if final_day => 1,
            SolveState::Solved => 2,
        }
    }
}

/// Per-year star totals.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct YearStats {
    pub earned: u32,
    pub possible: u32,
}

impl YearStats {
    pub fn percent(self) -> u32 {
        if self.possible == 0 {
            return 0;
        }
        100 * self.earned / self.possible
    }
}

/// Solve state for every (year, day) in the universe.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Completion {
    years: BTreeMap<Year, BTreeMap<Day, SolveState>>,
}

impl Completion {
    /// Aggregate evidence over the given year universe.
    ///
    /// Every (year, day) starts `Unsolved`; passing records drive the
    /// [`SolveState::observe_pass`] transition. Records naming a year
    /// outside the universe, or with case names that don't decompose as
    /// `dayDD::partP`, fail the aggregation.
    pub fn from_evidence(
        universe: impl IntoIterator<Item = Year>,
        records: &[EvidenceRecord],
    ) -> Result<Self, CompletionError> {
        let mut years: BTreeMap<Year, BTreeMap<Day, SolveState>> = universe
            .into_iter()
            .map(|year| (year, year.days().map(|day| (day, SolveState::default())).collect()))
            .collect();

        for record in records {
            let year = parse_suite(&record.suite)?;
            let (day, part) = parse_case(&record.suite, &record.case)?;

            let days = years.get_mut(&year).ok_or_else(|| {
                CompletionError::MalformedEvidence {
                    suite: record.suite.clone(),
                    reason: format!("year {year} is not in the expected universe"),
                }
            })?;
            if !year.contains(day) {
                return Err(CompletionError::MalformedEvidence {
                    suite: record.suite.clone(),
                    reason: format!("day {day} does not exist in {year}"),
                });
            }

            if record.passed {
                let state = days.entry(day).or_default();
                *state = state.observe_pass(part, year.is_final_day(day));
            }
        }

        Ok(Self { years })
    }

    pub fn state(&self, year: Year, day: Day) -> Option<SolveState> {
        self.years.get(&year)?.get(&day).copied()
    }

    /// Star totals per year, in year order.
    ///
    /// `possible = 2N - 1`: every day but the final one offers two stars,
    /// the final day one. Solving everything therefore yields exactly
    /// `possible`; there is no separate bonus star.
    pub fn stats(&self) -> Vec<(Year, YearStats)> {
        self.years
            .iter()
            .map(|(&year, days)| {
                let possible = 2 * u32::from(year.num_days()) - 1;
                let earned = days
                    .iter()
                    .map(|(&day, state)| state.stars(year.is_final_day(day)))
                    .sum();
                (year, YearStats { earned, possible })
            })
            .collect()
    }
}

fn parse_suite(suite: &str) -> Result<Year, CompletionError> {
    let malformed = |reason: String| CompletionError::MalformedEvidence {
        suite: suite.to_string(),
        reason,
    };
    let year = suite
        .strip_prefix(SUITE_PREFIX)
        .and_then(|rest| rest.strip_suffix(SUITE_SUFFIX))
        .ok_or_else(|| {
            malformed(format!(
                "expected suite named {SUITE_PREFIX}YYYY{SUITE_SUFFIX}"
            ))
        })?;
    year.parse::<Year>()
        .map_err(|e| malformed(e.to_string()))
}

fn parse_case(suite: &str, case: &str) -> Result<(Day, Part), CompletionError> {
    let malformed = |reason: String| CompletionError::MalformedEvidence {
        suite: suite.to_string(),
        reason,
    };

    let mut parts = case.split(CASE_DELIMITER);
    let (Some(day_str), Some(part_str), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(malformed(format!(
            "expected test named {DAY_PREFIX}DD{CASE_DELIMITER}{PART_PREFIX}P, found `{case}`"
        )));
    };

    let day = day_str
        .strip_prefix(DAY_PREFIX)
        .ok_or_else(|| malformed(format!("case `{case}` does not start with `{DAY_PREFIX}`")))?
        .parse::<Day>()
        .map_err(|e| malformed(e.to_string()))?;
    let part = part_str
        .strip_prefix(PART_PREFIX)
        .ok_or_else(|| malformed(format!("case `{case}` has no `{PART_PREFIX}` component")))?
        .parse::<u8>()
        .map_err(|_| malformed(format!("case `{case}` has a non-numeric part")))
        .and_then(|n| Part::from_number(n).map_err(|e| malformed(e.to_string())))?;
    Ok((day, part))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn year(raw: u16) -> Year {
        Year::new(raw).unwrap()
    }

    fn day(raw: u8) -> Day {
        Day::new(raw).unwrap()
    }

    fn pass(suite: &str, case: &str) -> EvidenceRecord {
        EvidenceRecord {
            suite: suite.into(),
            case: case.into(),
            passed: true,
        }
    }

    #[test]
    fn transition_part_one_then_two() {
        let state = SolveState::Unsolved.observe_pass(Part::One, false);
        assert_eq!(state, SolveState::PartiallySolved);
        let state = state.observe_pass(Part::Two, false);
        assert_eq!(state, SolveState::Solved);
    }

    #[test]
    fn part_two_pass_implies_part_one() {
        assert_eq!(
            SolveState::Unsolved.observe_pass(Part::Two, false),
            SolveState::Solved
        );
    }

    #[test]
    fn final_day_part_one_solves_outright() {
        assert_eq!(
            SolveState::Unsolved.observe_pass(Part::One, true),
            SolveState::Solved
        );
    }

    #[test]
    fn part_one_does_not_demote_solved() {
        assert_eq!(
            SolveState::Solved.observe_pass(Part::One, false),
            SolveState::Solved
        );
    }

    #[test]
    fn aggregates_mixed_evidence() {
        // 25-day year: day 1 fully solved, day 2 half, day 25 final.
        let records = vec![
            pass("aoc-2015::integration", "day01::part1"),
            pass("aoc-2015::integration", "day01::part2"),
            pass("aoc-2015::integration", "day02::part1"),
            pass("aoc-2015::integration", "day25::part1"),
        ];
        let completion = Completion::from_evidence([year(2015)], &records).unwrap();
        assert_eq!(completion.state(year(2015), day(1)), Some(SolveState::Solved));
        assert_eq!(
            completion.state(year(2015), day(2)),
            Some(SolveState::PartiallySolved)
        );
        assert_eq!(completion.state(year(2015), day(25)), Some(SolveState::Solved));
        assert_eq!(completion.state(year(2015), day(3)), Some(SolveState::Unsolved));

        let stats = completion.stats();
        assert_eq!(stats.len(), 1);
        let (_, s) = stats[0];
        assert_eq!(s.possible, 49);
        assert_eq!(s.earned, 2 + 1 + 1);
    }

    #[test]
    fn failing_records_do_not_advance_state() {
        let records = vec![EvidenceRecord {
            suite: "aoc-2015::integration".into(),
            case: "day01::part1".into(),
            passed: false,
        }];
        let completion = Completion::from_evidence([year(2015)], &records).unwrap();
        assert_eq!(
            completion.state(year(2015), day(1)),
            Some(SolveState::Unsolved)
        );
    }

    #[test]
    fn unknown_year_fails_aggregation() {
        let records = vec![pass("aoc-2024::integration", "day01::part1")];
        let err = Completion::from_evidence([year(2015)], &records).unwrap_err();
        assert!(matches!(err, CompletionError::MalformedEvidence { .. }));
    }

    #[test]
    fn malformed_case_fails_aggregation() {
        for case in ["day01", "day01::part1::extra", "d1::part1", "day01::p1"] {
            let records = vec![pass("aoc-2015::integration", case)];
            let err = Completion::from_evidence([year(2015)], &records).unwrap_err();
            assert!(
                matches!(err, CompletionError::MalformedEvidence { .. }),
                "case `{case}` should be rejected"
            );
        }
    }

    #[test]
    fn day_outside_event_fails_aggregation() {
        // 2025 runs 12 days; day 13 evidence is malformed, not ignored.
        let records = vec![pass("aoc-2025::integration", "day13::part1")];
        let err = Completion::from_evidence([year(2025)], &records).unwrap_err();
        assert!(matches!(err, CompletionError::MalformedEvidence { .. }));
    }
}
