//! End-to-end completion flow: junit XML → aggregation → README table.

use aocx::calendar::{Day, Year};
use aocx::completion::{Completion, CompletionError, SolveState};
use aocx::{junit, report};

fn year(raw: u16) -> Year {
    Year::new(raw).unwrap()
}

fn day(raw: u8) -> Day {
    Day::new(raw).unwrap()
}

/// Short-event scenario: one day fully solved, one half solved, the
/// final day solved by its single part.
#[test]
fn mixed_year_star_arithmetic() {
    let xml = r#"<?xml version="1.0"?>
<testsuites>
  <testsuite name="aoc-2025::integration">
    <testcase name="day01::part1"/>
    <testcase name="day01::part2"/>
    <testcase name="day02::part1"/>
    <testcase name="day12::part1"/>
  </testsuite>
</testsuites>
"#;
    let records = junit::parse_evidence(xml).unwrap();
    let completion = Completion::from_evidence([year(2025)], &records).unwrap();

    assert_eq!(completion.state(year(2025), day(1)), Some(SolveState::Solved));
    assert_eq!(
        completion.state(year(2025), day(2)),
        Some(SolveState::PartiallySolved)
    );
    // Day 12 is 2025's final day: a part-one pass solves it outright.
    assert_eq!(completion.state(year(2025), day(12)), Some(SolveState::Solved));

    let stats = completion.stats();
    let (_, s) = stats[0];
    assert_eq!(s.possible, 2 * 12 - 1);
    assert_eq!(s.earned, 2 + 1 + 1);
}

/// Fully-solved year: earned must equal possible exactly. The final
/// day's single star is already part of `2N - 1`; there is no extra
/// bonus on top.
#[test]
fn fully_solved_year_reaches_exact_total() {
    let mut cases = String::new();
    for d in 1..=11 {
        cases.push_str(&format!("<testcase name=\"day{d:02}::part1\"/>"));
        cases.push_str(&format!("<testcase name=\"day{d:02}::part2\"/>"));
    }
    cases.push_str("<testcase name=\"day12::part1\"/>");
    let xml = format!(
        "<testsuites><testsuite name=\"aoc-2025::integration\">{cases}</testsuite></testsuites>"
    );

    let records = junit::parse_evidence(&xml).unwrap();
    let completion = Completion::from_evidence([year(2025)], &records).unwrap();
    let (_, s) = completion.stats()[0];
    assert_eq!(s.possible, 23);
    assert_eq!(s.earned, s.possible);
    assert_eq!(s.percent(), 100);
}

#[test]
fn one_malformed_case_invalidates_the_report() {
    let xml = r#"<testsuites>
  <testsuite name="aoc-2025::integration">
    <testcase name="day01::part1"/>
    <testcase name="day02_part1"/>
  </testsuite>
</testsuites>
"#;
    let records = junit::parse_evidence(xml).unwrap();
    let err = Completion::from_evidence([year(2025)], &records).unwrap_err();
    assert!(matches!(err, CompletionError::MalformedEvidence { .. }));
}

#[test]
fn table_splices_into_readme() {
    let xml = r#"<testsuites>
  <testsuite name="aoc-2025::integration">
    <testcase name="day01::part1"/>
  </testsuite>
</testsuites>
"#;
    let records = junit::parse_evidence(xml).unwrap();
    let completion = Completion::from_evidence([year(2025)], &records).unwrap();
    let table = report::render_table(&completion.stats());

    let marker = report::TABLE_MARKER;
    let readme = format!("# advent\n\n{marker}\n{marker}\n");
    let updated = report::splice(&readme, &table).unwrap();
    assert!(updated.contains("| 2025 | 1 | 23 | 4% |"));

    // Re-splicing with the same stats is stable.
    assert_eq!(report::splice(&updated, &table).unwrap(), updated);
}
