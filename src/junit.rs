//! JUnit evidence reader.
//!
//! Thin pass-through over nextest's `junit.xml`: pulls out one
//! [`EvidenceRecord`] per testcase in the `::integration` suites and
//! nothing else. The aggregation contract lives in [`crate::completion`];
//! this module only needs suite and case names plus pass/fail.

use std::fs;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::completion::{CompletionError, EvidenceRecord, SUITE_SUFFIX};

/// Read evidence records from a JUnit XML report on disk.
pub fn read_evidence(path: &Path) -> Result<Vec<EvidenceRecord>, CompletionError> {
    let xml = fs::read_to_string(path).map_err(|e| CompletionError::EvidenceUnreadable {
        reason: format!("{}: {e}", path.display()),
    })?;
    parse_evidence(&xml)
}

/// Parse evidence records out of JUnit XML.
///
/// A testcase passes when it carries no `failure`/`error`/`skipped`
/// child. Suites not ending in `::integration` are ignored.
pub fn parse_evidence(xml: &str) -> Result<Vec<EvidenceRecord>, CompletionError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut records = Vec::new();
    let mut suite: Option<String> = None;
    let mut case: Option<(String, bool)> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| CompletionError::EvidenceUnreadable {
                reason: e.to_string(),
            })?;
        match event {
            Event::Start(e) => match e.name().as_ref() {
                b"testsuite" => {
                    suite = attribute(&e, "name")?.filter(|n| n.ends_with(SUITE_SUFFIX));
                }
                b"testcase" => {
                    if suite.is_some() {
                        case = Some((case_name(&e)?, true));
                    }
                }
                b"failure" | b"error" | b"skipped" => {
                    if let Some((_, passed)) = case.as_mut() {
                        *passed = false;
                    }
                }
                _ => {}
            },
            // Self-closing forms never get an End event.
            Event::Empty(e) => match e.name().as_ref() {
                b"testcase" => {
                    if let Some(suite) = &suite {
                        records.push(EvidenceRecord {
                            suite: suite.clone(),
                            case: case_name(&e)?,
                            passed: true,
                        });
                    }
                }
                b"failure" | b"error" | b"skipped" => {
                    if let Some((_, passed)) = case.as_mut() {
                        *passed = false;
                    }
                }
                _ => {}
            },
            Event::End(e) => match e.name().as_ref() {
                b"testcase" => {
                    if let (Some(suite), Some((name, passed))) = (&suite, case.take()) {
                        records.push(EvidenceRecord {
                            suite: suite.clone(),
                            case: name,
                            passed,
                        });
                    }
                }
                b"testsuite" => suite = None,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(records)
}

fn case_name(e: &BytesStart<'_>) -> Result<String, CompletionError> {
    attribute(e, "name")?.ok_or_else(|| CompletionError::EvidenceUnreadable {
        reason: "testcase without a name attribute".into(),
    })
}

fn attribute(e: &BytesStart<'_>, name: &str) -> Result<Option<String>, CompletionError> {
    let attr = e
        .try_get_attribute(name)
        .map_err(|e| CompletionError::EvidenceUnreadable {
            reason: e.to_string(),
        })?;
    match attr {
        Some(attr) => {
            let value = attr
                .unescape_value()
                .map_err(|e| CompletionError::EvidenceUnreadable {
                    reason: e.to_string(),
                })?;
            Ok(Some(value.into_owned()))
        }
        None => Ok(None),
    }
}
