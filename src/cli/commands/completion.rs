//! Handler for `aocx completion`.

use std::fs;

use time::OffsetDateTime;

use crate::calendar::Year;
use crate::completion::Completion;
use crate::paths::Workspace;
use crate::{Result, junit, report};

/// Read the latest junit report, aggregate solve state, and splice the
/// completion table into the README.
///
/// Running the tests themselves is the test runner's job; this only
/// consumes its evidence file.
pub fn update(profile: &str) -> Result<()> {
    let workspace = Workspace::discover()?;

    let records = junit::read_evidence(&workspace.junit_path(profile))?;
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    let completion = Completion::from_evidence(Year::started_by(now), &records)?;

    let table = report::render_table(&completion.stats());
    let readme = fs::read_to_string(workspace.readme_path())?;
    let spliced = report::splice(&readme, &table)?;
    fs::write(workspace.readme_path(), spliced)?;

    println!("updated completion table in {}", workspace.readme_path().display());
    Ok(())
}
