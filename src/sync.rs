//! The sync run: lockfile → fetch loop → lockfile save.
//!
//! Strictly sequential: one day is fetched, written to disk, and recorded
//! before the next begins, so the client's cooldown alone bounds request
//! rate. The lockfile is loaded once, mutated by this single writer, and
//! saved exactly once — including on the abort path, so completed days
//! survive and a rerun resumes where this one stopped.

use std::fs;
use std::path::Path;

use time::OffsetDateTime;

use crate::Result;
use crate::calendar::{Day, Year};
use crate::digest::ContentDigest;
use crate::fetch::{Clock, FetchError, RateLimitedClient, Transport};
use crate::lockfile::Lockfile;
use crate::paths::Workspace;

#[derive(Clone, Copy, Debug, Default)]
pub struct SyncOptions {
    /// Re-fetch every day regardless of lockfile state.
    pub force: bool,
}

/// What a sync run did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    pub fetched: usize,
    pub cached: usize,
    /// Days the server does not have yet (skipped, not recorded).
    pub unavailable: usize,
}

/// The (year, day) universe a sync run covers as of `now`: every started
/// year in full, except the in-progress December which is capped at
/// today's door.
pub fn sync_universe(now: OffsetDateTime) -> Vec<(Year, Day)> {
    let mut universe = Vec::new();
    for year in Year::started_by(now) {
        let cap = if year.as_u16() == now.year() as u16 {
            now.day().min(year.num_days())
        } else {
            year.num_days()
        };
        for day in year.days().take(cap as usize) {
            universe.push((year, day));
        }
    }
    universe
}

/// Fetch every missing day in `universe`, writing payloads under the
/// workspace inputs tree and recording digests as fetches succeed.
///
/// `NotYetAvailable` skips the day; `AuthenticationInvalid` aborts the
/// run (every further request would fail identically). Either way the
/// lockfile is saved before returning, per-unit granularity making the
/// run naturally resumable.
pub fn sync_inputs<T: Transport, C: Clock>(
    client: &mut RateLimitedClient<T, C>,
    workspace: &Workspace,
    universe: &[(Year, Day)],
    options: SyncOptions,
) -> Result<SyncOutcome> {
    let lockfile_path = workspace.lockfile_path();
    let mut lockfile = Lockfile::load(&lockfile_path)?;
    let mut outcome = SyncOutcome::default();

    let run = fetch_missing(client, workspace, universe, options, &mut lockfile, &mut outcome);

    // Save on success and on abort alike: completed days stay recorded.
    lockfile.save(&lockfile_path)?;
    run?;

    tracing::info!(
        fetched = outcome.fetched,
        cached = outcome.cached,
        unavailable = outcome.unavailable,
        "sync complete"
    );
    Ok(outcome)
}

fn fetch_missing<T: Transport, C: Clock>(
    client: &mut RateLimitedClient<T, C>,
    workspace: &Workspace,
    universe: &[(Year, Day)],
    options: SyncOptions,
    lockfile: &mut Lockfile,
    outcome: &mut SyncOutcome,
) -> Result<()> {
    for &(year, day) in universe {
        if !options.force && !lockfile.needs_fetch(year, day) {
            outcome.cached += 1;
            continue;
        }

        let payload = match client.fetch(year, day) {
            Ok(payload) => payload,
            Err(FetchError::NotYetAvailable { .. }) => {
                tracing::debug!(%year, %day, "input not available yet, skipping");
                outcome.unavailable += 1;
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        write_input(&workspace.input_path(year, day), &payload)?;
        // Recorded only after the write succeeded; a failure between
        // fetch and write leaves the day marked as needing fetch.
        lockfile.record(year, day, ContentDigest::of(payload.as_bytes()));
        outcome.fetched += 1;
    }
    Ok(())
}

fn write_input(path: &Path, payload: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, payload)
}
