//! The sync lockfile (`aoc.lock`).
//!
//! Maps (year, day) to the digest of the input as last fetched. Presence
//! of an entry is the sync signal: `needs_fetch` never re-hashes the live
//! file. Loaded once per run, mutated in memory, saved exactly once.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calendar::{Day, Year};
use crate::digest::ContentDigest;
use crate::paths::atomic_write;

const LOCKFILE_VERSION: u32 = 1;

/// Errors from loading or persisting the lockfile.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum LockfileError {
    #[error("lockfile at {path} is corrupt: {reason}")]
    Corrupt { path: String, reason: String },

    #[error("failed to persist lockfile to {path}: {source}")]
    Persist {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to read lockfile at {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// On-disk document. Keys are `"YYYY/DD"` so the file diffs cleanly and
/// sorts by year then day.
#[derive(Serialize, Deserialize)]
struct LockfileDoc {
    version: u32,
    inputs: BTreeMap<String, ContentDigest>,
}

/// In-memory lockfile: (year, day) → digest at last successful fetch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Lockfile {
    entries: BTreeMap<(Year, Day), ContentDigest>,
}

impl Lockfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from disk. A missing file is an empty lockfile, not an error.
    pub fn load(path: &Path) -> Result<Self, LockfileError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::new()),
            Err(e) => {
                return Err(LockfileError::Read {
                    path: path.display().to_string(),
                    source: e,
                });
            }
        };

        let doc: LockfileDoc = toml::from_str(&contents).map_err(|e| LockfileError::Corrupt {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        if doc.version != LOCKFILE_VERSION {
            return Err(LockfileError::Corrupt {
                path: path.display().to_string(),
                reason: format!("unsupported version {}", doc.version),
            });
        }

        let mut entries = BTreeMap::new();
        for (key, digest) in doc.inputs {
            let coord = parse_key(&key).ok_or_else(|| LockfileError::Corrupt {
                path: path.display().to_string(),
                reason: format!("bad input key `{key}`, expected YYYY/DD"),
            })?;
            entries.insert(coord, digest);
        }
        Ok(Self { entries })
    }

    /// True if no entry exists for (year, day). A `force` flag at the
    /// call site bypasses this entirely.
    pub fn needs_fetch(&self, year: Year, day: Day) -> bool {
        !self.entries.contains_key(&(year, day))
    }

    pub fn digest(&self, year: Year, day: Day) -> Option<&ContentDigest> {
        self.entries.get(&(year, day))
    }

    /// Insert or overwrite. Idempotent.
    pub fn record(&mut self, year: Year, day: Day, digest: ContentDigest) {
        self.entries.insert((year, day), digest);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the persisted document. Pure function of the mapping:
    /// BTreeMap ordering means re-saving an unchanged lockfile is
    /// byte-identical, keeping version-control diffs sane.
    pub fn to_document(&self) -> String {
        let doc = LockfileDoc {
            version: LOCKFILE_VERSION,
            inputs: self
                .entries
                .iter()
                .map(|(&(year, day), &digest)| (format!("{year}/{day}"), digest))
                .collect(),
        };
        toml::to_string(&doc).expect("lockfile document serializes")
    }

    /// Atomic persistence: temp file in the same directory, then rename.
    pub fn save(&self, path: &Path) -> Result<(), LockfileError> {
        atomic_write(path, self.to_document().as_bytes()).map_err(|e| LockfileError::Persist {
            path: path.display().to_string(),
            source: e,
        })
    }
}

fn parse_key(key: &str) -> Option<(Year, Day)> {
    let (year, day) = key.split_once('/')?;
    Some((year.parse().ok()?, day.parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(year: u16, day: u8) -> (Year, Day) {
        (Year::new(year).unwrap(), Day::new(day).unwrap())
    }

    #[test]
    fn needs_fetch_tracks_entry_presence() {
        let (year, day) = coord(2020, 7);
        let mut lockfile = Lockfile::new();
        assert!(lockfile.needs_fetch(year, day));
        lockfile.record(year, day, ContentDigest::of(b"payload"));
        assert!(!lockfile.needs_fetch(year, day));
    }

    #[test]
    fn record_is_idempotent() {
        let (year, day) = coord(2019, 1);
        let digest = ContentDigest::of(b"payload");
        let mut lockfile = Lockfile::new();
        lockfile.record(year, day, digest);
        lockfile.record(year, day, digest);
        assert_eq!(lockfile.len(), 1);
        assert_eq!(lockfile.digest(year, day), Some(&digest));
    }

    #[test]
    fn save_load_roundtrip_preserves_answers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aoc.lock");

        let mut lockfile = Lockfile::new();
        lockfile.record(coord(2015, 1).0, coord(2015, 1).1, ContentDigest::of(b"a"));
        lockfile.record(coord(2024, 25).0, coord(2024, 25).1, ContentDigest::of(b"b"));
        lockfile.save(&path).unwrap();

        let loaded = Lockfile::load(&path).unwrap();
        assert_eq!(loaded, lockfile);
        assert!(!loaded.needs_fetch(coord(2015, 1).0, coord(2015, 1).1));
        assert!(loaded.needs_fetch(coord(2016, 1).0, coord(2016, 1).1));
    }

    #[test]
    fn serialization_is_order_stable() {
        let digest_a = ContentDigest::of(b"a");
        let digest_b = ContentDigest::of(b"b");
        let digest_c = ContentDigest::of(b"c");

        let mut forward = Lockfile::new();
        forward.record(coord(2015, 3).0, coord(2015, 3).1, digest_a);
        forward.record(coord(2016, 1).0, coord(2016, 1).1, digest_b);
        forward.record(coord(2016, 12).0, coord(2016, 12).1, digest_c);

        let mut reverse = Lockfile::new();
        reverse.record(coord(2016, 12).0, coord(2016, 12).1, digest_c);
        reverse.record(coord(2016, 1).0, coord(2016, 1).1, digest_b);
        reverse.record(coord(2015, 3).0, coord(2015, 3).1, digest_a);

        assert_eq!(forward.to_document(), reverse.to_document());
    }

    #[test]
    fn missing_file_is_empty_lockfile() {
        let dir = tempfile::tempdir().unwrap();
        let lockfile = Lockfile::load(&dir.path().join("absent.lock")).unwrap();
        assert!(lockfile.is_empty());
    }

    #[test]
    fn garbage_is_corrupt_not_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aoc.lock");
        fs::write(&path, "not a lockfile {{{{").unwrap();
        assert!(matches!(
            Lockfile::load(&path),
            Err(LockfileError::Corrupt { .. })
        ));
    }

    #[test]
    fn bad_key_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aoc.lock");
        let digest = ContentDigest::of(b"a").to_string();
        fs::write(
            &path,
            format!("version = 1\n\n[inputs]\n\"2015-01\" = \"{digest}\"\n"),
        )
        .unwrap();
        assert!(matches!(
            Lockfile::load(&path),
            Err(LockfileError::Corrupt { .. })
        ));
    }
}
