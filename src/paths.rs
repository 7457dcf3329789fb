//! Well-known workspace paths.
//!
//! Everything hangs off a single root: the decrypted inputs cache under
//! `target/`, the lockfile and encrypted archive at the top level (both
//! committed), and the README carrying the completion table.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::calendar::{Day, Year};

const INPUTS_SUBDIR: &str = "target/inputs";
const ARCHIVE_FILE: &str = "inputs.tar.gz.age";
const LOCKFILE: &str = "aoc.lock";
const README: &str = "README.md";

/// Path layout rooted at a workspace directory.
///
/// Tests construct one over a temp dir; the CLI discovers the root from
/// `AOC_ROOT` or the current directory.
#[derive(Clone, Debug)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root from `AOC_ROOT` if set and non-empty, otherwise the cwd.
    pub fn discover() -> io::Result<Self> {
        if let Ok(dir) = std::env::var("AOC_ROOT")
            && !dir.trim().is_empty()
        {
            return Ok(Self::at(dir));
        }
        Ok(Self::at(std::env::current_dir()?))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Decrypted inputs cache. Disposable; regenerated from the archive.
    pub fn inputs_dir(&self) -> PathBuf {
        self.root.join(INPUTS_SUBDIR)
    }

    pub fn input_path(&self, year: Year, day: Day) -> PathBuf {
        self.inputs_dir().join(year.to_string()).join(day.to_string())
    }

    pub fn archive_path(&self) -> PathBuf {
        self.root.join(ARCHIVE_FILE)
    }

    pub fn lockfile_path(&self) -> PathBuf {
        self.root.join(LOCKFILE)
    }

    pub fn readme_path(&self) -> PathBuf {
        self.root.join(README)
    }

    pub fn junit_path(&self, profile: &str) -> PathBuf {
        self.root
            .join("target")
            .join("nextest")
            .join(profile)
            .join("junit.xml")
    }
}

/// Write via a temp file in the same directory, then rename into place.
/// A crash mid-write leaves the previous document intact.
pub(crate) fn atomic_write(path: &Path, data: &[u8]) -> io::Result<()> {
    let dir = path.parent().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "path missing parent directory")
    })?;
    fs::create_dir_all(dir)?;
    let temp = tempfile::NamedTempFile::new_in(dir)?;
    fs::write(temp.path(), data)?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
