use thiserror::Error;

use crate::archive::ArchiveError;
use crate::completion::CompletionError;
use crate::config::ConfigError;
use crate::fetch::FetchError;
use crate::lockfile::LockfileError;
use crate::report::ReportError;

/// Whether retrying this operation may succeed.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Transience {
    /// Retry will never help without changing inputs/state.
    Permanent,
    /// Retry may help (transient contention/outage).
    Retryable,
    /// Unknown if retry will help.
    Unknown,
}

impl Transience {
    pub fn is_retryable(self) -> bool {
        matches!(self, Transience::Retryable)
    }
}

/// Invalid calendar coordinate (year, day, or part).
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum CalendarError {
    #[error("year `{raw}` is invalid: {reason}")]
    Year { raw: String, reason: String },
    #[error("day `{raw}` is invalid: {reason}")]
    Day { raw: String, reason: String },
    #[error("part `{raw}` is invalid: {reason}")]
    Part { raw: String, reason: String },
}

/// Crate-level convenience error.
///
/// Not a "god error": it is a thin wrapper over capability errors.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Calendar(#[from] CalendarError),

    #[error(transparent)]
    Lockfile(#[from] LockfileError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error(transparent)]
    Completion(#[from] CompletionError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether retrying the failed operation may succeed.
    ///
    /// Only transport failures are retryable; configuration, data, and
    /// cryptographic errors are permanent by policy.
    pub fn transience(&self) -> Transience {
        match self {
            Error::Fetch(e) => e.transience(),
            Error::Io(_) => Transience::Unknown,
            _ => Transience::Permanent,
        }
    }
}
