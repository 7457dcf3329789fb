#![forbid(unsafe_code)]

pub mod archive;
pub mod calendar;
pub mod cli;
pub mod completion;
pub mod config;
pub mod digest;
pub mod error;
pub mod fetch;
pub mod junit;
pub mod lockfile;
pub mod paths;
pub mod report;
pub mod sync;
pub mod telemetry;

pub use error::{Error, Transience};
pub type Result<T> = std::result::Result<T, Error>;

// Re-export core types at crate root for convenience
pub use crate::calendar::{Day, Part, Year};
pub use crate::completion::{Completion, EvidenceRecord, SolveState, YearStats};
pub use crate::digest::ContentDigest;
pub use crate::lockfile::Lockfile;
pub use crate::paths::Workspace;
