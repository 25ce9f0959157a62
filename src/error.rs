// Error taxonomy — every public operation fails with one of these kinds.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// One failed attempt against a candidate URL.
#[derive(Debug, Clone)]
pub struct DownloadAttempt {
    pub url: String,
    pub reason: String,
}

/// One file a cache deletion could not remove.
#[derive(Debug, Clone)]
pub struct DeletionFailure {
    pub name: String,
    pub reason: String,
}

/// Outcome of a cache deletion that removed every targeted file.
#[derive(Debug, Clone, Default)]
pub struct DeletionReport {
    pub deleted: Vec<String>,
    pub freed_bytes: u64,
}

#[derive(Debug, Error)]
pub enum Error {
    /// The name matched no mission key, alias, or compact form.
    #[error("unknown mission '{name}'")]
    UnknownMission { name: String },

    /// The mission's coverage spans many time-segmented files; a query
    /// window is required to pick them.
    #[error("mission '{key}' uses segmented kernels; call ensure_segmented_kernels with a time window")]
    SegmentedMission { key: String },

    /// The mission has no kernel sources configured at all.
    #[error("no kernel sources configured for mission '{key}'")]
    NoKernels { key: String },

    /// Every candidate URL failed. Carries the full attempt diagnostics;
    /// the caller may retry later.
    #[error("kernel {filename} unavailable: {} candidate(s) failed", .attempts.len())]
    KernelUnavailable {
        filename: String,
        attempts: Vec<DownloadAttempt>,
    },

    /// The engine rejected a cached file. Treated as cache corruption:
    /// delete that one file and redownload.
    #[error("engine rejected kernel {}: {reason}", .path.display())]
    KernelLoad { path: PathBuf, reason: String },

    /// Cleanup could not remove one or more files. Reported only after
    /// every deletion was attempted.
    #[error("{} cache file(s) could not be deleted", .failures.len())]
    PartialDeletion {
        deleted: Vec<String>,
        freed_bytes: u64,
        failures: Vec<DeletionFailure>,
    },

    /// The engine could not answer a state query from the loaded kernels.
    /// Never retried automatically.
    #[error("insufficient kernel coverage: {reason}")]
    InsufficientCoverage { reason: String },

    #[error("invalid query window: end {end} precedes start {start}")]
    InvalidWindow { start: NaiveDate, end: NaiveDate },

    /// A segment manifest is missing or unreadable.
    #[error("manifest '{id}': {reason}")]
    Manifest { id: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
