/// Error types for every fallible step of a triage run.
///
/// Each component owns one enum so callers can decide locally whether a
/// failure is skipped-and-logged or aborts the unit of work in progress.
/// Only [`SessionError`] ever escapes a run.
use crate::failure::{Component, Failure, FailureKind};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures while turning listing text into snapshots.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// One line or block of the listing broke the block/key-value grammar.
    #[error("listing line {line}: {reason}")]
    Parse { line: usize, reason: String },

    /// A block's creation time is not a usable listing timestamp.
    #[error("listing block at line {line} skipped: {source}")]
    CreationTime {
        line: usize,
        #[source]
        source: TimeError,
    },

    /// The listing contained no snapshot blocks at all.
    #[error("listing contains no shadow copies")]
    EmptyListing,

    /// The listing text could not be obtained from the platform.
    #[error("could not capture snapshot listing: {0}")]
    ListingCapture(String),
}

impl CatalogError {
    /// Failure record for a block or line the parser skipped.
    pub fn to_failure(&self) -> Failure {
        let (source, kind) = match self {
            Self::CreationTime {
                source: TimeError::Format { .. },
                ..
            } => (Component::TimeCodec, FailureKind::TimeFormat),
            Self::CreationTime { .. } => (Component::TimeCodec, FailureKind::TimeConversion),
            Self::Parse { .. } | Self::EmptyListing | Self::ListingCapture(_) => {
                (Component::Catalog, FailureKind::Parse)
            }
        };
        Failure::new(source, kind, self.to_string())
    }
}

/// Failures converting between listing, epoch and report timestamps.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimeError {
    /// The listing timestamp does not match `MM/DD/YYYY hh:mm:ss AM|PM`.
    #[error("timestamp {input:?} does not match the listing format: {reason}")]
    Format { input: String, reason: String },

    /// The epoch value cannot be represented as a calendar time.
    #[error("epoch value {value} cannot be converted to a calendar time")]
    Conversion { value: i64 },
}

/// Per-file failures raised while walking a snapshot.
#[derive(Debug, Error)]
pub enum WalkError {
    /// Opening or reading the file failed (locked, denied, vanished).
    #[error("cannot read {}: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The directory walker itself could not enumerate an entry.
    #[error("cannot enumerate {}: {message}", path.display())]
    Enumerate { path: PathBuf, message: String },

    /// Stat succeeded but a timestamp was unusable.
    #[error("malformed timestamps on {}: {source}", path.display())]
    Stat {
        path: PathBuf,
        #[source]
        source: TimeError,
    },
}

impl WalkError {
    /// Path of the file the failure is attached to.
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::FileAccess { path, .. } | Self::Enumerate { path, .. } | Self::Stat { path, .. } => {
                path
            }
        }
    }
}

/// Report destination failures.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The report file could not be created (directory missing or unwritable).
    #[error("cannot create report {}: {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Writing a row failed; rows already written are left intact.
    #[error("cannot write to report {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Reading a finished report back failed.
    #[error("cannot read report {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Writing derived visualisation data failed.
    #[error("cannot export {}: {source}", path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Run-level failures. These are the only errors surfaced to the user as fatal.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The output directory is missing and could not be created.
    #[error("cannot create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The selected baseline does not exist in the catalog.
    #[error("baseline {index} is out of range (catalog holds {len} snapshots)")]
    InvalidBaseline { index: usize, len: usize },

    /// The baseline's creation time cannot be used as a threshold.
    #[error("baseline snapshot {name} has an unusable creation time: {source}")]
    BaselineTime {
        name: String,
        #[source]
        source: TimeError,
    },

    /// Nothing to process.
    #[error("the snapshot catalog is empty")]
    EmptyCatalog,

    /// The background worker died before returning a result.
    #[error("session worker thread panicked")]
    WorkerPanicked,
}
