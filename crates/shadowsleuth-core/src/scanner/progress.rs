/// Progress reporting: lightweight messages sent from the worker thread
/// to the frontend via a crossbeam channel.
///
/// Messages carry counters and names only. Reports are written by the
/// worker; the frontend never touches them.
use std::path::PathBuf;
use std::time::Duration;

/// How a snapshot's contribution to a report is filtered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    /// Every file (full mode and baseline).
    Full,
    /// Only files created after the baseline.
    Delta,
}

#[derive(Debug, Clone)]
pub enum ScanProgress {
    /// A snapshot walk is starting.
    SnapshotStarted {
        snapshot: String,
        report: String,
        kind: PassKind,
    },
    /// Running count of files visited in the current snapshot.
    Update {
        snapshot: String,
        files_visited: u64,
        current_path: PathBuf,
    },
    /// A non-fatal per-file error.
    Error { path: PathBuf, message: String },
    /// A snapshot walk finished or was aborted.
    SnapshotFinished {
        snapshot: String,
        rows_written: u64,
        aborted: bool,
    },
    /// The whole run completed.
    Complete { duration: Duration, error_count: u64 },
}
