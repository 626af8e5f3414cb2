/// Report files: one CSV per snapshot (or one for the whole full-mode run),
/// plus the read-back side that derives visualisation data from them.
///
/// Column names and order are a compatibility contract with chart tooling:
/// `Filename,Path,<digest>,Size,Modified Time,Access Time,Created Time`.
pub mod summary;
pub mod writer;

use crate::model::Snapshot;
use crate::scanner::hasher::HashAlgorithm;

pub use summary::{summarise_directory, summarise_report, write_visualisation, ReportSummary};
pub use writer::ReportWriter;

/// Name of the single report produced in full mode.
pub const FULL_REPORT_NAME: &str = "All_ShadowCopy_Files";

pub const COLUMN_FILENAME: &str = "Filename";
pub const COLUMN_PATH: &str = "Path";
pub const COLUMN_SIZE: &str = "Size";
pub const COLUMN_MODIFIED: &str = "Modified Time";
pub const COLUMN_ACCESS: &str = "Access Time";
pub const COLUMN_CREATED: &str = "Created Time";

/// Report header for the given digest algorithm.
pub fn header(hash: HashAlgorithm) -> [&'static str; 7] {
    [
        COLUMN_FILENAME,
        COLUMN_PATH,
        hash.column_name(),
        COLUMN_SIZE,
        COLUMN_MODIFIED,
        COLUMN_ACCESS,
        COLUMN_CREATED,
    ]
}

/// Per-snapshot report role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportMode {
    Baseline,
    Compare,
}

impl ReportMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Baseline => "Baseline",
            Self::Compare => "Compare",
        }
    }

    /// `<Mode>_<snapshotName>`, without extension.
    pub fn report_name(self, snapshot: &Snapshot) -> String {
        format!("{}_{}", self.label(), snapshot.name())
    }
}
