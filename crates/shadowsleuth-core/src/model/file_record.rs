/// Uniform per-file metadata record, written to a report as one row.
///
/// Records are created per visited file and handed straight to a report
/// writer; nothing retains them.
use crate::model::size;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// File name only.
    pub filename: String,
    /// Directory containing the file, as found during the walk.
    pub directory_path: String,
    /// Lowercase hex digest of the full file content.
    pub digest: String,
    /// Size in KiB, truncated toward zero.
    pub size_kib: u64,
    /// `DD/MM/YYYY hh:mm:ss` timestamps.
    pub modified_time: String,
    pub access_time: String,
    pub created_time: String,
}

/// Convert a byte count to whole KiB, truncating.
pub fn size_kib(bytes: u64) -> u64 {
    bytes / size::KIB
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_truncates_instead_of_rounding() {
        assert_eq!(size_kib(0), 0);
        assert_eq!(size_kib(10), 0);
        assert_eq!(size_kib(1023), 0);
        assert_eq!(size_kib(1024), 1);
        assert_eq!(size_kib(2047), 1);
        assert_eq!(size_kib(1_048_576), 1024);
    }
}
