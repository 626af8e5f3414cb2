/// Data model: snapshots discovered in the listing and the per-file
/// records written to reports.
pub mod file_record;
pub mod size;
pub mod snapshot;

pub use file_record::FileRecord;
pub use snapshot::Snapshot;
