/// Sequential file-tree walker that hashes and stats every file under a
/// snapshot root.
///
/// `jwalk` runs in serial mode with sorted entries, so the walk order is
/// deterministic: depth-first, names ascending within each directory. Each
/// file is stat'ed, offered to the optional creation-time filter, then
/// hashed. Per-file failures go to the failure sink and the walk moves on;
/// only a failure of the record consumer (the report) stops it.
use crate::compare::CreationFilter;
use crate::error::{ReportError, WalkError};
use crate::failure::{Component, Failure, FailureKind, FailureSink};
use crate::model::file_record::{size_kib, FileRecord};
use crate::platform::stat::raw_stat;
use crate::scanner::hasher::HashAlgorithm;
use crate::time_codec::TimeCodec;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Counters for one walk.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WalkSummary {
    /// Files (non-directories) reached by the walk.
    pub visited: u64,
    /// Records handed to the consumer.
    pub accepted: u64,
    /// Files rejected by the creation-time filter.
    pub filtered: u64,
    /// Files and entries skipped because of an error.
    pub failed: u64,
    /// Bytes read while hashing accepted files.
    pub bytes_hashed: u64,
}

/// The record consumer failed; the walk stopped at that point.
#[derive(Debug)]
pub struct WalkAborted {
    pub summary: WalkSummary,
    pub error: ReportError,
}

/// Hashes and stats files with one algorithm and one time zone.
#[derive(Debug, Clone, Copy)]
pub struct FileWalker {
    hash: HashAlgorithm,
    codec: TimeCodec,
}

impl FileWalker {
    pub fn new(hash: HashAlgorithm, codec: TimeCodec) -> Self {
        Self { hash, codec }
    }

    /// Visit every file under `root`, in walk order.
    ///
    /// `progress` receives the running visited count and current path.
    /// `on_record` receives each accepted record; an error from it aborts
    /// the walk and is returned with the counters reached so far.
    pub fn walk<F>(
        &self,
        root: &Path,
        filter: Option<&dyn CreationFilter>,
        sink: &mut dyn FailureSink,
        progress: &mut dyn FnMut(u64, &Path),
        mut on_record: F,
    ) -> Result<WalkSummary, WalkAborted>
    where
        F: FnMut(FileRecord) -> Result<(), ReportError>,
    {
        let mut summary = WalkSummary::default();

        let walker = jwalk::WalkDir::new(root)
            .skip_hidden(false)
            .follow_links(false)
            .sort(true)
            .parallelism(jwalk::Parallelism::Serial);

        for entry_result in walker {
            let entry = match entry_result {
                Ok(e) => e,
                Err(err) => {
                    let path = err
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| root.to_path_buf());
                    summary.failed += 1;
                    report_failure(
                        sink,
                        WalkError::Enumerate {
                            path,
                            message: err.to_string(),
                        },
                    );
                    continue;
                }
            };

            let file_type = entry.file_type();
            if file_type.is_dir() {
                continue;
            }
            let path = entry.path();
            if file_type.is_symlink() && points_to_dir(&path) {
                debug!("Not following directory link {}", path.display());
                continue;
            }

            summary.visited += 1;
            progress(summary.visited, &path);

            match self.inspect(&path, filter) {
                Ok(Some((record, bytes))) => {
                    if let Err(error) = on_record(record) {
                        return Err(WalkAborted { summary, error });
                    }
                    summary.accepted += 1;
                    summary.bytes_hashed += bytes;
                }
                Ok(None) => summary.filtered += 1,
                Err(err) => {
                    summary.failed += 1;
                    report_failure(sink, err);
                }
            }
        }

        Ok(summary)
    }

    /// Build the record for one file, or `None` if the filter rejects it.
    ///
    /// Returns the record together with the file size in bytes.
    pub fn inspect(
        &self,
        path: &Path,
        filter: Option<&dyn CreationFilter>,
    ) -> Result<Option<(FileRecord, u64)>, WalkError> {
        let meta = fs::metadata(path).map_err(|source| WalkError::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;
        let stat = raw_stat(&meta).map_err(|source| WalkError::Stat {
            path: path.to_path_buf(),
            source,
        })?;

        if let Some(filter) = filter {
            if !filter.accept(stat.created) {
                return Ok(None);
            }
        }

        let human = |epoch: i64| {
            self.codec
                .epoch_to_human(epoch)
                .map_err(|source| WalkError::Stat {
                    path: path.to_path_buf(),
                    source,
                })
        };
        let modified_time = human(stat.modified)?;
        let access_time = human(stat.accessed)?;
        let created_time = human(stat.created)?;

        let file = File::open(path).map_err(|source| WalkError::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;
        let digest = self
            .hash
            .digest_reader(file)
            .map_err(|source| WalkError::FileAccess {
                path: path.to_path_buf(),
                source,
            })?;

        let record = FileRecord {
            filename: file_name(path),
            directory_path: parent_dir(path),
            digest,
            size_kib: size_kib(stat.size),
            modified_time,
            access_time,
            created_time,
        };
        Ok(Some((record, stat.size)))
    }
}

fn points_to_dir(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.is_dir()).unwrap_or(false)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn parent_dir(path: &Path) -> String {
    path.parent()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn report_failure(sink: &mut dyn FailureSink, err: WalkError) {
    let kind = match &err {
        WalkError::FileAccess { .. } => FailureKind::FileAccess,
        WalkError::Enumerate { .. } => FailureKind::Enumerate,
        WalkError::Stat { .. } => FailureKind::TimeConversion,
    };
    let path: PathBuf = err.path().clone();
    sink.record(Failure::new(Component::Walker, kind, err.to_string()).with_path(path));
}
