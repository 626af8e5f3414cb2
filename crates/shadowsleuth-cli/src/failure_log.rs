/// Persistent failure log: one JSON object per line in the output directory.
use shadowsleuth_core::failure::log_failure;
use shadowsleuth_core::{Failure, FailureKind, FailureSink};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::warn;

/// File name of the log inside the output directory.
pub const FAILURE_LOG_NAME: &str = "failures.jsonl";

/// Appends every failure to `<output>/failures.jsonl` and mirrors it to
/// the tracing log.
///
/// The file is opened on the first failure so a clean run leaves nothing
/// behind. If the log itself cannot be written, failures still reach
/// tracing.
#[derive(Debug)]
pub struct JsonLinesSink {
    path: PathBuf,
    file: Option<File>,
    broken: bool,
    recorded: u64,
    kinds: Vec<FailureKind>,
}

impl JsonLinesSink {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            path: output_dir.join(FAILURE_LOG_NAME),
            file: None,
            broken: false,
            recorded: 0,
            kinds: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Failures recorded through this sink.
    pub fn recorded(&self) -> u64 {
        self.recorded
    }

    /// How many failures of `kind` were recorded.
    pub fn count(&self, kind: FailureKind) -> usize {
        self.kinds.iter().filter(|k| **k == kind).count()
    }

    fn open(&mut self) -> std::io::Result<&mut File> {
        if self.file.is_none() {
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)?;
            self.file = Some(file);
        }
        match self.file.as_mut() {
            Some(file) => Ok(file),
            None => Err(std::io::Error::other("failure log not open")),
        }
    }

    fn append(&mut self, failure: &Failure) -> std::io::Result<()> {
        let line = serde_json::to_string(failure)?;
        let file = self.open()?;
        writeln!(file, "{line}")?;
        file.flush()
    }
}

impl FailureSink for JsonLinesSink {
    fn record(&mut self, failure: Failure) {
        log_failure(&failure);
        self.recorded += 1;
        self.kinds.push(failure.kind);

        if self.broken {
            return;
        }
        if let Err(err) = self.append(&failure) {
            warn!("Cannot write failure log {}: {err}", self.path.display());
            self.broken = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shadowsleuth_core::failure::Component;
    use tempfile::TempDir;

    #[test]
    fn clean_run_leaves_no_file() {
        let tmp = TempDir::new().unwrap();
        let sink = JsonLinesSink::new(tmp.path());
        assert!(!sink.path().exists());
        assert_eq!(sink.recorded(), 0);
    }

    #[test]
    fn failures_are_appended_as_json_lines() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("ProcessingOutput");
        let mut sink = JsonLinesSink::new(&out);

        sink.record(
            Failure::new(Component::Walker, FailureKind::FileAccess, "permission denied")
                .with_path("/snap/locked.db"),
        );
        sink.record(Failure::new(Component::Catalog, FailureKind::Parse, "listing line 4"));

        let text = fs::read_to_string(out.join(FAILURE_LOG_NAME)).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["source"], "walker");
        assert_eq!(lines[0]["kind"], "file_access");
        assert_eq!(lines[0]["path"], "/snap/locked.db");
        assert_eq!(lines[1]["kind"], "parse");
        assert!(lines[1].get("path").is_none());

        assert_eq!(sink.recorded(), 2);
        assert_eq!(sink.count(FailureKind::FileAccess), 1);
    }

    #[test]
    fn unwritable_log_still_counts() {
        let tmp = TempDir::new().unwrap();
        // A file where the directory should be.
        let blocker = tmp.path().join("out");
        fs::write(&blocker, b"x").unwrap();

        let mut sink = JsonLinesSink::new(&blocker);
        sink.record(Failure::new(Component::Walker, FailureKind::Enumerate, "gone"));
        sink.record(Failure::new(Component::Walker, FailureKind::Enumerate, "gone"));
        assert_eq!(sink.recorded(), 2);
    }
}
