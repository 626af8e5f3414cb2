/// Single-writer report session.
///
/// One file handle is held for the report's whole lifetime. The header is
/// written and flushed by [`ReportWriter::create`], before any row can be
/// appended. Every row is flushed as it is written, so an interrupted run
/// leaves a truncated but well-formed report. Creating a report that
/// already exists truncates it.
use crate::error::ReportError;
use crate::model::FileRecord;
use crate::report::header;
use crate::scanner::hasher::HashAlgorithm;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct ReportWriter<W: Write = File> {
    path: PathBuf,
    writer: csv::Writer<W>,
    rows: u64,
}

impl<W: Write> std::fmt::Debug for ReportWriter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportWriter")
            .field("path", &self.path)
            .field("rows", &self.rows)
            .finish()
    }
}

impl ReportWriter<File> {
    /// Create (or truncate) the report at `path` and write its header.
    pub fn create(path: &Path, hash: HashAlgorithm) -> Result<Self, ReportError> {
        let file = File::create(path).map_err(|source| ReportError::Create {
            path: path.to_path_buf(),
            source,
        })?;
        let report = Self::from_writer(path, file, hash)?;
        debug!("Created report {}", path.display());
        Ok(report)
    }
}

impl<W: Write> ReportWriter<W> {
    /// Write the header to an already open destination. `path` only labels
    /// errors.
    pub fn from_writer(path: &Path, inner: W, hash: HashAlgorithm) -> Result<Self, ReportError> {
        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::CRLF)
            .from_writer(inner);

        let mut report = Self {
            path: path.to_path_buf(),
            writer,
            rows: 0,
        };
        report.write_fields(header(hash))?;
        Ok(report)
    }

    /// Append one record as a row.
    pub fn append(&mut self, record: &FileRecord) -> Result<(), ReportError> {
        let size = record.size_kib.to_string();
        self.write_fields([
            record.filename.as_str(),
            record.directory_path.as_str(),
            record.digest.as_str(),
            size.as_str(),
            record.modified_time.as_str(),
            record.access_time.as_str(),
            record.created_time.as_str(),
        ])?;
        self.rows += 1;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Data rows written so far (the header is not counted).
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Flush and close, returning the row count.
    pub fn finish(mut self) -> Result<u64, ReportError> {
        self.flush()?;
        Ok(self.rows)
    }

    fn write_fields(&mut self, fields: [&str; 7]) -> Result<(), ReportError> {
        self.writer
            .write_record(fields)
            .map_err(|source| self.write_error(source))?;
        self.flush()
    }

    fn flush(&mut self) -> Result<(), ReportError> {
        self.writer
            .flush()
            .map_err(|e| self.write_error(csv::Error::from(e)))
    }

    fn write_error(&self, source: csv::Error) -> ReportError {
        ReportError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(name: &str) -> FileRecord {
        FileRecord {
            filename: name.to_string(),
            directory_path: r"\\?\GLOBALROOT\Device\HarddiskVolumeShadowCopy1\Users\bob".to_string(),
            digest: "781e5e245d69b566979b86e28d23f2c7".to_string(),
            size_kib: 3,
            modified_time: "01/02/2023 10:00:00".to_string(),
            access_time: "02/02/2023 11:00:00".to_string(),
            created_time: "31/01/2023 09:00:00".to_string(),
        }
    }

    #[test]
    fn header_precedes_rows() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("Baseline_X.csv");

        let mut report = ReportWriter::create(&path, HashAlgorithm::Md5).unwrap();
        report.append(&record("a.txt")).unwrap();
        report.append(&record("b, with comma.txt")).unwrap();
        assert_eq!(report.finish().unwrap(), 2);

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "Filename,Path,MD5,Size,Modified Time,Access Time,Created Time"
        );
        assert!(lines[1].starts_with("a.txt,"));
        assert!(lines[2].starts_with("\"b, with comma.txt\","));
        assert_eq!(text.matches("Filename,Path").count(), 1);
    }

    #[test]
    fn header_is_on_disk_before_first_row() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("Compare_X.csv");
        let report = ReportWriter::create(&path, HashAlgorithm::Sha256).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "Filename,Path,SHA256,Size,Modified Time,Access Time,Created Time\r\n"
        );
        assert_eq!(report.rows(), 0);
    }

    #[test]
    fn recreate_truncates_previous_report() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("All_ShadowCopy_Files.csv");

        let mut first = ReportWriter::create(&path, HashAlgorithm::Md5).unwrap();
        first.append(&record("old.txt")).unwrap();
        first.finish().unwrap();

        let second = ReportWriter::create(&path, HashAlgorithm::Md5).unwrap();
        second.finish().unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 1);
    }

    /// Accepts `budget` bytes, then fails every write.
    struct DiskFull {
        budget: usize,
        written: Vec<u8>,
    }

    impl Write for DiskFull {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if buf.len() > self.budget {
                return Err(std::io::Error::other("no space left on device"));
            }
            self.budget -= buf.len();
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn failed_row_is_a_write_error() {
        let path = Path::new("Compare_X.csv");
        let sink = DiskFull {
            budget: 128,
            written: Vec::new(),
        };
        let mut report = ReportWriter::from_writer(path, sink, HashAlgorithm::Md5).unwrap();
        assert!(matches!(
            report.append(&record("a.txt")),
            Err(ReportError::Write { .. })
        ));
        assert_eq!(report.rows(), 0);
    }

    #[test]
    fn missing_directory_is_a_create_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("no_such_dir").join("r.csv");
        assert!(matches!(
            ReportWriter::create(&path, HashAlgorithm::Md5),
            Err(ReportError::Create { .. })
        ));
    }
}
