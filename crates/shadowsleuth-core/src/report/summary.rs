/// Visualisation data derived from finished reports.
///
/// Reads reports back by column name and counts file types and MAC dates
/// per report. Rows that lack an extension, a column, or a parsable date
/// are local misses: counted, logged at debug level, never fatal. Chart
/// rendering is left to external tooling that consumes the JSON output.
use crate::error::ReportError;
use crate::failure::{Component, Failure, FailureKind, FailureSink};
use crate::report::{COLUMN_ACCESS, COLUMN_CREATED, COLUMN_FILENAME, COLUMN_MODIFIED};
use crate::time_codec::REPORT_DATE_FORMAT;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Sub-directory of the output directory receiving visualisation data.
pub const VISUALISATION_DIR: &str = "Visualisation";

/// Number of files seen on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateCount {
    pub date: String,
    pub count: u64,
}

/// Counts for one report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    /// Report file name.
    pub report: String,
    /// Label used as the chart title: the report name after its last `_`.
    pub label: String,
    /// Data rows read.
    pub rows: u64,
    /// Lowercase extension -> file count.
    pub file_types: BTreeMap<String, u64>,
    /// Per-day counts, oldest first.
    pub created: Vec<DateCount>,
    pub modified: Vec<DateCount>,
    pub accessed: Vec<DateCount>,
    /// Cells that could not contribute to a count.
    pub misses: u64,
}

/// Column indices resolved from a report header.
struct Columns {
    filename: Option<usize>,
    created: Option<usize>,
    modified: Option<usize>,
    accessed: Option<usize>,
}

impl Columns {
    fn resolve(headers: &csv::StringRecord) -> Self {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        Self {
            filename: find(COLUMN_FILENAME),
            created: find(COLUMN_CREATED),
            modified: find(COLUMN_MODIFIED),
            accessed: find(COLUMN_ACCESS),
        }
    }
}

/// Summarise one report.
///
/// `type_filter` restricts file-type counting to the listed extensions
/// (case-insensitive); listed types that never occur are reported as zero.
pub fn summarise_report(
    path: &Path,
    type_filter: Option<&[String]>,
    sink: &mut dyn FailureSink,
) -> Result<ReportSummary, ReportError> {
    let read_err = |source: csv::Error| ReportError::Read {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(read_err)?;
    let columns = Columns::resolve(reader.headers().map_err(read_err)?);

    let wanted: Option<Vec<String>> =
        type_filter.map(|types| types.iter().map(|t| normalise_type(t)).collect());

    let report = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut summary = ReportSummary {
        label: chart_label(path),
        report,
        ..ReportSummary::default()
    };
    if let Some(wanted) = &wanted {
        for t in wanted {
            summary.file_types.insert(t.clone(), 0);
        }
    }

    let mut created = BTreeMap::new();
    let mut modified = BTreeMap::new();
    let mut accessed = BTreeMap::new();

    for (idx, result) in reader.records().enumerate() {
        let row = match result {
            Ok(row) => row,
            Err(err) => {
                summary.misses += 1;
                sink.record(
                    Failure::new(
                        Component::Report,
                        FailureKind::ReportRead,
                        format!("row {}: {err}", idx + 1),
                    )
                    .with_path(path),
                );
                continue;
            }
        };
        summary.rows += 1;

        match cell(&row, columns.filename).and_then(extension) {
            Some(ext) => {
                let counted = wanted.as_ref().map_or(true, |w| w.contains(&ext));
                if counted {
                    *summary.file_types.entry(ext).or_insert(0) += 1;
                }
            }
            None => {
                debug!("{}: row {} has no file type", path.display(), idx + 1);
                summary.misses += 1;
            }
        }

        for (column, bucket) in [
            (columns.created, &mut created),
            (columns.modified, &mut modified),
            (columns.accessed, &mut accessed),
        ] {
            match cell(&row, column).and_then(date_part) {
                Some(date) => *bucket.entry(date).or_insert(0u64) += 1,
                None => summary.misses += 1,
            }
        }
    }

    summary.created = into_date_counts(created);
    summary.modified = into_date_counts(modified);
    summary.accessed = into_date_counts(accessed);
    Ok(summary)
}

/// Summarise every report in `dir` with the given extension, by file name.
///
/// A report that cannot be opened is recorded and skipped.
pub fn summarise_directory(
    dir: &Path,
    extension: &str,
    type_filter: Option<&[String]>,
    sink: &mut dyn FailureSink,
) -> Result<Vec<ReportSummary>, ReportError> {
    let entries = fs::read_dir(dir).map_err(|source| ReportError::Export {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut reports: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|e| e == extension))
        .collect();
    reports.sort();

    let mut summaries = Vec::with_capacity(reports.len());
    for path in reports {
        match summarise_report(&path, type_filter, sink) {
            Ok(summary) => summaries.push(summary),
            Err(err) => sink.record(
                Failure::new(Component::Report, FailureKind::ReportRead, err.to_string())
                    .with_path(&path),
            ),
        }
    }
    Ok(summaries)
}

/// Per-report file-type counts, as written to `Filetypes.json`.
#[derive(Serialize)]
struct TypeCounts<'a> {
    label: &'a str,
    file_types: &'a BTreeMap<String, u64>,
}

/// Per-report MAC date series, as written to `MAC-Times.json`.
#[derive(Serialize)]
struct MacSeries<'a> {
    label: &'a str,
    created: &'a [DateCount],
    modified: &'a [DateCount],
    accessed: &'a [DateCount],
}

/// Write `Filetypes.json` and `MAC-Times.json` under `<dir>/Visualisation`.
///
/// Both files are keyed by report file name, so a baseline and a delta
/// report of the same snapshot stay separate; each entry carries its chart
/// label. Returns the directory written to.
pub fn write_visualisation(dir: &Path, summaries: &[ReportSummary]) -> Result<PathBuf, ReportError> {
    let out_dir = dir.join(VISUALISATION_DIR);
    fs::create_dir_all(&out_dir).map_err(|source| ReportError::Export {
        path: out_dir.clone(),
        source,
    })?;

    let file_types: BTreeMap<&str, TypeCounts<'_>> = summaries
        .iter()
        .map(|s| {
            (
                s.report.as_str(),
                TypeCounts {
                    label: &s.label,
                    file_types: &s.file_types,
                },
            )
        })
        .collect();
    write_json(&out_dir.join("Filetypes.json"), &file_types)?;

    let mac: BTreeMap<&str, MacSeries<'_>> = summaries
        .iter()
        .map(|s| {
            (
                s.report.as_str(),
                MacSeries {
                    label: &s.label,
                    created: &s.created,
                    modified: &s.modified,
                    accessed: &s.accessed,
                },
            )
        })
        .collect();
    write_json(&out_dir.join("MAC-Times.json"), &mac)?;

    info!(
        "Wrote visualisation data for {} reports to {}",
        summaries.len(),
        out_dir.display()
    );
    Ok(out_dir)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ReportError> {
    let export_err = |source: std::io::Error| ReportError::Export {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(export_err)?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)
        .map_err(|e| export_err(e.into()))
}

fn cell(row: &csv::StringRecord, column: Option<usize>) -> Option<&str> {
    row.get(column?).map(str::trim).filter(|v| !v.is_empty())
}

/// Extension after the last dot, lowercased. `None` for names without one.
fn extension(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    (!ext.is_empty()).then(|| ext.to_ascii_lowercase())
}

fn normalise_type(t: &str) -> String {
    t.trim().trim_start_matches('.').to_ascii_lowercase()
}

/// Date part of a `DD/MM/YYYY hh:mm:ss` cell.
fn date_part(value: &str) -> Option<NaiveDate> {
    let date = value.split(' ').next()?;
    NaiveDate::parse_from_str(date, REPORT_DATE_FORMAT).ok()
}

fn into_date_counts(counts: BTreeMap<NaiveDate, u64>) -> Vec<DateCount> {
    counts
        .into_iter()
        .map(|(date, count)| DateCount {
            date: date.format(REPORT_DATE_FORMAT).to_string(),
            count,
        })
        .collect()
}

fn chart_label(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match stem.rsplit_once('_') {
        Some((_, tail)) => tail.to_string(),
        None => stem,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::failure::CollectingSink;
    use tempfile::TempDir;

    const REPORT: &str = "\
Filename,Path,MD5,Size,Modified Time,Access Time,Created Time\r
a.JPG,C:\\x,d41d8cd98f00b204e9800998ecf8427e,1,02/01/2023 10:00:00,02/01/2023 10:00:00,01/01/2023 09:00:00\r
b.jpg,C:\\x,d41d8cd98f00b204e9800998ecf8427e,1,01/01/2023 10:00:00,15/12/2022 10:00:00,01/01/2023 09:00:00\r
README,C:\\x,d41d8cd98f00b204e9800998ecf8427e,0,01/01/2023 10:00:00,01/01/2023 10:00:00,01/01/2023 09:00:00\r
notes.pdf,C:\\x,d41d8cd98f00b204e9800998ecf8427e,0,garbage,01/01/2023 10:00:00\r
";

    fn write_report(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, REPORT).unwrap();
        path
    }

    #[test]
    fn counts_types_and_dates() {
        let tmp = TempDir::new().unwrap();
        let path = write_report(tmp.path(), "Compare_HarddiskVolumeShadowCopy2.csv");
        let mut sink = CollectingSink::new();

        let summary = summarise_report(&path, None, &mut sink).unwrap();
        assert_eq!(summary.label, "HarddiskVolumeShadowCopy2");
        assert_eq!(summary.rows, 4);
        assert_eq!(summary.file_types.get("jpg"), Some(&2));
        assert_eq!(summary.file_types.get("pdf"), Some(&1));
        assert_eq!(summary.file_types.len(), 2);

        // Accessed dates are sorted chronologically, not lexically.
        let accessed: Vec<_> = summary.accessed.iter().map(|d| d.date.as_str()).collect();
        assert_eq!(accessed, ["15/12/2022", "01/01/2023", "02/01/2023"]);
        assert_eq!(summary.created, vec![DateCount { date: "01/01/2023".into(), count: 3 }]);

        // README (no extension), garbage modified date, missing created cell.
        assert_eq!(summary.misses, 3);
        assert!(sink.failures.is_empty());
    }

    #[test]
    fn type_filter_keeps_listed_types_only() {
        let tmp = TempDir::new().unwrap();
        let path = write_report(tmp.path(), "Baseline_X.csv");
        let filter = vec!["jpg".to_string(), ".PNG".to_string()];

        let summary = summarise_report(&path, Some(&filter), &mut CollectingSink::new()).unwrap();
        assert_eq!(summary.file_types.get("jpg"), Some(&2));
        assert_eq!(summary.file_types.get("png"), Some(&0));
        assert!(!summary.file_types.contains_key("pdf"));
    }

    #[test]
    fn directory_summary_writes_json() {
        let tmp = TempDir::new().unwrap();
        write_report(tmp.path(), "Baseline_A.csv");
        write_report(tmp.path(), "Compare_B.csv");
        fs::write(tmp.path().join("failures.jsonl"), "{}").unwrap();

        let mut sink = CollectingSink::new();
        let summaries = summarise_directory(tmp.path(), "csv", None, &mut sink).unwrap();
        let labels: Vec<_> = summaries.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, ["A", "B"]);

        let out = write_visualisation(tmp.path(), &summaries).unwrap();
        let types: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(out.join("Filetypes.json")).unwrap()).unwrap();
        assert_eq!(types["Baseline_A.csv"]["label"], "A");
        assert_eq!(types["Baseline_A.csv"]["file_types"]["jpg"], 2);
        let mac: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(out.join("MAC-Times.json")).unwrap()).unwrap();
        assert_eq!(mac["Compare_B.csv"]["label"], "B");
        assert_eq!(mac["Compare_B.csv"]["created"][0]["count"], 3);
    }

    #[test]
    fn baseline_and_delta_of_one_snapshot_stay_separate() {
        let tmp = TempDir::new().unwrap();
        let header = "Filename,Path,MD5,Size,Modified Time,Access Time,Created Time\r\n";
        let row = |name: &str| {
            format!("{name},C:\\,d41d8cd98f00b204e9800998ecf8427e,0,01/01/2023 10:00:00,01/01/2023 10:00:00,01/01/2023 10:00:00\r\n")
        };
        fs::write(
            tmp.path().join("Baseline_HarddiskVolumeShadowCopy2.csv"),
            format!("{header}{}", row("a.jpg")),
        )
        .unwrap();
        fs::write(
            tmp.path().join("Compare_HarddiskVolumeShadowCopy2.csv"),
            format!("{header}{}", row("b.pdf")),
        )
        .unwrap();

        let mut sink = CollectingSink::new();
        let summaries = summarise_directory(tmp.path(), "csv", None, &mut sink).unwrap();
        assert_eq!(summaries.len(), 2);
        let out = write_visualisation(tmp.path(), &summaries).unwrap();

        let types: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(out.join("Filetypes.json")).unwrap()).unwrap();
        let entries = types.as_object().unwrap();
        assert_eq!(entries.len(), 2);
        let baseline = &types["Baseline_HarddiskVolumeShadowCopy2.csv"];
        let delta = &types["Compare_HarddiskVolumeShadowCopy2.csv"];
        assert_eq!(baseline["label"], "HarddiskVolumeShadowCopy2");
        assert_eq!(baseline["file_types"]["jpg"], 1);
        assert_eq!(delta["label"], "HarddiskVolumeShadowCopy2");
        assert_eq!(delta["file_types"]["pdf"], 1);

        let mac: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(out.join("MAC-Times.json")).unwrap()).unwrap();
        assert_eq!(mac.as_object().unwrap().len(), 2);
    }

    #[test]
    fn extension_rules() {
        assert_eq!(extension("photo.JPEG").as_deref(), Some("jpeg"));
        assert_eq!(extension("archive.tar.gz").as_deref(), Some("gz"));
        assert_eq!(extension("Makefile"), None);
        assert_eq!(extension("trailing."), None);
    }
}
