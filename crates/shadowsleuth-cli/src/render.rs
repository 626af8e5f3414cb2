/// Console output: banner, snapshot listing, live progress and run summary.
use shadowsleuth_core::model::size::{format_count, format_size};
use shadowsleuth_core::report::summary::ReportSummary;
use shadowsleuth_core::scanner::{PassKind, ScanProgress};
use shadowsleuth_core::session::ReportStatus;
use shadowsleuth_core::{SessionSummary, SnapshotCatalog};
use std::io::{self, Write};
use std::path::Path;

pub fn print_banner<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "ShadowSleuth {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(
        out,
        "Walks every Volume Shadow Copy on this volume and records the name, path, \
         digest, size and MAC times of each file."
    )?;
    writeln!(out)?;
    writeln!(out, "  -l, --list       list available shadow copies")?;
    writeln!(out, "  -p, --parse      report on all copies, or compare against a baseline")?;
    writeln!(out, "  -v, --visualize  derive chart data from generated reports")?;
    writeln!(out)?;
    writeln!(out, "Run with --help for every option.")
}

/// Print every snapshot, numbered from 1.
pub fn print_listing<W: Write>(out: &mut W, catalog: &SnapshotCatalog) -> io::Result<()> {
    writeln!(out, "{} shadow copies found", catalog.len())?;
    for (i, snapshot) in catalog.iter().enumerate() {
        writeln!(out)?;
        writeln!(out, "[{}] {}", i + 1, snapshot.name())?;
        writeln!(out, "    Shadow copy set:  {}", snapshot.id)?;
        if let Some(id) = &snapshot.shadow_copy_id {
            writeln!(out, "    Shadow copy ID:   {id}")?;
        }
        writeln!(out, "    Created:          {}", snapshot.creation_time)?;
        if let Some(machine) = &snapshot.originating_machine {
            writeln!(out, "    Machine:          {machine}")?;
        }
        if let Some(volume) = &snapshot.original_volume {
            writeln!(out, "    Original volume:  {volume}")?;
        }
        writeln!(out, "    Volume path:      {}", snapshot.volume_path)?;
    }
    Ok(())
}

/// Tracks the single rewritten progress line.
#[derive(Debug, Default)]
pub struct ProgressLine {
    open: bool,
}

impl ProgressLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle<W: Write>(&mut self, out: &mut W, msg: &ScanProgress) -> io::Result<()> {
        match msg {
            ScanProgress::SnapshotStarted {
                snapshot,
                report,
                kind,
            } => {
                self.close(out)?;
                let pass = match kind {
                    PassKind::Full => "all files",
                    PassKind::Delta => "files created after baseline",
                };
                writeln!(out, "Processing {snapshot} ({pass}) into {report}")?;
            }
            ScanProgress::Update {
                snapshot,
                files_visited,
                ..
            } => {
                write!(out, "\rProcessing file: {files_visited} in: {snapshot}")?;
                out.flush()?;
                self.open = true;
            }
            // Persisted by the failure log; the line stays a counter.
            ScanProgress::Error { .. } => {}
            ScanProgress::SnapshotFinished {
                snapshot,
                rows_written,
                aborted,
            } => {
                self.close(out)?;
                if *aborted {
                    writeln!(out, "{snapshot}: report aborted after {rows_written} rows")?;
                } else {
                    writeln!(out, "{snapshot}: {} rows written", format_count(*rows_written))?;
                }
            }
            ScanProgress::Complete { .. } => self.close(out)?,
        }
        Ok(())
    }

    fn close<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        if self.open {
            writeln!(out)?;
            self.open = false;
        }
        Ok(())
    }
}

pub fn print_summary<W: Write>(
    out: &mut W,
    summary: &SessionSummary,
    failure_log: &Path,
) -> io::Result<()> {
    writeln!(out)?;
    writeln!(
        out,
        "Finished in {:.1}s: {} reports, {} rows",
        summary.duration.as_secs_f64(),
        summary.reports.len(),
        format_count(summary.total_rows())
    )?;
    for report in &summary.reports {
        let status = match &report.status {
            ReportStatus::Complete => "complete".to_string(),
            ReportStatus::Aborted(reason) => format!("aborted: {reason}"),
            ReportStatus::NotCreated(reason) => format!("not created: {reason}"),
        };
        writeln!(
            out,
            "  {}  {} rows, {} visited, {} filtered, {} failed, {} hashed ({status})",
            report.path.display(),
            format_count(report.rows),
            format_count(report.walk.visited),
            format_count(report.walk.filtered),
            format_count(report.walk.failed),
            format_size(report.walk.bytes_hashed),
        )?;
    }
    if summary.error_count > 0 {
        writeln!(
            out,
            "{} errors recorded in {}",
            format_count(summary.error_count),
            failure_log.display()
        )?;
    }
    Ok(())
}

pub fn print_visualisation<W: Write>(
    out: &mut W,
    summaries: &[ReportSummary],
    written_to: &Path,
) -> io::Result<()> {
    for summary in summaries {
        let types: u64 = summary.file_types.values().sum();
        writeln!(
            out,
            "{}: {} rows, {} typed files, {} creation dates",
            summary.label,
            format_count(summary.rows),
            format_count(types),
            summary.created.len()
        )?;
    }
    writeln!(out, "Chart data written to {}", written_to.display())
}
