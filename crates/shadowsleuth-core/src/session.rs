/// Session orchestration: runs a full or compare pass over a catalog.
///
/// Snapshots are processed strictly in catalog order, one file at a time.
/// Per-item failures are recovered where they happen and sent to the
/// failure sink; only the conditions in [`SessionError`] end a run.
///
/// [`start_session`] runs the same work on a named background thread and
/// streams [`ScanProgress`] messages back over a bounded channel, the way a
/// frontend wants it.
use crate::catalog::SnapshotCatalog;
use crate::compare::{ComparisonEngine, CreationFilter, DeltaPlan};
use crate::config::Config;
use crate::error::{ReportError, SessionError};
use crate::failure::{Component, Failure, FailureKind, FailureSink};
use crate::model::Snapshot;
use crate::report::{ReportMode, ReportWriter, FULL_REPORT_NAME};
use crate::scanner::progress::{PassKind, ScanProgress};
use crate::scanner::walker::{FileWalker, WalkAborted, WalkSummary};
use crate::time_codec::TimeCodec;
use crossbeam_channel::{Receiver, Sender};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Maximum number of progress messages that may queue up in the channel.
///
/// Progress is best-effort: when the frontend falls behind, updates are
/// dropped rather than stalling the walk.
pub const PROGRESS_CHANNEL_CAPACITY: usize = 1_024;

/// What a run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// One report covering every snapshot.
    Full,
    /// Baseline report plus one delta report per later snapshot.
    /// `baseline` is a zero-based catalog position.
    Compare { baseline: usize },
}

/// Final state of one report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportStatus {
    Complete,
    /// A row write failed; rows before it are intact.
    Aborted(String),
    /// The report file could not be created; nothing was walked.
    NotCreated(String),
}

#[derive(Debug, Clone)]
pub struct ReportOutcome {
    pub name: String,
    pub path: PathBuf,
    pub kind: PassKind,
    /// Snapshots that contributed, in processing order.
    pub snapshots: Vec<String>,
    pub walk: WalkSummary,
    pub rows: u64,
    pub status: ReportStatus,
}

#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub mode: RunMode,
    pub reports: Vec<ReportOutcome>,
    /// Failures recorded during the run.
    pub error_count: u64,
    pub duration: Duration,
}

impl SessionSummary {
    pub fn total_rows(&self) -> u64 {
        self.reports.iter().map(|r| r.rows).sum()
    }
}

/// Make sure the output directory exists. An existing directory is
/// reported and reused; failure to create a missing one ends the run.
pub fn prepare_output_dir(dir: &Path, sink: &mut dyn FailureSink) -> Result<(), SessionError> {
    if dir.is_dir() {
        sink.record(
            Failure::new(
                Component::Session,
                FailureKind::OutputDirExists,
                "output directory already exists; reports will be overwritten",
            )
            .with_path(dir),
        );
        return Ok(());
    }
    fs::create_dir_all(dir).map_err(|source| SessionError::OutputDir {
        path: dir.to_path_buf(),
        source,
    })?;
    info!("Created output directory {}", dir.display());
    Ok(())
}

/// A single triage run bound to one configuration and one failure sink.
pub struct Session<'a> {
    config: &'a Config,
    codec: TimeCodec,
    walker: FileWalker,
    sink: &'a mut dyn FailureSink,
    progress: Option<Sender<ScanProgress>>,
    error_count: u64,
}

impl<'a> Session<'a> {
    pub fn new(config: &'a Config, sink: &'a mut dyn FailureSink) -> Self {
        let codec = TimeCodec::new(config.time_zone);
        Self {
            config,
            codec,
            walker: FileWalker::new(config.hash, codec),
            sink,
            progress: None,
            error_count: 0,
        }
    }

    /// Stream progress messages to `tx`.
    ///
    /// Milestone messages block while the channel is full, so the receiver
    /// must be drained while the session runs.
    pub fn with_progress(mut self, tx: Sender<ScanProgress>) -> Self {
        self.progress = Some(tx);
        self
    }

    pub fn run(&mut self, catalog: &SnapshotCatalog, mode: RunMode) -> Result<SessionSummary, SessionError> {
        let start = Instant::now();
        if catalog.is_empty() {
            return Err(SessionError::EmptyCatalog);
        }
        prepare_output_dir(&self.config.output_dir, &mut *self.sink)?;

        let reports = match mode {
            RunMode::Full => vec![self.run_full(catalog)],
            RunMode::Compare { baseline } => self.run_compare(catalog, baseline)?,
        };

        let duration = start.elapsed();
        info!(
            "Run finished: {} reports, {} failures in {:?}",
            reports.len(),
            self.error_count,
            duration
        );
        self.emit(ScanProgress::Complete {
            duration,
            error_count: self.error_count,
        });
        Ok(SessionSummary {
            mode,
            reports,
            error_count: self.error_count,
            duration,
        })
    }

    /// Every file of every snapshot into one report, snapshot by snapshot.
    fn run_full(&mut self, catalog: &SnapshotCatalog) -> ReportOutcome {
        let mut outcome = self.outcome(FULL_REPORT_NAME, PassKind::Full);
        let Some(mut report) = self.open_report(&mut outcome) else {
            return outcome;
        };

        for snapshot in catalog {
            let finished = self.process_snapshot(snapshot, &mut report, &mut outcome, None);
            if !finished {
                break;
            }
        }
        self.close_report(report, &mut outcome);
        outcome
    }

    /// Baseline in full, then each later snapshot filtered by creation time.
    fn run_compare(
        &mut self,
        catalog: &SnapshotCatalog,
        baseline: usize,
    ) -> Result<Vec<ReportOutcome>, SessionError> {
        let plan = DeltaPlan::new(catalog, baseline)?;
        let base = plan.baseline();
        let threshold = base
            .creation_epoch(&self.codec)
            .map_err(|source| SessionError::BaselineTime {
                name: base.name().to_string(),
                source,
            })?;
        info!(
            "Baseline {} created {} (epoch {threshold}); {} snapshots to compare",
            base.name(),
            base.creation_time,
            plan.targets().len()
        );

        let mut outcomes = Vec::with_capacity(plan.targets().len() + 1);
        outcomes.push(self.run_single(base, ReportMode::Baseline, None));

        if plan.targets().is_empty() {
            info!("Baseline is the newest snapshot; nothing to compare");
            return Ok(outcomes);
        }

        let engine = ComparisonEngine::new(threshold);
        for target in plan.targets() {
            outcomes.push(self.run_single(target, ReportMode::Compare, Some(&engine)));
        }
        Ok(outcomes)
    }

    fn run_single(
        &mut self,
        snapshot: &Snapshot,
        mode: ReportMode,
        filter: Option<&dyn CreationFilter>,
    ) -> ReportOutcome {
        let kind = match filter {
            Some(_) => PassKind::Delta,
            None => PassKind::Full,
        };
        let mut outcome = self.outcome(&mode.report_name(snapshot), kind);
        if let Some(mut report) = self.open_report(&mut outcome) {
            self.process_snapshot(snapshot, &mut report, &mut outcome, filter);
            self.close_report(report, &mut outcome);
        }
        outcome
    }

    /// Walk one snapshot into `report`. Returns `false` if the report failed.
    fn process_snapshot<W: Write>(
        &mut self,
        snapshot: &Snapshot,
        report: &mut ReportWriter<W>,
        outcome: &mut ReportOutcome,
        filter: Option<&dyn CreationFilter>,
    ) -> bool {
        let name = snapshot.name().to_string();
        let root = snapshot.root_path(self.config.walk_subpath.as_deref());
        debug!("Walking {} for report {}", root.display(), outcome.name);
        self.emit(ScanProgress::SnapshotStarted {
            snapshot: name.clone(),
            report: outcome.name.clone(),
            kind: outcome.kind,
        });
        outcome.snapshots.push(name.clone());

        let rows_before = report.rows();
        let walker = self.walker;
        let progress_tx = self.progress.clone();
        let mut on_progress = |files_visited: u64, path: &Path| {
            if let Some(tx) = &progress_tx {
                let _ = tx.try_send(ScanProgress::Update {
                    snapshot: name.clone(),
                    files_visited,
                    current_path: path.to_path_buf(),
                });
            }
        };
        let mut sink = CountingSink {
            inner: &mut *self.sink,
            progress: self.progress.as_ref(),
            count: 0,
        };

        let result = walker.walk(&root, filter, &mut sink, &mut on_progress, |record| {
            report.append(&record)
        });
        self.error_count += sink.count;

        let (summary, aborted) = match result {
            Ok(summary) => (summary, None),
            Err(WalkAborted { summary, error }) => (summary, Some(error)),
        };
        add_summary(&mut outcome.walk, &summary);
        outcome.rows = report.rows();

        let finished = match aborted {
            None => true,
            Some(error) => {
                self.record_report_error(&error);
                outcome.status = ReportStatus::Aborted(error.to_string());
                false
            }
        };
        info!(
            "{}: {} files visited, {} rows written to {}",
            name,
            summary.visited,
            report.rows() - rows_before,
            outcome.name
        );
        self.emit(ScanProgress::SnapshotFinished {
            snapshot: name,
            rows_written: report.rows() - rows_before,
            aborted: !finished,
        });
        finished
    }

    fn outcome(&self, name: &str, kind: PassKind) -> ReportOutcome {
        ReportOutcome {
            name: name.to_string(),
            path: self.config.report_path(name),
            kind,
            snapshots: Vec::new(),
            walk: WalkSummary::default(),
            rows: 0,
            status: ReportStatus::Complete,
        }
    }

    fn open_report(&mut self, outcome: &mut ReportOutcome) -> Option<ReportWriter> {
        match ReportWriter::create(&outcome.path, self.config.hash) {
            Ok(report) => Some(report),
            Err(error) => {
                self.record_report_error(&error);
                outcome.status = ReportStatus::NotCreated(error.to_string());
                None
            }
        }
    }

    /// Flush a report that is still complete. An aborted one is dropped as is.
    fn close_report<W: Write>(&mut self, report: ReportWriter<W>, outcome: &mut ReportOutcome) {
        if outcome.status != ReportStatus::Complete {
            return;
        }
        match report.finish() {
            Ok(rows) => outcome.rows = rows,
            Err(error) => {
                self.record_report_error(&error);
                outcome.status = ReportStatus::Aborted(error.to_string());
            }
        }
    }

    fn record_report_error(&mut self, error: &ReportError) {
        let (kind, path) = match error {
            ReportError::Create { path, .. } => (FailureKind::ReportCreate, path),
            ReportError::Write { path, .. } => (FailureKind::ReportWrite, path),
            ReportError::Read { path, .. } | ReportError::Export { path, .. } => {
                (FailureKind::ReportRead, path)
            }
        };
        self.error_count += 1;
        self.emit(ScanProgress::Error {
            path: path.clone(),
            message: error.to_string(),
        });
        self.sink
            .record(Failure::new(Component::Report, kind, error.to_string()).with_path(path));
    }

    /// Per-file messages are dropped when the channel is full; milestones
    /// wait for the receiver.
    fn emit(&self, message: ScanProgress) {
        let Some(tx) = &self.progress else {
            return;
        };
        match message {
            ScanProgress::Update { .. } | ScanProgress::Error { .. } => {
                let _ = tx.try_send(message);
            }
            _ => {
                let _ = tx.send(message);
            }
        }
    }
}

/// Forwards walk failures to the real sink, mirrors them onto the progress
/// channel, and counts them.
struct CountingSink<'s> {
    inner: &'s mut dyn FailureSink,
    progress: Option<&'s Sender<ScanProgress>>,
    count: u64,
}

impl FailureSink for CountingSink<'_> {
    fn record(&mut self, failure: Failure) {
        self.count += 1;
        if let Some(tx) = self.progress {
            let _ = tx.try_send(ScanProgress::Error {
                path: failure.path.clone().unwrap_or_default(),
                message: failure.message.clone(),
            });
        }
        self.inner.record(failure);
    }
}

fn add_summary(total: &mut WalkSummary, part: &WalkSummary) {
    total.visited += part.visited;
    total.accepted += part.accepted;
    total.filtered += part.filtered;
    total.failed += part.failed;
    total.bytes_hashed += part.bytes_hashed;
}

/// Handle to a session running on a background thread.
pub struct SessionHandle<S> {
    /// Progress messages from the worker.
    pub progress_rx: Receiver<ScanProgress>,
    thread: thread::JoinHandle<(Result<SessionSummary, SessionError>, S)>,
}

impl<S> SessionHandle<S> {
    /// Wait for the worker and take back the run result and the sink.
    pub fn join(self) -> Result<(SessionSummary, S), SessionError> {
        let (result, sink) = self.thread.join().map_err(|_| SessionError::WorkerPanicked)?;
        result.map(|summary| (summary, sink))
    }
}

/// Run a session on a background thread.
///
/// The sink is moved to the worker and handed back by
/// [`SessionHandle::join`].
pub fn start_session<S>(
    config: Config,
    catalog: SnapshotCatalog,
    mode: RunMode,
    mut sink: S,
) -> SessionHandle<S>
where
    S: FailureSink + Send + 'static,
{
    let (progress_tx, progress_rx) =
        crossbeam_channel::bounded::<ScanProgress>(PROGRESS_CHANNEL_CAPACITY);

    let thread = thread::Builder::new()
        .name("shadowsleuth-session".into())
        .spawn(move || {
            info!("Starting {:?} run over {} snapshots", mode, catalog.len());
            let result = Session::new(&config, &mut sink)
                .with_progress(progress_tx)
                .run(&catalog, mode);
            (result, sink)
        })
        .expect("failed to spawn session thread");

    SessionHandle {
        progress_rx,
        thread,
    }
}
