/// Structured failure signals and the sinks that receive them.
///
/// The core never decides where failures are persisted. Components hand a
/// [`Failure`] to whatever [`FailureSink`] the caller supplied and carry on.
use serde::Serialize;
use std::path::PathBuf;
use tracing::warn;

/// Component that raised a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    Catalog,
    TimeCodec,
    Walker,
    Report,
    Session,
}

impl Component {
    pub fn label(self) -> &'static str {
        match self {
            Self::Catalog => "catalog",
            Self::TimeCodec => "time_codec",
            Self::Walker => "walker",
            Self::Report => "report",
            Self::Session => "session",
        }
    }
}

/// Failure classification, one variant per recoverable error kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Parse,
    TimeFormat,
    TimeConversion,
    FileAccess,
    Enumerate,
    ReportCreate,
    ReportWrite,
    ReportRead,
    OutputDirExists,
}

/// A single recovered failure with enough context to reproduce it.
#[derive(Debug, Clone, Serialize)]
pub struct Failure {
    pub source: Component,
    pub kind: FailureKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Failure {
    pub fn new(source: Component, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            source,
            kind,
            message: message.into(),
            path: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }
}

/// Destination for recovered failures.
pub trait FailureSink {
    fn record(&mut self, failure: Failure);
}

/// Logs every failure through `tracing` and keeps nothing.
#[derive(Debug, Default)]
pub struct TracingSink;

impl FailureSink for TracingSink {
    fn record(&mut self, failure: Failure) {
        log_failure(&failure);
    }
}

/// Logs every failure and keeps it in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub failures: Vec<Failure>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, kind: FailureKind) -> usize {
        self.failures.iter().filter(|f| f.kind == kind).count()
    }
}

impl FailureSink for CollectingSink {
    fn record(&mut self, failure: Failure) {
        log_failure(&failure);
        self.failures.push(failure);
    }
}

/// Emit a failure as a structured `warn!` event.
pub fn log_failure(failure: &Failure) {
    let path = failure
        .path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    warn!(
        source = failure.source.label(),
        kind = ?failure.kind,
        path = %path,
        "{}",
        failure.message
    );
}
