/// ShadowSleuth Core: snapshot catalog, file hashing walker, and delta
/// comparison engine.
///
/// This crate contains all triage logic with no terminal dependencies.
/// Frontends obtain listing text, pick a [`session::RunMode`], and hand a
/// [`failure::FailureSink`] to a [`session::Session`].
///
/// # Modules
///
/// - [`catalog`]: parses `vssadmin list shadows` text into snapshots.
/// - [`time_codec`]: listing, epoch, and report timestamp conversions.
/// - [`scanner`]: sequential walker with streaming content digests.
/// - [`compare`]: baseline threshold and delta inclusion rule.
/// - [`report`]: CSV report writer and visualisation data export.
/// - [`session`]: full and compare runs, foreground or on a worker thread.
/// - [`platform`]: listing capture, elevation check, raw file timestamps.
pub mod catalog;
pub mod compare;
pub mod config;
pub mod error;
pub mod failure;
pub mod model;
pub mod platform;
pub mod report;
pub mod scanner;
pub mod session;
pub mod time_codec;

pub use catalog::SnapshotCatalog;
pub use compare::{ComparisonEngine, DeltaPlan};
pub use config::Config;
pub use error::{CatalogError, ReportError, SessionError, TimeError, WalkError};
pub use failure::{CollectingSink, Failure, FailureKind, FailureSink, TracingSink};
pub use model::{FileRecord, Snapshot};
pub use session::{start_session, RunMode, Session, SessionSummary};
pub use time_codec::{TimeCodec, Zone};
