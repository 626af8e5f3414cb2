/// Snapshot catalog: parses `vssadmin list shadows` text into snapshots.
///
/// # Grammar
///
/// The listing is a sequence of line blocks separated by blank lines. A
/// block opens with a line starting with `Contents` whose identifier follows
/// the first colon. Every other line in the block is a `key: value` pair.
/// Keys ending in `creation time` are normalised regardless of their prefix
/// (the listing says `Contained 1 shadow copies at creation time: ...`).
///
/// Parsing is best-effort per line: lines before the first block are
/// ignored, a line without a colon inside a block is skipped and reported,
/// and a block missing a required field or carrying an unreadable creation
/// time is skipped and reported. The trailing block is emitted even without
/// a closing blank line.
use crate::error::CatalogError;
use crate::model::snapshot::{Snapshot, SnapshotFields};
use crate::time_codec::TimeCodec;
use tracing::debug;

const BLOCK_KEYWORD: &str = "Contents";
const CREATION_TIME_SUFFIX: &str = "creation time";

const KEY_SHADOW_COPY_ID: &str = "Shadow Copy ID";
const KEY_VOLUME: &str = "Shadow Copy Volume";
const KEY_MACHINE: &str = "Originating Machine";
const KEY_ORIGINAL_VOLUME: &str = "Original Volume";

/// Ordered, immutable set of snapshots from one listing capture.
#[derive(Debug, Clone, Default)]
pub struct SnapshotCatalog {
    snapshots: Vec<Snapshot>,
}

/// Result of a best-effort parse: the snapshots plus every skipped line.
#[derive(Debug, Default)]
pub struct ParseOutcome {
    pub snapshots: Vec<Snapshot>,
    pub issues: Vec<CatalogError>,
}

impl SnapshotCatalog {
    /// Build a catalog, failing only when no snapshot could be parsed.
    ///
    /// Creation times are checked with `codec`, the same zone later used to
    /// compare against them.
    pub fn from_listing(
        text: &str,
        codec: &TimeCodec,
    ) -> Result<(Self, Vec<CatalogError>), CatalogError> {
        let outcome = parse(text, codec);
        if outcome.snapshots.is_empty() {
            return Err(CatalogError::EmptyListing);
        }
        Ok((Self::from_snapshots(outcome.snapshots), outcome.issues))
    }

    pub fn from_snapshots(snapshots: Vec<Snapshot>) -> Self {
        Self { snapshots }
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Snapshot> {
        self.snapshots.iter()
    }
}

impl<'a> IntoIterator for &'a SnapshotCatalog {
    type Item = &'a Snapshot;
    type IntoIter = std::slice::Iter<'a, Snapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.snapshots.iter()
    }
}

/// Block currently being accumulated, with the line that opened it.
struct OpenBlock {
    fields: SnapshotFields,
    opened_at: usize,
}

/// Parse listing text into snapshots, in block order.
pub fn parse(text: &str, codec: &TimeCodec) -> ParseOutcome {
    let mut outcome = ParseOutcome::default();
    let mut current: Option<OpenBlock> = None;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();

        if line.is_empty() {
            close_block(current.take(), codec, &mut outcome);
            continue;
        }

        if line.starts_with(BLOCK_KEYWORD) {
            close_block(current.take(), codec, &mut outcome);
            match block_identifier(line) {
                Some(id) => {
                    current = Some(OpenBlock {
                        fields: SnapshotFields::new(id),
                        opened_at: line_no,
                    });
                }
                None => outcome.issues.push(CatalogError::Parse {
                    line: line_no,
                    reason: format!("block header without identifier: {line:?}"),
                }),
            }
            continue;
        }

        let Some(block) = current.as_mut() else {
            continue;
        };

        match split_pair(line) {
            Some((key, value)) => apply_pair(&mut block.fields, key, value),
            None => {
                debug!("Skipping listing line {line_no}: no key/value separator");
                outcome.issues.push(CatalogError::Parse {
                    line: line_no,
                    reason: format!("expected `key: value`, found {line:?}"),
                });
            }
        }
    }

    close_block(current, codec, &mut outcome);
    outcome
}

fn close_block(block: Option<OpenBlock>, codec: &TimeCodec, outcome: &mut ParseOutcome) {
    let Some(block) = block else {
        return;
    };
    let snapshot = match block.fields.build() {
        Ok(snapshot) => snapshot,
        Err(reason) => {
            outcome.issues.push(CatalogError::Parse {
                line: block.opened_at,
                reason: format!("block skipped: {reason}"),
            });
            return;
        }
    };
    match snapshot.creation_epoch(codec) {
        Ok(_) => outcome.snapshots.push(snapshot),
        Err(source) => {
            debug!("Skipping snapshot {}: {source}", snapshot.id);
            outcome.issues.push(CatalogError::CreationTime {
                line: block.opened_at,
                source,
            });
        }
    }
}

/// Identifier after the first colon of a `Contents` line.
fn block_identifier(line: &str) -> Option<String> {
    let (_, rest) = line.split_once(':')?;
    let id = rest.split(':').next().unwrap_or_default().trim();
    (!id.is_empty()).then(|| id.to_string())
}

/// Split at the first colon. Values keep everything after it, including
/// further colons (`(C:)\\?\Volume{...}`).
fn split_pair(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once(':')?;
    Some((key.trim(), value.trim()))
}

fn apply_pair(fields: &mut SnapshotFields, key: &str, value: &str) {
    let value = value.to_string();
    if key.ends_with(CREATION_TIME_SUFFIX) {
        fields.creation_time = Some(value);
        return;
    }
    match key {
        KEY_SHADOW_COPY_ID => fields.shadow_copy_id = Some(value),
        KEY_VOLUME => fields.volume_path = Some(value),
        KEY_MACHINE => fields.originating_machine = Some(value),
        KEY_ORIGINAL_VOLUME => fields.original_volume = Some(value),
        _ => {}
    }
}
