/// Scanner module: walks a snapshot root and turns every file into a
/// [`FileRecord`](crate::model::FileRecord).
///
/// Hashing and stat calls are blocking and strictly sequential; rows come
/// out in walk order.
pub mod hasher;
pub mod progress;
pub mod walker;

pub use hasher::{HashAlgorithm, CHUNK_SIZE};
pub use progress::{PassKind, ScanProgress};
pub use walker::{FileWalker, WalkAborted, WalkSummary};
