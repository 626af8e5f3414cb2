/// Raw file-system timestamps, normalised to Unix seconds.
///
/// Windows reports FILETIME ticks and a true creation time. Unix has no
/// portable birth time, so the inode change time (`st_ctime`) stands in
/// for "created", as it does for the classic `os.stat` tooling.
use crate::error::TimeError;
use std::fs::Metadata;

/// Size and MAC epochs of one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawStat {
    pub size: u64,
    pub created: i64,
    pub modified: i64,
    pub accessed: i64,
}

#[cfg(windows)]
pub fn raw_stat(meta: &Metadata) -> Result<RawStat, TimeError> {
    use crate::time_codec::filetime_to_epoch;
    use std::os::windows::fs::MetadataExt;

    Ok(RawStat {
        size: meta.file_size(),
        created: filetime_to_epoch(meta.creation_time())?,
        modified: filetime_to_epoch(meta.last_write_time())?,
        accessed: filetime_to_epoch(meta.last_access_time())?,
    })
}

#[cfg(unix)]
pub fn raw_stat(meta: &Metadata) -> Result<RawStat, TimeError> {
    use std::os::unix::fs::MetadataExt;

    Ok(RawStat {
        size: meta.size(),
        created: meta.ctime(),
        modified: meta.mtime(),
        accessed: meta.atime(),
    })
}

#[cfg(not(any(unix, windows)))]
pub fn raw_stat(meta: &Metadata) -> Result<RawStat, TimeError> {
    use std::time::{SystemTime, UNIX_EPOCH};

    fn secs(time: std::io::Result<SystemTime>) -> Result<i64, TimeError> {
        time.ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs() as i64)
            .ok_or(TimeError::Conversion { value: 0 })
    }

    Ok(RawStat {
        size: meta.len(),
        created: secs(meta.created())?,
        modified: secs(meta.modified())?,
        accessed: secs(meta.accessed())?,
    })
}
