/// A single volume shadow copy as described by one listing block.
///
/// Built once by the catalog parser and immutable afterwards. Construction
/// fails fast when a required field is missing instead of deferring the
/// problem to first use.
use crate::error::TimeError;
use crate::time_codec::TimeCodec;
use std::path::{Path, PathBuf};

/// Prefix of the device namespace paths that `vssadmin` reports.
const DEVICE_PREFIX: &str = r"\\?\GLOBALROOT\";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Identifier carried by the block's `Contents` line.
    pub id: String,
    /// Per-copy identifier (`Shadow Copy ID`), when listed.
    pub shadow_copy_id: Option<String>,
    /// Machine that created the copy. Informational only.
    pub originating_machine: Option<String>,
    /// Creation time in the listing's `MM/DD/YYYY hh:mm:ss AM|PM` format.
    pub creation_time: String,
    /// Device path of the shadow copy volume.
    pub volume_path: String,
    /// Volume the copy was taken from, when listed.
    pub original_volume: Option<String>,
}

/// Fields gathered from one block before validation.
#[derive(Debug, Default)]
pub(crate) struct SnapshotFields {
    pub id: String,
    pub shadow_copy_id: Option<String>,
    pub originating_machine: Option<String>,
    pub creation_time: Option<String>,
    pub volume_path: Option<String>,
    pub original_volume: Option<String>,
}

impl SnapshotFields {
    pub fn new(id: String) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Validate required fields. The error names the first missing one.
    pub fn build(self) -> Result<Snapshot, &'static str> {
        let creation_time = self
            .creation_time
            .filter(|v| !v.is_empty())
            .ok_or("missing creation time")?;
        let volume_path = self
            .volume_path
            .filter(|v| !v.is_empty())
            .ok_or("missing shadow copy volume path")?;
        Ok(Snapshot {
            id: self.id,
            shadow_copy_id: self.shadow_copy_id,
            originating_machine: self.originating_machine,
            creation_time,
            volume_path,
            original_volume: self.original_volume,
        })
    }
}

impl Snapshot {
    /// Final component of the volume path, e.g. `HarddiskVolumeShadowCopy3`.
    pub fn name(&self) -> &str {
        self.volume_path
            .trim_end_matches(['\\', '/'])
            .rsplit(['\\', '/'])
            .next()
            .unwrap_or(&self.volume_path)
    }

    /// Creation time as Unix seconds.
    pub fn creation_epoch(&self, codec: &TimeCodec) -> Result<i64, TimeError> {
        codec.to_epoch(&self.creation_time)
    }

    /// Directory to walk for this snapshot.
    ///
    /// Device namespace paths only open as directories with a trailing
    /// separator, so one is appended when absent.
    pub fn root_path(&self, subpath: Option<&Path>) -> PathBuf {
        let mut root = self.volume_path.clone();
        if root.starts_with(DEVICE_PREFIX) && !root.ends_with('\\') {
            root.push('\\');
        }
        let root = PathBuf::from(root);
        match subpath {
            Some(sub) => root.join(sub),
            None => root,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_codec::Zone;

    fn snapshot(volume_path: &str) -> Snapshot {
        Snapshot {
            id: "{set}".into(),
            shadow_copy_id: None,
            originating_machine: Some("WS01".into()),
            creation_time: "01/01/2023 10:00:00 AM".into(),
            volume_path: volume_path.into(),
            original_volume: None,
        }
    }

    #[test]
    fn name_is_last_path_component() {
        let s = snapshot(r"\\?\GLOBALROOT\Device\HarddiskVolumeShadowCopy7");
        assert_eq!(s.name(), "HarddiskVolumeShadowCopy7");
        assert_eq!(snapshot("/mnt/snap/one/").name(), "one");
        assert_eq!(snapshot("bare").name(), "bare");
    }

    #[test]
    fn device_root_gets_trailing_separator() {
        let s = snapshot(r"\\?\GLOBALROOT\Device\HarddiskVolumeShadowCopy7");
        assert_eq!(
            s.root_path(None),
            PathBuf::from(r"\\?\GLOBALROOT\Device\HarddiskVolumeShadowCopy7\")
        );
        assert_eq!(snapshot("/mnt/snap").root_path(None), PathBuf::from("/mnt/snap"));
        assert_eq!(
            snapshot("/mnt/snap").root_path(Some(Path::new("Users"))),
            PathBuf::from("/mnt/snap").join("Users")
        );
    }

    #[test]
    fn build_requires_time_and_path() {
        let mut fields = SnapshotFields::new("{a}".into());
        fields.volume_path = Some("/mnt/a".into());
        assert_eq!(fields.build().unwrap_err(), "missing creation time");

        let mut fields = SnapshotFields::new("{a}".into());
        fields.creation_time = Some("01/01/2023 10:00:00 AM".into());
        assert_eq!(fields.build().unwrap_err(), "missing shadow copy volume path");
    }

    #[test]
    fn creation_epoch_uses_codec() {
        let codec = TimeCodec::new(Zone::Utc);
        assert_eq!(snapshot("/x").creation_epoch(&codec).unwrap(), 1_672_567_200);
    }
}
