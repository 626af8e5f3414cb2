/// Baseline/delta comparison.
///
/// A delta report keeps only files whose creation epoch is strictly later
/// than the baseline snapshot's creation epoch. Modification time is
/// collected but deliberately not consulted: the comparison detects new
/// files, not edited ones.
use crate::catalog::SnapshotCatalog;
use crate::error::SessionError;
use crate::model::Snapshot;

/// Predicate on a file's raw creation epoch, applied before hashing.
pub trait CreationFilter {
    fn accept(&self, created_epoch: i64) -> bool;
}

/// Holds the baseline threshold for one delta run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComparisonEngine {
    threshold_epoch: i64,
}

impl ComparisonEngine {
    pub fn new(threshold_epoch: i64) -> Self {
        Self { threshold_epoch }
    }

    /// `true` iff the file was created strictly after the baseline.
    pub fn include_in_delta(&self, file_created_epoch: i64) -> bool {
        file_created_epoch > self.threshold_epoch
    }
}

impl CreationFilter for ComparisonEngine {
    fn accept(&self, created_epoch: i64) -> bool {
        self.include_in_delta(created_epoch)
    }
}

/// Which snapshots a compare run touches: the baseline in full, then every
/// snapshot after it in catalog order.
#[derive(Debug, Clone, Copy)]
pub struct DeltaPlan<'a> {
    catalog: &'a SnapshotCatalog,
    baseline: usize,
}

impl<'a> DeltaPlan<'a> {
    /// `baseline` is a zero-based catalog position.
    pub fn new(catalog: &'a SnapshotCatalog, baseline: usize) -> Result<Self, SessionError> {
        if baseline >= catalog.len() {
            return Err(SessionError::InvalidBaseline {
                index: baseline,
                len: catalog.len(),
            });
        }
        Ok(Self { catalog, baseline })
    }

    pub fn baseline(&self) -> &'a Snapshot {
        &self.catalog.snapshots()[self.baseline]
    }

    /// Snapshots strictly after the baseline. Empty when the baseline is last.
    pub fn targets(&self) -> &'a [Snapshot] {
        &self.catalog.snapshots()[self.baseline + 1..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn snapshot(n: usize) -> Snapshot {
        Snapshot {
            id: format!("{{set-{n}}}"),
            shadow_copy_id: None,
            originating_machine: None,
            creation_time: format!("01/0{n}/2023 10:00:00 AM"),
            volume_path: format!(r"\\?\GLOBALROOT\Device\HarddiskVolumeShadowCopy{n}"),
            original_volume: None,
        }
    }

    fn catalog(n: usize) -> SnapshotCatalog {
        SnapshotCatalog::from_snapshots((1..=n).map(snapshot).collect())
    }

    #[test]
    fn threshold_is_strict() {
        let engine = ComparisonEngine::new(1000);
        assert!(!engine.include_in_delta(999));
        assert!(!engine.include_in_delta(1000));
        assert!(engine.include_in_delta(1001));
    }

    #[test]
    fn plan_targets_follow_baseline() {
        let catalog = catalog(4);
        let plan = DeltaPlan::new(&catalog, 1).unwrap();
        assert_eq!(plan.baseline().name(), "HarddiskVolumeShadowCopy2");
        let names: Vec<_> = plan.targets().iter().map(|s| s.name()).collect();
        assert_eq!(names, ["HarddiskVolumeShadowCopy3", "HarddiskVolumeShadowCopy4"]);
    }

    #[test]
    fn last_baseline_has_no_targets() {
        let catalog = catalog(3);
        let plan = DeltaPlan::new(&catalog, 2).unwrap();
        assert!(plan.targets().is_empty());
    }

    #[test]
    fn out_of_range_baseline_is_rejected() {
        let catalog = catalog(2);
        assert!(matches!(
            DeltaPlan::new(&catalog, 2),
            Err(SessionError::InvalidBaseline { index: 2, len: 2 })
        ));
    }

    proptest! {
        #[test]
        fn include_iff_strictly_greater(threshold in any::<i64>(), created in any::<i64>()) {
            let engine = ComparisonEngine::new(threshold);
            prop_assert_eq!(engine.include_in_delta(created), created > threshold);
            prop_assert!(!engine.include_in_delta(threshold));
        }
    }
}
