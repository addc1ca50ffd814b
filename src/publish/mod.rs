//! Read-only publication of hardware profiles.
//!
//! Long-running callers keep a [`Publisher`] and call [`Publisher::refresh`]
//! periodically. Each refresh runs the whole pipeline and swaps the snapshot
//! in one atomic store, so readers see either the old or the new profile and
//! never a mix of both.

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

use crate::overrides::{OverrideError, OverrideSet};
use crate::profile::{self, Diagnostics, HardwareProfile};
use crate::probe::Source;

#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub generation: u64,
    pub detected_at: DateTime<Utc>,
    pub profile: HardwareProfile,
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    pub snapshot: Arc<Snapshot>,
    /// Whether the profile differs from the previous snapshot
    pub changed: bool,
}

pub struct Publisher {
    source: Box<dyn Source>,
    overrides: OverrideSet,
    current: ArcSwap<Snapshot>,
    next_generation: AtomicU64,
}

impl Publisher {
    /// Run an initial detection and publish it as generation 1. The
    /// overrides are validated once here and reused by every refresh.
    pub fn new(source: Box<dyn Source>, overrides: OverrideSet) -> Result<Self, OverrideError> {
        overrides.validate()?;
        let first = Self::build(source.as_ref(), &overrides, 1);

        Ok(Self {
            source,
            overrides,
            current: ArcSwap::new(Arc::new(first)),
            next_generation: AtomicU64::new(2),
        })
    }

    fn build(source: &dyn Source, overrides: &OverrideSet, generation: u64) -> Snapshot {
        let detection = profile::run(source, overrides);
        Snapshot {
            generation,
            detected_at: Utc::now(),
            profile: detection.profile,
            diagnostics: detection.diagnostics,
        }
    }

    /// The current snapshot
    pub fn current(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    pub fn overrides(&self) -> &OverrideSet {
        &self.overrides
    }

    /// Re-run the pipeline and publish the result
    pub fn refresh(&self) -> RefreshOutcome {
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst);
        let snapshot = Arc::new(Self::build(self.source.as_ref(), &self.overrides, generation));

        let previous = self.current.swap(Arc::clone(&snapshot));
        let changed = previous.profile != snapshot.profile;

        if changed {
            info!(
                generation,
                from = %previous.profile.performance_profile(),
                to = %snapshot.profile.performance_profile(),
                "hardware profile changed"
            );
        }

        RefreshOutcome { snapshot, changed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::PerformanceProfile;
    use crate::probe::{Arch, FsSource};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_initial_snapshot() {
        let temp_dir = TempDir::new().unwrap();
        let publisher = Publisher::new(
            Box::new(FsSource::new(temp_dir.path()).isolated()),
            OverrideSet::default(),
        )
        .unwrap();

        let snapshot = publisher.current();
        assert_eq!(snapshot.generation, 1);
        assert!(snapshot.profile.cpu().core_count >= 1);
    }

    #[test]
    fn test_refresh_swaps_snapshot() {
        let temp_dir = TempDir::new().unwrap();
        let publisher = Publisher::new(
            Box::new(FsSource::new(temp_dir.path()).isolated()),
            OverrideSet::default(),
        )
        .unwrap();
        let before = publisher.current();

        let outcome = publisher.refresh();
        assert!(!outcome.changed);
        assert_eq!(outcome.snapshot.generation, 2);

        // readers holding the old Arc keep their view
        assert_eq!(before.generation, 1);
        assert_eq!(publisher.current().generation, 2);
    }

    #[test]
    fn test_refresh_sees_new_hardware() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let mut overrides = OverrideSet::default();
        overrides.cpu.cores = Some(16);

        let source = FsSource::new(root).with_arch(Arch::X86_64).isolated();
        let publisher = Publisher::new(Box::new(source), overrides).unwrap();
        assert_eq!(
            publisher.current().profile.performance_profile(),
            PerformanceProfile::Minimal
        );

        fs::create_dir_all(root.join("proc")).unwrap();
        fs::write(root.join("proc/meminfo"), "MemTotal: 67108864 kB\n").unwrap();
        fs::create_dir_all(root.join("sys/class/nvme/nvme0")).unwrap();
        fs::create_dir_all(root.join("sys/block/nvme0n1/queue")).unwrap();
        fs::write(root.join("sys/block/nvme0n1/queue/rotational"), "0\n").unwrap();

        let outcome = publisher.refresh();
        assert!(outcome.changed);
        assert_eq!(
            outcome.snapshot.profile.performance_profile(),
            PerformanceProfile::HighPerformance
        );
    }

    #[test]
    fn test_new_rejects_invalid_overrides() {
        let temp_dir = TempDir::new().unwrap();
        let mut overrides = OverrideSet::default();
        overrides.cpu.cores = Some(0);

        let result = Publisher::new(
            Box::new(FsSource::new(temp_dir.path()).isolated()),
            overrides,
        );
        assert!(matches!(
            result,
            Err(OverrideError::CoresOutOfRange { value: 0, .. })
        ));
    }
}
