//! Profile aggregation.
//!
//! Runs the pipeline end to end: extract, classify, apply overrides, then
//! derive the performance-profile label. The resulting [`HardwareProfile`] is
//! immutable; a new run builds a new one.

use serde::Serialize;
use tracing::{debug, warn};

use crate::classify;
use crate::facts::{
    CpuFacts, FactSet, GpuFacts, MemoryFacts, PerformanceProfile, StorageFacts, Tier,
    VirtualizationFacts,
};
use crate::overrides::{self, OverrideError, OverrideSet};
use crate::parse::{self, Fact, RawFacts};
use crate::probe::Source;

/// Aggregate snapshot of one detection run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HardwareProfile {
    cpu: CpuFacts,
    memory: MemoryFacts,
    storage: StorageFacts,
    gpu: GpuFacts,
    virtualization: VirtualizationFacts,
    performance_profile: PerformanceProfile,
}

impl HardwareProfile {
    /// Build a profile from resolved facts. A forced label bypasses the
    /// decision table.
    pub fn aggregate(facts: FactSet, forced: Option<PerformanceProfile>) -> Self {
        let performance_profile = forced.unwrap_or_else(|| {
            classify::performance_profile(
                facts.memory.class,
                facts.cpu.core_count,
                facts.storage.primary_type,
            )
        });

        Self {
            cpu: facts.cpu,
            memory: facts.memory,
            storage: facts.storage,
            gpu: facts.gpu,
            virtualization: facts.virtualization,
            performance_profile,
        }
    }

    pub fn cpu(&self) -> &CpuFacts {
        &self.cpu
    }

    pub fn memory(&self) -> &MemoryFacts {
        &self.memory
    }

    pub fn storage(&self) -> &StorageFacts {
        &self.storage
    }

    pub fn gpu(&self) -> &GpuFacts {
        &self.gpu
    }

    pub fn virtualization(&self) -> &VirtualizationFacts {
        &self.virtualization
    }

    pub fn performance_profile(&self) -> PerformanceProfile {
        self.performance_profile
    }

    pub fn cpu_class(&self) -> Tier {
        classify::cpu_class(self.cpu.core_count)
    }
}

/// What the run could not see and what the operator replaced
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    pub defaulted: Vec<Fact>,
    pub overridden: Vec<&'static str>,
}

impl Diagnostics {
    pub fn is_clean(&self) -> bool {
        self.defaulted.is_empty()
    }

    /// Emit the non-fatal blind-spot warning
    pub fn log(&self) {
        if !self.defaulted.is_empty() {
            let facts: Vec<String> = self.defaulted.iter().map(|f| f.to_string()).collect();
            warn!(
                defaulted = %facts.join(", "),
                "hardware detection fell back to defaults"
            );
        }

        if !self.overridden.is_empty() {
            debug!(overridden = %self.overridden.join(", "), "operator overrides applied");
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub profile: HardwareProfile,
    pub diagnostics: Diagnostics,
}

/// Classification stage: raw extractor output to tiered facts
pub fn classify_facts(raw: RawFacts) -> FactSet {
    FactSet {
        cpu: raw.cpu,
        memory: classify::memory_facts(raw.memory_kb),
        storage: classify::storage_facts(raw.storage),
        gpu: classify::gpu_facts(raw.gpu),
        virtualization: VirtualizationFacts::from_kind(raw.virt),
    }
}

/// Run the full pipeline against `source`. Invalid overrides are rejected
/// before anything is probed.
pub fn detect(source: &dyn Source, overrides: &OverrideSet) -> Result<Detection, OverrideError> {
    overrides.validate()?;
    Ok(run(source, overrides))
}

/// Pipeline body; `overrides` must already be validated
pub(crate) fn run(source: &dyn Source, overrides: &OverrideSet) -> Detection {
    let extraction = parse::extract_all(source);
    let classified = classify_facts(extraction.facts);
    let resolved = overrides::resolve(classified, overrides);
    let profile = HardwareProfile::aggregate(resolved, overrides.performance_profile);

    let diagnostics = Diagnostics {
        defaulted: extraction.defaulted,
        overridden: overrides.active_fields(),
    };
    diagnostics.log();

    debug!(
        performance_profile = %profile.performance_profile(),
        cores = profile.cpu().core_count,
        memory_gb = profile.memory().total_gb,
        storage = %profile.storage().primary_type,
        "hardware profile built"
    );

    Detection { profile, diagnostics }
}
