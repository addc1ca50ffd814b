//! Operator overrides.
//!
//! An [`OverrideSet`] mirrors the profile with every field optional. Present
//! fields replace the detected value, absent ones keep it. Fields are
//! independent: contradictory flags are taken verbatim. Values derived from an
//! overridden input (memory class, storage primary type, discrete GPU, the
//! virtualization booleans) are recomputed unless they are overridden too.
//!
//! Invalid overrides are the one failure that is never papered over; they are
//! rejected when the configuration is loaded.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

use crate::classify;
use crate::facts::{
    CpuFacts, CpuFeature, CpuVendor, FactSet, GpuFacts, MemoryFacts, PerformanceProfile,
    StorageFacts, StorageType, Tier, VirtKind, VirtualizationFacts,
};
use crate::parse::memory::KB_PER_GB;

pub const MAX_CORES: u32 = 4096;
pub const MAX_MEMORY_GB: u64 = 65536;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OverrideError {
    #[error("cpu.cores override must be between 1 and {max}, got {value}")]
    CoresOutOfRange { value: u32, max: u32 },

    #[error("memory.total_gb override must be at most {max}, got {value}")]
    MemoryOutOfRange { value: u64, max: u64 },

    #[error("cpu.model_name override must not be empty")]
    EmptyModelName,

    #[error("invalid overrides: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OverrideSet {
    #[serde(default)]
    pub cpu: CpuOverrides,

    #[serde(default)]
    pub memory: MemoryOverrides,

    #[serde(default)]
    pub storage: StorageOverrides,

    #[serde(default)]
    pub gpu: GpuOverrides,

    #[serde(default)]
    pub virtualization: VirtualizationOverrides,

    /// Forces the overall label, bypassing the decision table
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance_profile: Option<PerformanceProfile>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CpuOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<CpuVendor>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cores: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<BTreeSet<CpuFeature>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_gb: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<Tier>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_ssd: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_nvme: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_type: Option<StorageType>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GpuOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_nvidia: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_amd: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_intel: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_virtio: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_nouveau: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_discrete: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VirtualizationOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<VirtKind>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_vm: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_wsl: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_container: Option<bool>,
}

impl OverrideSet {
    /// Parse a standalone TOML override document and validate it
    pub fn from_toml_str(contents: &str) -> Result<Self, OverrideError> {
        let set: OverrideSet =
            toml::from_str(contents).map_err(|e| OverrideError::Malformed(e.to_string()))?;
        set.validate()?;
        Ok(set)
    }

    /// Range checks that serde cannot express
    pub fn validate(&self) -> Result<(), OverrideError> {
        if let Some(cores) = self.cpu.cores {
            if cores == 0 || cores > MAX_CORES {
                return Err(OverrideError::CoresOutOfRange {
                    value: cores,
                    max: MAX_CORES,
                });
            }
        }

        if let Some(model) = &self.cpu.model_name {
            if model.trim().is_empty() {
                return Err(OverrideError::EmptyModelName);
            }
        }

        if let Some(total_gb) = self.memory.total_gb {
            if total_gb > MAX_MEMORY_GB {
                return Err(OverrideError::MemoryOutOfRange {
                    value: total_gb,
                    max: MAX_MEMORY_GB,
                });
            }
        }

        Ok(())
    }

    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        *self == OverrideSet::default()
    }

    /// Dotted names of the fields that are set, for reporting
    pub fn active_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        let mut push = |set: bool, name: &'static str| {
            if set {
                fields.push(name);
            }
        };

        push(self.cpu.vendor.is_some(), "cpu.vendor");
        push(self.cpu.cores.is_some(), "cpu.cores");
        push(self.cpu.model_name.is_some(), "cpu.model_name");
        push(self.cpu.features.is_some(), "cpu.features");
        push(self.memory.total_gb.is_some(), "memory.total_gb");
        push(self.memory.class.is_some(), "memory.class");
        push(self.storage.has_ssd.is_some(), "storage.has_ssd");
        push(self.storage.has_nvme.is_some(), "storage.has_nvme");
        push(self.storage.primary_type.is_some(), "storage.primary_type");
        push(self.gpu.has_nvidia.is_some(), "gpu.has_nvidia");
        push(self.gpu.has_amd.is_some(), "gpu.has_amd");
        push(self.gpu.has_intel.is_some(), "gpu.has_intel");
        push(self.gpu.has_virtio.is_some(), "gpu.has_virtio");
        push(self.gpu.has_nouveau.is_some(), "gpu.has_nouveau");
        push(self.gpu.has_discrete.is_some(), "gpu.has_discrete");
        push(self.virtualization.kind.is_some(), "virtualization.kind");
        push(self.virtualization.is_vm.is_some(), "virtualization.is_vm");
        push(self.virtualization.is_wsl.is_some(), "virtualization.is_wsl");
        push(self.virtualization.is_container.is_some(), "virtualization.is_container");
        push(self.performance_profile.is_some(), "performance_profile");

        fields
    }
}

/// Apply `overrides` over detected facts
pub fn resolve(facts: FactSet, overrides: &OverrideSet) -> FactSet {
    FactSet {
        cpu: resolve_cpu(facts.cpu, &overrides.cpu),
        memory: resolve_memory(facts.memory, &overrides.memory),
        storage: resolve_storage(facts.storage, &overrides.storage),
        gpu: resolve_gpu(facts.gpu, &overrides.gpu),
        virtualization: resolve_virtualization(facts.virtualization, &overrides.virtualization),
    }
}

fn resolve_cpu(cpu: CpuFacts, o: &CpuOverrides) -> CpuFacts {
    CpuFacts {
        vendor: o.vendor.unwrap_or(cpu.vendor),
        core_count: o.cores.unwrap_or(cpu.core_count),
        model_name: o.model_name.clone().unwrap_or(cpu.model_name),
        features: o.features.clone().unwrap_or(cpu.features),
    }
}

fn resolve_memory(memory: MemoryFacts, o: &MemoryOverrides) -> MemoryFacts {
    let base = match o.total_gb {
        Some(total_gb) => classify::memory_facts(total_gb.saturating_mul(KB_PER_GB)),
        None => memory,
    };

    MemoryFacts {
        class: o.class.unwrap_or(base.class),
        ..base
    }
}

fn resolve_storage(storage: StorageFacts, o: &StorageOverrides) -> StorageFacts {
    let has_nvme = o.has_nvme.unwrap_or(storage.has_nvme);
    let has_ssd = o.has_ssd.unwrap_or(storage.has_ssd);

    let primary_type = match o.primary_type {
        Some(primary_type) => primary_type,
        None if o.has_nvme.is_some() || o.has_ssd.is_some() => {
            classify::primary_type_for(&storage.devices, has_nvme, has_ssd)
        }
        None => storage.primary_type,
    };

    StorageFacts {
        devices: storage.devices,
        has_ssd,
        has_nvme,
        primary_type,
    }
}

fn resolve_gpu(gpu: GpuFacts, o: &GpuOverrides) -> GpuFacts {
    let merged = GpuFacts {
        has_nvidia: o.has_nvidia.unwrap_or(gpu.has_nvidia),
        has_amd: o.has_amd.unwrap_or(gpu.has_amd),
        has_intel: o.has_intel.unwrap_or(gpu.has_intel),
        has_virtio: o.has_virtio.unwrap_or(gpu.has_virtio),
        has_nouveau: o.has_nouveau.unwrap_or(gpu.has_nouveau),
        has_discrete: gpu.has_discrete,
    };

    let derived = classify::gpu_facts(merged);
    GpuFacts {
        has_discrete: o.has_discrete.unwrap_or(derived.has_discrete),
        ..derived
    }
}

fn resolve_virtualization(virt: VirtualizationFacts, o: &VirtualizationOverrides) -> VirtualizationFacts {
    let base = match o.kind {
        Some(kind) => VirtualizationFacts::from_kind(kind),
        None => virt,
    };

    VirtualizationFacts {
        kind: base.kind,
        is_vm: o.is_vm.unwrap_or(base.is_vm),
        is_wsl: o.is_wsl.unwrap_or(base.is_wsl),
        is_container: o.is_container.unwrap_or(base.is_container),
    }
}
