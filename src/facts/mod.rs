//! Typed hardware facts.
//!
//! Plain immutable records shared by the parsers, the override resolver and
//! the aggregator. Nothing in here touches the filesystem.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CpuVendor {
    Intel,
    Amd,
    Arm,
    Unknown,
}

impl fmt::Display for CpuVendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CpuVendor::Intel => write!(f, "intel"),
            CpuVendor::Amd => write!(f, "amd"),
            CpuVendor::Arm => write!(f, "arm"),
            CpuVendor::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CpuFeature {
    Avx,
    Avx2,
    Avx512,
    Sse4,
    Aes,
}

impl CpuFeature {
    pub const ALL: [CpuFeature; 5] = [
        CpuFeature::Avx,
        CpuFeature::Avx2,
        CpuFeature::Avx512,
        CpuFeature::Sse4,
        CpuFeature::Aes,
    ];

    /// Substring looked for in the cpuinfo flags line
    pub fn marker(&self) -> &'static str {
        match self {
            CpuFeature::Avx => "avx",
            CpuFeature::Avx2 => "avx2",
            CpuFeature::Avx512 => "avx512",
            CpuFeature::Sse4 => "sse4",
            CpuFeature::Aes => "aes",
        }
    }
}

impl fmt::Display for CpuFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker())
    }
}

/// Ordinal tier shared by the cpu and memory classifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Minimal,
    Low,
    Medium,
    High,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Minimal => write!(f, "minimal"),
            Tier::Low => write!(f, "low"),
            Tier::Medium => write!(f, "medium"),
            Tier::High => write!(f, "high"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    Nvme,
    Ssd,
    Virtio,
    Mmc,
    Hdd,
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageType::Nvme => write!(f, "nvme"),
            StorageType::Ssd => write!(f, "ssd"),
            StorageType::Virtio => write!(f, "virtio"),
            StorageType::Mmc => write!(f, "mmc"),
            StorageType::Hdd => write!(f, "hdd"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VirtKind {
    BareMetal,
    Qemu,
    Vmware,
    Virtualbox,
    Hyperv,
    Wsl,
    Container,
    UnknownVirtualized,
}

impl VirtKind {
    /// True for kinds that run under a hypervisor we can see from the guest
    pub fn is_vm(&self) -> bool {
        matches!(
            self,
            VirtKind::Qemu
                | VirtKind::Vmware
                | VirtKind::Virtualbox
                | VirtKind::Hyperv
                | VirtKind::UnknownVirtualized
        )
    }
}

impl fmt::Display for VirtKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VirtKind::BareMetal => write!(f, "bare-metal"),
            VirtKind::Qemu => write!(f, "qemu"),
            VirtKind::Vmware => write!(f, "vmware"),
            VirtKind::Virtualbox => write!(f, "virtualbox"),
            VirtKind::Hyperv => write!(f, "hyperv"),
            VirtKind::Wsl => write!(f, "wsl"),
            VirtKind::Container => write!(f, "container"),
            VirtKind::UnknownVirtualized => write!(f, "unknown-virtualized"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PerformanceProfile {
    Minimal,
    ResourceConstrained,
    Balanced,
    HighPerformance,
}

impl fmt::Display for PerformanceProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PerformanceProfile::Minimal => write!(f, "minimal"),
            PerformanceProfile::ResourceConstrained => write!(f, "resource-constrained"),
            PerformanceProfile::Balanced => write!(f, "balanced"),
            PerformanceProfile::HighPerformance => write!(f, "high-performance"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CpuFacts {
    pub vendor: CpuVendor,
    pub core_count: u32,
    pub model_name: String,
    pub features: BTreeSet<CpuFeature>,
}

impl CpuFacts {
    pub fn has_feature(&self, feature: CpuFeature) -> bool {
        self.features.contains(&feature)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MemoryFacts {
    pub total_kb: u64,
    pub total_gb: u64,
    pub class: Tier,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockDevice {
    pub name: String,
    pub rotational: bool,
    pub is_nvme: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageFacts {
    pub devices: Vec<BlockDevice>,
    pub has_ssd: bool,
    pub has_nvme: bool,
    pub primary_type: StorageType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct GpuFacts {
    pub has_nvidia: bool,
    pub has_amd: bool,
    pub has_intel: bool,
    pub has_virtio: bool,
    pub has_nouveau: bool,
    pub has_discrete: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VirtualizationFacts {
    pub kind: VirtKind,
    pub is_vm: bool,
    pub is_wsl: bool,
    pub is_container: bool,
}

impl VirtualizationFacts {
    pub fn from_kind(kind: VirtKind) -> Self {
        Self {
            kind,
            is_vm: kind.is_vm(),
            is_wsl: kind == VirtKind::Wsl,
            is_container: kind == VirtKind::Container,
        }
    }
}

/// Classified facts for one detection run, before the profile label
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FactSet {
    pub cpu: CpuFacts,
    pub memory: MemoryFacts,
    pub storage: StorageFacts,
    pub gpu: GpuFacts,
    pub virtualization: VirtualizationFacts,
}
