//! Pure classification of raw facts into ordinal tiers.
//!
//! Every function here is total and deterministic. Memory uses the 4/8/32 GB
//! table everywhere.

use crate::facts::{
    BlockDevice, GpuFacts, MemoryFacts, PerformanceProfile, StorageFacts, StorageType, Tier,
};
use crate::parse::memory::kb_to_gb;
use crate::parse::storage::{self, StorageScan};

pub const MEMORY_LOW_GB: u64 = 4;
pub const MEMORY_MEDIUM_GB: u64 = 8;
pub const MEMORY_HIGH_GB: u64 = 32;

pub fn cpu_class(cores: u32) -> Tier {
    match cores {
        16.. => Tier::High,
        8..=15 => Tier::Medium,
        4..=7 => Tier::Low,
        _ => Tier::Minimal,
    }
}

pub fn memory_class(total_gb: u64) -> Tier {
    if total_gb >= MEMORY_HIGH_GB {
        Tier::High
    } else if total_gb >= MEMORY_MEDIUM_GB {
        Tier::Medium
    } else if total_gb >= MEMORY_LOW_GB {
        Tier::Low
    } else {
        Tier::Minimal
    }
}

/// First matching flag wins: nvme > ssd > virtio > mmc > hdd
pub fn storage_primary_type(has_nvme: bool, has_ssd: bool, has_virtio: bool, has_mmc: bool) -> StorageType {
    if has_nvme {
        StorageType::Nvme
    } else if has_ssd {
        StorageType::Ssd
    } else if has_virtio {
        StorageType::Virtio
    } else if has_mmc {
        StorageType::Mmc
    } else {
        StorageType::Hdd
    }
}

pub fn performance_profile(memory: Tier, cores: u32, storage: StorageType) -> PerformanceProfile {
    if memory == Tier::High && cores >= 8 && storage == StorageType::Nvme {
        PerformanceProfile::HighPerformance
    } else if memory == Tier::Medium
        && cores >= 4
        && matches!(storage, StorageType::Ssd | StorageType::Nvme)
    {
        PerformanceProfile::Balanced
    } else if memory == Tier::Low {
        PerformanceProfile::ResourceConstrained
    } else {
        PerformanceProfile::Minimal
    }
}

pub fn memory_facts(total_kb: u64) -> MemoryFacts {
    let total_gb = kb_to_gb(total_kb);
    MemoryFacts {
        total_kb,
        total_gb,
        class: memory_class(total_gb),
    }
}

pub fn storage_facts(scan: StorageScan) -> StorageFacts {
    let has_nvme = scan.nvme_controller || scan.devices.iter().any(|d| d.is_nvme);
    let has_ssd = has_nvme
        || scan
            .devices
            .iter()
            .any(|d| !d.rotational && storage::is_ssd_name(&d.name));

    let primary_type = primary_type_for(&scan.devices, has_nvme, has_ssd);

    StorageFacts {
        devices: scan.devices,
        has_ssd,
        has_nvme,
        primary_type,
    }
}

/// Primary type from the given flags plus the virtio/mmc devices present
pub fn primary_type_for(devices: &[BlockDevice], has_nvme: bool, has_ssd: bool) -> StorageType {
    let has_virtio = devices.iter().any(|d| storage::is_virtio_name(&d.name));
    let has_mmc = devices.iter().any(|d| storage::is_mmc_name(&d.name));
    storage_primary_type(has_nvme, has_ssd, has_virtio, has_mmc)
}

pub fn gpu_facts(gpu: GpuFacts) -> GpuFacts {
    GpuFacts {
        has_discrete: gpu.has_nvidia || gpu.has_amd,
        ..gpu
    }
}
