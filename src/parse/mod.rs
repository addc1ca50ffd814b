//! Extractors turning raw probe output into typed facts.
//!
//! Each category lives in its own module and follows the same shape: pure
//! `parse_*` functions over text, plus an `extract` that drives the probes for
//! that category. Extractors are total; anything unmatched degrades to
//! `unknown` or a platform fallback and the fallback is recorded.

pub mod cpu;
pub mod gpu;
pub mod memory;
pub mod storage;
pub mod virt;

use serde::Serialize;
use std::fmt;

use crate::facts::{CpuFacts, GpuFacts, VirtKind};
use crate::probe::Source;
use storage::StorageScan;

/// A fact that may fall back to a default when its source is absent
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Fact {
    CpuCores,
    CpuVendor,
    CpuModel,
    MemoryTotal,
    BlockDevices,
    GpuDevices,
    DmiIdentity,
}

impl Fact {
    pub const ALL: [Fact; 7] = [
        Fact::CpuCores,
        Fact::CpuVendor,
        Fact::CpuModel,
        Fact::MemoryTotal,
        Fact::BlockDevices,
        Fact::GpuDevices,
        Fact::DmiIdentity,
    ];

    /// Source consulted for the fact, for diagnostics
    pub fn source_hint(&self) -> &'static str {
        match self {
            Fact::CpuCores => "/proc/cpuinfo, /sys/devices/system/cpu/online",
            Fact::CpuVendor | Fact::CpuModel => "/proc/cpuinfo",
            Fact::MemoryTotal => "/proc/meminfo",
            Fact::BlockDevices => "/sys/block",
            Fact::GpuDevices => "/sys/class/drm, /proc/modules",
            Fact::DmiIdentity => "/sys/class/dmi/id",
        }
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fact::CpuCores => write!(f, "cpu.cores"),
            Fact::CpuVendor => write!(f, "cpu.vendor"),
            Fact::CpuModel => write!(f, "cpu.model_name"),
            Fact::MemoryTotal => write!(f, "memory.total"),
            Fact::BlockDevices => write!(f, "storage.devices"),
            Fact::GpuDevices => write!(f, "gpu"),
            Fact::DmiIdentity => write!(f, "virtualization.dmi"),
        }
    }
}

/// Everything the extractors found, before classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFacts {
    pub cpu: CpuFacts,
    pub memory_kb: u64,
    pub storage: StorageScan,
    pub gpu: GpuFacts,
    pub virt: VirtKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub facts: RawFacts,
    /// Facts that came from a fallback, in a stable order
    pub defaulted: Vec<Fact>,
}

/// Run every extractor against `source`
pub fn extract_all(source: &dyn Source) -> Extraction {
    let mut defaulted = Vec::new();

    let cpu = cpu::extract(source, &mut defaulted);

    let memory = memory::extract(source);
    if memory.defaulted {
        defaulted.push(Fact::MemoryTotal);
    }

    let storage = storage::extract(source);
    if storage.defaulted {
        defaulted.push(Fact::BlockDevices);
    }

    let gpu = gpu::extract(source);
    if gpu.defaulted {
        defaulted.push(Fact::GpuDevices);
    }

    let virt = virt::extract(source);
    if virt.defaulted {
        defaulted.push(Fact::DmiIdentity);
    }

    defaulted.sort();
    defaulted.dedup();

    Extraction {
        facts: RawFacts {
            cpu,
            memory_kb: memory.value,
            storage: storage.value,
            gpu: gpu.value,
            virt: virt.value,
        },
        defaulted,
    }
}

/// Split a `key : value` line as found in /proc/cpuinfo
pub(crate) fn key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once(':')?;
    Some((key.trim(), value.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_value() {
        assert_eq!(key_value("processor\t: 3"), Some(("processor", "3")));
        assert_eq!(
            key_value("model name\t: AMD Ryzen 9 7950X 16-Core Processor"),
            Some(("model name", "AMD Ryzen 9 7950X 16-Core Processor"))
        );
        assert_eq!(key_value("no separator"), None);
    }

    #[test]
    fn test_fact_display() {
        assert_eq!(Fact::CpuCores.to_string(), "cpu.cores");
        assert_eq!(Fact::BlockDevices.to_string(), "storage.devices");
    }
}
