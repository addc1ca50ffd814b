//! CPU extractor.
//!
//! Reads /proc/cpuinfo for vendor, model, flags and the per-core `processor`
//! entries, and falls back to the online CPU range when cpuinfo has none.

use std::collections::BTreeSet;

use super::{key_value, Fact};
use crate::facts::{CpuFacts, CpuFeature, CpuVendor};
use crate::probe::{paths, Arch, Probed, Source};

const UNKNOWN_MODEL: &str = "unknown";

/// Markers that identify an ARM cpuinfo
const ARM_MARKERS: &[&str] = &["CPU implementer", "AArch64", "ARMv"];

/// Number of `processor` entries
pub fn count_processors(cpuinfo: &str) -> u32 {
    cpuinfo
        .lines()
        .filter_map(key_value)
        .filter(|(key, _)| *key == "processor")
        .count() as u32
}

/// Count the CPUs in a kernel range list such as `0-3,6,8-9`.
///
/// Returns 0 when any part of the list is malformed.
pub fn parse_online_range(range: &str) -> u32 {
    let mut count = 0u32;

    for part in range.trim().split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        match part.split_once('-') {
            Some((start, end)) => {
                let (Ok(start), Ok(end)) = (start.trim().parse::<u32>(), end.trim().parse::<u32>()) else {
                    return 0;
                };
                if end < start {
                    return 0;
                }
                count = count.saturating_add(end - start + 1);
            }
            None => {
                if part.parse::<u32>().is_err() {
                    return 0;
                }
                count = count.saturating_add(1);
            }
        }
    }

    count
}

pub fn default_cores(arch: Arch) -> u32 {
    match arch {
        Arch::X86_64 => 4,
        Arch::Aarch64 => 4,
        Arch::Other => 2,
    }
}

/// Core count with the cpuinfo → online range → platform default chain
pub fn resolve_core_count(cpuinfo: &str, online: &str, arch: Arch) -> Probed<u32> {
    let processors = count_processors(cpuinfo);
    if processors > 0 {
        return Probed::detected(processors);
    }

    let online = parse_online_range(online);
    if online > 0 {
        return Probed::detected(online);
    }

    Probed::defaulted(default_cores(arch))
}

pub fn parse_vendor(cpuinfo: &str) -> CpuVendor {
    if cpuinfo.contains("GenuineIntel") {
        CpuVendor::Intel
    } else if cpuinfo.contains("AuthenticAMD") {
        CpuVendor::Amd
    } else if ARM_MARKERS.iter().any(|marker| cpuinfo.contains(marker)) {
        CpuVendor::Arm
    } else {
        CpuVendor::Unknown
    }
}

/// Model string from `model name` (x86) or `Model` / `Hardware` (ARM)
pub fn parse_model(cpuinfo: &str) -> Option<String> {
    for wanted in ["model name", "Model", "Hardware"] {
        let found = cpuinfo
            .lines()
            .filter_map(key_value)
            .find(|(key, value)| *key == wanted && !value.is_empty());

        if let Some((_, value)) = found {
            return Some(value.to_string());
        }
    }
    None
}

/// The first `flags` (x86) or `Features` (ARM) line
pub fn flags_line(cpuinfo: &str) -> Option<&str> {
    cpuinfo
        .lines()
        .filter_map(key_value)
        .find(|(key, _)| *key == "flags" || *key == "Features")
        .map(|(_, value)| value)
}

/// Features present in the flags line, by substring membership
pub fn parse_features(cpuinfo: &str) -> BTreeSet<CpuFeature> {
    let Some(flags) = flags_line(cpuinfo) else {
        return BTreeSet::new();
    };
    let flags = flags.to_lowercase();

    CpuFeature::ALL
        .into_iter()
        .filter(|feature| flags.contains(feature.marker()))
        .collect()
}

pub fn extract(source: &dyn Source, defaulted: &mut Vec<Fact>) -> CpuFacts {
    let cpuinfo = source.read(paths::CPUINFO);
    let online = source.read(paths::CPU_ONLINE);

    let cores = resolve_core_count(&cpuinfo.content, &online.content, source.arch());
    if cores.defaulted {
        defaulted.push(Fact::CpuCores);
    }

    let vendor = parse_vendor(&cpuinfo.content);
    // an unrecognized vendor string is still a detected vendor
    if !cpuinfo.available {
        defaulted.push(Fact::CpuVendor);
    }

    let model_name = parse_model(&cpuinfo.content).unwrap_or_else(|| {
        defaulted.push(Fact::CpuModel);
        UNKNOWN_MODEL.to_string()
    });

    CpuFacts {
        vendor,
        core_count: cores.value,
        model_name,
        features: parse_features(&cpuinfo.content),
    }
}
