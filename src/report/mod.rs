//! Human-readable and JSON rendering of hardware profiles.
//!
//! Formatting is kept apart from detection: every function here takes an
//! already built profile and touches no OS state, so it can be tested with
//! hand-made profiles.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::facts::{CpuFeature, GpuFacts};
use crate::profile::{Diagnostics, HardwareProfile};
use crate::publish::Snapshot;

/// Host identity for diagnostic dumps
#[derive(Debug, Clone, Serialize)]
pub struct HostInfo {
    pub os: String,
    pub version: String,
    pub arch: String,
}

impl HostInfo {
    pub fn current() -> Self {
        let info = os_info::get();
        HostInfo {
            os: info.os_type().to_string(),
            version: info.version().to_string(),
            arch: std::env::consts::ARCH.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct DiagnosticDump<'a> {
    host: &'a HostInfo,
    #[serde(flatten)]
    snapshot: &'a Snapshot,
}

/// Multi-line summary for logs and the terminal
pub fn format_summary(profile: &HardwareProfile) -> String {
    let cpu = profile.cpu();
    let memory = profile.memory();
    let storage = profile.storage();
    let virt = profile.virtualization();

    let mut summary = String::new();

    summary.push_str(&format!(
        "Performance profile: {}\n",
        profile.performance_profile()
    ));
    summary.push_str(&format!(
        "  CPU:            {} ({}), {} cores [{}]\n",
        cpu.model_name,
        cpu.vendor,
        cpu.core_count,
        profile.cpu_class()
    ));
    summary.push_str(&format!("  CPU features:   {}\n", format_features(cpu.features.iter())));
    summary.push_str(&format!(
        "  Memory:         {} GB [{}]\n",
        memory.total_gb, memory.class
    ));

    let devices: Vec<&str> = storage.devices.iter().map(|d| d.name.as_str()).collect();
    summary.push_str(&format!(
        "  Storage:        {} (ssd: {}, nvme: {}) devices: {}\n",
        storage.primary_type,
        yes_no(storage.has_ssd),
        yes_no(storage.has_nvme),
        if devices.is_empty() {
            "none".to_string()
        } else {
            devices.join(", ")
        }
    ));
    summary.push_str(&format!("  GPU:            {}\n", format_gpu(profile.gpu())));
    summary.push_str(&format!(
        "  Virtualization: {} (vm: {}, wsl: {}, container: {})\n",
        virt.kind,
        yes_no(virt.is_vm),
        yes_no(virt.is_wsl),
        yes_no(virt.is_container)
    ));

    summary
}

/// One line, for log sinks
pub fn format_compact(profile: &HardwareProfile) -> String {
    format!(
        "profile={} cores={} memory_gb={} memory_class={} storage={} gpu={} virt={}",
        profile.performance_profile(),
        profile.cpu().core_count,
        profile.memory().total_gb,
        profile.memory().class,
        profile.storage().primary_type,
        format_gpu(profile.gpu()).replace(", ", "+"),
        profile.virtualization().kind,
    )
}

/// Blind spots and overrides, one per line; empty when there is nothing to say
pub fn format_diagnostics(diagnostics: &Diagnostics) -> String {
    let mut report = String::new();

    if !diagnostics.defaulted.is_empty() {
        report.push_str("Defaulted facts (source unavailable or unparseable):\n");
        for fact in &diagnostics.defaulted {
            report.push_str(&format!("  - {} ({})\n", fact, fact.source_hint()));
        }
    }

    if !diagnostics.overridden.is_empty() {
        report.push_str("Operator overrides:\n");
        for field in &diagnostics.overridden {
            report.push_str(&format!("  - {}\n", field));
        }
    }

    report
}

/// Pretty JSON dump of a snapshot. The layout is not a stable format.
pub fn to_json(snapshot: &Snapshot, host: &HostInfo) -> Result<String> {
    let dump = DiagnosticDump { host, snapshot };
    serde_json::to_string_pretty(&dump).context("Failed to serialize hardware profile")
}

fn format_features<'a>(features: impl Iterator<Item = &'a CpuFeature>) -> String {
    let names: Vec<String> = features.map(|f| f.to_string()).collect();
    if names.is_empty() {
        "none".to_string()
    } else {
        names.join(" ")
    }
}

fn format_gpu(gpu: &GpuFacts) -> String {
    let mut vendors = Vec::new();
    if gpu.has_nvidia {
        vendors.push(if gpu.has_nouveau { "nvidia (nouveau)" } else { "nvidia" });
    }
    if gpu.has_amd {
        vendors.push("amd");
    }
    if gpu.has_intel {
        vendors.push("intel");
    }
    if gpu.has_virtio {
        vendors.push("virtio");
    }

    if vendors.is_empty() {
        return "none".to_string();
    }

    let mut line = vendors.join(", ");
    if gpu.has_discrete {
        line.push_str(" [discrete]");
    }
    line
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
