//! Virtualization extractor.
//!
//! Checks run from most to least specific: WSL markers, container markers,
//! DMI hypervisor signatures, then the cpuinfo `hypervisor` flag.

use super::cpu;
use crate::facts::VirtKind;
use crate::probe::{paths, Probed, Source};

/// cgroup path fragments left by container runtimes
const CGROUP_RUNTIMES: &[&str] = &["docker", "kubepods", "lxc", "containerd", "libpod"];

/// Match DMI product name and system vendor against hypervisor signatures
pub fn match_dmi(product: &str, vendor: &str) -> Option<VirtKind> {
    let product = product.trim().to_lowercase();
    let vendor = vendor.trim().to_lowercase();
    let both = format!("{} {}", product, vendor);

    if both.contains("qemu") || both.contains("kvm") {
        Some(VirtKind::Qemu)
    } else if both.contains("vmware") {
        Some(VirtKind::Vmware)
    } else if both.contains("virtualbox") || both.contains("innotek") {
        Some(VirtKind::Virtualbox)
    } else if both.contains("hyper-v")
        || (vendor.contains("microsoft corporation") && product.contains("virtual machine"))
    {
        Some(VirtKind::Hyperv)
    } else {
        None
    }
}

/// True when cpuinfo advertises the `hypervisor` flag
pub fn has_hypervisor_flag(cpuinfo: &str) -> bool {
    cpu::flags_line(cpuinfo)
        .map(|flags| flags.split_whitespace().any(|flag| flag == "hypervisor"))
        .unwrap_or(false)
}

/// True when PID 1 runs inside a container runtime's cgroup
pub fn cgroup_in_container(cgroup: &str) -> bool {
    CGROUP_RUNTIMES.iter().any(|runtime| cgroup.contains(runtime))
}

pub fn is_wsl(source: &dyn Source) -> bool {
    source.exists(paths::WSL_INTEROP) || source.exists(paths::WSL_RUN_DIR)
}

pub fn is_container(source: &dyn Source) -> bool {
    if source.exists(paths::DOCKER_ENV) || source.exists(paths::CONTAINER_ENV) {
        return true;
    }

    if source
        .env(paths::CONTAINER_VAR)
        .is_some_and(|value| !value.trim().is_empty())
    {
        return true;
    }

    cgroup_in_container(&source.read(paths::INIT_CGROUP).content)
}

/// Virtualization kind; defaulted when no DMI identity could be read and
/// nothing else identified the environment
pub fn extract(source: &dyn Source) -> Probed<VirtKind> {
    if is_wsl(source) {
        return Probed::detected(VirtKind::Wsl);
    }

    if is_container(source) {
        return Probed::detected(VirtKind::Container);
    }

    let product = source.read(paths::DMI_PRODUCT_NAME);
    let vendor = source.read(paths::DMI_SYS_VENDOR);

    if let Some(kind) = match_dmi(&product.content, &vendor.content) {
        return Probed::detected(kind);
    }

    if has_hypervisor_flag(&source.read(paths::CPUINFO).content) {
        return Probed::detected(VirtKind::UnknownVirtualized);
    }

    if product.available || vendor.available {
        Probed::detected(VirtKind::BareMetal)
    } else {
        Probed::defaulted(VirtKind::BareMetal)
    }
}
