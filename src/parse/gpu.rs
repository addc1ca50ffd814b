//! GPU extractor.
//!
//! Looks at the driver bound to each DRM card and at the loaded kernel
//! modules. DRM drivers are matched by substring; module names are matched
//! exactly against [`GPU_MODULES`] so that `kvm_amd` or `snd_hda_intel` never
//! count as a GPU.

use crate::facts::GpuFacts;
use crate::probe::{paths, Probed, Source};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpuDriver {
    Nvidia,
    Nouveau,
    Amd,
    Intel,
    Virtio,
}

pub const GPU_MODULES: &[(&str, GpuDriver)] = &[
    ("amdgpu", GpuDriver::Amd),
    ("radeon", GpuDriver::Amd),
    ("i915", GpuDriver::Intel),
    ("xe", GpuDriver::Intel),
    ("nvidia", GpuDriver::Nvidia),
    ("nouveau", GpuDriver::Nouveau),
    ("virtio_gpu", GpuDriver::Virtio),
];

/// Match a DRM driver name, case-insensitively
pub fn match_drm_driver(driver: &str) -> Option<GpuDriver> {
    let driver = driver.trim().to_lowercase();

    if driver.contains("nouveau") {
        Some(GpuDriver::Nouveau)
    } else if driver.contains("nvidia") {
        Some(GpuDriver::Nvidia)
    } else if driver.contains("amd") || driver.contains("radeon") {
        Some(GpuDriver::Amd)
    } else if driver.contains("i915") || driver.contains("intel") || driver == "xe" {
        Some(GpuDriver::Intel)
    } else if driver.contains("virtio") {
        Some(GpuDriver::Virtio)
    } else {
        None
    }
}

pub fn match_module(module: &str) -> Option<GpuDriver> {
    let module = module.to_lowercase();
    GPU_MODULES
        .iter()
        .find(|(name, _)| *name == module)
        .map(|(_, driver)| *driver)
}

/// `DRIVER=` value from a device uevent file
pub fn parse_uevent_driver(uevent: &str) -> Option<&str> {
    uevent
        .lines()
        .find_map(|line| line.trim().strip_prefix("DRIVER="))
        .map(str::trim)
        .filter(|driver| !driver.is_empty())
}

/// Module names from /proc/modules (first column)
pub fn parse_modules(modules: &str) -> Vec<&str> {
    modules
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .collect()
}

/// DRM card entries, without connectors such as `card0-HDMI-A-1`
pub fn is_card(name: &str) -> bool {
    name.starts_with("card") && !name.contains('-')
}

pub fn apply_driver(gpu: &mut GpuFacts, driver: GpuDriver) {
    match driver {
        GpuDriver::Nvidia => gpu.has_nvidia = true,
        GpuDriver::Nouveau => {
            gpu.has_nouveau = true;
            gpu.has_nvidia = true;
        }
        GpuDriver::Amd => gpu.has_amd = true,
        GpuDriver::Intel => gpu.has_intel = true,
        GpuDriver::Virtio => gpu.has_virtio = true,
    }
}

/// GPU vendor flags; `has_discrete` is left for the classifier
pub fn extract(source: &dyn Source) -> Probed<GpuFacts> {
    let mut gpu = GpuFacts::default();

    let cards: Vec<String> = source
        .list(paths::DRM_CLASS)
        .into_iter()
        .filter(|name| is_card(name))
        .collect();

    for card in &cards {
        let uevent = source.read(&paths::drm_uevent(card));
        if let Some(driver) = parse_uevent_driver(&uevent.content).and_then(match_drm_driver) {
            apply_driver(&mut gpu, driver);
        }
    }

    let modules = source.read(paths::MODULES);
    for module in parse_modules(&modules.content) {
        if let Some(driver) = match_module(module) {
            apply_driver(&mut gpu, driver);
        }
    }

    if cards.is_empty() && !modules.available {
        Probed::defaulted(gpu)
    } else {
        Probed::detected(gpu)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::FsSource;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_match_drm_driver() {
        assert_eq!(match_drm_driver("amdgpu"), Some(GpuDriver::Amd));
        assert_eq!(match_drm_driver("Radeon"), Some(GpuDriver::Amd));
        assert_eq!(match_drm_driver("i915"), Some(GpuDriver::Intel));
        assert_eq!(match_drm_driver("xe"), Some(GpuDriver::Intel));
        assert_eq!(match_drm_driver("NVIDIA"), Some(GpuDriver::Nvidia));
        assert_eq!(match_drm_driver("nouveau"), Some(GpuDriver::Nouveau));
        assert_eq!(match_drm_driver("virtio-pci"), Some(GpuDriver::Virtio));
        assert_eq!(match_drm_driver("xen-fbfront"), None);
        assert_eq!(match_drm_driver("simple-framebuffer"), None);
    }

    #[test]
    fn test_match_module_is_exact() {
        assert_eq!(match_module("amdgpu"), Some(GpuDriver::Amd));
        assert_eq!(match_module("virtio_gpu"), Some(GpuDriver::Virtio));
        assert_eq!(match_module("kvm_amd"), None);
        assert_eq!(match_module("snd_hda_intel"), None);
        assert_eq!(match_module("nvidia_drm"), None);
    }

    #[test]
    fn test_parse_uevent_driver() {
        let uevent = "DRIVER=amdgpu\nPCI_CLASS=30000\nPCI_ID=1002:73BF\n";
        assert_eq!(parse_uevent_driver(uevent), Some("amdgpu"));
        assert_eq!(parse_uevent_driver("PCI_CLASS=30000\n"), None);
        assert_eq!(parse_uevent_driver("DRIVER=\n"), None);
    }

    #[test]
    fn test_is_card() {
        assert!(is_card("card0"));
        assert!(!is_card("card0-HDMI-A-1"));
        assert!(!is_card("renderD128"));
        assert!(!is_card("version"));
    }

    #[test]
    fn test_nouveau_counts_as_nvidia_hardware() {
        let mut gpu = GpuFacts::default();
        apply_driver(&mut gpu, GpuDriver::Nouveau);
        assert!(gpu.has_nouveau);
        assert!(gpu.has_nvidia);
    }

    #[test]
    fn test_extract_from_drm_and_modules() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        let card0 = root.join("sys/class/drm/card0/device");
        fs::create_dir_all(&card0).unwrap();
        fs::write(card0.join("uevent"), "DRIVER=i915\n").unwrap();
        fs::create_dir_all(root.join("sys/class/drm/card0-eDP-1")).unwrap();

        fs::create_dir_all(root.join("proc")).unwrap();
        fs::write(
            root.join("proc/modules"),
            "kvm_amd 200704 0 - Live 0x0000000000000000\nnvidia 56000000 1 - Live 0x0000000000000000\n",
        )
        .unwrap();

        let gpu = extract(&FsSource::new(root));
        assert!(!gpu.defaulted);
        assert!(gpu.value.has_intel);
        assert!(gpu.value.has_nvidia);
        assert!(!gpu.value.has_amd);
        assert!(!gpu.value.has_virtio);
    }

    #[test]
    fn test_extract_nothing_available() {
        let temp_dir = TempDir::new().unwrap();
        let gpu = extract(&FsSource::new(temp_dir.path()));
        assert!(gpu.defaulted);
        assert_eq!(gpu.value, GpuFacts::default());
    }
}
