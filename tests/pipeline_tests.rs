use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

use hwfacts::facts::{StorageType, VirtKind};
use hwfacts::parse::Fact;
use hwfacts::probe::Arch;
use hwfacts::{detect, FsSource, OverrideError, OverrideSet, PerformanceProfile, Publisher};

fn write(root: &Path, path: &str, content: &str) {
    let full = root.join(path);
    fs::create_dir_all(full.parent().unwrap()).unwrap();
    fs::write(full, content).unwrap();
}

fn cpuinfo(cores: u32, vendor: &str, model: &str) -> String {
    (0..cores)
        .map(|i| {
            format!(
                "processor\t: {}\nvendor_id\t: {}\nmodel name\t: {}\nflags\t\t: fpu sse4_2 avx avx2\n\n",
                i, vendor, model
            )
        })
        .collect()
}

fn meminfo_gb(gb: u64) -> String {
    format!("MemTotal:       {} kB\nMemFree:        1024 kB\n", gb * 1024 * 1024)
}

fn source(root: &Path) -> FsSource {
    FsSource::new(root).with_arch(Arch::X86_64).isolated()
}

#[test]
fn test_workstation_is_high_performance() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "proc/cpuinfo", &cpuinfo(16, "AuthenticAMD", "AMD Ryzen 9 7950X"));
    write(root, "proc/meminfo", &meminfo_gb(64));
    write(root, "sys/block/nvme0n1/queue/rotational", "0\n");
    write(root, "sys/class/dmi/id/product_name", "X670E AORUS MASTER\n");
    write(root, "sys/class/dmi/id/sys_vendor", "Gigabyte Technology Co., Ltd.\n");
    write(root, "sys/class/drm/card0/device/uevent", "DRIVER=amdgpu\nPCI_ID=1002:744C\n");

    let detection = detect(&source(root), &OverrideSet::default()).unwrap();
    let profile = &detection.profile;

    assert_eq!(profile.performance_profile(), PerformanceProfile::HighPerformance);
    assert_eq!(profile.cpu().core_count, 16);
    assert_eq!(profile.memory().total_gb, 64);
    assert_eq!(profile.storage().primary_type, StorageType::Nvme);
    assert!(profile.storage().has_ssd);
    assert!(profile.gpu().has_amd);
    assert!(profile.gpu().has_discrete);
    assert_eq!(profile.virtualization().kind, VirtKind::BareMetal);
    assert!(detection.diagnostics.is_clean());
}

#[test]
fn test_qemu_guest() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "proc/cpuinfo", &cpuinfo(4, "GenuineIntel", "QEMU Virtual CPU version 2.5+"));
    write(root, "proc/meminfo", &meminfo_gb(8));
    write(root, "sys/block/vda/queue/rotational", "1\n");
    write(root, "sys/class/dmi/id/product_name", "Standard PC (i440FX + PIIX, 1996)\n");
    write(root, "sys/class/dmi/id/sys_vendor", "QEMU\n");

    let detection = detect(&source(root), &OverrideSet::default()).unwrap();
    let virt = detection.profile.virtualization();

    assert_eq!(virt.kind, VirtKind::Qemu);
    assert!(virt.is_vm);
    assert!(!virt.is_container);
    assert_eq!(detection.profile.storage().primary_type, StorageType::Virtio);
}

#[test]
fn test_override_beats_detection() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "proc/cpuinfo", &cpuinfo(16, "GenuineIntel", "Intel(R) Xeon(R)"));
    write(root, "proc/meminfo", &meminfo_gb(64));
    write(root, "sys/block/nvme0n1/queue/rotational", "0\n");

    let overrides = OverrideSet::from_toml_str("[cpu]\ncores = 2\n").unwrap();
    let detection = detect(&source(root), &overrides).unwrap();

    assert_eq!(detection.profile.cpu().core_count, 2);
    assert_ne!(
        detection.profile.performance_profile(),
        PerformanceProfile::HighPerformance
    );
    assert_eq!(detection.diagnostics.overridden, vec!["cpu.cores"]);
}

#[test]
fn test_invalid_overrides_fail_fast() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "proc/cpuinfo", &cpuinfo(16, "GenuineIntel", "Intel(R) Xeon(R)"));

    let mut overrides = OverrideSet::default();
    overrides.cpu.cores = Some(0);

    assert!(matches!(
        detect(&source(root), &overrides),
        Err(OverrideError::CoresOutOfRange { value: 0, .. })
    ));
    assert!(Publisher::new(Box::new(source(root)), overrides).is_err());
}

#[test]
fn test_forced_label() {
    let temp_dir = TempDir::new().unwrap();
    let overrides =
        OverrideSet::from_toml_str("performance_profile = \"high-performance\"\n").unwrap();

    let detection = detect(&source(temp_dir.path()), &overrides).unwrap();
    assert_eq!(
        detection.profile.performance_profile(),
        PerformanceProfile::HighPerformance
    );
}

#[test]
fn test_overrides_are_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "proc/cpuinfo", &cpuinfo(8, "GenuineIntel", "Intel(R) Core(TM) i7"));
    write(root, "proc/meminfo", &meminfo_gb(16));
    write(root, "sys/block/sda/queue/rotational", "0\n");

    let overrides = OverrideSet::from_toml_str("[memory]\ntotal_gb = 2\n").unwrap();
    let first = detect(&source(root), &overrides).unwrap();
    let second = detect(&source(root), &overrides).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.profile.memory().total_gb, 2);
}

#[test]
fn test_empty_tree_degrades() {
    let temp_dir = TempDir::new().unwrap();
    let detection = detect(&source(temp_dir.path()), &OverrideSet::default()).unwrap();
    let profile = &detection.profile;

    assert!(profile.cpu().core_count >= 1);
    assert!(profile.memory().total_gb > 0);
    assert_eq!(profile.storage().primary_type, StorageType::Hdd);
    assert!(!profile.storage().has_ssd);
    assert!(!profile.storage().has_nvme);
    assert_eq!(profile.virtualization().kind, VirtKind::BareMetal);

    for fact in [
        Fact::CpuCores,
        Fact::MemoryTotal,
        Fact::BlockDevices,
        Fact::GpuDevices,
        Fact::DmiIdentity,
    ] {
        assert!(detection.diagnostics.defaulted.contains(&fact), "{} not defaulted", fact);
    }
}

#[test]
fn test_nvme_class_without_block_listing_is_hdd() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::create_dir_all(root.join("sys/class/nvme/nvme0")).unwrap();

    let detection = detect(&source(root), &OverrideSet::default()).unwrap();
    let storage = detection.profile.storage();

    assert!(storage.devices.is_empty());
    assert!(!storage.has_nvme);
    assert!(!storage.has_ssd);
    assert_eq!(storage.primary_type, StorageType::Hdd);
    assert!(detection.diagnostics.defaulted.contains(&Fact::BlockDevices));
}

#[test]
fn test_missing_cpuinfo_keeps_positive_cores() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "proc/meminfo", &meminfo_gb(8));

    for arch in [Arch::X86_64, Arch::Aarch64, Arch::Other] {
        let detection = detect(
            &FsSource::new(root).with_arch(arch).isolated(),
            &OverrideSet::default(),
        )
        .unwrap();
        assert!(detection.profile.cpu().core_count > 0);
    }
}

#[test]
fn test_publisher_shared_across_threads() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "proc/cpuinfo", &cpuinfo(4, "GenuineIntel", "Intel(R) Core(TM) i5"));
    write(root, "proc/meminfo", &meminfo_gb(8));

    let publisher = Publisher::new(Box::new(source(root)), OverrideSet::default()).unwrap();
    let publisher = Arc::new(publisher);

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let publisher = Arc::clone(&publisher);
            thread::spawn(move || {
                for _ in 0..50 {
                    let snapshot = publisher.current();
                    assert_eq!(snapshot.profile.cpu().core_count, 4);
                }
            })
        })
        .collect();

    for _ in 0..5 {
        publisher.refresh();
    }

    for reader in readers {
        reader.join().unwrap();
    }

    assert_eq!(publisher.current().generation, 6);
}

#[test]
#[serial_test::serial]
fn test_container_env_from_process() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "sys/class/dmi/id/sys_vendor", "QEMU\n");

    std::env::set_var("container", "podman");
    let detection = detect(
        &FsSource::new(root).with_arch(Arch::X86_64),
        &OverrideSet::default(),
    )
    .unwrap();
    std::env::remove_var("container");

    let virt = detection.profile.virtualization();
    assert_eq!(virt.kind, VirtKind::Container);
    assert!(virt.is_container);
    assert!(!virt.is_vm);
}

#[test]
#[serial_test::serial]
fn test_isolated_source_ignores_process_env() {
    let temp_dir = TempDir::new().unwrap();

    std::env::set_var("container", "docker");
    let detection = detect(&source(temp_dir.path()), &OverrideSet::default()).unwrap();
    std::env::remove_var("container");

    assert_eq!(detection.profile.virtualization().kind, VirtKind::BareMetal);
}
