//! Block device extractor.

use crate::facts::BlockDevice;
use crate::probe::{paths, Probed, RawSample, Source};

/// Kernel block devices that are not backed by a disk
const PSEUDO_PREFIXES: &[&str] = &["loop", "ram", "zram", "dm-", "sr", "md", "nbd", "fd"];

/// Disk names that may be solid state when the kernel says non-rotational
const SSD_PREFIXES: &[&str] = &["sd", "xvd"];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StorageScan {
    pub devices: Vec<BlockDevice>,
    /// At least one entry under /sys/class/nvme. Only set when /sys/block
    /// could be listed.
    pub nvme_controller: bool,
}

pub fn is_pseudo(name: &str) -> bool {
    PSEUDO_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
}

pub fn is_nvme_name(name: &str) -> bool {
    name.starts_with("nvme")
}

pub fn is_ssd_name(name: &str) -> bool {
    SSD_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
}

pub fn is_virtio_name(name: &str) -> bool {
    name.starts_with("vd")
}

pub fn is_mmc_name(name: &str) -> bool {
    name.starts_with("mmcblk")
}

/// `queue/rotational` is `0` for solid state; anything else counts as spinning
pub fn parse_rotational(sample: &RawSample) -> bool {
    sample.text() != Some("0")
}

pub fn extract(source: &dyn Source) -> Probed<StorageScan> {
    let names = source.list(paths::BLOCK);
    // an unreadable block listing reports no disks at all
    let nvme_controller = !names.is_empty() && !source.list(paths::NVME_CLASS).is_empty();

    let devices: Vec<BlockDevice> = names
        .iter()
        .filter(|name| !is_pseudo(name))
        .map(|name| BlockDevice {
            name: name.clone(),
            rotational: parse_rotational(&source.read(&paths::rotational(name))),
            is_nvme: is_nvme_name(name),
        })
        .collect();

    let scan = StorageScan {
        devices,
        nvme_controller,
    };

    if names.is_empty() {
        Probed::defaulted(scan)
    } else {
        Probed::detected(scan)
    }
}
