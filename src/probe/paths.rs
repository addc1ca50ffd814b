//! OS paths read during detection.

pub const CPUINFO: &str = "/proc/cpuinfo";
pub const CPU_ONLINE: &str = "/sys/devices/system/cpu/online";
pub const MEMINFO: &str = "/proc/meminfo";
pub const MODULES: &str = "/proc/modules";

pub const BLOCK: &str = "/sys/block";
pub const NVME_CLASS: &str = "/sys/class/nvme";
pub const DRM_CLASS: &str = "/sys/class/drm";

pub const DMI_PRODUCT_NAME: &str = "/sys/class/dmi/id/product_name";
pub const DMI_SYS_VENDOR: &str = "/sys/class/dmi/id/sys_vendor";

pub const WSL_INTEROP: &str = "/proc/sys/fs/binfmt_misc/WSLInterop";
pub const WSL_RUN_DIR: &str = "/run/WSL";

pub const DOCKER_ENV: &str = "/.dockerenv";
pub const CONTAINER_ENV: &str = "/run/.containerenv";
pub const CONTAINER_VAR: &str = "container";
pub const INIT_CGROUP: &str = "/proc/1/cgroup";

pub fn rotational(device: &str) -> String {
    format!("{}/{}/queue/rotational", BLOCK, device)
}

pub fn drm_uevent(card: &str) -> String {
    format!("{}/{}/device/uevent", DRM_CLASS, card)
}
