//! Memory extractor for /proc/meminfo.

use regex::Regex;
use std::sync::OnceLock;

use crate::probe::{paths, Arch, Probed, Source};

pub const KB_PER_GB: u64 = 1_048_576;

fn mem_total_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?m)^MemTotal:\s+(\d+)\s*kB").expect("Invalid MemTotal pattern")
    })
}

/// Total memory in kB, if meminfo carries a usable `MemTotal`
pub fn parse_mem_total_kb(meminfo: &str) -> Option<u64> {
    mem_total_pattern()
        .captures(meminfo)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u64>().ok())
        .filter(|kb| *kb > 0)
}

pub fn kb_to_gb(total_kb: u64) -> u64 {
    total_kb / KB_PER_GB
}

pub fn default_memory_gb(arch: Arch) -> u64 {
    match arch {
        Arch::X86_64 => 8,
        Arch::Aarch64 => 4,
        Arch::Other => 2,
    }
}

/// Total memory in kB, falling back to the platform default
pub fn extract(source: &dyn Source) -> Probed<u64> {
    let sample = source.read(paths::MEMINFO);

    match parse_mem_total_kb(&sample.content) {
        Some(kb) => Probed::detected(kb),
        None => Probed::defaulted(default_memory_gb(source.arch()) * KB_PER_GB),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::FsSource;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_mem_total() {
        let sample = "MemTotal:       32768000 kB
MemFree:         8192000 kB
MemAvailable:   16384000 kB
";
        assert_eq!(parse_mem_total_kb(sample), Some(32768000));
    }

    #[test]
    fn test_parse_mem_total_rejects_garbage() {
        assert_eq!(parse_mem_total_kb(""), None);
        assert_eq!(parse_mem_total_kb("MemFree: 100 kB\n"), None);
        assert_eq!(parse_mem_total_kb("MemTotal: lots kB\n"), None);
        assert_eq!(parse_mem_total_kb("MemTotal: 0 kB\n"), None);
    }

    #[test]
    fn test_kb_to_gb_truncates() {
        assert_eq!(kb_to_gb(67_108_864), 64);
        assert_eq!(kb_to_gb(16_000_000), 15);
        assert_eq!(kb_to_gb(1_048_575), 0);
    }

    #[test]
    fn test_extract_defaults_per_platform() {
        let temp_dir = TempDir::new().unwrap();

        let x86 = FsSource::new(temp_dir.path()).with_arch(Arch::X86_64);
        assert_eq!(extract(&x86), Probed::defaulted(8 * KB_PER_GB));

        let arm = FsSource::new(temp_dir.path()).with_arch(Arch::Aarch64);
        assert_eq!(extract(&arm), Probed::defaulted(4 * KB_PER_GB));

        let other = FsSource::new(temp_dir.path()).with_arch(Arch::Other);
        assert_eq!(extract(&other), Probed::defaulted(2 * KB_PER_GB));
    }

    #[test]
    fn test_extract_reads_meminfo() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("proc")).unwrap();
        fs::write(temp_dir.path().join("proc/meminfo"), "MemTotal: 4194304 kB\n").unwrap();

        let source = FsSource::new(temp_dir.path());
        assert_eq!(extract(&source), Probed::detected(4_194_304));
    }
}
