//! Read-only access to the OS surface.
//!
//! Every probe is tolerant of absence: a missing or unreadable file becomes an
//! unavailable [`RawSample`] with empty content, a missing directory becomes an
//! empty listing. Nothing in here returns an error.

pub mod paths;

use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One read of one OS-exposed path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSample {
    pub source_path: String,
    pub content: String,
    pub available: bool,
}

impl RawSample {
    pub fn missing(source_path: &str) -> Self {
        Self {
            source_path: source_path.to_string(),
            content: String::new(),
            available: false,
        }
    }

    /// Trimmed content, or `None` when the source was absent or blank
    pub fn text(&self) -> Option<&str> {
        let trimmed = self.content.trim();
        if self.available && !trimmed.is_empty() {
            Some(trimmed)
        } else {
            None
        }
    }
}

/// A value together with whether it came from a fallback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Probed<T> {
    pub value: T,
    pub defaulted: bool,
}

impl<T> Probed<T> {
    pub fn detected(value: T) -> Self {
        Self { value, defaulted: false }
    }

    pub fn defaulted(value: T) -> Self {
        Self { value, defaulted: true }
    }
}

/// CPU architecture, used only to pick fallback values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Arch {
    X86_64,
    Aarch64,
    Other,
}

impl Arch {
    pub fn current() -> Self {
        Self::from_name(std::env::consts::ARCH)
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "x86_64" => Arch::X86_64,
            "aarch64" => Arch::Aarch64,
            _ => Arch::Other,
        }
    }
}

/// Where facts are read from
pub trait Source: Send + Sync {
    fn read(&self, path: &str) -> RawSample;
    fn list(&self, dir: &str) -> Vec<String>;
    fn exists(&self, path: &str) -> bool;
    fn env(&self, name: &str) -> Option<String>;
    fn arch(&self) -> Arch;
}

/// Filesystem-backed source, re-rooted under `root`
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
    arch: Arch,
    // None reads the process environment
    env: Option<HashMap<String, String>>,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            arch: Arch::current(),
            env: None,
        }
    }

    /// The live host
    pub fn host() -> Self {
        Self::new("/")
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn with_arch(mut self, arch: Arch) -> Self {
        self.arch = arch;
        self
    }

    /// Stop consulting the process environment
    pub fn isolated(mut self) -> Self {
        self.env.get_or_insert_with(HashMap::new);
        self
    }

    /// Provide an environment variable; implies [`FsSource::isolated`]
    pub fn with_env(mut self, name: &str, value: &str) -> Self {
        self.env
            .get_or_insert_with(HashMap::new)
            .insert(name.to_string(), value.to_string());
        self
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }
}

impl Source for FsSource {
    fn read(&self, path: &str) -> RawSample {
        match fs::read_to_string(self.resolve(path)) {
            Ok(content) => RawSample {
                source_path: path.to_string(),
                content,
                available: true,
            },
            Err(e) => {
                debug!(path, error = %e, "probe unavailable");
                RawSample::missing(path)
            }
        }
    }

    fn list(&self, dir: &str) -> Vec<String> {
        let entries = match fs::read_dir(self.resolve(dir)) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(dir, error = %e, "listing unavailable");
                return Vec::new();
            }
        };

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
            .collect();

        // read_dir order is filesystem dependent
        names.sort();
        names
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve(path).exists()
    }

    fn env(&self, name: &str) -> Option<String> {
        match &self.env {
            Some(vars) => vars.get(name).cloned(),
            None => std::env::var(name).ok(),
        }
    }

    fn arch(&self) -> Arch {
        self.arch
    }
}
