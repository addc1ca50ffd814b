//! hwfacts - Hardware detection and classification for system tuning.
//!
//! This library provides the detection pipeline behind the `hwfacts` binary:
//! - Probing OS pseudo-files without ever failing on absence
//! - Extracting typed CPU, memory, storage, GPU and virtualization facts
//! - Classifying facts into ordinal tiers
//! - Resolving operator overrides
//! - Aggregating an immutable hardware profile with a performance label
//! - Publishing snapshots and rendering them for logs

pub mod cfg;
pub mod classify;
pub mod facts;
pub mod overrides;
pub mod parse;
pub mod probe;
pub mod profile;
pub mod publish;
pub mod report;
pub mod ui;

pub use facts::{FactSet, PerformanceProfile};
pub use overrides::{OverrideError, OverrideSet};
pub use probe::{FsSource, Source};
pub use profile::{detect, Detection, Diagnostics, HardwareProfile};
pub use publish::{Publisher, Snapshot};
