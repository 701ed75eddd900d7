pub mod trash_stores;
pub mod walk;

use crate::allowlist::Allowlist;
use crate::constants::SIZE_UNITS;
use crate::model::{ActionSizing, Descriptor, ResourceKind, SizeReport, SizeSnapshot};
use crate::registry::Registry;
use log::warn;
use rayon::prelude::*;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use trash_stores::TrashProbe;
use walk::{FileMatcher, entry_len};

/// Read-only size accounting for descriptors.
#[derive(Debug, Clone)]
pub struct Estimator {
    allowlist: Arc<Allowlist>,
    trash: TrashProbe,
}

impl Estimator {
    pub fn new(allowlist: Arc<Allowlist>) -> Self {
        Self {
            allowlist,
            trash: TrashProbe::system(),
        }
    }

    #[cfg(test)]
    #[must_use]
    pub fn with_trash_probe(mut self, probe: TrashProbe) -> Self {
        self.trash = probe;
        self
    }

    /// Current reclaimable bytes. Never fails: inaccessible entries count as 0.
    pub fn estimate(&self, descriptor: &Descriptor) -> u64 {
        match &descriptor.kind {
            ResourceKind::PathBased { root, pattern } => self.path_size(root, pattern.as_deref()),
            ResourceKind::ActionBased {
                sizing: ActionSizing::TrashStores,
                ..
            } => self.trash.total_size(&self.allowlist),
            ResourceKind::ActionBased {
                sizing: ActionSizing::Unsized,
                ..
            } => 0,
        }
    }

    pub fn snapshot(&self, descriptor: &Descriptor) -> SizeSnapshot {
        SizeSnapshot {
            name: descriptor.name.clone(),
            bytes: self.estimate(descriptor),
            measured: descriptor.is_measured(),
        }
    }

    /// Fresh sizes for every descriptor, in registry order.
    pub fn snapshot_all(&self, registry: &Registry) -> SizeReport {
        let taken_at = Instant::now();
        let sizes = registry
            .descriptors()
            .par_iter()
            .map(|d| self.snapshot(d))
            .collect();
        SizeReport { taken_at, sizes }
    }

    fn path_size(&self, root: &Path, pattern: Option<&str>) -> u64 {
        if root.as_os_str().is_empty() || !root.is_dir() {
            return 0;
        }
        let matcher = match FileMatcher::new(pattern) {
            Ok(m) => m,
            Err(e) => {
                warn!("{}: {e:#}", root.display());
                return 0;
            }
        };
        walk::files(root, &matcher)
            .filter(|entry| !self.allowlist.is_allowed(&entry.path()))
            .map(|entry| entry_len(&entry))
            .sum()
    }
}

/// Binary-scaled size with one decimal: `1536` is `"1.5 KB"`, `0` is `"0 B"`.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    #[allow(clippy::cast_precision_loss)]
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{size:.1} {}", SIZE_UNITS[unit])
}
