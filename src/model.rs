use crate::estimator::format_bytes;
use anyhow::Result;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Opaque cleanup operation. `Ok(false)` and `Err` both count as a failed cleanup.
pub type Action = Arc<dyn Fn() -> Result<bool> + Send + Sync>;

/// How an action-based resource reports its reclaimable size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionSizing {
    /// Nothing measurable on disk (e.g. a resolver cache).
    Unsized,
    /// Sum of the current user's trash/recycle stores across fixed volumes.
    TrashStores,
}

#[derive(Clone)]
pub enum ResourceKind {
    PathBased {
        root: PathBuf,
        pattern: Option<String>,
    },
    ActionBased {
        action: Action,
        sizing: ActionSizing,
    },
}

impl fmt::Debug for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PathBased { root, pattern } => f
                .debug_struct("PathBased")
                .field("root", root)
                .field("pattern", pattern)
                .finish(),
            Self::ActionBased { sizing, .. } => f
                .debug_struct("ActionBased")
                .field("sizing", sizing)
                .finish_non_exhaustive(),
        }
    }
}

/// Static definition of one cleanable category.
///
/// The risk message lives in an `Option`, so "risky" and "has a risk message" can never
/// disagree.
#[derive(Debug, Clone)]
pub struct Descriptor {
    pub name: String,
    pub kind: ResourceKind,
    pub description: String,
    risk: Option<String>,
}

impl Descriptor {
    /// Every file under `root`, recursively; emptied subdirectories are pruned.
    pub fn path(name: &str, root: PathBuf, description: &str) -> Self {
        Self::with_kind(
            name,
            ResourceKind::PathBased {
                root,
                pattern: None,
            },
            description,
        )
    }

    /// Only files whose name matches `pattern`, recursively; directories are kept.
    pub fn pattern(name: &str, root: PathBuf, pattern: &str, description: &str) -> Self {
        let pattern = (!pattern.is_empty()).then(|| pattern.to_string());
        Self::with_kind(name, ResourceKind::PathBased { root, pattern }, description)
    }

    pub fn action<F>(name: &str, description: &str, sizing: ActionSizing, action: F) -> Self
    where
        F: Fn() -> Result<bool> + Send + Sync + 'static,
    {
        Self::with_kind(
            name,
            ResourceKind::ActionBased {
                action: Arc::new(action),
                sizing,
            },
            description,
        )
    }

    fn with_kind(name: &str, kind: ResourceKind, description: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            description: description.to_string(),
            risk: None,
        }
    }

    #[must_use]
    pub fn risky(mut self, message: &str) -> Self {
        self.risk = Some(message.to_string());
        self
    }

    pub const fn is_risky(&self) -> bool {
        self.risk.is_some()
    }

    pub fn risk_message(&self) -> Option<&str> {
        self.risk.as_deref()
    }

    pub fn root(&self) -> Option<&Path> {
        match &self.kind {
            ResourceKind::PathBased { root, .. } => Some(root),
            ResourceKind::ActionBased { .. } => None,
        }
    }

    /// Whether a size is worth showing next to the name.
    pub const fn is_measured(&self) -> bool {
        matches!(
            self.kind,
            ResourceKind::PathBased { .. }
                | ResourceKind::ActionBased {
                    sizing: ActionSizing::TrashStores,
                    ..
                }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupResult {
    pub name: String,
    pub success: bool,
}

impl CleanupResult {
    pub fn status_text(&self) -> String {
        if self.success {
            format!("Cleaned {} successfully.", self.name)
        } else {
            format!("Failed to clean {}.", self.name)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeSnapshot {
    pub name: String,
    pub bytes: u64,
    pub measured: bool,
}

impl SizeSnapshot {
    pub fn formatted(&self) -> Option<String> {
        self.measured.then(|| format_bytes(self.bytes))
    }

    /// "Name (1.5 KB)" for measured resources, the bare name otherwise.
    pub fn label(&self) -> String {
        match self.formatted() {
            Some(size) => format!("{} ({size})", self.name),
            None => self.name.clone(),
        }
    }
}

/// One pass of the estimator over the whole registry.
#[derive(Debug, Clone)]
pub struct SizeReport {
    pub taken_at: Instant,
    pub sizes: Vec<SizeSnapshot>,
}

impl SizeReport {
    pub fn get(&self, name: &str) -> Option<&SizeSnapshot> {
        self.sizes.iter().find(|s| s.name == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    All,
    None,
    Partial,
}

/// What a presentation layer needs to render one row.
#[derive(Debug, Clone)]
pub struct DescriptorView {
    pub name: String,
    pub description: String,
    pub root: Option<PathBuf>,
    pub risk_message: Option<String>,
    pub size: SizeSnapshot,
}

impl DescriptorView {
    pub const fn is_risky(&self) -> bool {
        self.risk_message.is_some()
    }
}
