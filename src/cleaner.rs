use crate::allowlist::Allowlist;
use crate::estimator::walk::{self, FileMatcher};
use crate::model::{Action, Descriptor, ResourceKind};
use anyhow::{Context, Result, anyhow};
use log::{debug, info, trace, warn};
use std::fs;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;

/// Filesystem removal primitives, replaceable in tests.
pub trait Remover: Send + Sync {
    fn remove_file(&self, path: &Path) -> io::Result<()>;
    fn remove_dir_all(&self, path: &Path) -> io::Result<()>;
}

pub struct FsRemover;

impl Remover for FsRemover {
    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir_all(path)
    }
}

/// Tally of one path-based sweep. Only used for logging: individual failures never
/// change the outcome.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Sweep {
    pub files_removed: usize,
    pub files_failed: usize,
    pub dirs_removed: usize,
    pub dirs_failed: usize,
}

pub struct Cleaner {
    remover: Arc<dyn Remover>,
    allowlist: Arc<Allowlist>,
}

impl Cleaner {
    pub fn new(allowlist: Arc<Allowlist>) -> Self {
        Self::with_remover(allowlist, Arc::new(FsRemover))
    }

    pub fn with_remover(allowlist: Arc<Allowlist>, remover: Arc<dyn Remover>) -> Self {
        Self { remover, allowlist }
    }

    /// Cleans one descriptor, best effort. `false` only when the action reported
    /// failure or the walk itself could not proceed.
    pub fn clean(&self, descriptor: &Descriptor) -> bool {
        if descriptor.is_risky() {
            info!("{}: cleaning an item marked risky", descriptor.name);
        }
        let outcome = match &descriptor.kind {
            ResourceKind::ActionBased { action, .. } => run_action(action),
            ResourceKind::PathBased { root, pattern } => {
                self.clean_path(root, pattern.as_deref()).map(|sweep| {
                    info!(
                        "{}: removed {} files and {} directories ({} files, {} directories left behind)",
                        descriptor.name,
                        sweep.files_removed,
                        sweep.dirs_removed,
                        sweep.files_failed,
                        sweep.dirs_failed
                    );
                    true
                })
            }
        };

        match outcome {
            Ok(true) => true,
            Ok(false) => {
                warn!("{}: cleanup reported failure", descriptor.name);
                false
            }
            Err(e) => {
                warn!("{}: {e:#}", descriptor.name);
                false
            }
        }
    }

    /// Without a pattern: every file under `root`, then every immediate child
    /// directory. With one: matching files only, directories untouched.
    pub fn clean_path(&self, root: &Path, pattern: Option<&str>) -> Result<Sweep> {
        if root.as_os_str().is_empty() || !root.is_dir() {
            debug!("{} does not exist, nothing to clean", root.display());
            return Ok(Sweep::default());
        }
        let matcher = FileMatcher::new(pattern)?;

        // The walk swallows unreadable entries, so check that it can start at all.
        fs::read_dir(root).with_context(|| format!("cannot enumerate {}", root.display()))?;

        let mut sweep = Sweep::default();
        for entry in walk::files(root, &matcher) {
            let path = entry.path();
            if self.allowlist.is_allowed(&path) {
                continue;
            }
            match self.remover.remove_file(&path) {
                Ok(()) => sweep.files_removed += 1,
                Err(e) => {
                    trace!("could not remove {}: {e}", path.display());
                    sweep.files_failed += 1;
                }
            }
        }

        // A root that vanished mid-walk means the sweep did not complete.
        let children =
            fs::read_dir(root).with_context(|| format!("cannot enumerate {}", root.display()))?;
        if pattern.is_none() {
            for child in children.filter_map(Result::ok) {
                if !child.file_type().is_ok_and(|t| t.is_dir()) {
                    continue;
                }
                let path = child.path();
                if self.allowlist.is_allowed(&path) || self.allowlist.protects_descendant_of(&path)
                {
                    continue;
                }
                match self.remover.remove_dir_all(&path) {
                    Ok(()) => sweep.dirs_removed += 1,
                    Err(e) => {
                        trace!("could not remove {}: {e}", path.display());
                        sweep.dirs_failed += 1;
                    }
                }
            }
        }

        Ok(sweep)
    }
}

/// Invokes an opaque action; a panic inside it counts as failure.
fn run_action(action: &Action) -> Result<bool> {
    panic::catch_unwind(AssertUnwindSafe(|| action()))
        .map_err(|_| anyhow!("cleanup action panicked"))?
}
