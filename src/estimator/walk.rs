use anyhow::{Context, Result};
use glob::{MatchOptions, Pattern};
use jwalk::{DirEntry, Parallelism, WalkDir};
use log::trace;
use std::ffi::OsStr;
use std::path::Path;

/// Filename filter for path-based resources. `None` matches every file.
#[derive(Debug, Clone)]
pub struct FileMatcher {
    pattern: Option<Pattern>,
}

impl FileMatcher {
    pub fn new(pattern: Option<&str>) -> Result<Self> {
        let pattern = pattern
            .map(|p| Pattern::new(p).with_context(|| format!("invalid file pattern {p:?}")))
            .transpose()?;
        Ok(Self { pattern })
    }

    pub const fn all() -> Self {
        Self { pattern: None }
    }

    pub fn matches(&self, file_name: &OsStr) -> bool {
        let Some(pattern) = &self.pattern else {
            return true;
        };
        let options = MatchOptions {
            case_sensitive: !cfg!(windows),
            ..MatchOptions::new()
        };
        pattern.matches_with(&file_name.to_string_lossy(), options)
    }
}

/// Every non-directory entry under `root`, recursively, whose name passes `matcher`.
/// Symlinks are yielded as entries and never followed. Entries that cannot be read are
/// skipped.
pub fn files<'a>(root: &Path, matcher: &'a FileMatcher) -> impl Iterator<Item = DirEntry<((), ())>> + 'a {
    // Serial walk: sizing runs per-descriptor in parallel already
    WalkDir::new(root)
        .skip_hidden(false)
        .follow_links(false)
        .parallelism(Parallelism::Serial)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                trace!("skipping unreadable entry: {e}");
                None
            }
        })
        .filter(|entry| !entry.file_type().is_dir())
        .filter(move |entry| matcher.matches(entry.file_name()))
}

/// Byte length of an entry, 0 when it cannot be stat'd.
pub fn entry_len(entry: &DirEntry<((), ())>) -> u64 {
    entry.metadata().map_or(0, |m| m.len())
}

/// Total length of every file under `path`; a plain file reports its own length.
pub fn tree_size(path: &Path) -> u64 {
    match path.symlink_metadata() {
        Ok(meta) if meta.is_dir() => files(path, &FileMatcher::all())
            .map(|entry| entry_len(&entry))
            .sum(),
        Ok(meta) => meta.len(),
        Err(_) => 0,
    }
}
