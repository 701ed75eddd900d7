use super::walk::tree_size;
use crate::allowlist::Allowlist;
use crate::constants::{
    FREEDESKTOP_CONTENT_DIR, FREEDESKTOP_TOPDIR_TRASH, FREEDESKTOP_TRASH_DIR,
    MACOS_FOLDER_METADATA, MACOS_USER_TRASH, MACOS_VOLUME_TRASHES, RECYCLE_BIN_DIR,
    RECYCLE_CONTENT_PREFIX,
};
use log::{debug, trace};
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use sysinfo::Disks;

/// On-disk arrangement of per-user trash stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrashLayout {
    /// `<volume>\$Recycle.Bin\<SID>\`, content entries `$R*`, metadata `$I*`.
    RecycleBin,
    /// XDG trash: content under `files/`, metadata under the sibling `info/`.
    Freedesktop,
    /// `~/.Trash` and `<volume>/.Trashes/<uid>`.
    MacOs,
}

impl TrashLayout {
    pub const fn current() -> Self {
        if cfg!(windows) {
            Self::RecycleBin
        } else if cfg!(target_os = "macos") {
            Self::MacOs
        } else {
            Self::Freedesktop
        }
    }

    /// The user's own trash in their home area, if this layout has one.
    fn home_store(self) -> Option<PathBuf> {
        match self {
            Self::RecycleBin => None,
            Self::Freedesktop => dirs::data_dir()
                .map(|d| d.join(FREEDESKTOP_TRASH_DIR).join(FREEDESKTOP_CONTENT_DIR)),
            Self::MacOs => dirs::home_dir().map(|h| h.join(MACOS_USER_TRASH)),
        }
    }

    fn volume_stores(self, volume: &Path, identity: &str) -> Vec<PathBuf> {
        match self {
            Self::RecycleBin => vec![volume.join(RECYCLE_BIN_DIR).join(identity)],
            Self::Freedesktop => vec![
                volume
                    .join(FREEDESKTOP_TOPDIR_TRASH)
                    .join(identity)
                    .join(FREEDESKTOP_CONTENT_DIR),
                volume
                    .join(format!("{FREEDESKTOP_TOPDIR_TRASH}-{identity}"))
                    .join(FREEDESKTOP_CONTENT_DIR),
            ],
            Self::MacOs => vec![volume.join(MACOS_VOLUME_TRASHES).join(identity)],
        }
    }

    /// Whether a top-level entry of a store is deleted content rather than bookkeeping.
    fn is_content(self, name: &OsStr) -> bool {
        let name = name.to_string_lossy();
        match self {
            Self::RecycleBin => name.starts_with(RECYCLE_CONTENT_PREFIX),
            Self::Freedesktop => true,
            Self::MacOs => name != MACOS_FOLDER_METADATA,
        }
    }
}

#[derive(Debug, Clone)]
enum Volumes {
    /// Re-enumerated from the OS on every estimate.
    System,
    #[cfg(test)]
    Fixed(Vec<PathBuf>),
}

/// Locates and measures the current user's trash stores.
#[derive(Debug, Clone)]
pub struct TrashProbe {
    layout: TrashLayout,
    volumes: Volumes,
    home_store: Option<PathBuf>,
    identity: Option<String>,
}

impl TrashProbe {
    pub fn system() -> Self {
        let layout = TrashLayout::current();
        let identity = current_identity();
        if identity.is_none() {
            debug!("could not resolve current user identity; only the home trash is measured");
        }
        Self {
            layout,
            volumes: Volumes::System,
            home_store: layout.home_store(),
            identity,
        }
    }

    #[cfg(test)]
    pub fn new(
        layout: TrashLayout,
        volumes: Vec<PathBuf>,
        home_store: Option<PathBuf>,
        identity: Option<String>,
    ) -> Self {
        Self {
            layout,
            volumes: Volumes::Fixed(volumes),
            home_store,
            identity,
        }
    }

    /// Existing store directories, deduplicated, home store first.
    pub fn stores(&self) -> Vec<PathBuf> {
        let volumes = match &self.volumes {
            Volumes::System => fixed_volumes(),
            #[cfg(test)]
            Volumes::Fixed(v) => v.clone(),
        };

        let mut stores: Vec<PathBuf> = self.home_store.iter().cloned().collect();
        if let Some(identity) = &self.identity {
            for volume in &volumes {
                stores.extend(self.layout.volume_stores(volume, identity));
            }
        }
        let mut seen = Vec::new();
        stores.retain(|p| {
            let keep = p.is_dir() && !seen.contains(p);
            seen.push(p.clone());
            keep
        });
        stores
    }

    /// Bytes of deleted content across all stores. Never fails; anything unreadable
    /// contributes 0.
    pub fn total_size(&self, allowlist: &Allowlist) -> u64 {
        self.stores()
            .iter()
            .map(|store| self.store_size(store, allowlist))
            .sum()
    }

    fn store_size(&self, store: &Path, allowlist: &Allowlist) -> u64 {
        let Ok(entries) = fs::read_dir(store) else {
            trace!("trash store {} unreadable", store.display());
            return 0;
        };
        entries
            .filter_map(Result::ok)
            .filter(|e| self.layout.is_content(&e.file_name()))
            .map(|e| e.path())
            .filter(|p| !allowlist.is_allowed(p))
            .map(|p| tree_size(&p))
            .sum()
    }
}

fn fixed_volumes() -> Vec<PathBuf> {
    let disks = Disks::new_with_refreshed_list();
    let mut volumes: Vec<PathBuf> = disks
        .list()
        .iter()
        .filter(|d| !d.is_removable())
        .map(|d| d.mount_point().to_path_buf())
        .collect();
    volumes.sort();
    volumes.dedup();
    volumes
}

#[cfg(unix)]
fn current_identity() -> Option<String> {
    use std::os::unix::fs::MetadataExt;

    let home = dirs::home_dir()?;
    fs::metadata(home).ok().map(|m| m.uid().to_string())
}

#[cfg(windows)]
fn current_identity() -> Option<String> {
    let output = std::process::Command::new("whoami")
        .args(["/user", "/fo", "csv", "/nh"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    parse_whoami_sid(&String::from_utf8_lossy(&output.stdout))
}

#[cfg(not(any(unix, windows)))]
fn current_identity() -> Option<String> {
    None
}

/// Pulls the SID out of `whoami /user /fo csv /nh` output: `"host\user","S-1-5-21-..."`.
#[cfg_attr(not(windows), allow(dead_code))]
fn parse_whoami_sid(stdout: &str) -> Option<String> {
    let line = stdout.lines().find(|l| !l.trim().is_empty())?;
    let sid = line.rsplit(',').next()?.trim().trim_matches('"');
    sid.starts_with("S-1-").then(|| sid.to_string())
}
