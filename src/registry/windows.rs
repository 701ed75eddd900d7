use super::actions::{empty_trash, flush_dns};
use crate::constants::{
    PROGRAM_DATA_FALLBACK, WIN_DEFENDER_HISTORY, WIN_DELIVERY_OPTIMIZATION, WIN_EDGE_CACHE,
    WIN_ERROR_REPORTING, WIN_EXPLORER, WIN_LOGS, WIN_PREFETCH, WIN_PRINT_SPOOLER, WIN_TEMP,
    WIN_THUMBCACHE_PATTERN, WIN_UPDATE_CACHE, WIN_USER_TEMP, WINDOWS_DIR_FALLBACK,
};
use crate::model::{ActionSizing, Descriptor};
use std::env;
use std::path::{Path, PathBuf};

/// Well-known folders the Windows catalogue is rooted in.
#[derive(Debug, Clone)]
pub struct WindowsPaths {
    pub windows_dir: PathBuf,
    pub program_data: PathBuf,
    pub user_profile: Option<PathBuf>,
    pub local_app_data: Option<PathBuf>,
}

impl WindowsPaths {
    pub fn resolve() -> Self {
        let from_env = |key: &str, fallback: &str| {
            env::var_os(key).map_or_else(|| PathBuf::from(fallback), PathBuf::from)
        };
        Self {
            windows_dir: from_env("WINDIR", WINDOWS_DIR_FALLBACK),
            program_data: from_env("ProgramData", PROGRAM_DATA_FALLBACK),
            user_profile: dirs::home_dir(),
            local_app_data: dirs::data_local_dir(),
        }
    }
}

/// `base\relative`, or an empty path when the base is unknown.
fn under(base: Option<&Path>, relative: &str) -> PathBuf {
    base.map(|b| b.join(relative)).unwrap_or_default()
}

pub fn catalogue(paths: &WindowsPaths) -> Vec<Descriptor> {
    let windir = paths.windows_dir.as_path();
    let program_data = paths.program_data.as_path();
    let profile = paths.user_profile.as_deref();
    let local = paths.local_app_data.as_deref();

    vec![
        Descriptor::path(
            "Windows Temp",
            windir.join(WIN_TEMP),
            "Cleans temporary files created by Windows and system applications. These files are used for temporary storage during installation and updates. Windows recreates this directory automatically if needed.",
        ),
        Descriptor::path(
            "User Temp",
            under(profile, WIN_USER_TEMP),
            "Cleans temporary files specific to your user account. Applications keep cache data, installer payloads and scratch documents here, and recreate them when needed.",
        ),
        Descriptor::path(
            "Prefetch",
            windir.join(WIN_PREFETCH),
            "Cleans prefetch data Windows uses to speed up application launches. The system rebuilds these files over time as you use your applications.",
        ),
        Descriptor::path(
            "Print Spooler",
            windir.join(WIN_PRINT_SPOOLER),
            "Cleans stuck print jobs and printer queue files. This can resolve printing problems where documents sit in the queue and never print.",
        ),
        Descriptor::path(
            "Windows Update Cache",
            windir.join(WIN_UPDATE_CACHE),
            "Cleans downloaded Windows Update installation files. Once updates are installed these files are no longer needed; Windows Update downloads them again if a reinstall requires it.",
        ),
        Descriptor::pattern(
            "Thumbnail Cache",
            under(local, WIN_EXPLORER),
            WIN_THUMBCACHE_PATTERN,
            "Cleans cached thumbnails for files and folders in File Explorer. Windows regenerates them automatically when you browse.",
        ),
        Descriptor::path(
            "Windows Log Files",
            windir.join(WIN_LOGS),
            "Cleans Windows diagnostic log files used for troubleshooting. These logs record system events, errors and application crashes.",
        )
        .risky("May remove logs needed for diagnosing system issues. If your system is misbehaving, keep these logs until the problem is understood."),
        Descriptor::path(
            "Delivery Optimization Files",
            windir.join(WIN_DELIVERY_OPTIMIZATION),
            "Cleans the Delivery Optimization cache used for updates and Store apps. The cache lets Windows share update fragments with other devices on your network.",
        ),
        Descriptor::path(
            "Microsoft Edge Cache",
            under(local, WIN_EDGE_CACHE),
            "Cleans Microsoft Edge browser cache files. They hold page content, images and media to speed up browsing; clearing them frees space and can fix some browsing issues.",
        ),
        Descriptor::path(
            "Windows Defender Logs",
            program_data.join(WIN_DEFENDER_HISTORY),
            "Cleans Windows Defender scan history. These logs describe previous scans, detected threats and the actions taken.",
        )
        .risky("May remove security history needed for tracking threats. Keep these logs while investigating a security incident."),
        Descriptor::path(
            "Windows Error Reporting",
            program_data.join(WIN_ERROR_REPORTING),
            "Cleans Windows Error Reporting files. Windows writes these crash reports so developers can diagnose failures.",
        ),
        Descriptor::action(
            "DNS Cache",
            "Flushes the DNS resolver cache, which remembers the addresses of servers you visited recently. Flushing it can resolve some connectivity problems.",
            ActionSizing::Unsized,
            flush_dns,
        ),
        Descriptor::action(
            "Recycle Bin",
            "Empties the Recycle Bin, permanently removing every deleted file it holds across all drives.",
            ActionSizing::TrashStores,
            empty_trash,
        )
        .risky("Permanently deletes all files in the Recycle Bin. They cannot be recovered afterwards."),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ResourceKind;

    fn resolved() -> WindowsPaths {
        WindowsPaths {
            windows_dir: PathBuf::from(WINDOWS_DIR_FALLBACK),
            program_data: PathBuf::from(PROGRAM_DATA_FALLBACK),
            user_profile: Some(PathBuf::from(r"C:\Users\alice")),
            local_app_data: Some(PathBuf::from(r"C:\Users\alice\AppData\Local")),
        }
    }

    #[test]
    fn catalogue_order_and_risk() {
        let list = catalogue(&resolved());
        let names: Vec<&str> = list.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "Windows Temp",
                "User Temp",
                "Prefetch",
                "Print Spooler",
                "Windows Update Cache",
                "Thumbnail Cache",
                "Windows Log Files",
                "Delivery Optimization Files",
                "Microsoft Edge Cache",
                "Windows Defender Logs",
                "Windows Error Reporting",
                "DNS Cache",
                "Recycle Bin",
            ]
        );

        let risky: Vec<&str> = list
            .iter()
            .filter(|d| d.is_risky())
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(risky, ["Windows Log Files", "Windows Defender Logs", "Recycle Bin"]);
    }

    #[test]
    fn path_roots_are_resolved() {
        for d in catalogue(&resolved()) {
            if let ResourceKind::PathBased { root, .. } = &d.kind {
                assert!(!root.as_os_str().is_empty(), "{} has empty root", d.name);
            }
        }
    }

    #[test]
    fn thumbnail_cache_uses_pattern() {
        let list = catalogue(&resolved());
        let thumbs = list.iter().find(|d| d.name == "Thumbnail Cache");
        assert!(matches!(
            thumbs.map(|d| &d.kind),
            Some(ResourceKind::PathBased { pattern: Some(p), .. }) if p == WIN_THUMBCACHE_PATTERN
        ));
    }

    #[test]
    fn unresolved_profile_degrades_to_empty_root() {
        let paths = WindowsPaths {
            user_profile: None,
            local_app_data: None,
            ..resolved()
        };
        let list = catalogue(&paths);
        let user_temp = list.iter().find(|d| d.name == "User Temp");
        assert_eq!(user_temp.and_then(Descriptor::root), Some(Path::new("")));
    }
}
