use super::actions::{empty_trash, flush_dns};
use crate::constants::{
    MACOS_CUPS_SPOOL, MACOS_USER_LOGS, MACOS_VAR_LOG, UNIX_CRASH_REPORTS, UNIX_CUPS_SPOOL,
    UNIX_THUMBNAIL_PATTERN, UNIX_THUMBNAILS, UNIX_VAR_LOG,
};
use crate::model::{ActionSizing, Descriptor};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct UnixPaths {
    pub macos: bool,
    pub home: Option<PathBuf>,
    pub cache_dir: Option<PathBuf>,
}

impl UnixPaths {
    pub fn resolve() -> Self {
        Self {
            macos: cfg!(target_os = "macos"),
            home: dirs::home_dir(),
            cache_dir: dirs::cache_dir(),
        }
    }
}

fn under(base: Option<&Path>, relative: &str) -> PathBuf {
    base.map(|b| b.join(relative)).unwrap_or_default()
}

pub fn catalogue(paths: &UnixPaths) -> Vec<Descriptor> {
    let cache = paths.cache_dir.clone().unwrap_or_default();
    let (var_log, spool) = if paths.macos {
        (MACOS_VAR_LOG, MACOS_CUPS_SPOOL)
    } else {
        (UNIX_VAR_LOG, UNIX_CUPS_SPOOL)
    };
    let crash_reports = if paths.macos {
        under(paths.home.as_deref(), MACOS_USER_LOGS)
    } else {
        PathBuf::from(UNIX_CRASH_REPORTS)
    };

    vec![
        Descriptor::path(
            "User Cache",
            cache,
            "Cleans per-user application caches. Applications keep downloaded assets, compiled shaders and other recreatable data here and rebuild it on demand.",
        ),
        Descriptor::pattern(
            "Thumbnail Cache",
            under(paths.cache_dir.as_deref(), UNIX_THUMBNAILS),
            UNIX_THUMBNAIL_PATTERN,
            "Cleans cached file previews shown by the file manager. They are regenerated the next time a folder is browsed.",
        ),
        Descriptor::path(
            "System Logs",
            PathBuf::from(var_log),
            "Cleans system log files used for troubleshooting. They record service output, kernel messages and login history.",
        )
        .risky("May remove logs needed for diagnosing system issues. If your system is misbehaving, keep these logs until the problem is understood."),
        Descriptor::path(
            "Print Spooler",
            PathBuf::from(spool),
            "Cleans stuck print jobs and queued print data. This can resolve printing problems where documents never leave the queue.",
        ),
        Descriptor::path(
            "Crash Reports",
            crash_reports,
            "Cleans crash reports and core dumps written when applications fail. They are only useful for diagnosing past crashes.",
        ),
        Descriptor::action(
            "DNS Cache",
            "Flushes the local DNS resolver cache, which remembers the addresses of servers you visited recently. Flushing it can resolve some connectivity problems.",
            ActionSizing::Unsized,
            flush_dns,
        ),
        Descriptor::action(
            "Trash",
            "Empties the trash, permanently removing every deleted file it holds across all drives.",
            ActionSizing::TrashStores,
            empty_trash,
        )
        .risky("Permanently deletes all files in the trash. They cannot be recovered afterwards."),
    ]
}
