use std::time::Duration;

pub const APP_NAME: &str = "clearway";

pub const ALLOWLIST_FILE: &str = "allowlist.txt";
pub const LOG_FILE: &str = "clearway.log";

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_ITEM_PAUSE: Duration = Duration::from_millis(500);

pub const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

// Windows catalogue
pub const WINDOWS_DIR_FALLBACK: &str = r"C:\Windows";
pub const PROGRAM_DATA_FALLBACK: &str = r"C:\ProgramData";
pub const WIN_TEMP: &str = "Temp";
pub const WIN_USER_TEMP: &str = r"AppData\Local\Temp";
pub const WIN_PREFETCH: &str = "Prefetch";
pub const WIN_PRINT_SPOOLER: &str = r"System32\spool\PRINTERS";
pub const WIN_UPDATE_CACHE: &str = r"SoftwareDistribution\Download";
pub const WIN_EXPLORER: &str = r"Microsoft\Windows\Explorer";
pub const WIN_THUMBCACHE_PATTERN: &str = "thumbcache_*.db";
pub const WIN_LOGS: &str = "Logs";
pub const WIN_DELIVERY_OPTIMIZATION: &str =
    r"ServiceProfiles\NetworkService\AppData\Local\Microsoft\Windows\DeliveryOptimization\Cache";
pub const WIN_EDGE_CACHE: &str = r"Microsoft\Edge\User Data\Default\Cache";
pub const WIN_DEFENDER_HISTORY: &str = r"Microsoft\Windows Defender\Scans\History";
pub const WIN_ERROR_REPORTING: &str = r"Microsoft\Windows\WER";

// Unix catalogue
pub const UNIX_THUMBNAILS: &str = "thumbnails";
pub const UNIX_THUMBNAIL_PATTERN: &str = "*.png";
pub const UNIX_VAR_LOG: &str = "/var/log";
pub const UNIX_CUPS_SPOOL: &str = "/var/spool/cups";
pub const UNIX_CRASH_REPORTS: &str = "/var/crash";
pub const MACOS_USER_LOGS: &str = "Library/Logs/DiagnosticReports";
pub const MACOS_VAR_LOG: &str = "/private/var/log";
pub const MACOS_CUPS_SPOOL: &str = "/private/var/spool/cups";

// Trash stores
pub const RECYCLE_BIN_DIR: &str = "$Recycle.Bin";
pub const RECYCLE_CONTENT_PREFIX: &str = "$R";
pub const FREEDESKTOP_TRASH_DIR: &str = "Trash";
pub const FREEDESKTOP_TOPDIR_TRASH: &str = ".Trash";
pub const FREEDESKTOP_CONTENT_DIR: &str = "files";
pub const MACOS_USER_TRASH: &str = ".Trash";
pub const MACOS_VOLUME_TRASHES: &str = ".Trashes";
pub const MACOS_FOLDER_METADATA: &str = ".DS_Store";
