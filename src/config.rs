use crate::constants::{APP_NAME, DEFAULT_ITEM_PAUSE, DEFAULT_REFRESH_INTERVAL, LOG_FILE};
use std::path::PathBuf;
use std::time::Duration;

/// Resolved runtime configuration, passed explicitly to whoever needs it.
#[derive(Debug, Clone)]
pub struct Settings {
    pub refresh_interval: Duration,
    pub item_pause: Duration,
    pub allowlist: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
    pub verbose: bool,
    pub quiet: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            item_pause: DEFAULT_ITEM_PAUSE,
            allowlist: None,
            log_file: None,
            verbose: false,
            quiet: false,
        }
    }
}

impl Settings {
    /// `RUST_LOG` still wins over this.
    pub const fn default_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose {
            "debug"
        } else {
            "info"
        }
    }

    /// Where the interactive UI writes its log.
    pub fn log_file_path(&self) -> Option<PathBuf> {
        self.log_file
            .clone()
            .or_else(|| dirs::data_local_dir().map(|d| d.join(APP_NAME).join(LOG_FILE)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_interactive_cadence() {
        let s = Settings::default();
        assert_eq!(s.refresh_interval, Duration::from_secs(5));
        assert_eq!(s.item_pause, Duration::from_millis(500));
        assert_eq!(s.default_log_level(), "info");
    }

    #[test]
    fn quiet_wins_over_verbose() {
        let s = Settings {
            verbose: true,
            quiet: true,
            ..Settings::default()
        };
        assert_eq!(s.default_log_level(), "error");
    }

    #[test]
    fn explicit_log_file_is_kept() {
        let s = Settings {
            log_file: Some(PathBuf::from("/tmp/clearway-test.log")),
            ..Settings::default()
        };
        assert_eq!(
            s.log_file_path(),
            Some(PathBuf::from("/tmp/clearway-test.log"))
        );
    }
}
