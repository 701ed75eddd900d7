use crate::constants::{ALLOWLIST_FILE, APP_NAME};
use log::{debug, warn};
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Path prefixes that are never counted or deleted.
#[derive(Debug, Default, Clone)]
pub struct Allowlist {
    rules: Vec<PathBuf>,
}

impl Allowlist {
    pub fn new(rules: Vec<PathBuf>) -> Self {
        Self { rules }
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_NAME).join(ALLOWLIST_FILE))
    }

    /// Loads `path`, or the default config location when `None`.
    /// A missing or unreadable file yields an empty allowlist.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path.map(Path::to_path_buf).or_else(Self::default_path) else {
            return Self::default();
        };
        if !path.exists() {
            debug!("no allowlist at {}", path.display());
            return Self::default();
        }

        match fs::File::open(&path) {
            Ok(file) => {
                let rules = parse_rules(BufReader::new(file));
                debug!("loaded {} allowlist rules from {}", rules.len(), path.display());
                Self::new(rules)
            }
            Err(e) => {
                warn!("ignoring unreadable allowlist {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// True when `path` is a rule or lies underneath one. Matching is per path
    /// component, so `/data/keep` does not protect `/data/keeper`.
    pub fn is_allowed(&self, path: &Path) -> bool {
        self.rules.iter().any(|rule| path.starts_with(rule))
    }

    /// True when some rule lies strictly inside `dir`; removing `dir` wholesale
    /// would take the protected entry with it.
    pub fn protects_descendant_of(&self, dir: &Path) -> bool {
        self.rules
            .iter()
            .any(|rule| rule != dir && rule.starts_with(dir))
    }
}

fn parse_rules(reader: impl BufRead) -> Vec<PathBuf> {
    reader
        .lines()
        .map_while(Result::ok)
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(PathBuf::from)
        .collect()
}
