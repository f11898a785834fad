//! Where tally keeps its files
//!
//! ```text
//! <base>/config.json
//! <base>/audit.log
//! <base>/data/transactions.json
//! <base>/data/categories.json
//! <base>/data/budgets.json
//! ```
//!
//! `<base>` is `$TALLY_DATA_DIR` when set, otherwise `tally` under
//! `$XDG_CONFIG_HOME` or `~/.config` (`%APPDATA%` on Windows).

use std::path::{Path, PathBuf};

use crate::error::{TallyError, TallyResult};

pub const DATA_DIR_ENV: &str = "TALLY_DATA_DIR";

const APP_DIR: &str = "tally";

#[derive(Debug, Clone)]
pub struct TallyPaths {
    base_dir: PathBuf,
}

impl TallyPaths {
    pub fn new() -> TallyResult<Self> {
        let base_dir = match std::env::var_os(DATA_DIR_ENV) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => default_base_dir().ok_or_else(|| {
                TallyError::Config(format!(
                    "no config directory found; set {} to choose one",
                    DATA_DIR_ENV
                ))
            })?,
        };

        Ok(Self { base_dir })
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    pub fn transactions_file(&self) -> PathBuf {
        self.data_dir().join("transactions.json")
    }

    pub fn categories_file(&self) -> PathBuf {
        self.data_dir().join("categories.json")
    }

    /// Percentage allocation per expense category
    pub fn budgets_file(&self) -> PathBuf {
        self.data_dir().join("budgets.json")
    }

    /// Create `<base>/data` and its parents
    pub fn ensure_directories(&self) -> TallyResult<()> {
        create_dir(&self.data_dir())
    }

    /// True once `config.json` has been written
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

#[cfg(not(windows))]
fn default_base_dir() -> Option<PathBuf> {
    match std::env::var_os("XDG_CONFIG_HOME") {
        Some(xdg) if !xdg.is_empty() => Some(PathBuf::from(xdg).join(APP_DIR)),
        _ => directories::BaseDirs::new().map(|dirs| dirs.home_dir().join(".config").join(APP_DIR)),
    }
}

/// `%APPDATA%\tally`
#[cfg(windows)]
fn default_base_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|dirs| dirs.config_dir().join(APP_DIR))
}

fn create_dir(dir: &Path) -> TallyResult<()> {
    std::fs::create_dir_all(dir)
        .map_err(|e| TallyError::Io(format!("cannot create {}: {}", dir.display(), e)))
}
