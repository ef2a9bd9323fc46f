use crate::error::{PlanError, Result};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Layout constants
// ---------------------------------------------------------------------------

/// Data directory under the user's home when none is given explicitly.
pub const DATA_DIR: &str = ".blueprint";
pub const PLAN_FILE: &str = "plan.json";
pub const CONFIG_FILE: &str = "config.yaml";
pub const EXPORTS_DIR: &str = "exports";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn default_home() -> Result<PathBuf> {
    home::home_dir()
        .map(|h| h.join(DATA_DIR))
        .ok_or(PlanError::HomeNotFound)
}

pub fn config_path(home: &Path) -> PathBuf {
    home.join(CONFIG_FILE)
}

/// Resolve `path` against `home` unless it is already absolute.
pub fn under_home(home: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        home.join(path)
    }
}

/// File name for an export taken on `date`.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("blueprint-{}.json", date.format("%Y-%m-%d"))
}
