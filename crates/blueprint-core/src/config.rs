use crate::error::Result;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Installation settings read from `config.yaml` in the data directory.
/// Plan-level settings such as the start date live in the plan document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_plan_file")]
    pub plan_file: PathBuf,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_exports_dir")]
    pub exports_dir: PathBuf,
}

fn default_plan_file() -> PathBuf {
    PathBuf::from(paths::PLAN_FILE)
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_exports_dir() -> PathBuf {
    PathBuf::from(paths::EXPORTS_DIR)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            plan_file: default_plan_file(),
            debounce_ms: default_debounce_ms(),
            exports_dir: default_exports_dir(),
        }
    }
}

impl Config {
    /// Load `config.yaml` from `home`; a missing file yields the defaults.
    pub fn load(home: &Path) -> Result<Self> {
        match crate::io::read_if_exists(&paths::config_path(home))? {
            Some(data) if !data.trim().is_empty() => Ok(serde_yaml::from_str(&data)?),
            _ => Ok(Self::default()),
        }
    }

    pub fn plan_path(&self, home: &Path) -> PathBuf {
        paths::under_home(home, &self.plan_file)
    }

    pub fn exports_path(&self, home: &Path) -> PathBuf {
        paths::under_home(home, &self.exports_dir)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.debounce_ms == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "debounce_ms is 0: every change is written immediately".to_string(),
            });
        }
        if self.plan_file.as_os_str().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "plan_file is empty".to_string(),
            });
        } else if self.plan_file.is_absolute() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "plan_file '{}' is outside the data directory",
                    self.plan_file.display()
                ),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
