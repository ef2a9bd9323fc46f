use anyhow::Context;
use std::path::{Path, PathBuf};

/// Resolve the data directory.
///
/// Priority:
/// 1. `--home` flag / `BLUEPRINT_HOME` env var (passed in as `explicit`)
/// 2. `~/.blueprint`
pub fn resolve_home(explicit: Option<&Path>) -> anyhow::Result<PathBuf> {
    if let Some(p) = explicit {
        return Ok(p.to_path_buf());
    }
    blueprint_core::paths::default_home().context("cannot locate a data directory")
}
