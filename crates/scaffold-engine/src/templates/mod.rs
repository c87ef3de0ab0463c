//! Template tree description and materialization
//!
//! This module provides:
//! - The root manifest (template.yaml) listing apps, third-party repos and setup commands
//! - Per-app install specs (`apps/<slug>.install.json`)
//! - Renaming of `.template`-marked files after a tree has been copied

pub mod install_spec;
pub mod manifest;
pub mod materialize;

use anyhow::Result;
use std::path::{Path, PathBuf};

pub use install_spec::InstallSpec;
pub use manifest::{AppTemplate, RootManifest, SetupGroup};
pub use materialize::{materialize, Rename, TEMPLATE_MARKER};

/// Locate the templates directory.
///
/// Order: explicit path, then the environment variable, then `templates/`
/// next to the executable, then `templates/` in the working directory.
pub fn resolve_templates_dir(explicit: Option<&Path>, env_var: &str) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(env_var) {
        if !path.is_empty() {
            return Ok(PathBuf::from(path));
        }
    }

    let beside_exe = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("templates")));
    if let Some(dir) = beside_exe.filter(|d| d.is_dir()) {
        return Ok(dir);
    }

    let in_cwd = std::env::current_dir()?.join("templates");
    if in_cwd.is_dir() {
        return Ok(in_cwd);
    }

    anyhow::bail!(
        "Template directory not found. Pass --templates-dir or set {}",
        env_var
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_dir_wins() {
        let dir = resolve_templates_dir(
            Some(Path::new("/opt/templates")),
            "SCAFFOLD_ENGINE_TEST_UNUSED_VAR",
        )
        .unwrap();
        assert_eq!(dir, PathBuf::from("/opt/templates"));
    }
}
