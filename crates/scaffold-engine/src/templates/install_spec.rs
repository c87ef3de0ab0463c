//! Per-app install specs (`apps/<slug>.install.json`)

use crate::error::EngineError;
use crate::plan::Step;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Extra steps an app contributes to the fresh-build plan
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InstallSpec {
    #[serde(default)]
    pub commands: Vec<Step>,
    /// Carried for compatibility with existing spec files; not executed
    #[serde(default)]
    pub tasks: Vec<serde_json::Value>,
}

impl InstallSpec {
    /// Location of the install spec for `app`
    pub fn path_for(templates_dir: &Path, app: &str) -> PathBuf {
        templates_dir
            .join("apps")
            .join(format!("{}.install.json", app))
    }

    /// Load the install spec for `app`; a missing or empty file is an empty spec
    pub fn load(templates_dir: &Path, app: &str) -> Result<Self, EngineError> {
        let path = Self::path_for(templates_dir, app);
        if !path.exists() {
            log::debug!("No install spec for {} at {}", app, path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_json::from_str(&content).map_err(|e| EngineError::Manifest {
            path,
            message: e.to_string(),
        })
    }
}
