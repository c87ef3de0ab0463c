//! Template manifest types and parsing

use crate::error::EngineError;
use crate::plan::Step;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the root manifest inside a templates directory
pub const MANIFEST_FILE: &str = "template.yaml";

fn default_base() -> String {
    "base".to_string()
}

/// An app boilerplate that can be added to a project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppTemplate {
    pub slug: String,
    pub description: String,
    /// Selected when the user accepts the default selection
    #[serde(default)]
    pub default: bool,
}

/// Extra commands run in a directory of the new project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetupGroup {
    /// Directory relative to the project root
    pub directory: String,
    #[serde(default)]
    pub commands: Vec<Step>,
}

/// Root manifest (template.yaml) describing the template tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootManifest {
    pub name: String,

    /// Directory copied as the project skeleton
    #[serde(default = "default_base")]
    pub base: String,

    #[serde(default)]
    pub apps: Vec<AppTemplate>,

    /// GitHub slugs cloned into `third-party/`
    #[serde(default)]
    pub third_party: Vec<String>,

    #[serde(default)]
    pub setup: Vec<SetupGroup>,
}

impl RootManifest {
    /// Read `template.yaml` from a templates directory
    pub fn load(templates_dir: &Path) -> Result<Self, EngineError> {
        let path = templates_dir.join(MANIFEST_FILE);
        let content = std::fs::read_to_string(&path).map_err(|e| EngineError::Manifest {
            path: path.clone(),
            message: e.to_string(),
        })?;
        Self::parse(&content, path)
    }

    fn parse(content: &str, path: PathBuf) -> Result<Self, EngineError> {
        serde_yaml::from_str(content).map_err(|e| EngineError::Manifest {
            path,
            message: e.to_string(),
        })
    }

    pub fn is_known_app(&self, slug: &str) -> bool {
        self.apps.iter().any(|app| app.slug == slug)
    }

    pub fn default_apps(&self) -> Vec<String> {
        self.apps
            .iter()
            .filter(|app| app.default)
            .map(|app| app.slug.clone())
            .collect()
    }

    /// Parse a free-form app selection.
    ///
    /// Slugs may be separated by spaces, commas or semicolons; unknown slugs
    /// are dropped. An empty selection means the default apps.
    pub fn parse_app_selection(&self, input: &str) -> Vec<String> {
        let requested: Vec<&str> = input
            .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .collect();

        if requested.is_empty() {
            return self.default_apps();
        }

        let mut selected: Vec<String> = Vec::new();
        for slug in requested {
            if self.is_known_app(slug) && !selected.iter().any(|s| s == slug) {
                selected.push(slug.to_string());
            } else if !self.is_known_app(slug) {
                log::warn!("Ignoring unknown app: {}", slug);
            }
        }
        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest() -> RootManifest {
        let yaml = r#"
name: sensible
apps:
  - slug: app
    description: Expo app (for android, iOS, web)
    default: true
  - slug: web
    description: Next.js app
    default: true
  - slug: chrome
    description: Chrome extension (Experimental)
third_party:
  - Code-From-Anywhere/react-with-native
setup:
  - directory: apps/server
    commands:
      - command: yarn add cors dotenv
        description: Installing server dependencies
"#;
        RootManifest::parse(yaml, PathBuf::from("template.yaml")).unwrap()
    }

    #[test]
    fn test_parse_manifest() {
        let m = manifest();
        assert_eq!(m.name, "sensible");
        assert_eq!(m.base, "base");
        assert_eq!(m.apps.len(), 3);
        assert_eq!(m.third_party.len(), 1);
        assert_eq!(m.setup[0].directory, "apps/server");
        assert_eq!(m.setup[0].commands[0].description, "Installing server dependencies");
    }

    #[test]
    fn test_default_apps() {
        assert_eq!(manifest().default_apps(), vec!["app", "web"]);
    }

    #[test]
    fn test_empty_selection_uses_defaults() {
        assert_eq!(manifest().parse_app_selection("  "), vec!["app", "web"]);
    }

    #[test]
    fn test_selection_separators_and_unknown_apps() {
        let m = manifest();
        assert_eq!(m.parse_app_selection("web;chrome"), vec!["web", "chrome"]);
        assert_eq!(m.parse_app_selection("chrome, web"), vec!["chrome", "web"]);
        assert_eq!(m.parse_app_selection("web desktop web"), vec!["web"]);
    }

    #[test]
    fn test_invalid_manifest_reports_path() {
        let err = RootManifest::parse("apps: [", PathBuf::from("/tpl/template.yaml")).unwrap_err();
        assert!(err.to_string().contains("/tpl/template.yaml"));
    }
}
