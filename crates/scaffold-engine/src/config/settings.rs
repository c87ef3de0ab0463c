//! Run configuration and persisted flag defaults
//!
//! The settings file holds flag tokens (`--branch=main --no-cache`) saved with
//! `--new-defaults`. At startup they are spliced into the argument list ahead
//! of the live arguments, so a live flag always wins over a saved one.

use crate::config::cache::DEFAULT_CACHE_DAYS;
use crate::runtime::preflight::InstallPolicy;
use crate::runtime::runner::Presentation;
use std::path::{Path, PathBuf};

/// Flag that requests saving the current flags; never persisted itself
pub const NEW_DEFAULTS_FLAG: &str = "new-defaults";

/// Name of a `--flag` or `--flag=value` token, without dashes or value
pub fn flag_name(token: &str) -> Option<&str> {
    let flag = token.strip_prefix("--")?;
    let name = flag.split('=').next().unwrap_or(flag);
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Split settings file contents into flag tokens
pub fn parse_flags(content: &str) -> Vec<String> {
    content
        .split_whitespace()
        .filter(|token| flag_name(token).is_some())
        .map(str::to_string)
        .collect()
}

/// Flag tokens from the live arguments worth saving as defaults
pub fn persistable_flags(live: &[String]) -> Vec<String> {
    live.iter()
        .skip(1)
        .filter(|token| matches!(flag_name(token), Some(name) if name != NEW_DEFAULTS_FLAG))
        .cloned()
        .collect()
}

/// Build the argument list to parse: program name, saved flags not given
/// live, then the live arguments.
pub fn merge_args(persisted: &[String], live: &[String]) -> Vec<String> {
    let Some((program, rest)) = live.split_first() else {
        return persisted.to_vec();
    };

    let live_names: Vec<&str> = rest.iter().filter_map(|t| flag_name(t)).collect();

    let mut merged = vec![program.clone()];
    merged.extend(
        persisted
            .iter()
            .filter(|token| match flag_name(token) {
                Some(name) => name != NEW_DEFAULTS_FLAG && !live_names.contains(&name),
                None => false,
            })
            .cloned(),
    );
    merged.extend(rest.iter().cloned());
    merged
}

/// Write flag tokens to the settings file, creating parent directories
pub async fn write_flags(path: &Path, flags: &[String]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, format!("{}\n", flags.join(" "))).await
}

/// Immutable configuration for one invocation, built once at process entry
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub debug: bool,
    pub interactive: bool,
    pub offline: bool,
    pub no_cache: bool,
    pub no_third_party: bool,
    /// Save `defaults_to_save` as new defaults at the end of the run
    pub new_defaults: bool,
    /// In non-interactive mode, never install missing tools
    pub skip_install: bool,
    pub branch: Option<String>,
    pub cache_days: u64,
    pub project_name: Option<String>,
    pub remote: Option<String>,
    pub apps: Option<Vec<String>>,
    pub templates_dir: Option<PathBuf>,
    pub defaults_to_save: Vec<String>,
    pub presentation: Presentation,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            debug: false,
            interactive: true,
            offline: false,
            no_cache: false,
            no_third_party: false,
            new_defaults: false,
            skip_install: false,
            branch: None,
            cache_days: DEFAULT_CACHE_DAYS,
            project_name: None,
            remote: None,
            apps: None,
            templates_dir: None,
            defaults_to_save: Vec::new(),
            presentation: Presentation::default(),
        }
    }
}

impl RunConfig {
    /// How missing tools with an install command are handled
    pub fn install_policy(&self) -> InstallPolicy {
        if self.interactive {
            InstallPolicy::Ask
        } else if self.skip_install {
            InstallPolicy::Never
        } else {
            InstallPolicy::Always
        }
    }
}
