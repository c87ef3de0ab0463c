//! Product configuration trait for CLI binaries
//!
//! The engine knows nothing about a particular product. Each binary implements
//! this trait to supply its identity, defaults and user-facing text.

use std::path::Path;

/// Configuration trait for a scaffolding CLI
pub trait ProductConfig: Clone + Send + Sync + 'static {
    /// Internal product name (used for the CLI command)
    fn name(&self) -> &'static str;

    /// Human-readable display name
    fn display_name(&self) -> &'static str;

    /// Directory under the home directory holding cache, timestamp and settings
    fn home_dir_name(&self) -> &'static str;

    /// Environment variable naming the templates directory
    fn templates_dir_env(&self) -> &'static str;

    /// Project name used when the user gives none
    fn default_project_name(&self) -> &'static str;

    /// Git branch used when `--branch` is not given
    fn default_branch(&self) -> &'static str;

    fn initial_commit_message(&self) -> &'static str;

    /// URL for product documentation
    fn docs_url(&self) -> &'static str;

    /// CLI description shown in help text
    fn cli_description(&self) -> &'static str;

    /// Generate the "next steps" instructions after project creation
    fn next_steps(&self, dir: &Path) -> Vec<String>;
}
