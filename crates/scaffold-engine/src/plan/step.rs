//! Steps, platform command variants, and variable substitution

use crate::platform::Platform;
use crate::templates::materialize;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Named values substituted into `{name}` placeholders
pub type Variables = BTreeMap<String, String>;

/// Command string per platform.
///
/// In install specs the keys may use either Rust (`macos`, `windows`) or
/// Node-style (`darwin`, `win32`) platform names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformCommands {
    #[serde(default, alias = "darwin", skip_serializing_if = "Option::is_none")]
    pub macos: Option<String>,
    #[serde(default, alias = "win32", skip_serializing_if = "Option::is_none")]
    pub windows: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linux: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl PlatformCommands {
    fn for_platform(&self, platform: Platform) -> Option<&String> {
        match platform {
            Platform::MacOs => self.macos.as_ref(),
            Platform::Windows => self.windows.as_ref(),
            Platform::Linux => self.linux.as_ref(),
        }
    }
}

/// A command that is either the same everywhere or varies per platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandVariant {
    Single(String),
    PerPlatform(PlatformCommands),
}

impl From<String> for CommandVariant {
    fn from(command: String) -> Self {
        CommandVariant::Single(command)
    }
}

impl From<PlatformCommands> for CommandVariant {
    fn from(commands: PlatformCommands) -> Self {
        CommandVariant::PerPlatform(commands)
    }
}

impl From<&str> for CommandVariant {
    fn from(command: &str) -> Self {
        CommandVariant::Single(command.to_string())
    }
}

/// Work done inside this process instead of by a spawned command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalTask {
    /// Rename `.template`-marked files below `root` to their real names
    MaterializeTemplates { root: PathBuf },
    /// Record the current time as the last successful fresh build
    StampCache { path: PathBuf },
    /// Persist flag tokens as defaults for later invocations
    SaveDefaults { path: PathBuf, flags: Vec<String> },
}

impl InternalTask {
    pub async fn run(&self) -> std::io::Result<()> {
        match self {
            InternalTask::MaterializeTemplates { root } => {
                let renamed = materialize::materialize(root).await?;
                log::debug!("Materialized {} template file(s)", renamed.len());
                Ok(())
            }
            InternalTask::StampCache { path } => {
                crate::config::cache::write_timestamp(path, crate::config::cache::now_millis())
                    .await
            }
            InternalTask::SaveDefaults { path, flags } => {
                crate::config::settings::write_flags(path, flags).await
            }
        }
    }
}

/// One unit of work in a command group
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<CommandVariant>,

    #[serde(skip)]
    pub task: Option<InternalTask>,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub is_disabled: bool,
}

impl Step {
    /// A step that runs a shell command
    pub fn shell(command: impl Into<CommandVariant>, description: impl Into<String>) -> Self {
        Self {
            command: Some(command.into()),
            task: None,
            description: description.into(),
            is_disabled: false,
        }
    }

    /// A step that runs in-process
    pub fn task(task: InternalTask, description: impl Into<String>) -> Self {
        Self {
            command: None,
            task: Some(task),
            description: description.into(),
            is_disabled: false,
        }
    }

    /// Mark the step disabled when `condition` holds
    pub fn disabled_if(mut self, condition: bool) -> Self {
        self.is_disabled = self.is_disabled || condition;
        self
    }
}

/// Resolve the command string to run on `platform`.
///
/// Returns `None` when the step has no command, the platform has no entry and
/// there is no default, or the resolved string is empty.
pub fn resolve_command(step: &Step, platform: Platform) -> Option<String> {
    let resolved = match step.command.as_ref()? {
        CommandVariant::Single(command) => Some(command),
        CommandVariant::PerPlatform(commands) => commands
            .for_platform(platform)
            .or(commands.default.as_ref()),
    }?;

    if resolved.trim().is_empty() {
        None
    } else {
        Some(resolved.clone())
    }
}

/// Replace every `{key}` occurrence for every key in `variables`
pub fn substitute(command: Option<String>, variables: &Variables) -> Option<String> {
    command.map(|command| {
        variables.iter().fold(command, |acc, (key, value)| {
            acc.replace(&format!("{{{}}}", key), value)
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn per_platform() -> Step {
        Step {
            command: Some(CommandVariant::PerPlatform(PlatformCommands {
                macos: Some("brew install jq".to_string()),
                windows: Some("choco install jq".to_string()),
                linux: None,
                default: Some("apt-get install jq".to_string()),
            })),
            description: "Installing jq".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_resolve_single_command() {
        let step = Step::shell("git init", "Initialising a git repo");
        assert_eq!(
            resolve_command(&step, Platform::Linux).as_deref(),
            Some("git init")
        );
    }

    #[test]
    fn test_resolve_platform_entry() {
        let step = per_platform();
        assert_eq!(
            resolve_command(&step, Platform::MacOs).as_deref(),
            Some("brew install jq")
        );
        assert_eq!(
            resolve_command(&step, Platform::Windows).as_deref(),
            Some("choco install jq")
        );
    }

    #[test]
    fn test_resolve_falls_back_to_default() {
        let step = per_platform();
        assert_eq!(
            resolve_command(&step, Platform::Linux).as_deref(),
            Some("apt-get install jq")
        );
    }

    #[test]
    fn test_resolve_absent_is_none() {
        let step = Step {
            command: Some(CommandVariant::PerPlatform(PlatformCommands {
                windows: Some("choco install watchman".to_string()),
                ..Default::default()
            })),
            ..Default::default()
        };
        assert_eq!(resolve_command(&step, Platform::Linux), None);
        assert_eq!(resolve_command(&Step::default(), Platform::Linux), None);
        assert_eq!(
            resolve_command(&Step::shell("  ", "blank"), Platform::Linux),
            None
        );
    }

    #[test]
    fn test_substitute_replaces_every_occurrence() {
        let mut variables = Variables::new();
        variables.insert("projectName".to_string(), "makes-sense".to_string());
        variables.insert("branch".to_string(), "live".to_string());

        let result = substitute(
            Some("cd {projectName} && git push origin {branch} # {projectName}".to_string()),
            &variables,
        )
        .unwrap();

        assert_eq!(result, "cd makes-sense && git push origin live # makes-sense");
        assert!(!result.contains("{projectName}"));
        assert!(!result.contains("{branch}"));
    }

    #[test]
    fn test_substitute_leaves_unknown_tokens() {
        let mut variables = Variables::new();
        variables.insert("app".to_string(), "web".to_string());
        let result = substitute(Some("echo {app} {other} {}".to_string()), &variables);
        assert_eq!(result.as_deref(), Some("echo web {other} {}"));
    }

    #[test]
    fn test_substitute_none_stays_none() {
        let mut variables = Variables::new();
        variables.insert("app".to_string(), "web".to_string());
        assert_eq!(substitute(None, &variables), None);
    }

    #[test]
    fn test_deserialize_install_spec_steps() {
        let json = r#"[
            {"command": "yarn create next-app --typescript {app}", "description": "Creating next-app"},
            {"command": {"darwin": "brew install watchman", "default": "echo skip"}, "description": "Watchman", "isDisabled": true}
        ]"#;
        let steps: Vec<Step> = serde_json::from_str(json).unwrap();
        assert_eq!(steps.len(), 2);
        assert_eq!(
            steps[0].command,
            Some(CommandVariant::Single(
                "yarn create next-app --typescript {app}".to_string()
            ))
        );
        assert!(steps[1].is_disabled);
        assert_eq!(
            resolve_command(&steps[1], Platform::MacOs).as_deref(),
            Some("brew install watchman")
        );
        assert_eq!(
            resolve_command(&steps[1], Platform::Linux).as_deref(),
            Some("echo skip")
        );
    }

    #[test]
    fn test_disabled_if_is_sticky() {
        let step = Step::shell("git push", "Push")
            .disabled_if(true)
            .disabled_if(false);
        assert!(step.is_disabled);
    }
}
