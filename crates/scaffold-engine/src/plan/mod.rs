//! Execution plans: ordered groups of steps tied to working directories
//!
//! This module provides:
//! - Step and command variant types with platform resolution and substitution
//! - Command groups and plans
//! - Builders for the fresh-build and from-cache plans

pub mod builder;
pub mod step;

use crate::runtime::preflight::Requirement;
use std::path::PathBuf;

pub use builder::PlanContext;
pub use step::{
    resolve_command, substitute, CommandVariant, InternalTask, PlatformCommands, Step, Variables,
};

/// Commands sharing one working directory, run in listed order
#[derive(Debug, Clone, Default)]
pub struct CommandGroup {
    pub directory: PathBuf,
    pub commands: Vec<Step>,
    /// Tools checked before the first command of this group runs
    pub requires: Vec<Requirement>,
    /// Group-specific values, layered over the plan's variables
    pub variables: Variables,
}

impl CommandGroup {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            ..Default::default()
        }
    }

    pub fn step(mut self, step: Step) -> Self {
        self.commands.push(step);
        self
    }

    pub fn steps(mut self, steps: impl IntoIterator<Item = Step>) -> Self {
        self.commands.extend(steps);
        self
    }

    pub fn requires(mut self, requirement: Requirement) -> Self {
        self.requires.push(requirement);
        self
    }

    pub fn variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }
}

/// Which of the two plans was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanKind {
    FreshBuild,
    FromCache,
}

/// The fully resolved list of groups for one invocation
#[derive(Debug, Clone)]
pub struct Plan {
    pub kind: PlanKind,
    pub groups: Vec<CommandGroup>,
    pub variables: Variables,
}

impl Plan {
    pub fn new(kind: PlanKind) -> Self {
        Self {
            kind,
            groups: Vec::new(),
            variables: Variables::new(),
        }
    }

    pub fn group(mut self, group: CommandGroup) -> Self {
        self.groups.push(group);
        self
    }

    /// Variables in effect for `group`: plan values overridden by group values
    pub fn variables_for(&self, group: &CommandGroup) -> Variables {
        let mut merged = self.variables.clone();
        merged.extend(
            group
                .variables
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        merged
    }

    /// Number of steps that are not disabled
    pub fn enabled_steps(&self) -> usize {
        self.groups
            .iter()
            .flat_map(|g| g.commands.iter())
            .filter(|s| !s.is_disabled)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_variables_override_plan() {
        let mut plan = Plan::new(PlanKind::FreshBuild);
        plan.variables
            .insert("app".to_string(), "none".to_string());
        plan.variables
            .insert("projectName".to_string(), "demo".to_string());

        let group = CommandGroup::new("/tmp").variable("app", "web");
        let merged = plan.variables_for(&group);

        assert_eq!(merged.get("app").map(String::as_str), Some("web"));
        assert_eq!(merged.get("projectName").map(String::as_str), Some("demo"));
    }

    #[test]
    fn test_enabled_steps_skips_disabled() {
        let plan = Plan::new(PlanKind::FromCache).group(
            CommandGroup::new("/tmp")
                .step(Step::shell("git init", "init"))
                .step(Step::shell("git push", "push").disabled_if(true)),
        );
        assert_eq!(plan.enabled_steps(), 1);
    }
}
