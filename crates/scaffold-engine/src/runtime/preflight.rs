//! Presence checks and installation of prerequisite tools
//!
//! Each command group lists the tools it needs. Before the group runs, every
//! tool is looked up on PATH; a missing tool is installed, explained, or turns
//! into a fatal abort depending on the requirement and the install policy.

use crate::error::EngineError;
use crate::plan::{PlatformCommands, Step, Variables};
use crate::platform::Platform;
use crate::runtime::runner::Runner;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;

/// Yes/no questions asked while negotiating installs
pub trait Prompter: Send + Sync {
    fn confirm(&self, question: &str, default: bool) -> std::io::Result<bool>;
}

/// Answers every question with its default
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeDefault;

impl Prompter for AssumeDefault {
    fn confirm(&self, _question: &str, default: bool) -> std::io::Result<bool> {
        Ok(default)
    }
}

/// What to do when a tool is missing but can be installed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallPolicy {
    /// Ask the user first (interactive mode)
    Ask,
    /// Install without asking
    Always,
    /// Never install; fall through to the instructions
    Never,
}

/// A tool some command group depends on
#[derive(Debug, Clone)]
pub struct Requirement {
    /// Binary name looked up on PATH
    pub tool: String,
    pub install: Option<Step>,
    /// Printed when the tool stays missing
    pub instructions: String,
    /// Abort the run when the tool stays missing
    pub mandatory: bool,
}

impl Requirement {
    pub fn new(tool: impl Into<String>, instructions: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            install: None,
            instructions: instructions.into(),
            mandatory: true,
        }
    }

    pub fn with_install(mut self, step: Step) -> Self {
        self.install = Some(step);
        self
    }

    pub fn optional(mut self) -> Self {
        self.mandatory = false;
        self
    }

    /// brew or choco
    pub fn package_manager(platform: Platform) -> Self {
        let pm = platform.package_manager();
        Self::new(
            pm,
            format!(
                "Please install {}. Go to {} for instructions",
                pm,
                platform.package_manager_docs_url()
            ),
        )
        .with_install(Step::shell(
            platform.package_manager_install_command(),
            format!("Installing {}", pm),
        ))
    }

    pub fn node(platform: Platform) -> Self {
        let pm = platform.package_manager();
        let install = PlatformCommands {
            windows: Some("choco install nodejs -y".to_string()),
            default: Some(format!("{} install node", pm)),
            ..Default::default()
        };
        Self::new(
            "node",
            format!(
                "Please run \"{} install node\" or go to https://nodejs.org for instructions",
                pm
            ),
        )
        .with_install(Step::shell(install, format!("Installing node using {}", pm)))
    }

    /// Installed along with node
    pub fn npm(platform: Platform) -> Self {
        let node = Self::node(platform);
        Self {
            tool: "npm".to_string(),
            instructions: format!(
                "npm comes with node. Please run \"{} install node\" or reinstall node from https://nodejs.org",
                platform.package_manager()
            ),
            ..node
        }
    }

    pub fn yarn() -> Self {
        Self::new(
            "yarn",
            "Please install yarn, see https://classic.yarnpkg.com/lang/en/docs/install",
        )
        .with_install(Step::shell("npm install --global yarn", "Installing yarn"))
    }

    pub fn git() -> Self {
        Self::new(
            "git",
            "Please install git, see https://git-scm.com/book/en/v2/Getting-Started-Installing-Git for instructions.",
        )
    }

    /// The `code` command used to open the new project
    pub fn editor() -> Self {
        Self::new(
            "code",
            "Please install VSCode and the code cli command, see https://code.visualstudio.com/docs/editor/command-line\n\
             On macOS, run \"Shell Command: Install 'code' command in PATH\" from the VSCode command palette.",
        )
    }
}

/// Look a tool up on PATH; lookup errors count as "not available"
pub fn is_available(tool: &str) -> bool {
    match which::which(tool) {
        Ok(path) => {
            log::debug!("Found {} at {}", tool, path.display());
            true
        }
        Err(e) => {
            log::debug!("{} not available: {}", tool, e);
            false
        }
    }
}

/// Checks requirements and negotiates installs
#[derive(Clone)]
pub struct Preflight {
    runner: Runner,
    policy: InstallPolicy,
    prompter: Arc<dyn Prompter>,
    /// Working directory for install commands
    install_dir: PathBuf,
}

impl Preflight {
    pub fn new(
        runner: Runner,
        policy: InstallPolicy,
        prompter: Arc<dyn Prompter>,
        install_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            runner,
            policy,
            prompter,
            install_dir: install_dir.into(),
        }
    }

    /// Make sure `requirement.tool` can be used.
    ///
    /// Returns `Ok(true)` when the tool is present or an install command ran
    /// successfully (presence is not re-checked afterwards), `Ok(false)` when an
    /// optional tool stays missing, and `PreflightAbort` when a mandatory one does.
    pub async fn ensure_available(&self, requirement: &Requirement) -> Result<bool, EngineError> {
        if is_available(&requirement.tool) {
            return Ok(true);
        }

        if let Some(install) = &requirement.install {
            if self.should_install(requirement, install)? {
                self.runner
                    .run(install, &self.install_dir, &Variables::new())
                    .await?;
                println!(
                    "{} {}",
                    "Installed".green(),
                    requirement.tool.as_str().bold()
                );
                return Ok(true);
            }
        }

        println!("{}", requirement.instructions.yellow());

        if self.policy == InstallPolicy::Ask && requirement.mandatory {
            while self.confirm(
                &format!(
                    "Check for {} again once you have installed it?",
                    requirement.tool
                ),
                true,
            )? {
                if is_available(&requirement.tool) {
                    return Ok(true);
                }
                println!("{} is still not available.", requirement.tool);
            }
        }

        if requirement.mandatory {
            Err(EngineError::PreflightAbort {
                tool: requirement.tool.clone(),
                instructions: requirement.instructions.clone(),
            })
        } else {
            log::info!("Continuing without {}", requirement.tool);
            Ok(false)
        }
    }

    fn should_install(&self, requirement: &Requirement, install: &Step) -> Result<bool, EngineError> {
        match self.policy {
            InstallPolicy::Always => Ok(true),
            InstallPolicy::Never => Ok(false),
            InstallPolicy::Ask => {
                let command = self
                    .runner
                    .command_for(install, &Variables::new())
                    .unwrap_or_else(|| install.description.clone());
                self.confirm(
                    &format!(
                        "You don't have {}, but we need it to set up your project. Shall we install it for you, using \"{}\"?",
                        requirement.tool, command
                    ),
                    true,
                )
            }
        }
    }

    fn confirm(&self, question: &str, default: bool) -> Result<bool, EngineError> {
        self.prompter
            .confirm(question, default)
            .map_err(EngineError::Prompt)
    }
}

impl std::fmt::Debug for Preflight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preflight")
            .field("runner", &self.runner)
            .field("policy", &self.policy)
            .field("install_dir", &self.install_dir)
            .finish()
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::runtime::runner::Presentation;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const MISSING_TOOL: &str = "scaffold-engine-definitely-missing-tool";

    /// Answers with a fixed value and counts the questions
    struct Scripted {
        answer: bool,
        asked: AtomicUsize,
    }

    impl Scripted {
        fn new(answer: bool) -> Arc<Self> {
            Arc::new(Self {
                answer,
                asked: AtomicUsize::new(0),
            })
        }
    }

    impl Prompter for Scripted {
        fn confirm(&self, _question: &str, _default: bool) -> std::io::Result<bool> {
            self.asked.fetch_add(1, Ordering::SeqCst);
            Ok(self.answer)
        }
    }

    fn preflight(policy: InstallPolicy, prompter: Arc<dyn Prompter>, dir: &std::path::Path) -> Preflight {
        let runner = Runner::new(Platform::Linux, false, Presentation::quiet());
        Preflight::new(runner, policy, prompter, dir)
    }

    fn missing_with_install() -> Requirement {
        Requirement::new(MISSING_TOOL, "Install it yourself")
            .with_install(Step::shell("touch installed", "Installing"))
    }

    #[test]
    fn test_present_tool_is_available() {
        assert!(is_available("sh"));
        assert!(!is_available(MISSING_TOOL));
    }

    #[tokio::test]
    async fn test_present_tool_short_circuits() {
        let dir = tempfile::tempdir().unwrap();
        let prompter = Scripted::new(false);
        let requirement =
            Requirement::new("sh", "unused").with_install(Step::shell("touch installed", "Installing"));

        let ok = preflight(InstallPolicy::Ask, prompter.clone(), dir.path())
            .ensure_available(&requirement)
            .await
            .unwrap();

        assert!(ok);
        assert_eq!(prompter.asked.load(Ordering::SeqCst), 0);
        assert!(!dir.path().join("installed").exists());
    }

    #[tokio::test]
    async fn test_always_installs_without_asking() {
        let dir = tempfile::tempdir().unwrap();
        let prompter = Scripted::new(false);

        let ok = preflight(InstallPolicy::Always, prompter.clone(), dir.path())
            .ensure_available(&missing_with_install())
            .await
            .unwrap();

        assert!(ok);
        assert!(dir.path().join("installed").exists());
        assert_eq!(prompter.asked.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_ask_accepted_installs() {
        let dir = tempfile::tempdir().unwrap();
        let prompter = Scripted::new(true);

        let ok = preflight(InstallPolicy::Ask, prompter.clone(), dir.path())
            .ensure_available(&missing_with_install())
            .await
            .unwrap();

        assert!(ok);
        assert!(dir.path().join("installed").exists());
        assert_eq!(prompter.asked.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_ask_declined_mandatory_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let prompter = Scripted::new(false);

        let err = preflight(InstallPolicy::Ask, prompter.clone(), dir.path())
            .ensure_available(&missing_with_install())
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::PreflightAbort { ref tool, .. } if tool == MISSING_TOOL));
        assert!(!dir.path().join("installed").exists());
        // install question, then the re-check question
        assert_eq!(prompter.asked.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_never_policy_optional_tool_continues() {
        let dir = tempfile::tempdir().unwrap();

        let ok = preflight(InstallPolicy::Never, Arc::new(AssumeDefault), dir.path())
            .ensure_available(&missing_with_install().optional())
            .await
            .unwrap();

        assert!(!ok);
        assert!(!dir.path().join("installed").exists());
    }

    #[tokio::test]
    async fn test_no_install_path_mandatory_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let requirement = Requirement::new(MISSING_TOOL, "See the docs");

        let err = preflight(InstallPolicy::Always, Arc::new(AssumeDefault), dir.path())
            .ensure_available(&requirement)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("See the docs"));
    }

    #[tokio::test]
    async fn test_failed_install_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let requirement = Requirement::new(MISSING_TOOL, "See the docs")
            .with_install(Step::shell("exit 4", "Installing"));

        let err = preflight(InstallPolicy::Always, Arc::new(AssumeDefault), dir.path())
            .ensure_available(&requirement)
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::CommandFailed { code: Some(4), .. }));
    }

    #[test]
    fn test_standard_requirements() {
        let node = Requirement::node(Platform::Windows);
        let runner = Runner::new(Platform::Windows, false, Presentation::quiet());
        assert_eq!(
            runner
                .command_for(node.install.as_ref().unwrap(), &Variables::new())
                .as_deref(),
            Some("choco install nodejs -y")
        );

        let node = Requirement::node(Platform::MacOs);
        let runner = Runner::new(Platform::MacOs, false, Presentation::quiet());
        assert_eq!(
            runner
                .command_for(node.install.as_ref().unwrap(), &Variables::new())
                .as_deref(),
            Some("brew install node")
        );

        let npm = Requirement::npm(Platform::MacOs);
        assert_eq!(npm.tool, "npm");
        assert!(npm.mandatory);
        assert_eq!(
            runner
                .command_for(npm.install.as_ref().unwrap(), &Variables::new())
                .as_deref(),
            Some("brew install node")
        );

        assert!(Requirement::git().install.is_none());
        assert!(Requirement::editor().mandatory);
        assert_eq!(Requirement::package_manager(Platform::MacOs).tool, "brew");
    }
}
