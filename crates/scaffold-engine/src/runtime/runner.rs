//! Execution of single steps as shell commands or in-process tasks

use crate::error::EngineError;
use crate::plan::{resolve_command, substitute, Step, Variables};
use crate::platform::{accepts_exit_code, Platform};
use colored::Colorize;
use std::io::Write;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tokio::process::Command as TokioCommand;

/// How long to keep reading output after the command has exited.
///
/// Background processes started by the command may hold the pipes open.
const DRAIN_GRACE: Duration = Duration::from_millis(100);

/// How a step finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Skipped because `is_disabled` was set
    Disabled,
    /// Nothing to run on this platform
    Noop,
    /// A shell command ran and was classified as success
    Spawned,
    /// An in-process task completed
    Internal,
}

impl StepOutcome {
    pub fn did_work(&self) -> bool {
        matches!(self, StepOutcome::Spawned | StepOutcome::Internal)
    }
}

/// Progress output around each step; never affects control flow
#[derive(Debug, Clone)]
pub struct Presentation {
    /// Print the description and a dot per tick while a command runs
    pub progress: bool,
    pub tick: Duration,
    /// Clear the terminal once a step settles
    pub clear_screen: bool,
}

impl Default for Presentation {
    fn default() -> Self {
        Self {
            progress: true,
            tick: Duration::from_secs(1),
            clear_screen: false,
        }
    }
}

impl Presentation {
    /// No progress output at all
    pub fn quiet() -> Self {
        Self {
            progress: false,
            tick: Duration::from_secs(1),
            clear_screen: false,
        }
    }

    fn begin(&self, description: &str) {
        if self.progress {
            print!("{}", description);
            let _ = std::io::stdout().flush();
        }
    }

    fn tick(&self) {
        if self.progress {
            print!(".");
            let _ = std::io::stdout().flush();
        }
    }

    fn finish(&self) {
        if self.clear_screen {
            let _ = console::Term::stdout().clear_screen();
        } else if self.progress {
            println!();
        }
    }
}

/// Runs steps one at a time in a given working directory
#[derive(Debug, Clone)]
pub struct Runner {
    platform: Platform,
    /// Stream child output to the terminal instead of capturing it
    debug: bool,
    presentation: Presentation,
}

impl Runner {
    pub fn new(platform: Platform, debug: bool, presentation: Presentation) -> Self {
        Self {
            platform,
            debug,
            presentation,
        }
    }

    /// The command `step` would run here, after resolution and substitution
    pub fn command_for(&self, step: &Step, variables: &Variables) -> Option<String> {
        substitute(resolve_command(step, self.platform), variables)
    }

    /// Run one step in `dir`.
    ///
    /// Any failure is fatal for the whole run; callers propagate it unchanged.
    pub async fn run(
        &self,
        step: &Step,
        dir: &Path,
        variables: &Variables,
    ) -> Result<StepOutcome, EngineError> {
        let description =
            substitute(Some(step.description.clone()), variables).unwrap_or_default();

        if step.is_disabled {
            log::debug!("Skipping disabled step: {}", description);
            return Ok(StepOutcome::Disabled);
        }

        if let Some(command) = self.command_for(step, variables) {
            self.presentation.begin(&description);
            let result = self.spawn(&command, &description, dir).await;
            self.presentation.finish();
            return result.map(|_| StepOutcome::Spawned);
        }

        if let Some(task) = &step.task {
            log::debug!("Running in-process step: {}", description);
            self.presentation.begin(&description);
            let result = task.run().await;
            self.presentation.finish();
            return result
                .map(|_| StepOutcome::Internal)
                .map_err(|source| EngineError::Task {
                    description,
                    source,
                });
        }

        log::debug!("No command for {} on {}", description, self.platform);
        Ok(StepOutcome::Noop)
    }

    async fn spawn(&self, command: &str, description: &str, dir: &Path) -> Result<(), EngineError> {
        log::debug!("Running `{}` in {}", command, dir.display());

        let (shell, flag) = self.platform.shell();
        let mut cmd = TokioCommand::new(shell);
        cmd.arg(flag);
        #[cfg(windows)]
        cmd.raw_arg(command);
        #[cfg(not(windows))]
        cmd.arg(command);
        cmd.current_dir(dir);

        if self.debug {
            cmd.stdin(Stdio::inherit())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit());
        } else {
            cmd.stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped());
        }

        let mut child = cmd.spawn().map_err(|source| EngineError::Spawn {
            command: command.to_string(),
            description: description.to_string(),
            source,
        })?;

        let mut stdout = child.stdout.take().map(|s| BufReader::new(s).lines());
        let mut stderr = child.stderr.take().map(|s| BufReader::new(s).lines());
        let mut output = Vec::new();

        let mut ticker = tokio::time::interval(self.presentation.tick);
        // The first tick completes immediately
        ticker.tick().await;

        // Keep reading while waiting so a chatty child cannot block on a full pipe
        let status = loop {
            tokio::select! {
                line = next_line(&mut stdout), if stdout.is_some() => match line {
                    Some(line) => output.push(line),
                    None => stdout = None,
                },
                line = next_line(&mut stderr), if stderr.is_some() => match line {
                    Some(line) => output.push(line),
                    None => stderr = None,
                },
                status = child.wait() => break status,
                _ = ticker.tick() => self.presentation.tick(),
            }
        };

        drain(&mut stdout, &mut output).await;
        drain(&mut stderr, &mut output).await;

        let status = status.map_err(|source| EngineError::Spawn {
            command: command.to_string(),
            description: description.to_string(),
            source,
        })?;

        match status.code() {
            Some(code) if accepts_exit_code(command, code) => {
                if code != 0 {
                    log::debug!("`{}` exited with accepted code {}", command, code);
                }
                Ok(())
            }
            code => {
                report_failure(command, description, &output);
                Err(EngineError::CommandFailed {
                    command: command.to_string(),
                    description: description.to_string(),
                    code,
                    output,
                })
            }
        }
    }
}

async fn next_line<R>(lines: &mut Option<Lines<R>>) -> Option<String>
where
    R: AsyncBufRead + Unpin,
{
    match lines {
        Some(lines) => match lines.next_line().await {
            Ok(line) => line,
            Err(e) => {
                log::debug!("Error reading command output: {}", e);
                None
            }
        },
        None => None,
    }
}

/// Read what is left in a pipe, giving up once it stays quiet for [`DRAIN_GRACE`]
async fn drain<R>(lines: &mut Option<Lines<R>>, output: &mut Vec<String>)
where
    R: AsyncBufRead + Unpin,
{
    while lines.is_some() {
        match tokio::time::timeout(DRAIN_GRACE, next_line(lines)).await {
            Ok(Some(line)) => output.push(line),
            Ok(None) | Err(_) => *lines = None,
        }
    }
}

fn report_failure(command: &str, description: &str, output: &[String]) {
    eprintln!();
    for line in output {
        eprintln!("  {}", line.dimmed());
    }
    eprintln!("{} {}", "Failed:".red().bold(), description);
    eprintln!("{} {}", "Command:".dimmed(), command.yellow());
}
