//! Strictly ordered execution of a plan

use crate::error::EngineError;
use crate::plan::Plan;
use crate::runtime::preflight::Preflight;
use crate::runtime::runner::Runner;

/// Counts of what a plan run did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Steps that spawned a command or ran an in-process task
    pub executed: usize,
    /// Disabled steps and steps with nothing to run on this platform
    pub skipped: usize,
}

/// Runs groups in order and the steps of each group in order.
///
/// At most one step is in flight at any time. The first failure stops the
/// run; nothing is retried here.
#[derive(Debug, Clone)]
pub struct Sequencer {
    runner: Runner,
    preflight: Preflight,
}

impl Sequencer {
    pub fn new(runner: Runner, preflight: Preflight) -> Self {
        Self { runner, preflight }
    }

    pub async fn execute(&self, plan: &Plan) -> Result<RunSummary, EngineError> {
        let mut summary = RunSummary::default();

        for group in &plan.groups {
            for requirement in &group.requires {
                self.preflight.ensure_available(requirement).await?;
            }

            let variables = plan.variables_for(group);
            log::debug!(
                "Running {} step(s) in {}",
                group.commands.len(),
                group.directory.display()
            );

            for step in &group.commands {
                let outcome = self.runner.run(step, &group.directory, &variables).await?;
                if outcome.did_work() {
                    summary.executed += 1;
                } else {
                    summary.skipped += 1;
                }
            }
        }

        Ok(summary)
    }
}
