//! Step execution and tool availability
//!
//! This module provides:
//! - The step runner (shell commands and in-process tasks)
//! - Preflight checks that install or explain missing tools
//! - The sequencer that drives a plan to completion

pub mod preflight;
pub mod runner;
pub mod sequencer;

pub use preflight::{AssumeDefault, InstallPolicy, Preflight, Prompter, Requirement};
pub use runner::{Presentation, Runner, StepOutcome};
pub use sequencer::{RunSummary, Sequencer};
