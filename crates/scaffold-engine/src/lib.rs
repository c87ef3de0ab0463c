//! Scaffold Engine - cross-platform orchestration of project scaffolding
//!
//! This library turns a template tree and a handful of user choices into a
//! new, git-initialised project. The work is expressed as a [`plan::Plan`]: an
//! ordered list of command groups, each bound to a working directory, which is
//! executed strictly one step at a time.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Layer 1: Core Operations** - platform commands, step resolution and
//!   substitution, template materialization, cache freshness
//! - **Layer 2: Execution** - the step runner, preflight tool checks and the
//!   sequencer, plus the `ProductConfig` trait for binaries
//! - **Layer 3: CLI/TUI Interface** - Optional cliclack-based prompts (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based TUI prompts module
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use scaffold_engine::{plan::{CommandGroup, Plan, PlanKind, Step}, runtime::*, Platform};
//!
//! let platform = Platform::current()?;
//! let runner = Runner::new(platform, false, Presentation::default());
//! let preflight = Preflight::new(runner.clone(), InstallPolicy::Never, Arc::new(AssumeDefault), ".");
//!
//! let plan = Plan::new(PlanKind::FreshBuild)
//!     .group(CommandGroup::new(".").step(Step::shell("git init", "Initialising a git repo")));
//! Sequencer::new(runner, preflight).execute(&plan).await?;
//! ```

pub mod config;
pub mod error;
pub mod plan;
pub mod platform;
pub mod product;
pub mod project;
pub mod runtime;
pub mod templates;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use config::{CacheStore, RunConfig};
pub use error::EngineError;
pub use plan::{Plan, PlanContext, Step};
pub use platform::Platform;
pub use product::ProductConfig;
pub use runtime::{Presentation, Runner, Sequencer};
pub use templates::RootManifest;

#[cfg(feature = "tui")]
pub use tui::run;
