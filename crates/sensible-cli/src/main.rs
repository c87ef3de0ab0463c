//! Sensible CLI - Project scaffolding for sensible apps

use anyhow::Result;
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use scaffold_engine::config::{merge_args, persistable_flags, CacheStore};
use scaffold_engine::{ProductConfig, RunConfig};
use std::path::{Path, PathBuf};

/// Sensible product configuration
#[derive(Clone)]
pub struct SensibleConfig;

impl ProductConfig for SensibleConfig {
    fn name(&self) -> &'static str {
        "sensible"
    }

    fn display_name(&self) -> &'static str {
        "Sensible"
    }

    fn home_dir_name(&self) -> &'static str {
        ".sensible"
    }

    fn templates_dir_env(&self) -> &'static str {
        "SENSIBLE_TEMPLATES_DIR"
    }

    fn default_project_name(&self) -> &'static str {
        "makes-sense"
    }

    fn default_branch(&self) -> &'static str {
        "live"
    }

    fn initial_commit_message(&self) -> &'static str {
        "🧠 This Makes Sense"
    }

    fn docs_url(&self) -> &'static str {
        "https://doc.sensible.to"
    }

    fn cli_description(&self) -> &'static str {
        "CLI for scaffolding sensible full-stack projects"
    }

    fn next_steps(&self, dir: &Path) -> Vec<String> {
        let mut steps = Vec::new();
        let current = std::env::current_dir().ok();

        if current.as_deref() != Some(dir) {
            steps.push(format!("cd {}", dir.display()));
        }
        steps.push("yarn dev".to_string());

        steps
    }
}

#[derive(Parser, Debug)]
#[command(name = "sensible")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Project name (slugified; a numeric suffix is added if the folder exists)
    pub name: Option<String>,

    /// Git remote: a URL or a GitHub "org/repo" slug
    pub remote: Option<String>,

    #[command(flatten)]
    pub flags: Flags,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new project
    Init {
        /// Project name (slugified; a numeric suffix is added if the folder exists)
        name: Option<String>,

        /// Git remote: a URL or a GitHub "org/repo" slug
        remote: Option<String>,
    },
}

/// Flags that may also come from the saved defaults
#[derive(Parser, Debug)]
pub struct Flags {
    /// Stream command output instead of showing progress
    #[arg(long, global = true)]
    pub debug: bool,

    /// Never prompt; use defaults and install missing tools automatically
    #[arg(long = "non-interactive", global = true, overrides_with = "interactive")]
    pub non_interactive: bool,

    /// Prompt for anything not given on the command line (default)
    #[arg(long, global = true, overrides_with = "non_interactive")]
    pub interactive: bool,

    /// Reuse the cached project regardless of its age
    #[arg(long, global = true)]
    pub offline: bool,

    /// Always build from templates
    #[arg(long = "no-cache", global = true)]
    pub no_cache: bool,

    /// Skip cloning third-party repositories
    #[arg(long = "no-third-party", global = true)]
    pub no_third_party: bool,

    /// Git branch to create and push
    #[arg(long, global = true, require_equals = true)]
    pub branch: Option<String>,

    /// Days a cached project stays fresh
    #[arg(long = "cache-days", global = true, require_equals = true)]
    pub cache_days: Option<u64>,

    /// Save the flags of this invocation as defaults for later runs
    #[arg(long = "new-defaults", global = true)]
    pub new_defaults: bool,

    /// In non-interactive mode, do not install missing tools
    #[arg(long = "skip-install", global = true)]
    pub skip_install: bool,

    /// Apps to create (comma-separated slugs)
    #[arg(long, global = true, require_equals = true, value_delimiter = ',')]
    pub apps: Option<Vec<String>>,

    /// Local templates directory (for development use)
    #[arg(long = "templates-dir", global = true, require_equals = true)]
    pub templates_dir: Option<PathBuf>,
}

impl Args {
    fn into_run_config(self, defaults_to_save: Vec<String>) -> RunConfig {
        let (name, remote) = match self.command {
            Some(Command::Init { name, remote }) => (name, remote),
            None => (self.name, self.remote),
        };
        let flags = self.flags;
        let defaults = RunConfig::default();

        RunConfig {
            debug: flags.debug,
            interactive: !flags.non_interactive,
            offline: flags.offline,
            no_cache: flags.no_cache,
            no_third_party: flags.no_third_party,
            new_defaults: flags.new_defaults,
            skip_install: flags.skip_install,
            branch: flags.branch,
            cache_days: flags.cache_days.unwrap_or(defaults.cache_days),
            project_name: name,
            remote,
            apps: flags.apps,
            templates_dir: flags.templates_dir,
            defaults_to_save,
            ..defaults
        }
    }
}

/// Parse `argv` with the product's name and description as clap metadata
fn parse_args<C: ProductConfig>(product: &C, argv: Vec<String>) -> Result<Args, clap::Error> {
    let matches = Args::command()
        .name(product.name())
        .about(product.cli_description())
        .try_get_matches_from(argv)?;
    Args::from_arg_matches(&matches)
}

/// Exit status for a parse error; `--help` and `--version` are not failures
fn parse_exit_code(err: &clap::Error) -> i32 {
    if err.use_stderr() {
        1
    } else {
        0
    }
}

fn init_logging(debug: bool) {
    let default_filter = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    let product = SensibleConfig;

    // Saved defaults go in front of the live arguments so live flags win
    let live: Vec<String> = std::env::args().collect();
    let persisted = CacheStore::in_home(product.home_dir_name())
        .map(|store| store.read_flags())
        .unwrap_or_default();
    let args = match parse_args(&product, merge_args(&persisted, &live)) {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            std::process::exit(parse_exit_code(&err));
        }
    };

    init_logging(args.flags.debug);
    if !persisted.is_empty() {
        log::debug!("Saved defaults: {}", persisted.join(" "));
    }

    let config = args.into_run_config(persistable_flags(&live));
    let result = scaffold_engine::run(&product, config).await;

    // Ensure cursor is visible on normal exit
    let _ = console::Term::stderr().show_cursor();

    result
}
