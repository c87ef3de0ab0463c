//! Charm-style CLI prompts using cliclack

use crate::config::{CacheStore, RunConfig};
use crate::plan::{Plan, PlanContext, PlanKind};
use crate::platform::Platform;
use crate::product::ProductConfig;
use crate::project::{normalize_remote, slugify, unique_name};
use crate::runtime::{AssumeDefault, Preflight, Prompter, Runner, Sequencer};
use crate::templates::{resolve_templates_dir, RootManifest};
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

/// Asks preflight questions with cliclack confirm prompts
#[derive(Debug, Clone, Copy, Default)]
pub struct CliclackPrompter;

impl Prompter for CliclackPrompter {
    fn confirm(&self, question: &str, default: bool) -> std::io::Result<bool> {
        cliclack::confirm(question).initial_value(default).interact()
    }
}

/// Run the whole scaffolding flow, prompting where the config leaves gaps
pub async fn run<C: ProductConfig>(product: &C, config: RunConfig) -> Result<()> {
    cliclack::intro(product.display_name())?;

    let platform = Platform::current()?;
    cliclack::log::info(format!("Platform: {}", platform))?;

    let store = CacheStore::in_home(product.home_dir_name())?;
    store
        .ensure_root()
        .with_context(|| format!("Failed to create {}", store.root().display()))?;

    let templates_dir =
        resolve_templates_dir(config.templates_dir.as_deref(), product.templates_dir_env())?;
    let manifest = RootManifest::load(&templates_dir)?;
    log::debug!("Using templates from {}", templates_dir.display());

    let parent_dir = std::env::current_dir().context("Failed to read the working directory")?;

    // Step 1: Project name and remote
    let project_name = select_project_name(product, &config, &parent_dir)?;
    let remote = select_remote(&config, &project_name)?;

    // Step 2: Cache or fresh build
    let use_cache = store.should_use_cache(config.cache_days, config.offline, config.no_cache);
    if use_cache {
        cliclack::log::info("Using the cached project from your last build")?;
    }

    // Step 3: Apps (fresh builds only)
    let selected_apps = if use_cache {
        Vec::new()
    } else {
        select_apps(&manifest, &config)?
    };

    let open_docs = ask_open_docs(&config)?;

    let context = PlanContext {
        platform,
        project_name,
        parent_dir: parent_dir.clone(),
        templates_dir,
        manifest,
        selected_apps,
        store,
        remote,
        branch: config
            .branch
            .clone()
            .unwrap_or_else(|| product.default_branch().to_string()),
        commit_message: product.initial_commit_message().to_string(),
        no_third_party: config.no_third_party,
        open_docs,
        docs_url: product.docs_url().to_string(),
        new_defaults: config.new_defaults,
        defaults_to_save: config.defaults_to_save.clone(),
    };

    let plan = if use_cache {
        context.from_cache()
    } else {
        context.fresh_build()?
    };

    // Step 4: Execute
    execute(&config, platform, &parent_dir, &plan).await?;

    print_next_steps(product, &context.project_dir())?;

    Ok(())
}

fn select_project_name<C: ProductConfig>(
    product: &C,
    config: &RunConfig,
    parent_dir: &Path,
) -> Result<String> {
    let input = match &config.project_name {
        Some(name) => name.clone(),
        None if config.interactive => cliclack::input("What should your app be called?")
            .placeholder(product.default_project_name())
            .default_input(product.default_project_name())
            .interact()?,
        None => String::new(),
    };

    let slug = slugify(&input);
    let base = if slug.is_empty() {
        product.default_project_name().to_string()
    } else {
        slug
    };

    let name = unique_name(parent_dir, &base);
    if name != base {
        cliclack::log::warning(format!(
            "Using name {} because {} folder already exists",
            name, base
        ))?;
    }
    cliclack::log::info(format!("Project: {}", name))?;
    Ok(name)
}

fn select_remote(config: &RunConfig, project_name: &str) -> Result<Option<String>> {
    let input = match &config.remote {
        Some(remote) => remote.clone(),
        None if config.interactive => cliclack::input(format!(
            "Where should {} be hosted? Provide a URL or a GitHub slug (\"org/repo\")",
            project_name
        ))
        .placeholder("leave empty to skip pushing")
        .required(false)
        .interact()?,
        None => String::new(),
    };

    let remote = normalize_remote(&input)?;
    if remote.is_none() {
        cliclack::log::info("No remote given; the project will not be pushed")?;
    }
    Ok(remote)
}

fn select_apps(manifest: &RootManifest, config: &RunConfig) -> Result<Vec<String>> {
    if let Some(apps) = &config.apps {
        let selected = manifest.parse_app_selection(&apps.join(","));
        cliclack::log::info(format!("Apps: {}", selected.join(", ")))?;
        return Ok(selected);
    }

    if !config.interactive || manifest.apps.is_empty() {
        return Ok(manifest.default_apps());
    }

    let mut multi = cliclack::multiselect("Which apps do you want to create?");
    for app in &manifest.apps {
        multi = multi.item(app.slug.clone(), &app.slug, &app.description);
    }
    let selected: Vec<String> = multi
        .initial_values(manifest.default_apps())
        .required(false)
        .interact()?;

    Ok(selected)
}

fn ask_open_docs(config: &RunConfig) -> Result<bool> {
    if !config.interactive {
        return Ok(false);
    }
    let open: bool = cliclack::confirm(
        "That's all we need to know! Do you want to open the docs while waiting?",
    )
    .initial_value(false)
    .interact()?;
    Ok(open)
}

async fn execute(
    config: &RunConfig,
    platform: Platform,
    install_dir: &Path,
    plan: &Plan,
) -> Result<()> {
    let runner = Runner::new(platform, config.debug, config.presentation.clone());
    let prompter: Arc<dyn Prompter> = if config.interactive {
        Arc::new(CliclackPrompter)
    } else {
        Arc::new(AssumeDefault)
    };
    let preflight = Preflight::new(runner.clone(), config.install_policy(), prompter, install_dir);

    let label = match plan.kind {
        PlanKind::FreshBuild => "Building your project",
        PlanKind::FromCache => "Creating your project from cache",
    };
    cliclack::log::step(format!("{} ({} steps)", label, plan.enabled_steps()))?;

    let summary = Sequencer::new(runner, preflight).execute(plan).await?;
    log::debug!(
        "Executed {} step(s), skipped {}",
        summary.executed,
        summary.skipped
    );

    cliclack::log::success("Project created")?;
    Ok(())
}

fn print_next_steps<C: ProductConfig>(product: &C, project_dir: &Path) -> Result<()> {
    let steps = product.next_steps(project_dir);

    println!();
    println!("  Next steps");
    println!();

    for (i, step) in steps.iter().enumerate() {
        println!("  {}.  {}", i + 1, step);
    }

    cliclack::outro("Happy coding!")?;

    Ok(())
}
