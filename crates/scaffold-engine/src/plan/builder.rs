//! Assembly of the fresh-build and from-cache plans

use super::{CommandGroup, InternalTask, Plan, PlanKind, Step};
use crate::config::CacheStore;
use crate::error::EngineError;
use crate::platform::Platform;
use crate::runtime::preflight::Requirement;
use crate::templates::{InstallSpec, RootManifest};
use std::path::{Path, PathBuf};

/// Everything needed to lay out a plan for one invocation
#[derive(Debug, Clone)]
pub struct PlanContext {
    pub platform: Platform,
    pub project_name: String,
    /// Directory the project folder is created in
    pub parent_dir: PathBuf,
    pub templates_dir: PathBuf,
    pub manifest: RootManifest,
    pub selected_apps: Vec<String>,
    pub store: CacheStore,
    /// Normalized git remote; pushing is disabled without one
    pub remote: Option<String>,
    pub branch: String,
    pub commit_message: String,
    pub no_third_party: bool,
    pub open_docs: bool,
    pub docs_url: String,
    pub new_defaults: bool,
    pub defaults_to_save: Vec<String>,
}

impl PlanContext {
    pub fn project_dir(&self) -> PathBuf {
        self.parent_dir.join(&self.project_name)
    }

    /// Build the project from templates, then refresh the cache
    pub fn fresh_build(&self) -> Result<Plan, EngineError> {
        let project_dir = self.project_dir();
        let base_dir = self.templates_dir.join(&self.manifest.base);

        let mut plan = self.plan(PlanKind::FreshBuild);

        plan = plan.group(
            CommandGroup::new(&self.parent_dir)
                .requires(Requirement::package_manager(self.platform))
                .requires(Requirement::node(self.platform))
                .requires(Requirement::npm(self.platform))
                .requires(Requirement::yarn())
                .step(Step::shell(
                    self.platform.make_dir_command(&self.project_name),
                    "Making folder for your app",
                ))
                .step(Step::shell(
                    self.platform
                        .copy_command(&dot_path(&base_dir), &self.project_name),
                    "Copying base template",
                ))
                .step(Step::task(
                    InternalTask::MaterializeTemplates {
                        root: project_dir.clone(),
                    },
                    "Rename template files to normal files",
                )),
        );

        for setup in &self.manifest.setup {
            plan = plan.group(
                CommandGroup::new(project_dir.join(&setup.directory))
                    .steps(setup.commands.iter().cloned()),
            );
        }

        if !self.no_third_party && !self.manifest.third_party.is_empty() {
            plan = plan.group(self.third_party_group(&project_dir));
        }

        if !self.selected_apps.is_empty() {
            plan = plan.group(CommandGroup::new(&project_dir).step(Step::shell(
                self.platform.make_dir_command("apps"),
                "Making apps folder",
            )));
        }
        for app in &self.selected_apps {
            plan = plan.group(self.app_group(&project_dir, app)?);
        }

        plan = plan
            .group(
                CommandGroup::new(&project_dir)
                    .requires(Requirement::editor())
                    .step(self.open_editor_step())
                    .step(self.open_docs_step()),
            )
            .group(self.git_group(&project_dir))
            .group(self.cache_group(&project_dir));

        Ok(plan)
    }

    /// Copy the cached project into place, then push it
    pub fn from_cache(&self) -> Plan {
        let project_dir = self.project_dir();

        self.plan(PlanKind::FromCache)
            .group(
                CommandGroup::new(&self.parent_dir)
                    .requires(Requirement::editor())
                    .step(Step::shell(
                        self.platform.make_dir_command(&self.project_name),
                        "Creating your app folder",
                    ))
                    .step(Step::shell(
                        self.platform
                            .copy_command(&dot_path(&self.store.cache_dir()), &self.project_name),
                        "Copying project from cache",
                    ))
                    .step(self.open_editor_step())
                    .step(self.open_docs_step())
                    .step(self.save_defaults_step()),
            )
            .group(self.git_group(&project_dir))
    }

    fn plan(&self, kind: PlanKind) -> Plan {
        let mut plan = Plan::new(kind);
        let project_dir = self.project_dir();
        for (key, value) in [
            ("projectName", self.project_name.clone()),
            ("projectDir", project_dir.display().to_string()),
            ("templatesDir", self.templates_dir.display().to_string()),
            ("branch", self.branch.clone()),
        ] {
            plan.variables.insert(key.to_string(), value);
        }
        plan
    }

    fn third_party_group(&self, project_dir: &Path) -> CommandGroup {
        let clones = self.manifest.third_party.iter().map(|slug| {
            let repo = slug.rsplit('/').next().unwrap_or(slug);
            Step::shell(
                format!(
                    "git clone https://github.com/{}.git {}",
                    slug,
                    self.platform.quote(&format!("third-party/{}", repo))
                ),
                format!("Adding third-party repo: {}", slug),
            )
        });

        CommandGroup::new(project_dir)
            .requires(Requirement::git())
            .step(Step::shell(
                self.platform.make_dir_command("third-party"),
                "Making third-party folder",
            ))
            .steps(clones)
    }

    fn app_group(&self, project_dir: &Path, app: &str) -> Result<CommandGroup, EngineError> {
        let spec = InstallSpec::load(&self.templates_dir, app)?;
        if !spec.tasks.is_empty() {
            log::debug!("Ignoring {} task(s) in the {} install spec", spec.tasks.len(), app);
        }

        let template_dir = self.templates_dir.join("apps").join(app);
        let copy = Step::shell(
            self.platform.copy_command(&dot_path(&template_dir), app),
            format!("Copying {} template", app),
        )
        .disabled_if(!template_dir.is_dir());

        Ok(CommandGroup::new(project_dir.join("apps"))
            .variable("app", app)
            .steps(spec.commands)
            .step(copy))
    }

    fn git_group(&self, project_dir: &Path) -> CommandGroup {
        let no_remote = self.remote.is_none();
        let remote = self.remote.as_deref().unwrap_or_default();

        CommandGroup::new(project_dir)
            .requires(Requirement::git())
            .step(Step::shell(
                self.platform.remove_dir_command(".git"),
                "Remove previous git",
            ))
            .step(Step::shell("git init", "Initialising a git repo"))
            .step(Step::shell(
                "git branch -M {branch}",
                format!("Move to '{}' branch", self.branch),
            ))
            .step(Step::shell(
                format!(
                    "git add . && git commit -m {}",
                    self.platform.quote(&self.commit_message)
                ),
                "Creating commit",
            ))
            .step(
                Step::shell(
                    format!("git remote add origin {}", self.platform.quote(remote)),
                    "Adding remote",
                )
                .disabled_if(no_remote),
            )
            .step(Step::shell("git push -u origin {branch}", "Push").disabled_if(no_remote))
    }

    fn cache_group(&self, project_dir: &Path) -> CommandGroup {
        let cache_dir = self.store.cache_dir().display().to_string();

        CommandGroup::new(self.store.root())
            .step(Step::shell(
                self.platform.recreate_dir_command(&cache_dir),
                "Creating cache folder",
            ))
            .step(Step::shell(
                self.platform.copy_command(&dot_path(project_dir), &cache_dir),
                "Creating cache",
            ))
            .step(Step::task(
                InternalTask::StampCache {
                    path: self.store.timestamp_path(),
                },
                "Add current timestamp to cached files",
            ))
            .step(self.save_defaults_step())
    }

    fn open_editor_step(&self) -> Step {
        Step::shell(
            format!(
                "code {} --goto README.md:1:1",
                self.platform.quote(&self.project_dir().display().to_string())
            ),
            "Opening your project in VSCode",
        )
    }

    fn open_docs_step(&self) -> Step {
        Step::shell(
            self.platform.open_url_command(&self.docs_url),
            "Opening the docs",
        )
        .disabled_if(!self.open_docs)
    }

    fn save_defaults_step(&self) -> Step {
        Step::task(
            InternalTask::SaveDefaults {
                path: self.store.settings_path(),
                flags: self.defaults_to_save.clone(),
            },
            "Save new settings",
        )
        .disabled_if(!self.new_defaults)
    }
}

/// `dir/.` so a recursive copy includes hidden files
fn dot_path(dir: &Path) -> String {
    format!("{}/.", dir.display())
}
