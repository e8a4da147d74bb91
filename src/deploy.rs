//! Deployment pipeline definition
//!
//! Wires layout resolution, the command runner, the settings patcher, and
//! the descriptor generator into the ordered step list. Layout resolution
//! happens before any step runs, so resolution failures abort with nothing
//! mutated.

use std::path::{Path, PathBuf};

use crate::config::{DeployConfig, ROOT_MARKER};
use crate::descriptor;
use crate::error::{DeployError, DeployResult};
use crate::exec::{CommandRunner, ExecOutput, Invocation};
use crate::layout::{self, ProjectLayout};
use crate::pipeline::{Prompter, RunReport, Step, StepRunner};
use crate::settings::{apply_to_file, ProductionBlock};

/// Pending migrations are listed with an unchecked box. Counting them is
/// advisory reporting only.
fn pending_count(output: &ExecOutput) -> usize {
    output.stdout_lines_containing("[ ]").count()
}

fn applied_count(output: &ExecOutput) -> usize {
    output.stdout_lines_containing("[X]").count()
}

/// A resolved deployment: configuration plus layout, ready to build steps
pub struct Deployment<'a> {
    config: &'a DeployConfig,
    runner: &'a dyn CommandRunner,
    layout: ProjectLayout,
}

impl<'a> Deployment<'a> {
    /// Resolve the project layout. Fatal on any missing path; no mutation
    /// has happened yet at that point.
    pub fn resolve(
        config: &'a DeployConfig,
        runner: &'a dyn CommandRunner,
        invocation_dir: &Path,
        home: &Path,
    ) -> DeployResult<Self> {
        let layout = layout::locate_project(config, invocation_dir, home)?;
        Ok(Self {
            config,
            runner,
            layout,
        })
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    fn venv_dir(&self) -> PathBuf {
        self.layout.root.join("venv")
    }

    fn venv_python(&self) -> PathBuf {
        self.venv_dir().join("bin").join("python")
    }

    fn venv_pip(&self) -> PathBuf {
        self.venv_dir().join("bin").join("pip")
    }

    /// `manage.py` invocation through the venv interpreter, run from the
    /// project root
    fn manage<I, S>(&self, args: I) -> Invocation
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Invocation::new(self.venv_python().display().to_string())
            .arg("manage.py")
            .args(args)
            .current_dir(&self.layout.root)
    }

    fn say(&self, line: &str) {
        if !self.config.json {
            println!("{line}");
        }
    }

    /// Build the ordered step list. Order matters: later steps depend on
    /// state produced by earlier ones.
    pub fn steps(&self) -> Vec<Step<'_>> {
        vec![
            self.step_check_project(),
            self.step_create_venv(),
            self.step_install_dependencies(),
            self.step_patch_settings(),
            self.step_make_migrations(),
            self.step_check_database(),
            self.step_review_pending(),
            self.step_apply_migrations(),
            self.step_verify_migrations(),
            self.step_collect_static(),
            self.step_create_admin(),
            self.step_generate_descriptor(),
        ]
    }

    fn step_check_project(&self) -> Step<'_> {
        Step::mandatory("Checking project directory", move || {
            if !self.layout.root.join(ROOT_MARKER).is_file() {
                return Err(DeployError::ProjectNotFound {
                    marker: ROOT_MARKER.to_string(),
                    candidates: vec![self.layout.root.clone()],
                });
            }
            self.say(&format!("  project root: {}", self.layout.root.display()));
            Ok(())
        })
    }

    fn step_create_venv(&self) -> Step<'_> {
        Step::mandatory("Setting up virtual environment", move || {
            if self.venv_dir().exists() {
                self.say("  virtual environment already exists");
                return Ok(());
            }
            self.runner.run_checked(
                &Invocation::new(self.config.python_binary())
                    .args(["-m", "venv", "venv"])
                    .current_dir(&self.layout.root),
            )?;
            Ok(())
        })
    }

    fn step_install_dependencies(&self) -> Step<'_> {
        Step::mandatory("Installing dependencies", move || {
            let pip = self.venv_pip();
            if !pip.is_file() {
                return Err(DeployError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("virtual environment pip not found at {}", pip.display()),
                )));
            }

            // Best effort; an old installer still installs.
            let _ = self.runner.run(
                &Invocation::new(pip.display().to_string())
                    .args(["install", "--upgrade", "pip"])
                    .current_dir(&self.layout.root),
            );

            self.say(&format!("  using manifest: {}", self.layout.manifest.display()));
            self.runner.run_checked(
                &Invocation::new(pip.display().to_string())
                    .arg("install")
                    .arg("-r")
                    .arg(self.layout.manifest.display().to_string())
                    .current_dir(&self.layout.root),
            )?;
            Ok(())
        })
    }

    fn step_patch_settings(&self) -> Step<'_> {
        Step::mandatory("Updating settings for production", move || {
            let block = ProductionBlock::from_config(self.config);
            apply_to_file(&self.layout.settings_file, &block.render())?;
            self.say(&format!(
                "  patched: {}",
                self.layout.settings_file.display()
            ));
            Ok(())
        })
    }

    fn step_make_migrations(&self) -> Step<'_> {
        Step::optional("Creating migrations for model changes", move || {
            let dry_run = self
                .runner
                .run(&self.manage(["makemigrations", "--dry-run"]))?;
            if !dry_run.success
                || dry_run.stdout.trim().is_empty()
                || dry_run.stdout.contains("No changes detected")
            {
                self.say("  no model changes detected");
                return Ok(());
            }

            let output = self.runner.run_checked(&self.manage(["makemigrations"]))?;
            for line in output.stdout_lines_containing("Creating").take(5) {
                self.say(&format!("  {}", line.trim()));
            }
            Ok(())
        })
    }

    fn step_check_database(&self) -> Step<'_> {
        Step::optional("Checking database connection", move || {
            self.runner
                .run_checked(&self.manage(["check", "--database", "default"]))?;
            Ok(())
        })
    }

    fn step_review_pending(&self) -> Step<'_> {
        Step::optional("Checking for pending migrations", move || {
            let output = self
                .runner
                .run_checked(&self.manage(["showmigrations", "--plan"]))?;
            let pending = pending_count(&output);
            if pending == 0 {
                self.say("  no pending migrations");
            } else {
                self.say(&format!("  {pending} pending migration(s)"));
                for line in output.stdout_lines_containing("[ ]").take(10) {
                    self.say(&format!("  {}", line.trim()));
                }
            }
            Ok(())
        })
    }

    fn step_apply_migrations(&self) -> Step<'_> {
        // Migration failures are often environment-specific and fixable by
        // rerun, so the operator gets the final word instead of an
        // automatic abort.
        Step::mandatory("Applying database migrations", move || {
            let output = self
                .runner
                .run_checked(&self.manage(["migrate", "--noinput"]))?;
            for line in output.stdout_lines_containing("Applying").take(15) {
                self.say(&format!("  {}", line.trim()));
            }
            Ok(())
        })
        .with_checkpoint("Apply all pending migrations?", true)
        .recoverable()
    }

    fn step_verify_migrations(&self) -> Step<'_> {
        Step::optional("Verifying database state", move || {
            let output = self.runner.run_checked(&self.manage(["showmigrations"]))?;
            let applied = applied_count(&output);
            let unapplied = pending_count(&output);
            self.say(&format!("  applied migrations: {applied}"));
            if unapplied > 0 {
                self.say(&format!("  unapplied migrations: {unapplied}"));
            } else {
                self.say("  all migrations applied");
            }
            Ok(())
        })
    }

    fn step_collect_static(&self) -> Step<'_> {
        Step::optional("Collecting static files", move || {
            self.runner
                .run_checked(&self.manage(["collectstatic", "--noinput"]))?;
            Ok(())
        })
    }

    fn step_create_admin(&self) -> Step<'_> {
        // The subprocess owns the terminal for its own credential prompts;
        // credential entry never passes through this tool.
        Step::optional("Creating administrative account", move || {
            self.runner
                .run_checked(&self.manage(["createsuperuser"]).interactive())?;
            Ok(())
        })
        .with_checkpoint("Create a superuser account?", false)
    }

    fn step_generate_descriptor(&self) -> Step<'_> {
        Step::mandatory("Generating WSGI configuration", move || {
            let path = descriptor::write(&self.layout, self.config)?;
            self.say(&format!("  wrote: {}", path.display()));
            Ok(())
        })
    }

    /// Run the full pipeline
    pub fn execute(&self, prompter: &mut dyn Prompter) -> RunReport {
        let mut steps = self.steps();
        let mut runner = StepRunner::new(prompter);
        if self.config.json {
            runner = runner.quiet();
        }
        runner.run(&mut steps)
    }
}
