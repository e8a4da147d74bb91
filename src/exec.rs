//! External command execution
//!
//! Every mutation of the outside world (venv creation, dependency install,
//! migrations, static collection) goes through [`CommandRunner`]. The engine
//! only ever looks at exit status and captured text; the commands themselves
//! are opaque.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::error::{DeployError, DeployResult};

/// A fully described external command
#[derive(Debug, Clone)]
pub struct Invocation {
    program: String,
    args: Vec<String>,
    cwd: Option<PathBuf>,
    /// Inherit the terminal instead of capturing output. Used for commands
    /// that prompt on their own (admin-account creation).
    interactive: bool,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            interactive: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn interactive(mut self) -> Self {
        self.interactive = true;
        self
    }

    /// Single-line rendering for banners and error messages
    pub fn display_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// Captured result of one command invocation
#[derive(Debug, Clone)]
pub struct ExecOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ExecOutput {
    /// Lines of stdout containing `needle`. Advisory reporting only; never
    /// used to decide control flow.
    pub fn stdout_lines_containing<'a>(&'a self, needle: &'a str) -> impl Iterator<Item = &'a str> {
        self.stdout
            .lines()
            .filter(move |line| line.contains(needle))
    }
}

/// Synchronous command execution boundary.
///
/// `run` never fails on a nonzero exit; it only fails when the command
/// cannot be spawned at all. Callers that require success use
/// [`CommandRunner::run_checked`].
pub trait CommandRunner {
    fn run(&self, invocation: &Invocation) -> DeployResult<ExecOutput>;

    fn run_checked(&self, invocation: &Invocation) -> DeployResult<ExecOutput> {
        let output = self.run(invocation)?;
        if output.success {
            Ok(output)
        } else {
            Err(DeployError::CommandFailed {
                command: invocation.display_line(),
                code: output.code,
                stderr: output.stderr.clone(),
            })
        }
    }
}

/// Runs commands on the local machine
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellRunner;

impl ShellRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for ShellRunner {
    fn run(&self, invocation: &Invocation) -> DeployResult<ExecOutput> {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args);
        if let Some(cwd) = &invocation.cwd {
            cmd.current_dir(cwd);
        }

        if invocation.interactive {
            cmd.stdin(Stdio::inherit())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit());
            let status = cmd.status()?;
            return Ok(ExecOutput {
                success: status.success(),
                code: status.code(),
                stdout: String::new(),
                stderr: String::new(),
            });
        }

        let output = cmd.output()?;
        Ok(ExecOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
