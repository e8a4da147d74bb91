//! Error types for shipwright
//!
//! Uses `thiserror` for library errors; the binary boundary wraps these in
//! `anyhow` for display.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for shipwright operations
pub type DeployResult<T> = Result<T, DeployError>;

/// Main error type for shipwright operations
#[derive(Error, Debug)]
pub enum DeployError {
    /// No project-root candidate contained the marker file
    #[error("project directory not found (no candidate contains '{marker}')\nsearched:\n{}", format_candidates(.candidates))]
    ProjectNotFound {
        marker: String,
        candidates: Vec<PathBuf>,
    },

    /// Settings file absent from every known location inside the project
    #[error("settings file not found in project\nsearched:\n{}", format_candidates(.candidates))]
    SettingsNotFound { candidates: Vec<PathBuf> },

    /// Dependency manifest absent from every candidate location
    #[error("dependency manifest '{name}' not found\nsearched:\n{}", format_candidates(.candidates))]
    ManifestNotFound {
        name: String,
        candidates: Vec<PathBuf>,
    },

    /// External command exited nonzero while success was required
    #[error("command failed{}: {command}\n{stderr}", exit_code(.code))]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// A begin sentinel has no matching end sentinel
    #[error("unterminated production block in {file}: begin sentinel at line {line} has no end sentinel")]
    UnterminatedBlock { file: PathBuf, line: usize },

    /// Settings rewrite failed; the original file is untouched
    #[error("failed to patch {path}: {message}")]
    ConfigPatch { path: PathBuf, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Run was aborted at a checkpoint or after a mandatory failure
    #[error("deployment aborted")]
    Aborted,
}

fn format_candidates(candidates: &[PathBuf]) -> String {
    candidates
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn exit_code(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!(" (exit code {c})"),
        None => " (terminated by signal)".to_string(),
    }
}
