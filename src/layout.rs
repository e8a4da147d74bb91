//! Project layout resolution
//!
//! Every path the pipeline touches is resolved once, up front, by probing a
//! declarative ordered list of candidate locations for a marker file. The
//! priority order is data, not branching, so it can be tested on its own.

use std::path::{Path, PathBuf};

use crate::config::{DeployConfig, MANIFEST_NAME, ROOT_MARKER};
use crate::error::{DeployError, DeployResult};

/// One resolution rule: a directory probed for the marker file. The probed
/// directory is also the result on a match.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Human-readable label used in progress output
    pub description: &'static str,
    /// Directory checked for the marker file
    pub dir: PathBuf,
}

impl Candidate {
    pub fn new(description: &'static str, dir: PathBuf) -> Self {
        Self { description, dir }
    }
}

/// Return the first candidate whose directory contains `marker`.
/// Pure probing; no side effects.
pub fn resolve<'a>(candidates: &'a [Candidate], marker: &str) -> Option<&'a Candidate> {
    candidates.iter().find(|c| c.dir.join(marker).is_file())
}

/// Paths the rest of the run depends on, immutable after resolution
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    /// Absolute project root (contains `manage.py`)
    pub root: PathBuf,
    /// Settings source file inside the root
    pub settings_file: PathBuf,
    /// Dependency manifest, possibly outside the root
    pub manifest: PathBuf,
}

/// Ordered project-root candidates for a given invocation directory
pub fn root_candidates(config: &DeployConfig, invocation_dir: &Path, home: &Path) -> Vec<Candidate> {
    let name = &config.project_name;
    let mut candidates = vec![
        Candidate::new("invocation directory", invocation_dir.to_path_buf()),
        Candidate::new("project subdirectory", invocation_dir.join(name)),
    ];

    // Sibling checkout: `<parent>/<project>` next to the invocation
    // directory. When the invocation directory is itself named `<project>`
    // this probes the same place, so running from inside the project still
    // resolves.
    if let Some(parent) = invocation_dir.parent() {
        candidates.push(Candidate::new("sibling checkout", parent.join(name)));
    }

    candidates.push(Candidate::new("home directory", home.join(name)));
    candidates
}

/// Locate the project root, or fall back to the default guess under the
/// home directory. The default is validated like any other candidate; if it
/// too lacks the marker, every probed location is reported.
pub fn locate_root(
    config: &DeployConfig,
    invocation_dir: &Path,
    home: &Path,
) -> DeployResult<PathBuf> {
    let candidates = root_candidates(config, invocation_dir, home);
    if let Some(found) = resolve(&candidates, ROOT_MARKER) {
        return Ok(found.dir.clone());
    }

    let default_guess = home.join(&config.project_name);
    if default_guess.join(ROOT_MARKER).is_file() {
        return Ok(default_guess);
    }

    let mut probed: Vec<PathBuf> = candidates.into_iter().map(|c| c.dir).collect();
    if !probed.contains(&default_guess) {
        probed.push(default_guess);
    }
    Err(DeployError::ProjectNotFound {
        marker: ROOT_MARKER.to_string(),
        candidates: probed,
    })
}

/// Settings-file locations inside the root, in priority order
pub fn settings_candidates(root: &Path, project_name: &str) -> Vec<PathBuf> {
    vec![
        root.join("backend").join("settings.py"),
        root.join(project_name).join("settings.py"),
        root.join("settings.py"),
    ]
}

/// Locate the settings source file inside the resolved root
pub fn locate_settings(root: &Path, project_name: &str) -> DeployResult<PathBuf> {
    let candidates = settings_candidates(root, project_name);
    candidates
        .iter()
        .find(|p| p.is_file())
        .cloned()
        .ok_or(DeployError::SettingsNotFound { candidates })
}

/// Manifest locations, deliberately independent of the root order: the
/// manifest may sit next to the invoker rather than inside the project.
pub fn manifest_candidates(invocation_dir: &Path, root: &Path) -> Vec<Candidate> {
    let mut candidates = vec![
        Candidate::new("invocation directory", invocation_dir.to_path_buf()),
        Candidate::new("project root", root.to_path_buf()),
    ];
    if let Some(parent) = root.parent() {
        candidates.push(Candidate::new("project-root parent", parent.to_path_buf()));
    }
    candidates
}

/// Locate the dependency manifest
pub fn locate_manifest(invocation_dir: &Path, root: &Path) -> DeployResult<PathBuf> {
    let candidates = manifest_candidates(invocation_dir, root);
    if let Some(found) = resolve(&candidates, MANIFEST_NAME) {
        return Ok(found.dir.join(MANIFEST_NAME));
    }
    Err(DeployError::ManifestNotFound {
        name: MANIFEST_NAME.to_string(),
        candidates: candidates.into_iter().map(|c| c.dir).collect(),
    })
}

/// Resolve the full layout for a run
pub fn locate_project(
    config: &DeployConfig,
    invocation_dir: &Path,
    home: &Path,
) -> DeployResult<ProjectLayout> {
    let root = locate_root(config, invocation_dir, home)?;
    let settings_file = locate_settings(&root, &config.project_name)?;
    let manifest = locate_manifest(invocation_dir, &root)?;
    Ok(ProjectLayout {
        root,
        settings_file,
        manifest,
    })
}

/// True when the settings file sits under `<root>/<project_name>/`, which
/// selects the `<project>.settings` module reference in the descriptor.
pub fn settings_under_project_dir(layout: &ProjectLayout, project_name: &str) -> bool {
    layout
        .settings_file
        .parent()
        .and_then(|p| p.file_name())
        .is_some_and(|n| n == project_name)
}
