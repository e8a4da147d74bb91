//! Deployment configuration
//!
//! A single `DeployConfig` value is built once at startup and threaded
//! through every component. Precedence, highest first:
//! 1. CLI flags
//! 2. `shipwright.toml` in the invocation directory
//! 3. Built-in defaults / environment detection

use std::path::Path;

use serde::Deserialize;

/// Hosting platform domain; the generated settings block toggles production
/// mode when the request's HTTP host contains this.
pub const PLATFORM_DOMAIN: &str = "pythonanywhere.com";

/// Marker file identifying a project root
pub const ROOT_MARKER: &str = "manage.py";

/// Dependency manifest filename
pub const MANIFEST_NAME: &str = "requirements.txt";

/// Config file read from the invocation directory, all fields optional
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    pub project: Option<String>,
    pub username: Option<String>,
    pub runtime: Option<String>,
}

impl ConfigFile {
    /// Load overrides from `path`. A missing or unreadable file yields the
    /// empty override set; a present but malformed file is an error so a
    /// typo does not silently fall back to defaults.
    pub fn load(path: &Path) -> Result<Self, toml::de::Error> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content),
            Err(_) => Ok(Self::default()),
        }
    }
}

/// Resolved deployment configuration, immutable for the whole run
#[derive(Debug, Clone)]
pub struct DeployConfig {
    /// Project folder name, also the hosting account's app name
    pub project_name: String,

    /// Hosting account username; forms the public hostname
    pub username: String,

    /// Python runtime version used to create the virtual environment
    pub runtime_version: String,

    /// Accept every checkpoint default without prompting
    pub assume_defaults: bool,

    /// Emit the final summary as JSON
    pub json: bool,
}

impl DeployConfig {
    /// Public hostname the deployed application answers on
    pub fn host(&self) -> String {
        format!("{}.{}", self.username, PLATFORM_DOMAIN)
    }

    /// Interpreter binary name for venv creation, e.g. `python3.10`
    pub fn python_binary(&self) -> String {
        format!("python{}", self.runtime_version)
    }
}

/// Detect the hosting account username from the environment, falling back
/// to the home directory's name.
pub fn detect_username() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .ok()
        .filter(|u| !u.is_empty())
        .or_else(|| {
            dirs::home_dir()
                .and_then(|h| h.file_name().map(|n| n.to_string_lossy().into_owned()))
        })
        .unwrap_or_else(|| "user".to_string())
}
