//! WSGI entry-point descriptor
//!
//! The hosting platform starts the application from a WSGI file configured
//! in its dashboard. We render the full content once per run and overwrite
//! the previous version; regeneration is authoritative, manual edits to the
//! generated file do not survive.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::config::DeployConfig;
use crate::error::{DeployError, DeployResult};
use crate::layout::{settings_under_project_dir, ProjectLayout};

/// Fixed output filename inside the project root
pub const DESCRIPTOR_NAME: &str = "wsgi_config_generated.py";

/// Settings module used when the settings file is not under a directory
/// named after the project
pub const DEFAULT_SETTINGS_MODULE: &str = "backend.settings";

/// Dotted settings-module reference for the resolved layout
pub fn settings_module(layout: &ProjectLayout, config: &DeployConfig) -> String {
    if settings_under_project_dir(layout, &config.project_name) {
        format!("{}.settings", config.project_name)
    } else {
        DEFAULT_SETTINGS_MODULE.to_string()
    }
}

/// Render the descriptor text. Pure; embeds the absolute project root and
/// the settings-module reference.
pub fn render(layout: &ProjectLayout, config: &DeployConfig) -> String {
    render_with_timestamp(layout, config, &Local::now().format("%Y-%m-%d %H:%M").to_string())
}

/// Render with an explicit generated-on string. Split out so tests can pin
/// the timestamp.
pub fn render_with_timestamp(
    layout: &ProjectLayout,
    config: &DeployConfig,
    generated_on: &str,
) -> String {
    let module = settings_module(layout, config);
    let root = layout.root.display();
    format!(
        r#"# WSGI configuration generated by shipwright on {generated_on}.
# Copy this content into the WSGI file configured in the hosting dashboard.

import os
import sys

path = '{root}'
if path not in sys.path:
    sys.path.insert(0, path)

os.environ['DJANGO_SETTINGS_MODULE'] = '{module}'

from django.core.wsgi import get_wsgi_application
application = get_wsgi_application()
"#
    )
}

/// Write the rendered descriptor into the project root, replacing any prior
/// version atomically. Returns the output path.
pub fn write(layout: &ProjectLayout, config: &DeployConfig) -> DeployResult<PathBuf> {
    let path = layout.root.join(DESCRIPTOR_NAME);
    let content = render(layout, config);
    write_atomic(&path, &content)?;
    Ok(path)
}

fn write_atomic(path: &Path, content: &str) -> DeployResult<()> {
    let dir = path.parent().ok_or_else(|| DeployError::ConfigPatch {
        path: path.to_path_buf(),
        message: "no parent directory".to_string(),
    })?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.persist(path)
        .map_err(|e| DeployError::Io(e.error))?;
    Ok(())
}
