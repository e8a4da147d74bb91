//! Idempotent settings patching
//!
//! `patch` drops every existing managed span (and any block left behind by
//! the pre-sentinel version of this tool) and appends a freshly rendered
//! block at end of file. Applying it twice with the same block yields the
//! same text as applying it once.
//!
//! `apply_to_file` performs the rewrite with an exclusive advisory lock and
//! a write-to-temp-then-rename replacement, so an interrupted run can never
//! leave a half-written settings file behind.

use std::fs::OpenOptions;
use std::io::{Read, Write};
use std::path::Path;

use fs2::FileExt;

use crate::error::{DeployError, DeployResult};
use crate::settings::block::{BLOCK_BEGIN, BLOCK_END};

/// Banner line of the legacy (heuristic-era) block
const LEGACY_BANNER: &str = "# ============================================";

/// Title substring identifying the legacy block's second line
const LEGACY_TITLE: &str = "Production Settings";

/// Guard variable the heuristic-era tool emitted in its host check
const LEGACY_GUARD: &str = "ON_PYTHONANYWHERE";

/// Lines between the banner footer and the host-check `if` (the guard
/// assignment plus blank spacing)
const LEGACY_IF_WINDOW: usize = 4;

/// Replace any existing managed block in `original` with `block_text`.
///
/// `file` is only used for error reporting. A begin sentinel without a
/// matching end sentinel is an error; nothing is guessed.
pub fn patch(original: &str, block_text: &str, file: &Path) -> DeployResult<String> {
    let lines: Vec<&str> = original.lines().collect();
    let mut kept: Vec<&str> = Vec::with_capacity(lines.len());

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];

        if line.trim_end() == BLOCK_BEGIN {
            let end = lines[i + 1..]
                .iter()
                .position(|l| l.trim_end() == BLOCK_END)
                .ok_or(DeployError::UnterminatedBlock {
                    file: file.to_path_buf(),
                    line: i + 1,
                })?;
            i += end + 2;
            continue;
        }

        if let Some(skip) = legacy_block_len(&lines[i..]) {
            i += skip;
            continue;
        }

        kept.push(line);
        i += 1;
    }

    // Everything outside managed spans is kept byte-for-byte. Only the seam
    // is normalized: a final newline, plus one separating blank line when
    // the remaining text does not already end blank.
    let mut result = kept.join("\n");
    if !kept.is_empty() {
        result.push('\n');
    }
    if kept.last().is_some_and(|l| !l.trim().is_empty()) {
        result.push('\n');
    }
    result.push_str(block_text);
    result.push('\n');
    Ok(result)
}

/// Length of a legacy block starting at `lines[0]`, or `None`.
///
/// Only the full legacy signature is stripped: banner, title line, a second
/// banner, then the `ON_PYTHONANYWHERE` host-check `if` within a few lines
/// (the guard assignment sits between). The span ends at the first
/// non-empty unindented line after the `if` body begins. Anything short of
/// the full signature is hand-written text and stays untouched.
fn legacy_block_len(lines: &[&str]) -> Option<usize> {
    if lines.len() < 4
        || !lines[0].trim_end().starts_with(LEGACY_BANNER)
        || !lines[1].contains(LEGACY_TITLE)
        || !lines[2].trim_end().starts_with(LEGACY_BANNER)
    {
        return None;
    }

    let mut body_start = None;
    for (i, line) in lines.iter().enumerate().skip(3).take(LEGACY_IF_WINDOW) {
        if line.trim_start().starts_with("if ") && line.contains(LEGACY_GUARD) {
            body_start = Some(i + 1);
            break;
        }
    }

    let mut i = body_start?;
    while i < lines.len() {
        let line = lines[i];
        if !line.trim().is_empty() && !line.starts_with(' ') && !line.starts_with('\t') {
            break;
        }
        i += 1;
    }
    Some(i)
}

/// Patch `path` in place: lock, read, patch in memory, write a sibling
/// temporary file, rename it over the original.
pub fn apply_to_file(path: &Path, block_text: &str) -> DeployResult<()> {
    let mut file = OpenOptions::new()
        .read(true)
        .open(path)
        .map_err(|e| patch_error(path, format!("open: {e}")))?;
    file.lock_exclusive()
        .map_err(|e| patch_error(path, format!("lock: {e}")))?;

    let mut original = String::new();
    file.read_to_string(&mut original)
        .map_err(|e| patch_error(path, format!("read: {e}")))?;

    let patched = patch(&original, block_text, path)?;

    let dir = path
        .parent()
        .ok_or_else(|| patch_error(path, "no parent directory".to_string()))?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .map_err(|e| patch_error(path, format!("create temp file: {e}")))?;
    tmp.write_all(patched.as_bytes())
        .map_err(|e| patch_error(path, format!("write temp file: {e}")))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| patch_error(path, format!("sync temp file: {e}")))?;
    tmp.persist(path)
        .map_err(|e| patch_error(path, format!("rename: {e}")))?;

    // The lock on the old inode is released when `file` drops.
    Ok(())
}

fn patch_error(path: &Path, message: String) -> DeployError {
    DeployError::ConfigPatch {
        path: path.to_path_buf(),
        message,
    }
}
