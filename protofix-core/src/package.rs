//! Package markers and stub indexes for the output tree.
//!
//! Every directory under the output root gets an empty `__init__.py` when it
//! lacks one. When stubs are processed, each directory also gets an
//! `__init__.pyi` re-exporting its stub modules and stub-bearing
//! subpackages; lines already present are kept in their original order.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use indexmap::IndexSet;
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

pub const PACKAGE_MARKER: &str = "__init__.py";
pub const STUB_INDEX: &str = "__init__.pyi";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PackageOutcome {
    pub markers_created: Vec<Utf8PathBuf>,
    pub stub_indexes_written: Vec<Utf8PathBuf>,
}

pub fn ensure_packages(root: &Utf8Path, stub_index: bool) -> anyhow::Result<PackageOutcome> {
    let mut outcome = PackageOutcome::default();

    for dir in package_dirs(root)? {
        let marker = dir.join(PACKAGE_MARKER);
        if !marker.exists() {
            fs::write(&marker, "")?;
            info!(path = %marker, "created package marker");
            outcome.markers_created.push(marker);
        }

        if stub_index && update_stub_index(&dir)? {
            outcome.stub_indexes_written.push(dir.join(STUB_INDEX));
        }
    }

    Ok(outcome)
}

/// The root and every directory below it, skipping build caches and hidden dirs.
pub fn package_dirs(root: &Utf8Path) -> anyhow::Result<Vec<Utf8PathBuf>> {
    let mut dirs = Vec::new();
    for entry in WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_skipped(e))
    {
        let entry = entry.with_context(|| format!("walk {}", root))?;
        if !entry.file_type().is_dir() {
            continue;
        }
        let path = Utf8PathBuf::from_path_buf(entry.into_path())
            .map_err(|p| anyhow::anyhow!("non-UTF-8 path: {}", p.display()))?;
        dirs.push(path);
    }
    Ok(dirs)
}

fn is_skipped(entry: &DirEntry) -> bool {
    entry.file_type().is_dir() && is_skipped_dir_name(&entry.file_name().to_string_lossy())
}

fn is_skipped_dir_name(name: &str) -> bool {
    name == "__pycache__" || name.starts_with('.')
}

/// Merge the desired re-export lines into `dir/__init__.pyi`.
///
/// Returns whether the file was written. A directory with nothing to
/// re-export and no existing index is left alone.
pub fn update_stub_index(dir: &Utf8Path) -> anyhow::Result<bool> {
    let index = dir.join(STUB_INDEX);
    let desired = desired_stub_lines(dir)?;

    let existing = if index.exists() {
        Some(fs::read_to_string(&index)?)
    } else {
        None
    };
    if existing.is_none() && desired.is_empty() {
        return Ok(false);
    }

    match merge_lines(existing.as_deref().unwrap_or(""), &desired) {
        Some(merged) => {
            fs::write(&index, merged)?;
            debug!(path = %index, "wrote stub index");
            Ok(true)
        }
        None => Ok(false),
    }
}

/// `from . import <name>` for every immediate stub module and every
/// immediate subdirectory with a stub somewhere beneath it.
pub fn desired_stub_lines(dir: &Utf8Path) -> anyhow::Result<Vec<String>> {
    let mut names = BTreeSet::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = Utf8PathBuf::from_path_buf(entry.path())
            .map_err(|p| anyhow::anyhow!("non-UTF-8 path: {}", p.display()))?;
        let Some(name) = path.file_name() else {
            continue;
        };

        if path.is_dir() {
            if !is_skipped_dir_name(name) && is_identifier(name) && contains_stub(&path) {
                names.insert(name.to_string());
            }
        } else if path.extension() == Some("pyi")
            && let Some(stem) = path.file_stem()
            && stem != "__init__"
            && is_identifier(stem)
        {
            names.insert(stem.to_string());
        }
    }

    Ok(names
        .into_iter()
        .map(|name| format!("from . import {name}"))
        .collect())
}

fn contains_stub(dir: &Utf8Path) -> bool {
    WalkDir::new(dir)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_skipped(e))
        .filter_map(Result::ok)
        .any(|e| e.file_type().is_file() && e.path().extension().is_some_and(|ext| ext == "pyi"))
}

/// Python identifier check; non-ASCII letters are accepted as Python 3 does.
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c == '_' || c.is_alphabetic())
        && chars.all(|c| c == '_' || c.is_alphanumeric())
}

/// `existing` kept verbatim with the desired lines it lacks appended, or
/// `None` when nothing is added.
pub fn merge_lines(existing: &str, desired: &[String]) -> Option<String> {
    let present: HashSet<&str> = existing.lines().collect();
    let missing: IndexSet<&str> = desired
        .iter()
        .map(String::as_str)
        .filter(|line| !present.contains(line))
        .collect();
    if missing.is_empty() {
        return None;
    }

    let mut out = existing.to_string();
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    for line in missing {
        out.push_str(line);
        out.push('\n');
    }
    Some(out)
}
