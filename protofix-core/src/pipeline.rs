//! The fix-imports pipeline, extracted from the CLI.
//!
//! The manifest arrives through a [`ManifestSource`]; rewritten artifacts
//! leave through an [`ArtifactSink`]. Generated files are read straight
//! from `python_out`.

use crate::error::ToolError;
use crate::exclusion::ExclusionSet;
use crate::package::{PackageOutcome, ensure_packages};
use crate::ports::ArtifactSink;
use crate::settings::FixSettings;
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use protofix_manifest::{ManifestSource, ProtoFile};
use protofix_rewrite::{ImportRewriter, build_rewrites, module_path};
use tracing::{debug, info};

/// Outcome of `fix_imports`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FixOutcome {
    /// Artifacts handed to the sink, in processing order.
    pub rewritten: Vec<Utf8PathBuf>,
    /// Expected artifacts not found on disk.
    pub missing: Vec<Utf8PathBuf>,
    /// Manifest entries skipped by an exclusion glob.
    pub excluded: Vec<String>,
    pub packages: PackageOutcome,
}

/// Rewrite every generated module of every non-excluded manifest entry.
pub fn fix_imports(
    settings: &FixSettings,
    manifest: &dyn ManifestSource,
    sink: &dyn ArtifactSink,
) -> Result<FixOutcome, ToolError> {
    let exclusions = ExclusionSet::new(&settings.exclude_imports_glob)?;
    let files = manifest.load().context("load dependency manifest")?;
    debug!(files = files.len(), "loaded manifest");

    let mut outcome = FixOutcome::default();

    for file in &files {
        if exclusions.is_excluded(&file.logical_path) {
            debug!(file = %file.logical_path, "excluded");
            outcome.excluded.push(file.logical_path.clone());
            continue;
        }

        let rewriter = rewriter_for(file, &exclusions)
            .with_context(|| format!("build rewrite rules for {}", file.logical_path))?;

        for suffix in &settings.module_suffixes {
            let path = artifact_path(&settings.python_out, &file.logical_path, suffix);
            if !path.is_file() {
                debug!(path = %path, "artifact not generated");
                outcome.missing.push(path);
                continue;
            }

            let source = fs::read_to_string(&path).with_context(|| format!("read {}", path))?;
            let rewritten = rewriter
                .rewrite_file(path.as_str(), &source)
                .with_context(|| format!("rewrite imports in {}", path))?;
            sink.accept(&path, &rewritten)?;
            outcome.rewritten.push(path);
        }
    }

    if settings.create_package {
        outcome.packages = ensure_packages(&settings.python_out, settings.wants_stub_index())
            .context("create package markers")?;
    }

    info!(
        rewritten = outcome.rewritten.len(),
        missing = outcome.missing.len(),
        excluded = outcome.excluded.len(),
        "fixed imports"
    );
    Ok(outcome)
}

/// Rules for one file: its own module first, then each non-excluded dependency.
pub fn rewriter_for(file: &ProtoFile, exclusions: &ExclusionSet) -> anyhow::Result<ImportRewriter> {
    let mut rewriter = ImportRewriter::new();
    rewriter.register_all(&build_rewrites(&file.logical_path, &file.logical_path))?;

    for dep in &file.dependencies {
        if exclusions.is_excluded(dep) {
            debug!(file = %file.logical_path, dep = %dep, "dependency excluded");
            continue;
        }
        rewriter.register_all(&build_rewrites(&file.logical_path, dep))?;
    }

    Ok(rewriter)
}

/// `python_out/<module path><suffix>`, e.g. `out/d/thing1_pb2.py`.
pub fn artifact_path(python_out: &Utf8Path, logical_path: &str, suffix: &str) -> Utf8PathBuf {
    python_out.join(format!("{}{}", module_path(logical_path), suffix))
}
