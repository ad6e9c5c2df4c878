//! Default artifact sinks.

use crate::ports::ArtifactSink;
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io::Write;
use tracing::debug;

/// Overwrites artifacts in place. Unchanged files are not touched.
#[derive(Debug, Clone, Default)]
pub struct OverwriteSink;

impl ArtifactSink for OverwriteSink {
    fn accept(&self, path: &Utf8Path, contents: &str) -> anyhow::Result<()> {
        if let Ok(existing) = fs::read_to_string(path)
            && existing == contents
        {
            debug!(path = %path, "artifact unchanged");
            return Ok(());
        }
        fs::write(path, contents).with_context(|| format!("write {}", path))
    }
}

/// Writes rewritten text to a stream; the disk is left alone.
#[derive(Debug)]
pub struct EmitSink<W: Write> {
    out: RefCell<W>,
}

impl<W: Write> EmitSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: RefCell::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

impl EmitSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> ArtifactSink for EmitSink<W> {
    fn accept(&self, path: &Utf8Path, contents: &str) -> anyhow::Result<()> {
        let mut out = self.out.borrow_mut();
        out.write_all(contents.as_bytes())
            .and_then(|()| {
                if contents.ends_with('\n') {
                    Ok(())
                } else {
                    out.write_all(b"\n")
                }
            })
            .and_then(|()| out.flush())
            .with_context(|| format!("emit {}", path))
    }
}

/// Collects artifacts in memory, for embedding and testing.
#[derive(Debug, Default)]
pub struct MemorySink {
    artifacts: RefCell<BTreeMap<Utf8PathBuf, String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &Utf8Path) -> Option<String> {
        self.artifacts.borrow().get(path).cloned()
    }

    pub fn paths(&self) -> Vec<Utf8PathBuf> {
        self.artifacts.borrow().keys().cloned().collect()
    }

    pub fn into_inner(self) -> BTreeMap<Utf8PathBuf, String> {
        self.artifacts.into_inner()
    }
}

impl ArtifactSink for MemorySink {
    fn accept(&self, path: &Utf8Path, contents: &str) -> anyhow::Result<()> {
        self.artifacts
            .borrow_mut()
            .insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }
}
