//! Port traits abstracting artifact persistence away from the pipeline.

use camino::Utf8Path;

/// Receives each fully rewritten artifact.
///
/// Called once per artifact with its complete new text, never with a
/// partial transformation.
pub trait ArtifactSink {
    fn accept(&self, path: &Utf8Path, contents: &str) -> anyhow::Result<()>;
}
