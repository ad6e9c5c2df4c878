//! Embeddable core library for protofix.
//!
//! Provides a clap-free entry point for rewriting the imports of generated
//! Python protobuf modules into package-relative form.
//!
//! # Port traits
//!
//! - [`ManifestSource`] supplies the files and their dependencies
//! - [`ArtifactSink`](ports::ArtifactSink) receives each rewritten artifact
//!
//! The [`adapters`] module provides the overwrite, emit and in-memory sinks.
//!
//! # Entry point
//!
//! - [`fix_imports`](pipeline::fix_imports)

pub mod adapters;
pub mod error;
pub mod exclusion;
pub mod package;
pub mod pipeline;
pub mod ports;
pub mod settings;

pub use error::ToolError;
pub use pipeline::{FixOutcome, fix_imports};
pub use settings::{DEFAULT_MODULE_SUFFIXES, FixSettings, GOOGLE_PROTOBUF_GLOB};

// Re-export manifest types so embedders don't need protofix-manifest directly.
pub use protofix_manifest::{InMemoryManifest, ManifestSource, ProtoFile};
