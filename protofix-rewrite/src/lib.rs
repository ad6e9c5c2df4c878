//! Import-rewrite engine for protobuf-generated Python modules.
//!
//! Responsibilities:
//! - Derive, for each dependency edge, the absolute import the compiler
//!   emitted and its package-relative replacement ([`build_rewrites`]).
//! - Hold per-file rule sets and apply them to a module's top-level
//!   imports by structural matching ([`ImportRewriter`]).
//!
//! Rewriting is idempotent: an already-relative import never matches an
//! absolute pattern, so a second pass leaves the text untouched.

mod engine;
mod error;
mod matcher;
mod replacement;
mod transform;
mod tree;

pub use engine::ImportRewriter;
pub use error::{RewriteError, RewriteResult};
pub use matcher::matches;
pub use replacement::{Replacement, build_rewrites, mangle, module_path, module_segment};
pub use transform::ImportTransformer;
pub use tree::{Alias, ImportStmt, Leaf, Node, NodeKind, Value, parse_module};
