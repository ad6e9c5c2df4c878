//! Error types for protofix-rewrite.
//!
//! Every variant is fatal for the artifact being rewritten:
//! - Parse failures mean the generated module is not valid Python.
//! - Template failures and ambiguous rules mean rule derivation is broken.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RewriteError {
    /// The source handed to the engine did not parse.
    #[error("parse error in {path}: {message}")]
    Parse { path: String, message: String },

    /// A replacement template is not a single import statement.
    #[error("invalid import template `{template}`: {message}")]
    InvalidTemplate { template: String, message: String },

    /// A pattern structurally matches more than one registered rule.
    #[error("more than one rewrite rule found for pattern `{pattern}` ({matches} matches)")]
    AmbiguousRule { pattern: String, matches: usize },

    /// A text-form pattern could not be compiled.
    #[error("invalid text pattern `{pattern}`: {message}")]
    TextPattern { pattern: String, message: String },
}

pub type RewriteResult<T> = Result<T, RewriteError>;
