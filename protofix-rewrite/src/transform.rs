//! Visitor applying tree rules to the top-level imports of a module.

use crate::engine::ImportRewriter;
use crate::tree::{ImportStmt, Value};
use indexmap::IndexSet;
use rustpython_parser::ast;
use std::ops::Range;
use tracing::debug;

enum Edit {
    Replace(Range<usize>, String),
    Drop(Range<usize>),
}

/// Rewrites the top-level import statements of one module.
///
/// An import whose resulting text was already emitted earlier in the same
/// module is dropped. This covers every top-level import, rewritten or
/// not. A dependency can need both a tree and a text rewrite, and the two
/// may converge on the same line.
pub struct ImportTransformer<'a> {
    rewriter: &'a ImportRewriter,
    seen: IndexSet<String>,
}

impl<'a> ImportTransformer<'a> {
    pub fn new(rewriter: &'a ImportRewriter) -> Self {
        Self {
            rewriter,
            seen: IndexSet::new(),
        }
    }

    /// Apply the rules to `suite`, which must have been parsed from `source`.
    pub fn transform(mut self, source: &str, suite: &[ast::Stmt]) -> String {
        let mut edits = Vec::new();

        for stmt in suite {
            let Some((import, span)) = ImportStmt::from_ast(stmt) else {
                continue;
            };
            if let Some(edit) = self.visit_import(source, &import, span) {
                edits.push(edit);
            }
        }

        apply_edits(source, edits)
    }

    fn visit_import(
        &mut self,
        source: &str,
        import: &ImportStmt,
        span: Range<usize>,
    ) -> Option<Edit> {
        let node = Value::Node(import.to_located_node(&span));
        let rewritten = self.rewriter.find(&node);
        let text = rewritten.unwrap_or(import).to_string();

        if !self.seen.insert(text.clone()) {
            debug!(import = %text, "dropping duplicate import");
            return Some(Edit::Drop(statement_line(source, span)));
        }

        rewritten.map(|_| Edit::Replace(span, text))
    }
}

/// Widen `span` to its whole line when nothing else shares the line, and
/// through a trailing `;` separator otherwise.
fn statement_line(source: &str, span: Range<usize>) -> Range<usize> {
    let line_start = source[..span.start].rfind('\n').map_or(0, |i| i + 1);
    let rest = &source[span.end..];
    let line_len = rest.find('\n').map_or(rest.len(), |i| i + 1);

    if source[line_start..span.start].trim().is_empty() && rest[..line_len].trim().is_empty() {
        return line_start..span.end + line_len;
    }

    let after = rest.trim_start_matches([' ', '\t']);
    match after.strip_prefix(';') {
        Some(tail) => {
            let tail = tail.trim_start_matches([' ', '\t']);
            span.start..source.len() - tail.len()
        }
        None => span,
    }
}

fn apply_edits(source: &str, mut edits: Vec<Edit>) -> String {
    let mut out = source.to_string();
    edits.sort_by_key(|edit| match edit {
        Edit::Replace(span, _) | Edit::Drop(span) => span.start,
    });
    for edit in edits.into_iter().rev() {
        match edit {
            Edit::Replace(span, text) => out.replace_range(span, &text),
            Edit::Drop(span) => out.replace_range(span, ""),
        }
    }
    out
}
