//! Per-file rule registry and rewrite entry point.

use crate::error::{RewriteError, RewriteResult};
use crate::matcher::matches;
use crate::replacement::Replacement;
use crate::transform::ImportTransformer;
use crate::tree::{ImportStmt, Value, parse_module};
use regex::{NoExpand, Regex};
use tracing::debug;

#[derive(Debug)]
struct TreeRule {
    template: String,
    pattern: Value,
    replacement: ImportStmt,
}

#[derive(Debug)]
struct TextRule {
    old: String,
    pattern: Regex,
    new: String,
}

/// Ordered rewrite rules for the generated modules of one proto file.
///
/// Instances never share rules; build one per file.
#[derive(Debug, Default)]
pub struct ImportRewriter {
    tree_rules: Vec<TreeRule>,
    text_rules: Vec<TextRule>,
}

impl ImportRewriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a replacement.
    ///
    /// Registering a tree pattern that an existing rule already matches is
    /// a no-op. A pattern matching more than one existing rule means the
    /// rule set is inconsistent and is reported as
    /// [`RewriteError::AmbiguousRule`].
    pub fn register_rewrite(&mut self, replacement: &Replacement) -> RewriteResult<()> {
        match replacement {
            Replacement::Tree { old, new } => self.register_tree(old, new),
            Replacement::Text { old, new } => self.register_text(old, new),
        }
    }

    pub fn register_all<'a>(
        &mut self,
        replacements: impl IntoIterator<Item = &'a Replacement>,
    ) -> RewriteResult<()> {
        for replacement in replacements {
            self.register_rewrite(replacement)?;
        }
        Ok(())
    }

    fn register_tree(&mut self, old: &str, new: &str) -> RewriteResult<()> {
        let pattern = Value::Node(ImportStmt::parse_single(old)?.to_node());
        let replacement = ImportStmt::parse_single(new)?;

        let hits = self
            .tree_rules
            .iter()
            .filter(|rule| matches(&pattern, &rule.pattern))
            .count();

        match hits {
            0 => {
                debug!(old, new, "registered tree rewrite");
                self.tree_rules.push(TreeRule {
                    template: old.to_string(),
                    pattern,
                    replacement,
                });
                Ok(())
            }
            1 => {
                debug!(old, "tree rewrite already registered");
                Ok(())
            }
            n => Err(RewriteError::AmbiguousRule {
                pattern: old.to_string(),
                matches: n,
            }),
        }
    }

    fn register_text(&mut self, old: &str, new: &str) -> RewriteResult<()> {
        if self.text_rules.iter().any(|rule| rule.old == old) {
            debug!(old, "text rewrite already registered");
            return Ok(());
        }

        let pattern = Regex::new(&format!("(?mR)^{}$", regex::escape(old))).map_err(|e| {
            RewriteError::TextPattern {
                pattern: old.to_string(),
                message: e.to_string(),
            }
        })?;
        debug!(old, new, "registered text rewrite");
        self.text_rules.push(TextRule {
            old: old.to_string(),
            pattern,
            new: new.to_string(),
        });
        Ok(())
    }

    pub fn tree_rule_count(&self) -> usize {
        self.tree_rules.len()
    }

    pub fn text_rule_count(&self) -> usize {
        self.text_rules.len()
    }

    /// The replacement for the first rule whose pattern matches `node`.
    pub(crate) fn find(&self, node: &Value) -> Option<&ImportStmt> {
        self.tree_rules
            .iter()
            .find(|rule| matches(node, &rule.pattern))
            .map(|rule| {
                debug!(pattern = %rule.template, "tree rewrite matched");
                &rule.replacement
            })
    }

    pub fn rewrite(&self, source: &str) -> RewriteResult<String> {
        self.rewrite_file("<source>", source)
    }

    /// Rewrite one generated module; `path` only labels parse errors.
    pub fn rewrite_file(&self, path: &str, source: &str) -> RewriteResult<String> {
        let mut text = source.to_string();
        for rule in &self.text_rules {
            if rule.pattern.is_match(&text) {
                debug!(path, old = %rule.old, new = %rule.new, "text rewrite matched");
                text = rule
                    .pattern
                    .replace_all(&text, NoExpand(&rule.new))
                    .into_owned();
            }
        }

        let suite = parse_module(&text, path)?;
        Ok(ImportTransformer::new(self).transform(&text, &suite))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replacement::build_rewrites;
    use pretty_assertions::assert_eq;

    #[test]
    fn registering_the_same_edge_twice_is_idempotent() {
        let mut rewriter = ImportRewriter::new();
        let rewrites = build_rewrites("a", "foo");
        rewriter.register_all(&rewrites).unwrap();
        rewriter.register_all(&rewrites).unwrap();
        assert_eq!(rewriter.tree_rule_count(), 1);
        assert_eq!(rewriter.text_rule_count(), 1);
    }

    #[test]
    fn near_colliding_edges_register_separately() {
        let pairs = [("foo", "foo/foo"), ("a_b", "a/b"), ("a/b_c", "a_b/c"), ("x-y", "x_y")];
        for (first, second) in pairs {
            let mut rewriter = ImportRewriter::new();
            rewriter.register_all(&build_rewrites("svc", "svc")).unwrap();
            rewriter.register_all(&build_rewrites("svc", first)).unwrap();
            rewriter.register_all(&build_rewrites("svc", second)).unwrap();

            let distinct = build_rewrites("svc", first)[0].old() != build_rewrites("svc", second)[0].old();
            let expected = if distinct { 3 } else { 2 };
            assert_eq!(rewriter.tree_rule_count(), expected, "{first} vs {second}");
        }
    }

    #[test]
    fn ambiguous_rule_set_is_rejected() {
        let mut rewriter = ImportRewriter::new();
        rewriter
            .register_rewrite(&Replacement::Tree {
                old: "import foo_pb2 as foo__pb2".to_string(),
                new: "from . import foo_pb2 as foo__pb2".to_string(),
            })
            .unwrap();
        // Only reachable by bypassing registration; simulates a broken rule set.
        let duplicate = TreeRule {
            template: "import foo_pb2 as foo__pb2".to_string(),
            pattern: Value::Node(
                ImportStmt::parse_single("import foo_pb2 as foo__pb2")
                    .unwrap()
                    .to_node(),
            ),
            replacement: ImportStmt::parse_single("from . import foo_pb2 as foo__pb2").unwrap(),
        };
        rewriter.tree_rules.push(duplicate);

        let err = rewriter
            .register_rewrite(&Replacement::Tree {
                old: "import foo_pb2 as foo__pb2".to_string(),
                new: "from .. import foo_pb2 as foo__pb2".to_string(),
            })
            .unwrap_err();
        assert_eq!(
            err,
            RewriteError::AmbiguousRule {
                pattern: "import foo_pb2 as foo__pb2".to_string(),
                matches: 2,
            }
        );
    }

    #[test]
    fn invalid_template_is_reported() {
        let mut rewriter = ImportRewriter::new();
        let err = rewriter
            .register_rewrite(&Replacement::Tree {
                old: "def f(): pass".to_string(),
                new: "from . import f".to_string(),
            })
            .unwrap_err();
        assert!(matches!(err, RewriteError::InvalidTemplate { .. }));
    }

    #[test]
    fn text_rule_is_line_anchored() {
        let mut rewriter = ImportRewriter::new();
        rewriter.register_all(&build_rewrites("a", "foo")).unwrap();

        let src = "import foo_pb2\nimport foo_pb2_grpc\n# import foo_pb2\n";
        let out = rewriter.rewrite(src).unwrap();
        assert_eq!(
            out,
            "from . import foo_pb2\nimport foo_pb2_grpc\n# import foo_pb2\n"
        );
    }

    #[test]
    fn text_rule_handles_crlf() {
        let mut rewriter = ImportRewriter::new();
        rewriter.register_all(&build_rewrites("a", "foo")).unwrap();

        let out = rewriter.rewrite("import foo_pb2\r\nx = 1\r\n").unwrap();
        assert_eq!(out, "from . import foo_pb2\r\nx = 1\r\n");
    }

    #[test]
    fn unparsable_source_fails() {
        let rewriter = ImportRewriter::new();
        let err = rewriter.rewrite_file("bad_pb2.py", "import (\n").unwrap_err();
        assert!(matches!(err, RewriteError::Parse { .. }));
    }

    #[test]
    fn source_without_rules_is_unchanged() {
        let rewriter = ImportRewriter::new();
        let src = "import sys\nfrom google.protobuf import descriptor as _descriptor\n";
        assert_eq!(rewriter.rewrite(src).unwrap(), src);
    }
}
