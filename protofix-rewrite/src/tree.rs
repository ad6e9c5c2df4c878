//! Import statement trees.
//!
//! Parsed Python statements are lowered into a small generic tree
//! ([`Value`] / [`Node`]) that the matcher walks. Only the two import
//! statement kinds the protobuf compiler emits are represented; everything
//! else in a module is left to the source text.

use crate::error::{RewriteError, RewriteResult};
use rustpython_parser::{Parse, ast};
use std::fmt;
use std::ops::Range;

/// Primitive attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Leaf {
    None,
    Str(String),
    Int(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Import,
    ImportFrom,
    Alias,
}

/// A tree node: a kind plus ordered, named attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    kind: NodeKind,
    fields: Vec<(&'static str, Value)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Node(Node),
    Seq(Vec<Value>),
    Leaf(Leaf),
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            fields: Vec::new(),
        }
    }

    pub fn with(mut self, name: &'static str, value: Value) -> Self {
        self.fields.push((name, value));
        self
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.fields.iter().map(|(name, value)| (*name, value))
    }
}

impl From<Node> for Value {
    fn from(node: Node) -> Self {
        Value::Node(node)
    }
}

impl From<Option<&str>> for Value {
    fn from(value: Option<&str>) -> Self {
        match value {
            Some(s) => Value::Leaf(Leaf::Str(s.to_string())),
            None => Value::Leaf(Leaf::None),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    pub name: String,
    pub asname: Option<String>,
}

impl Alias {
    pub fn new(name: impl Into<String>, asname: Option<&str>) -> Self {
        Self {
            name: name.into(),
            asname: asname.map(str::to_string),
        }
    }

    fn from_ast(alias: &ast::Alias) -> Self {
        Self {
            name: alias.name.as_str().to_string(),
            asname: alias.asname.as_ref().map(|n| n.as_str().to_string()),
        }
    }

    fn to_node(&self) -> Node {
        Node::new(NodeKind::Alias)
            .with("name", Some(self.name.as_str()).into())
            .with("asname", self.asname.as_deref().into())
    }
}

impl fmt::Display for Alias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.asname {
            Some(asname) => write!(f, "{} as {}", self.name, asname),
            None => f.write_str(&self.name),
        }
    }
}

/// One top-level `import ...` or `from ... import ...` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportStmt {
    Import {
        names: Vec<Alias>,
    },
    ImportFrom {
        module: Option<String>,
        names: Vec<Alias>,
        level: u32,
    },
}

impl ImportStmt {
    /// Parse a template consisting of exactly one import statement.
    pub fn parse_single(template: &str) -> RewriteResult<Self> {
        let invalid = |message: &str| RewriteError::InvalidTemplate {
            template: template.to_string(),
            message: message.to_string(),
        };

        let suite = parse_module(template, "<template>").map_err(|e| invalid(&e.to_string()))?;
        match suite.as_slice() {
            [stmt] => Self::from_ast(stmt)
                .map(|(import, _)| import)
                .ok_or_else(|| invalid("not an import statement")),
            _ => Err(invalid("expected exactly one statement")),
        }
    }

    /// Convert a parsed statement, returning the byte span it occupies.
    pub fn from_ast(stmt: &ast::Stmt) -> Option<(Self, Range<usize>)> {
        match stmt {
            ast::Stmt::Import(import) => Some((
                ImportStmt::Import {
                    names: import.names.iter().map(Alias::from_ast).collect(),
                },
                usize::from(import.range.start())..usize::from(import.range.end()),
            )),
            ast::Stmt::ImportFrom(import) => Some((
                ImportStmt::ImportFrom {
                    module: import.module.as_ref().map(|m| m.as_str().to_string()),
                    names: import.names.iter().map(Alias::from_ast).collect(),
                    level: import.level.map_or(0, |level| level.to_u32()),
                },
                usize::from(import.range.start())..usize::from(import.range.end()),
            )),
            _ => None,
        }
    }

    /// Lower to a template tree carrying only syntactic attributes.
    pub fn to_node(&self) -> Node {
        match self {
            ImportStmt::Import { names } => {
                Node::new(NodeKind::Import).with("names", alias_seq(names))
            }
            ImportStmt::ImportFrom {
                module,
                names,
                level,
            } => Node::new(NodeKind::ImportFrom)
                .with("module", module.as_deref().into())
                .with("names", alias_seq(names))
                .with("level", Value::Leaf(Leaf::Int(u64::from(*level)))),
        }
    }

    /// Lower a statement found in real source, recording where it sits.
    pub fn to_located_node(&self, span: &Range<usize>) -> Node {
        self.to_node()
            .with("start", Value::Leaf(Leaf::Int(span.start as u64)))
            .with("end", Value::Leaf(Leaf::Int(span.end as u64)))
    }
}

fn alias_seq(names: &[Alias]) -> Value {
    Value::Seq(names.iter().map(|a| Value::Node(a.to_node())).collect())
}

fn join_aliases(f: &mut fmt::Formatter<'_>, names: &[Alias]) -> fmt::Result {
    for (i, alias) in names.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{alias}")?;
    }
    Ok(())
}

impl fmt::Display for ImportStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportStmt::Import { names } => {
                f.write_str("import ")?;
                join_aliases(f, names)
            }
            ImportStmt::ImportFrom {
                module,
                names,
                level,
            } => {
                f.write_str("from ")?;
                for _ in 0..*level {
                    f.write_str(".")?;
                }
                if let Some(module) = module {
                    f.write_str(module)?;
                }
                f.write_str(" import ")?;
                join_aliases(f, names)
            }
        }
    }
}

/// Parse a whole module into its top-level statements.
pub fn parse_module(source: &str, path: &str) -> RewriteResult<Vec<ast::Stmt>> {
    ast::Suite::parse(source, path).map_err(|e| RewriteError::Parse {
        path: path.to_string(),
        message: e.to_string(),
    })
}
