//! Derivation of import replacements from dependency edges.

/// An old/new pair of import statements.
///
/// `Tree` replacements are compared structurally against parsed import
/// statements. `Text` replacements are substituted as whole source lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Replacement {
    Tree { old: String, new: String },
    Text { old: String, new: String },
}

impl Replacement {
    pub fn old(&self) -> &str {
        match self {
            Replacement::Tree { old, .. } | Replacement::Text { old, .. } => old,
        }
    }

    pub fn replacement(&self) -> &str {
        match self {
            Replacement::Tree { new, .. } | Replacement::Text { new, .. } => new,
        }
    }
}

/// Module spelling of one logical path segment (`-` is not valid in a
/// Python module name, so the compiler emits `_`).
pub fn module_segment(segment: &str) -> String {
    segment.replace('-', "_")
}

/// Module spelling of a whole logical path, still `/`-separated.
pub fn module_path(logical_path: &str) -> String {
    logical_path
        .split('/')
        .map(module_segment)
        .collect::<Vec<_>>()
        .join("/")
}

/// Alias mangling used by the compiler: every `_` is doubled.
pub fn mangle(name: &str) -> String {
    name.replace('_', "__")
}

/// Build the replacements that make `proto`'s import of `dep` relative.
///
/// Both paths are logical paths (`/`-joined, no `.proto` suffix). `dep`
/// may equal `proto`; that self-edge rewrites a services module's import
/// of its sibling message module.
pub fn build_rewrites(proto: &str, dep: &str) -> [Replacement; 2] {
    let (package, leaf): (Vec<String>, &str) = match dep.rsplit_once('/') {
        Some((package, leaf)) => (package.split('/').map(module_segment).collect(), leaf),
        None => (Vec::new(), dep),
    };

    let depth = proto.matches('/').count() + 1;
    let dots = ".".repeat(depth);
    let module = format!("{}_pb2", module_segment(leaf));
    let leaf_alias = mangle(&module);

    let tree = if package.is_empty() {
        Replacement::Tree {
            old: format!("import {module} as {leaf_alias}"),
            new: format!("from {dots} import {module} as {leaf_alias}"),
        }
    } else {
        let from = package.join(".");
        let alias = package
            .iter()
            .map(|part| mangle(part))
            .chain(std::iter::once(leaf_alias))
            .collect::<Vec<_>>()
            .join("_dot_");
        Replacement::Tree {
            old: format!("from {from} import {module} as {alias}"),
            new: format!("from {dots}{from} import {module} as {alias}"),
        }
    };

    let text = match package.first() {
        None => Replacement::Text {
            old: format!("import {module}"),
            new: format!("from {dots} import {module}"),
        },
        Some(first) => Replacement::Text {
            old: format!("import {}.{module}", package.join(".")),
            new: format!("from {dots} import {first}"),
        },
    };

    [tree, text]
}
