use prost_types::FileDescriptorProto;

/// One `.proto` file of the manifest, as logical paths.
///
/// A logical path is the file's name relative to its search root with the
/// `.proto` suffix removed, e.g. `a/b/c/thing2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtoFile {
    pub logical_path: String,
    pub dependencies: Vec<String>,
}

impl ProtoFile {
    pub fn new(logical_path: impl Into<String>, dependencies: &[&str]) -> Self {
        Self {
            logical_path: logical_path.into(),
            dependencies: dependencies.iter().map(|d| d.to_string()).collect(),
        }
    }

    pub fn from_descriptor(fd: &FileDescriptorProto) -> Self {
        Self {
            logical_path: strip_proto_suffix(fd.name()).to_string(),
            dependencies: fd
                .dependency
                .iter()
                .map(|dep| strip_proto_suffix(dep).to_string())
                .collect(),
        }
    }
}

/// Remove a trailing `.proto`, leaving names without one untouched.
pub fn strip_proto_suffix(name: &str) -> &str {
    match name.strip_suffix(".proto") {
        Some(stem) if !stem.is_empty() => stem,
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn strips_suffix() {
        assert_eq!(strip_proto_suffix("a/b/c/thing2.proto"), "a/b/c/thing2");
        assert_eq!(strip_proto_suffix("thing"), "thing");
        assert_eq!(strip_proto_suffix(".proto"), ".proto");
        assert_eq!(strip_proto_suffix("x.proto.bak"), "x.proto.bak");
    }

    #[test]
    fn converts_descriptor() {
        let fd = FileDescriptorProto {
            name: Some("d/thing1.proto".to_string()),
            dependency: vec!["a/b/c/thing2.proto".to_string()],
            ..Default::default()
        };
        assert_eq!(
            ProtoFile::from_descriptor(&fd),
            ProtoFile::new("d/thing1", &["a/b/c/thing2"])
        );
    }
}
