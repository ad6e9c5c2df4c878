//! Clap-free settings for the fix-imports pipeline.

use camino::Utf8PathBuf;

/// Suffixes of the modules protoc, grpc and mypy-protobuf generate.
pub const DEFAULT_MODULE_SUFFIXES: [&str; 4] = ["_pb2.py", "_pb2.pyi", "_pb2_grpc.py", "_pb2_grpc.pyi"];

/// Well-known types ship with the protobuf runtime; their imports already resolve.
pub const GOOGLE_PROTOBUF_GLOB: &str = "google/protobuf/*";

pub const STUB_SUFFIX: &str = ".pyi";

#[derive(Debug, Clone)]
pub struct FixSettings {
    /// Directory holding the generated Python code.
    pub python_out: Utf8PathBuf,

    /// Materialize `__init__.py` (and `__init__.pyi` when stubs are processed)
    /// in every directory under `python_out`.
    pub create_package: bool,

    pub module_suffixes: Vec<String>,

    /// Logical paths matching any of these are neither rewritten nor used
    /// as rewrite targets.
    pub exclude_imports_glob: Vec<String>,
}

impl FixSettings {
    pub fn new(python_out: impl Into<Utf8PathBuf>) -> Self {
        Self {
            python_out: python_out.into(),
            ..Self::default()
        }
    }

    /// Whether any processed suffix is a type stub.
    pub fn wants_stub_index(&self) -> bool {
        self.module_suffixes.iter().any(|s| s.ends_with(STUB_SUFFIX))
    }
}

impl Default for FixSettings {
    fn default() -> Self {
        Self {
            python_out: Utf8PathBuf::from("."),
            create_package: false,
            module_suffixes: DEFAULT_MODULE_SUFFIXES.iter().map(|s| s.to_string()).collect(),
            exclude_imports_glob: Vec::new(),
        }
    }
}
