//! Configuration file loading for protofix.
//!
//! Discovers and loads `protofix.toml` from the working directory.
//! Merges config file settings with CLI arguments (CLI takes precedence).

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use protofix_core::{DEFAULT_MODULE_SUFFIXES, GOOGLE_PROTOBUF_GLOB};
use serde::Deserialize;
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "protofix.toml";

/// Top-level configuration from protofix.toml. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProtofixConfig {
    /// Replaces the default suffix list when set.
    pub module_suffixes: Option<Vec<String>>,

    /// Extra exclusion globs over logical paths.
    pub exclude_imports_glob: Vec<String>,

    /// Skip `google/protobuf/*` (default: true).
    pub exclude_google_imports: Option<bool>,

    /// Create `__init__.py` / `__init__.pyi` files (default: false).
    pub create_package: Option<bool>,

    /// Overwrite artifacts instead of printing them (default: false).
    pub in_place: Option<bool>,
}

/// Discover the protofix.toml config file in `dir`.
pub fn discover_config(dir: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = dir.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

pub fn load_config(path: &Utf8Path) -> anyhow::Result<ProtofixConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

pub fn parse_config(contents: &str) -> anyhow::Result<ProtofixConfig> {
    let config: ProtofixConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load config from `dir`, or return default if not found.
pub fn load_or_default(dir: &Utf8Path) -> anyhow::Result<ProtofixConfig> {
    match discover_config(dir) {
        Some(path) => load_config(&path),
        None => Ok(ProtofixConfig::default()),
    }
}

/// Options as given on the command line; `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct CliOptions {
    pub module_suffixes: Vec<String>,
    pub exclude_imports_glob: Vec<String>,
    pub exclude_google_imports: Option<bool>,
    pub create_package: Option<bool>,
    pub in_place: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedConfig {
    pub module_suffixes: Vec<String>,
    /// Exclusion globs, including the google glob when enabled.
    pub exclude_imports_glob: Vec<String>,
    pub create_package: bool,
    pub in_place: bool,
}

/// Builder for merging config file with CLI arguments.
pub struct ConfigMerger {
    config: ProtofixConfig,
}

impl ConfigMerger {
    pub fn new(config: ProtofixConfig) -> Self {
        Self { config }
    }

    /// CLI suffixes replace the configured list; CLI globs extend it.
    pub fn merge(self, cli: &CliOptions) -> MergedConfig {
        let module_suffixes = if !cli.module_suffixes.is_empty() {
            cli.module_suffixes.clone()
        } else if let Some(suffixes) = self.config.module_suffixes {
            suffixes
        } else {
            DEFAULT_MODULE_SUFFIXES.iter().map(|s| s.to_string()).collect()
        };

        let mut exclude_imports_glob = Vec::new();
        let exclude_google = cli
            .exclude_google_imports
            .or(self.config.exclude_google_imports)
            .unwrap_or(true);
        if exclude_google {
            exclude_imports_glob.push(GOOGLE_PROTOBUF_GLOB.to_string());
        }
        for pattern in self
            .config
            .exclude_imports_glob
            .iter()
            .chain(&cli.exclude_imports_glob)
        {
            if !exclude_imports_glob.contains(pattern) {
                exclude_imports_glob.push(pattern.clone());
            }
        }

        MergedConfig {
            module_suffixes,
            exclude_imports_glob,
            create_package: cli
                .create_package
                .or(self.config.create_package)
                .unwrap_or(false),
            in_place: cli.in_place.or(self.config.in_place).unwrap_or(false),
        }
    }
}
