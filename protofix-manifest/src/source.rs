//! Manifest producers.
//!
//! Each source ends in a serialized `FileDescriptorSet`:
//! - [`Protoc`] runs `protoc --descriptor_set_out`.
//! - [`Buf`] runs `buf build` with the set written to stdout.
//! - [`RawDescriptorSet`] reads a pre-built set from a file or stdin.

use crate::descriptor::decode_file_descriptor_set;
use crate::error::ManifestError;
use crate::proto_file::ProtoFile;
use anyhow::Context;
use camino::Utf8PathBuf;
use fs_err as fs;
use std::ffi::OsString;
use std::io::Read;
use std::process::Command;
use tracing::{debug, info};

/// Source of the dependency manifest.
pub trait ManifestSource {
    fn load(&self) -> anyhow::Result<Vec<ProtoFile>>;
}

/// Sources that produce serialized descriptor-set bytes.
pub trait DescriptorSetSource {
    fn descriptor_set_bytes(&self) -> anyhow::Result<Vec<u8>>;
}

fn load_descriptor_set(source: &dyn DescriptorSetSource) -> anyhow::Result<Vec<ProtoFile>> {
    let bytes = source.descriptor_set_bytes()?;
    let files = decode_file_descriptor_set(&bytes).context("decode FileDescriptorSet")?;
    info!(files = files.len(), "loaded dependency manifest");
    Ok(files)
}

impl ManifestSource for Protoc {
    fn load(&self) -> anyhow::Result<Vec<ProtoFile>> {
        load_descriptor_set(self)
    }
}

impl ManifestSource for Buf {
    fn load(&self) -> anyhow::Result<Vec<ProtoFile>> {
        load_descriptor_set(self)
    }
}

impl ManifestSource for RawDescriptorSet {
    fn load(&self) -> anyhow::Result<Vec<ProtoFile>> {
        load_descriptor_set(self)
    }
}

/// Split a possibly multi-word command (`python -m grpc_tools.protoc`)
/// into a `Command` with its leading arguments.
fn command_from(tool: &str, command: &str) -> Result<Command, ManifestError> {
    let mut words = command.split_whitespace();
    let program = words.next().ok_or_else(|| ManifestError::EmptyCommand {
        tool: tool.to_string(),
    })?;
    let mut cmd = Command::new(program);
    cmd.args(words);
    Ok(cmd)
}

fn describe(cmd: &Command) -> String {
    std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(|s| s.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Run to completion and return stdout; non-zero exit is an error carrying
/// the tool's stderr.
fn run(mut cmd: Command) -> Result<Vec<u8>, ManifestError> {
    let command = describe(&cmd);
    debug!(command = %command, "running manifest tool");

    let output = cmd.output().map_err(|source| ManifestError::Spawn {
        command: command.clone(),
        source,
    })?;

    if !output.status.success() {
        return Err(ManifestError::ToolFailed {
            command,
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(output.stdout)
}

/// `protoc`, or any protoc-compatible command line.
#[derive(Debug, Clone)]
pub struct Protoc {
    pub command: String,
    pub proto_paths: Vec<Utf8PathBuf>,
    pub files: Vec<Utf8PathBuf>,
    pub descriptor_set_in: Vec<Utf8PathBuf>,
}

impl Protoc {
    pub fn new(
        command: impl Into<String>,
        proto_paths: Vec<Utf8PathBuf>,
        files: Vec<Utf8PathBuf>,
    ) -> Self {
        Self {
            command: command.into(),
            proto_paths,
            files,
            descriptor_set_in: Vec::new(),
        }
    }

    pub fn with_descriptor_set_in(mut self, sets: Vec<Utf8PathBuf>) -> Self {
        self.descriptor_set_in = sets;
        self
    }
}

impl DescriptorSetSource for Protoc {
    fn descriptor_set_bytes(&self) -> anyhow::Result<Vec<u8>> {
        let scratch = tempfile::tempdir().context("create descriptor scratch dir")?;
        let out = scratch.path().join("descriptor_set.binpb");

        let mut cmd = command_from("protoc", &self.command)?;
        cmd.arg("--include_imports");

        let mut out_arg = OsString::from("--descriptor_set_out=");
        out_arg.push(&out);
        cmd.arg(out_arg);

        for path in &self.proto_paths {
            cmd.arg(format!("--proto_path={path}"));
        }
        if !self.descriptor_set_in.is_empty() {
            let joined =
                std::env::join_paths(self.descriptor_set_in.iter().map(|p| p.as_std_path()))
                    .context("join --descriptor_set_in paths")?;
            let mut arg = OsString::from("--descriptor_set_in=");
            arg.push(joined);
            cmd.arg(arg);
        }
        cmd.args(self.files.iter().map(|f| f.as_std_path()));

        run(cmd)?;
        let bytes = fs::read(&out).context("read protoc descriptor set")?;
        Ok(bytes)
    }
}

/// `buf build`, configured by the buf project files of `input`
/// (default: the current directory).
#[derive(Debug, Clone)]
pub struct Buf {
    pub command: String,
    pub input: Option<String>,
}

impl Buf {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            input: None,
        }
    }

    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }
}

impl DescriptorSetSource for Buf {
    fn descriptor_set_bytes(&self) -> anyhow::Result<Vec<u8>> {
        let mut cmd = command_from("buf", &self.command)?;
        cmd.arg("build");
        if let Some(input) = &self.input {
            cmd.arg(input);
        }
        cmd.args(["--as-file-descriptor-set", "--output", "-"]);
        Ok(run(cmd)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawInput {
    Stdin,
    File(Utf8PathBuf),
}

impl RawInput {
    /// `-` means standard input.
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            RawInput::Stdin
        } else {
            RawInput::File(Utf8PathBuf::from(arg))
        }
    }
}

/// A descriptor set that was serialized ahead of time.
#[derive(Debug, Clone)]
pub struct RawDescriptorSet {
    pub input: RawInput,
}

impl RawDescriptorSet {
    pub fn new(input: RawInput) -> Self {
        Self { input }
    }
}

impl DescriptorSetSource for RawDescriptorSet {
    fn descriptor_set_bytes(&self) -> anyhow::Result<Vec<u8>> {
        match &self.input {
            RawInput::File(path) => {
                debug!(path = %path, "reading descriptor set");
                Ok(fs::read(path)?)
            }
            RawInput::Stdin => {
                debug!("reading descriptor set from stdin");
                let mut bytes = Vec::new();
                std::io::stdin()
                    .lock()
                    .read_to_end(&mut bytes)
                    .context("read descriptor set from stdin")?;
                Ok(bytes)
            }
        }
    }
}

/// Pre-built manifest for embedding and testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryManifest {
    files: Vec<ProtoFile>,
}

impl InMemoryManifest {
    pub fn new(files: Vec<ProtoFile>) -> Self {
        Self { files }
    }
}

impl ManifestSource for InMemoryManifest {
    fn load(&self) -> anyhow::Result<Vec<ProtoFile>> {
        Ok(self.files.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_input_dash_is_stdin() {
        assert_eq!(RawInput::from_arg("-"), RawInput::Stdin);
        assert_eq!(
            RawInput::from_arg("set.binpb"),
            RawInput::File(Utf8PathBuf::from("set.binpb"))
        );
    }

    #[test]
    fn multi_word_commands_keep_leading_args() {
        let cmd = command_from("protoc", "python -m grpc_tools.protoc").unwrap();
        assert_eq!(describe(&cmd), "python -m grpc_tools.protoc");
    }

    #[test]
    fn blank_command_is_rejected() {
        let err = command_from("buf", "   ").unwrap_err();
        assert!(matches!(err, ManifestError::EmptyCommand { .. }));
    }

    #[test]
    fn missing_binary_is_a_spawn_error() {
        let source = Buf::new("protofix-test-definitely-not-installed");
        let err = source.descriptor_set_bytes().unwrap_err();
        let err = err.downcast::<ManifestError>().unwrap();
        assert!(matches!(err, ManifestError::Spawn { .. }));
    }

    #[test]
    fn in_memory_manifest_returns_files() {
        let manifest = InMemoryManifest::new(vec![ProtoFile::new("a", &["b"])]);
        assert_eq!(manifest.load().unwrap(), vec![ProtoFile::new("a", &["b"])]);
    }
}
