mod config;

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use config::{CliOptions, ConfigMerger};
use protofix_core::adapters::{EmitSink, OverwriteSink};
use protofix_core::ports::ArtifactSink;
use protofix_core::{FixSettings, ManifestSource, ToolError, fix_imports};
use protofix_manifest::{Buf, Protoc, RawDescriptorSet, RawInput};
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "protofix",
    version,
    about = "Rewrite the imports of generated Python protobuf code into package-relative form."
)]
struct Cli {
    /// Directory containing the generated Python code.
    #[arg(short = 'o', long)]
    python_out: Utf8PathBuf,

    /// Overwrite generated files instead of printing them to stdout.
    #[arg(long, overrides_with = "not_in_place")]
    in_place: bool,

    /// Print rewritten files to stdout (default).
    #[arg(long, overrides_with = "in_place")]
    not_in_place: bool,

    /// Create __init__.py (and __init__.pyi for stubs) in every output directory.
    #[arg(long, overrides_with = "dont_create_package")]
    create_package: bool,

    /// Do not create package files (default).
    #[arg(long, overrides_with = "create_package")]
    dont_create_package: bool,

    /// Suffixes of generated modules to rewrite (repeatable; replaces the defaults).
    #[arg(short = 's', long = "module-suffixes")]
    module_suffixes: Vec<String>,

    /// Leave imports of google/protobuf/* untouched (default).
    #[arg(long, overrides_with = "dont_exclude_google_imports")]
    exclude_google_imports: bool,

    /// Rewrite imports of google/protobuf/* like any other dependency.
    #[arg(long, overrides_with = "exclude_google_imports")]
    dont_exclude_google_imports: bool,

    /// Glob over proto logical paths (no `.proto`) to leave untouched (repeatable).
    #[arg(short = 'e', long = "exclude-imports-glob")]
    exclude_imports_glob: Vec<String>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Collect the dependency manifest by running protoc.
    Protoc(ProtocArgs),
    /// Collect the dependency manifest by running buf build.
    Buf(BufArgs),
    /// Read a serialized FileDescriptorSet from a file or stdin.
    Raw(RawArgs),
}

#[derive(Debug, Parser)]
struct ProtocArgs {
    /// protoc executable; may include arguments, e.g. "python -m grpc_tools.protoc".
    #[arg(long, env = "PROTOC_PATH", default_value = "protoc")]
    protoc_path: String,

    /// Directory to search for imports (repeatable).
    #[arg(short = 'p', long = "proto-path", required = true)]
    proto_path: Vec<Utf8PathBuf>,

    /// Pre-built descriptor sets to resolve imports from (repeatable).
    #[arg(long)]
    descriptor_set_in: Vec<Utf8PathBuf>,

    /// The .proto files that were compiled.
    #[arg(required = true)]
    files: Vec<Utf8PathBuf>,
}

#[derive(Debug, Parser)]
struct BufArgs {
    /// buf executable.
    #[arg(long, env = "BUF_PATH", default_value = "buf")]
    buf_path: String,

    /// buf input (default: the current directory).
    input: Option<String>,
}

#[derive(Debug, Parser)]
struct RawArgs {
    /// Serialized FileDescriptorSet, or `-` for stdin.
    descriptor_set: String,
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        error!("{:?}", e);
        let code = e.downcast_ref::<ToolError>().map_or(1, ToolError::exit_code);
        return ExitCode::from(code);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if !cli.python_out.is_dir() {
        anyhow::bail!("python output directory {} does not exist", cli.python_out);
    }

    let cwd = Utf8PathBuf::try_from(std::env::current_dir().context("read current dir")?)
        .context("current dir is not UTF-8")?;
    let file_config = config::load_or_default(&cwd).context("load protofix.toml config")?;
    let merged = ConfigMerger::new(file_config).merge(&CliOptions {
        module_suffixes: cli.module_suffixes.clone(),
        exclude_imports_glob: cli.exclude_imports_glob.clone(),
        exclude_google_imports: toggle(cli.exclude_google_imports, cli.dont_exclude_google_imports),
        create_package: toggle(cli.create_package, cli.dont_create_package),
        in_place: toggle(cli.in_place, cli.not_in_place),
    });
    debug!(
        "merged config: suffixes={:?}, exclude={:?}, create_package={}, in_place={}",
        merged.module_suffixes, merged.exclude_imports_glob, merged.create_package, merged.in_place
    );

    let settings = FixSettings {
        python_out: cli.python_out,
        create_package: merged.create_package,
        module_suffixes: merged.module_suffixes,
        exclude_imports_glob: merged.exclude_imports_glob,
    };

    let manifest = manifest_source(cli.cmd);
    let sink: Box<dyn ArtifactSink> = if merged.in_place {
        Box::new(OverwriteSink)
    } else {
        Box::new(EmitSink::stdout())
    };

    let outcome = fix_imports(&settings, manifest.as_ref(), sink.as_ref())?;
    info!(
        "rewrote {} artifacts under {} ({} markers, {} stub indexes)",
        outcome.rewritten.len(),
        settings.python_out,
        outcome.packages.markers_created.len(),
        outcome.packages.stub_indexes_written.len()
    );
    Ok(())
}

fn manifest_source(cmd: Command) -> Box<dyn ManifestSource> {
    match cmd {
        Command::Protoc(args) => Box::new(
            Protoc::new(args.protoc_path, args.proto_path, args.files)
                .with_descriptor_set_in(args.descriptor_set_in),
        ),
        Command::Buf(args) => {
            let buf = Buf::new(args.buf_path);
            Box::new(match args.input {
                Some(input) => buf.with_input(input),
                None => buf,
            })
        }
        Command::Raw(args) => Box::new(RawDescriptorSet::new(RawInput::from_arg(
            &args.descriptor_set,
        ))),
    }
}

/// An on/off flag pair; the last one given wins.
fn toggle(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}
