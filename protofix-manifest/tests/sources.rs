//! Manifest sources against real inputs.

use camino::Utf8PathBuf;
use pretty_assertions::assert_eq;
use prost::Message;
use prost_types::{FileDescriptorProto, FileDescriptorSet};
use protofix_manifest::{
    ManifestError, ManifestSource, ProtoFile, Protoc, RawDescriptorSet, RawInput,
};
use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn utf8(temp: &TempDir) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap()
}

fn fd(name: &str, deps: &[&str]) -> FileDescriptorProto {
    FileDescriptorProto {
        name: Some(name.to_string()),
        dependency: deps.iter().map(|d| d.to_string()).collect(),
        ..Default::default()
    }
}

#[test]
fn raw_file_source_decodes_manifest() {
    let temp = tempfile::tempdir().unwrap();
    let path = utf8(&temp).join("set.binpb");
    let set = FileDescriptorSet {
        file: vec![
            fd("a/b/c/thing2.proto", &[]),
            fd("d/thing1.proto", &["a/b/c/thing2.proto"]),
        ],
    };
    fs::write(&path, set.encode_to_vec()).unwrap();

    let files = RawDescriptorSet::new(RawInput::File(path)).load().unwrap();
    assert_eq!(
        files,
        vec![
            ProtoFile::new("a/b/c/thing2", &[]),
            ProtoFile::new("d/thing1", &["a/b/c/thing2"]),
        ]
    );
}

#[test]
fn raw_file_source_missing_file_fails() {
    let temp = tempfile::tempdir().unwrap();
    let path = utf8(&temp).join("nope.binpb");
    let err = RawDescriptorSet::new(RawInput::File(path.clone()))
        .load()
        .unwrap_err();
    assert!(format!("{err:#}").contains("nope.binpb"));
}

#[test]
fn raw_file_source_rejects_garbage() {
    let temp = tempfile::tempdir().unwrap();
    let path = utf8(&temp).join("garbage.binpb");
    fs::write(&path, [0xffu8, 0xff, 0xff]).unwrap();

    let err = RawDescriptorSet::new(RawInput::File(path)).load().unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ManifestError>(),
        Some(ManifestError::Decode { .. })
    ));
}

fn protoc_available() -> bool {
    Command::new("protoc")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

#[test]
fn protoc_source_includes_imports() {
    if !protoc_available() {
        eprintln!("protoc not found; skipping");
        return;
    }

    let temp = tempfile::tempdir().unwrap();
    let root = utf8(&temp);
    fs::create_dir_all(root.join("a/b/c")).unwrap();
    fs::create_dir_all(root.join("d")).unwrap();
    fs::write(
        root.join("a/b/c/thing2.proto"),
        "syntax = \"proto3\";\npackage thing2;\nmessage Thing2 { string field = 1; }\n",
    )
    .unwrap();
    fs::write(
        root.join("d/thing1.proto"),
        "syntax = \"proto3\";\nimport \"a/b/c/thing2.proto\";\npackage thing1;\nmessage Thing1 { thing2.Thing2 field = 1; }\n",
    )
    .unwrap();

    let source = Protoc::new("protoc", vec![root.clone()], vec![root.join("d/thing1.proto")]);
    let files = source.load().unwrap();

    assert!(files.contains(&ProtoFile::new("a/b/c/thing2", &[])));
    assert!(files.contains(&ProtoFile::new("d/thing1", &["a/b/c/thing2"])));
}

#[test]
fn protoc_failure_surfaces_diagnostic() {
    if !protoc_available() {
        eprintln!("protoc not found; skipping");
        return;
    }

    let temp = tempfile::tempdir().unwrap();
    let root = utf8(&temp);
    let source = Protoc::new("protoc", vec![root.clone()], vec![root.join("missing.proto")]);
    let err = source.load().unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ManifestError>(),
        Some(ManifestError::ToolFailed { .. })
    ));
}
