//! Dependency manifests for protofix.
//!
//! protofix only needs file names and their declared dependencies. Those
//! come from a `FileDescriptorSet` produced by `protoc`, `buf`, or handed
//! over pre-serialized.

mod descriptor;
mod error;
mod proto_file;
mod source;

pub use descriptor::decode_file_descriptor_set;
pub use error::ManifestError;
pub use proto_file::{ProtoFile, strip_proto_suffix};
pub use source::{
    Buf, DescriptorSetSource, InMemoryManifest, ManifestSource, Protoc, RawDescriptorSet,
    RawInput,
};
