use crate::error::ManifestError;
use crate::proto_file::ProtoFile;
use prost::Message;
use prost_types::FileDescriptorSet;
use tracing::{debug, warn};

/// Decode a serialized `FileDescriptorSet` into the manifest, in file order.
pub fn decode_file_descriptor_set(bytes: &[u8]) -> Result<Vec<ProtoFile>, ManifestError> {
    let fdset = FileDescriptorSet::decode(bytes).map_err(|e| ManifestError::Decode {
        message: e.to_string(),
    })?;

    let mut files = Vec::with_capacity(fdset.file.len());
    for fd in &fdset.file {
        if fd.name().is_empty() {
            warn!("skipping unnamed file descriptor");
            continue;
        }
        let file = ProtoFile::from_descriptor(fd);
        debug!(
            path = %file.logical_path,
            deps = file.dependencies.len(),
            "decoded file descriptor"
        );
        files.push(file);
    }
    Ok(files)
}
