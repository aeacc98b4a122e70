//! crates/notebook_core/src/storage_path.rs
//!
//! Recovers the storage-relative object path from a previously issued
//! signed URL so the Asset URL Refresher can re-sign the same object.

use crate::ports::{PortError, PortResult};

/// Extracts the object path that follows the `bucket` segment of a signed
/// URL.
///
/// Given `https://x/storage/v1/object/sign/audio/abc/def.mp3` and bucket
/// `audio`, yields `abc/def.mp3`. Fails with [`PortError::InvalidFormat`]
/// when the bucket segment is absent.
pub fn object_path_after_bucket(url: &str, bucket: &str) -> PortResult<String> {
    let parts: Vec<&str> = url.split('/').collect();
    let bucket_index = parts
        .iter()
        .position(|segment| *segment == bucket)
        .ok_or_else(|| {
            PortError::InvalidFormat(format!("no '{bucket}' segment in stored URL"))
        })?;

    let path = parts[bucket_index + 1..].join("/");
    if path.is_empty() {
        return Err(PortError::InvalidFormat(format!(
            "nothing follows the '{bucket}' segment in stored URL"
        )));
    }
    Ok(path)
}
