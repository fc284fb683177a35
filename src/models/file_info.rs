//! Descriptor for a file about to be streamed to a client.

use chrono::{DateTime, Utc};
use std::{fs::Metadata, path::Path};

/// Name, size and modification time of an on-disk file.
///
/// Produced by the repository, image and artifact services alongside an
/// open file handle; handlers turn it into response headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub name: String,
    pub size_bytes: u64,
    pub last_modified: Option<DateTime<Utc>>,
}

impl FileInfo {
    pub fn from_metadata(path: &Path, metadata: &Metadata) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            name,
            size_bytes: metadata.len(),
            last_modified: metadata.modified().ok().map(DateTime::<Utc>::from),
        }
    }
}
