//! Represents a launch artifact (jar) served to desktop clients.

use chrono::{DateTime, Utc};

/// A packaged archive available for client bootstrapping.
///
/// The `etag` is the hex MD5 of the archive contents, so clients can
/// revalidate cached jars with `If-None-Match`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artifact {
    /// File name including the `.jar` extension.
    pub filename: String,

    /// Size in bytes.
    pub size_bytes: u64,

    /// Last modification time reported by the filesystem.
    pub last_modified: Option<DateTime<Utc>>,

    /// MD5 checksum of the archive contents.
    pub etag: String,
}
