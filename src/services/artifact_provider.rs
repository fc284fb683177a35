//! src/services/artifact_provider.rs
//!
//! LaunchArtifactProvider serves the jar files that desktop clients
//! download to bootstrap themselves. Jars live flat in one directory shared
//! by all tenants. Each jar's MD5 is computed on first use and cached until
//! its size or modification time changes.

use crate::models::{artifact::Artifact, file_info::FileInfo};
use chrono::{DateTime, Utc};
use futures::StreamExt;
use md5::Context;
use std::{
    collections::HashMap,
    io::{self, ErrorKind, SeekFrom},
    path::PathBuf,
    sync::Arc,
};
use thiserror::Error;
use tokio::{
    fs::{self, File},
    io::AsyncSeekExt,
    sync::RwLock,
};
use tokio_util::io::ReaderStream;
use tracing::debug;

const JAR_SUFFIX: &str = ".jar";
const MAX_FILENAME_LEN: usize = 255;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("no such jar file: {0}")]
    NotFound(String),
    #[error("invalid jar file name `{0}`")]
    InvalidFilename(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type ArtifactResult<T> = Result<T, ArtifactError>;

#[derive(Clone, Debug, PartialEq, Eq)]
struct DigestEntry {
    size_bytes: u64,
    last_modified: Option<DateTime<Utc>>,
    etag: String,
}

#[derive(Clone)]
pub struct LaunchArtifactProvider {
    /// Directory holding the jar files.
    pub base_path: PathBuf,

    digests: Arc<RwLock<HashMap<String, DigestEntry>>>,
}

impl LaunchArtifactProvider {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            digests: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Accept only plain `*.jar` file names with a non-empty stem.
    fn ensure_filename_safe(&self, filename: &str) -> ArtifactResult<()> {
        let stem_ok = filename
            .strip_suffix(JAR_SUFFIX)
            .is_some_and(|stem| !stem.is_empty());
        let unsafe_name = !stem_ok
            || filename.len() > MAX_FILENAME_LEN
            || filename.starts_with('.')
            || filename.contains("..")
            || filename
                .bytes()
                .any(|b| b.is_ascii_control() || b == b'/' || b == b'\\');
        if unsafe_name {
            return Err(ArtifactError::InvalidFilename(filename.to_string()));
        }
        Ok(())
    }

    /// Open a jar for streaming, returning its descriptor and file handle.
    ///
    /// Returns NotFound if the file does not exist or is not a regular file.
    pub async fn read_jar_file(&self, filename: &str) -> ArtifactResult<(Artifact, File)> {
        self.ensure_filename_safe(filename)?;
        let path = self.base_path.join(filename);

        let mut file = File::open(&path).await.map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                ArtifactError::NotFound(filename.to_string())
            } else {
                ArtifactError::Io(err)
            }
        })?;
        let metadata = file.metadata().await?;
        if !metadata.is_file() {
            return Err(ArtifactError::NotFound(filename.to_string()));
        }

        let info = FileInfo::from_metadata(&path, &metadata);
        let etag = self.etag_for(&mut file, &info).await?;

        Ok((
            Artifact {
                filename: filename.to_string(),
                size_bytes: info.size_bytes,
                last_modified: info.last_modified,
                etag,
            },
            file,
        ))
    }

    /// Sorted names of all jar files in the artifact directory.
    pub async fn jar_filenames(&self) -> ArtifactResult<Vec<String>> {
        let mut names = Vec::new();
        let mut entries = fs::read_dir(&self.base_path).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if self.ensure_filename_safe(name).is_ok() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();

        self.digests
            .write()
            .await
            .retain(|name, _| names.binary_search(name).is_ok());
        Ok(names)
    }

    /// Cached MD5 of the open jar; recomputed when size or mtime differ.
    ///
    /// The digest is read from the handle that will be served, which is
    /// rewound afterwards.
    async fn etag_for(&self, file: &mut File, info: &FileInfo) -> ArtifactResult<String> {
        if let Some(entry) = self.digests.read().await.get(&info.name) {
            if entry.size_bytes == info.size_bytes && entry.last_modified == info.last_modified {
                return Ok(entry.etag.clone());
            }
        }

        let etag = compute_md5(file).await?;
        debug!(jar = %info.name, %etag, "computed jar digest");
        self.digests.write().await.insert(
            info.name.clone(),
            DigestEntry {
                size_bytes: info.size_bytes,
                last_modified: info.last_modified,
                etag: etag.clone(),
            },
        );
        Ok(etag)
    }
}

/// Stream a file through MD5 without holding it in memory, then rewind it.
async fn compute_md5(file: &mut File) -> io::Result<String> {
    let mut digest = Context::new();
    {
        let mut stream = ReaderStream::new(&mut *file);
        while let Some(chunk) = stream.next().await {
            digest.consume(&chunk?);
        }
    }
    file.seek(SeekFrom::Start(0)).await?;
    Ok(format!("{:x}", digest.compute()))
}
