//! src/services/repository.rs
//!
//! FileRepository is the tenant repository, laid out on disk as
//! `root/{tenant}/...`. Folders and files are handed out as lightweight
//! handles; opening a file yields its descriptor plus a tokio `File` ready
//! for streaming.

use crate::models::file_info::FileInfo;
use std::{
    io::{self, ErrorKind},
    path::PathBuf,
};
use thiserror::Error;
use tokio::fs::{self, File};
use tracing::debug;

const MAX_SEGMENT_LEN: usize = 255;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("invalid repository path segment `{0}`")]
    InvalidName(String),
    #[error("repository file `{0}` not found")]
    FileNotFound(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Root of the repository. Cheap to clone; holds only the base path.
#[derive(Clone, Debug)]
pub struct FileRepository {
    pub root: PathBuf,
}

/// A folder inside the repository, known to exist when it was handed out.
#[derive(Clone, Debug)]
pub struct RepositoryFolder {
    path: PathBuf,
}

/// A regular file inside a repository folder.
#[derive(Clone, Debug)]
pub struct RepositoryFile {
    name: String,
    path: PathBuf,
}

/// Reject anything that is not a single, plain path segment.
fn ensure_segment_safe(name: &str) -> RepositoryResult<()> {
    let unsafe_segment = name.is_empty()
        || name.len() > MAX_SEGMENT_LEN
        || name.starts_with('.')
        || name.contains("..")
        || name
            .bytes()
            .any(|b| b.is_ascii_control() || b == b'/' || b == b'\\');
    if unsafe_segment {
        return Err(RepositoryError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Return `Some(path)` if `path` is an existing directory, `None` if absent.
async fn existing_dir(path: PathBuf) -> RepositoryResult<Option<PathBuf>> {
    match fs::metadata(&path).await {
        Ok(meta) if meta.is_dir() => Ok(Some(path)),
        Ok(_) => Ok(None),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(RepositoryError::Io(err)),
    }
}

impl FileRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Look up a top-level folder (a tenant folder).
    pub async fn folder(&self, name: &str) -> RepositoryResult<Option<RepositoryFolder>> {
        ensure_segment_safe(name)?;
        let found = existing_dir(self.root.join(name)).await?;
        debug!(folder = name, found = found.is_some(), "repository folder lookup");
        Ok(found.map(|path| RepositoryFolder { path }))
    }
}

impl RepositoryFolder {
    /// Look up a direct child folder.
    pub async fn folder(&self, name: &str) -> RepositoryResult<Option<RepositoryFolder>> {
        ensure_segment_safe(name)?;
        let found = existing_dir(self.path.join(name)).await?;
        Ok(found.map(|path| RepositoryFolder { path }))
    }

    /// Look up a regular file directly inside this folder.
    pub async fn file(&self, name: &str) -> RepositoryResult<Option<RepositoryFile>> {
        ensure_segment_safe(name)?;
        let path = self.path.join(name);
        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(Some(RepositoryFile {
                name: name.to_string(),
                path,
            })),
            Ok(_) => Ok(None),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(RepositoryError::Io(err)),
        }
    }

    /// Names of the regular files in this folder ending with `suffix`, sorted.
    pub async fn list_files(&self, suffix: &str) -> RepositoryResult<Vec<String>> {
        let mut names = Vec::new();
        let mut entries = fs::read_dir(&self.path).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if name.ends_with(suffix) && !name.starts_with('.') {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

impl RepositoryFile {
    /// Open the file for streaming out.
    ///
    /// A file removed between lookup and open is reported as FileNotFound.
    pub async fn open(&self) -> RepositoryResult<(FileInfo, File)> {
        let file = File::open(&self.path).await.map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                RepositoryError::FileNotFound(self.name.clone())
            } else {
                RepositoryError::Io(err)
            }
        })?;
        let metadata = file.metadata().await?;
        Ok((FileInfo::from_metadata(&self.path, &metadata), file))
    }

    /// Read the whole file as UTF-8 text.
    pub async fn read_to_string(&self) -> RepositoryResult<String> {
        fs::read_to_string(&self.path).await.map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                RepositoryError::FileNotFound(self.name.clone())
            } else {
                RepositoryError::Io(err)
            }
        })
    }
}
