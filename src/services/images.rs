//! src/services/images.rs
//!
//! Launcher images (window icon, splash screen) shipped alongside the
//! server. They are shared by every tenant.

use crate::models::{file_info::FileInfo, resource::LauncherImage};
use std::{
    io::{self, ErrorKind},
    path::PathBuf,
};
use thiserror::Error;
use tokio::fs::File;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("image `{0}` not found")]
    NotFound(&'static str),
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Clone, Debug)]
pub struct ImageResources {
    /// Directory that contains the `images/` tree.
    pub base_path: PathBuf,
}

impl ImageResources {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub async fn open(&self, image: LauncherImage) -> Result<(FileInfo, File), ImageError> {
        let path = self.base_path.join(image.relative_path());
        let file = File::open(&path).await.map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                ImageError::NotFound(image.relative_path())
            } else {
                ImageError::Io(err)
            }
        })?;
        let metadata = file.metadata().await?;
        Ok((FileInfo::from_metadata(&path, &metadata), file))
    }
}
