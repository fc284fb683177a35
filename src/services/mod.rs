//! Storage collaborators behind the launch routes.

pub mod artifact_provider;
pub mod configuration_interceptor;
pub mod images;
pub mod job_files;
pub mod repository;

use self::{
    artifact_provider::LaunchArtifactProvider, configuration_interceptor::ConfigurationInterceptor,
    images::ImageResources, job_files::JobFiles, repository::FileRepository,
};
use crate::config::AppConfig;

/// Shared state handed to every handler. All members are cheap to clone.
#[derive(Clone)]
pub struct LaunchServices {
    pub repository: FileRepository,
    pub artifacts: LaunchArtifactProvider,
    pub interceptor: ConfigurationInterceptor,
    pub images: ImageResources,
    pub jobs: JobFiles,
}

impl LaunchServices {
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self {
            repository: FileRepository::new(&cfg.repository_dir),
            artifacts: LaunchArtifactProvider::new(&cfg.artifacts_dir),
            interceptor: ConfigurationInterceptor::new(cfg.public_url.clone()),
            images: ImageResources::new(&cfg.images_dir),
            jobs: JobFiles,
        }
    }
}
