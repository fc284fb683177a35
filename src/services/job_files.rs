//! src/services/job_files.rs
//!
//! Job definitions stored as `{tenant}/jobs/{job}.analysis.xml` in the
//! repository. Clients fetch them through the launch routes at job-loading
//! time.

use crate::{
    models::file_info::FileInfo,
    services::repository::{RepositoryError, RepositoryFolder, RepositoryResult},
};
use tokio::fs::File;

const JOBS_FOLDER: &str = "jobs";
const JOB_FILE_SUFFIX: &str = ".analysis.xml";

#[derive(Clone, Debug, Default)]
pub struct JobFiles;

impl JobFiles {
    /// Open the job file for `job` inside `tenant_folder`.
    ///
    /// A missing `jobs` folder is reported the same way as a missing file.
    pub async fn read_job(
        &self,
        tenant_folder: &RepositoryFolder,
        job: &str,
    ) -> RepositoryResult<(FileInfo, File)> {
        let filename = format!("{}{}", job, JOB_FILE_SUFFIX);
        let jobs = tenant_folder
            .folder(JOBS_FOLDER)
            .await?
            .ok_or_else(|| RepositoryError::FileNotFound(filename.clone()))?;
        let file = jobs
            .file(&filename)
            .await?
            .ok_or(RepositoryError::FileNotFound(filename))?;
        file.open().await
    }

    /// Names of the tenant's jobs, without the file suffix.
    pub async fn job_names(&self, tenant_folder: &RepositoryFolder) -> RepositoryResult<Vec<String>> {
        let Some(jobs) = tenant_folder.folder(JOBS_FOLDER).await? else {
            return Ok(Vec::new());
        };
        let mut names: Vec<String> = jobs
            .list_files(JOB_FILE_SUFFIX)
            .await?
            .into_iter()
            .filter_map(|name| name.strip_suffix(JOB_FILE_SUFFIX).map(str::to_string))
            .filter(|name| !name.is_empty())
            .collect();
        // `-` sorts before `.`, so file-name order is not job-name order.
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::repository::FileRepository;
    use tokio::io::AsyncReadExt;

    async fn tenant_folder(with_jobs: bool) -> (tempfile::TempDir, RepositoryFolder) {
        let temp_dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(temp_dir.path().join("demo")).unwrap();
        if with_jobs {
            let jobs = temp_dir.path().join("demo/jobs");
            std::fs::create_dir_all(&jobs).unwrap();
            std::fs::write(jobs.join("dedup.analysis.xml"), "<job>dedup</job>").unwrap();
            std::fs::write(jobs.join("profile.analysis.xml"), "<job>profile</job>").unwrap();
        }
        let folder = FileRepository::new(temp_dir.path())
            .folder("demo")
            .await
            .unwrap()
            .unwrap();
        (temp_dir, folder)
    }

    #[tokio::test]
    async fn reads_existing_job() {
        let (_temp_dir, folder) = tenant_folder(true).await;
        let (info, mut file) = JobFiles.read_job(&folder, "dedup").await.unwrap();
        assert_eq!(info.name, "dedup.analysis.xml");

        let mut contents = String::new();
        file.read_to_string(&mut contents).await.unwrap();
        assert_eq!(contents, "<job>dedup</job>");
    }

    #[tokio::test]
    async fn missing_job_or_folder_is_not_found() {
        let (_temp_dir, folder) = tenant_folder(true).await;
        assert!(matches!(
            JobFiles.read_job(&folder, "absent").await,
            Err(RepositoryError::FileNotFound(name)) if name == "absent.analysis.xml"
        ));

        let (_temp_dir, folder) = tenant_folder(false).await;
        assert!(matches!(
            JobFiles.read_job(&folder, "dedup").await,
            Err(RepositoryError::FileNotFound(_))
        ));
    }

    #[tokio::test]
    async fn rejects_job_names_with_separators() {
        let (_temp_dir, folder) = tenant_folder(true).await;
        assert!(matches!(
            JobFiles.read_job(&folder, "../../conf").await,
            Err(RepositoryError::InvalidName(_))
        ));
    }

    #[tokio::test]
    async fn lists_job_names() {
        let (_temp_dir, folder) = tenant_folder(true).await;
        assert_eq!(
            JobFiles.job_names(&folder).await.unwrap(),
            vec!["dedup", "profile"]
        );

        let (_temp_dir, folder) = tenant_folder(false).await;
        assert!(JobFiles.job_names(&folder).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn job_names_sort_after_suffix_is_stripped() {
        let (temp_dir, folder) = tenant_folder(true).await;
        let jobs = temp_dir.path().join("demo/jobs");
        std::fs::write(jobs.join("a.analysis.xml"), "<job/>").unwrap();
        std::fs::write(jobs.join("a-b.analysis.xml"), "<job/>").unwrap();

        assert_eq!(
            JobFiles.job_names(&folder).await.unwrap(),
            vec!["a", "a-b", "dedup", "profile"]
        );
    }
}
