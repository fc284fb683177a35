//! Names of the resources served beneath `/{tenant}/launch-resources/`.

pub const CONTENT_TYPE_PNG: &str = "image/png";
pub const CONTENT_TYPE_XML: &str = "application/xml";
pub const CONTENT_TYPE_JAR: &str = "application/x-java-archive";

const CONFIGURATION_FILE: &str = "conf.xml";
const ANALYSIS_JOB_SUFFIX: &str = ".analysis.xml";
const JAR_SUFFIX: &str = ".jar";

/// A single-segment resource name parsed from the request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchResource {
    /// `conf.xml`, decorated before it is sent.
    Configuration,
    /// `<job>.analysis.xml`; holds the job name without the suffix.
    AnalysisJob(String),
    /// `<name>.jar`; holds the full file name including `.jar`.
    JarFile(String),
}

impl LaunchResource {
    /// Parse a resource name, returning `None` for names no route serves.
    ///
    /// `conf.xml` takes precedence; job and jar names need a non-empty stem.
    pub fn parse(name: &str) -> Option<Self> {
        if name == CONFIGURATION_FILE {
            return Some(Self::Configuration);
        }
        if let Some(job) = name.strip_suffix(ANALYSIS_JOB_SUFFIX) {
            return (!job.is_empty()).then(|| Self::AnalysisJob(job.to_string()));
        }
        if let Some(stem) = name.strip_suffix(JAR_SUFFIX) {
            return (!stem.is_empty()).then(|| Self::JarFile(name.to_string()));
        }
        None
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Configuration | Self::AnalysisJob(_) => CONTENT_TYPE_XML,
            Self::JarFile(_) => CONTENT_TYPE_JAR,
        }
    }
}

/// Launcher images bundled with the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LauncherImage {
    AppIcon,
    Splash,
}

impl LauncherImage {
    /// Path of the image relative to the images directory.
    pub fn relative_path(self) -> &'static str {
        match self {
            Self::AppIcon => "images/window/app-icon.png",
            Self::Splash => "images/splash.png",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_resource_names() {
        assert_eq!(
            LaunchResource::parse("conf.xml"),
            Some(LaunchResource::Configuration)
        );
        assert_eq!(
            LaunchResource::parse("customer-dedup.analysis.xml"),
            Some(LaunchResource::AnalysisJob("customer-dedup".into()))
        );
        assert_eq!(
            LaunchResource::parse("DataCleaner-core.jar"),
            Some(LaunchResource::JarFile("DataCleaner-core.jar".into()))
        );
    }

    #[test]
    fn job_names_may_contain_dots() {
        assert_eq!(
            LaunchResource::parse("v1.2.nightly.analysis.xml"),
            Some(LaunchResource::AnalysisJob("v1.2.nightly".into()))
        );
    }

    #[test]
    fn rejects_empty_stems_and_unknown_names() {
        assert_eq!(LaunchResource::parse(".jar"), None);
        assert_eq!(LaunchResource::parse(".analysis.xml"), None);
        assert_eq!(LaunchResource::parse("other.xml"), None);
        assert_eq!(LaunchResource::parse("readme.txt"), None);
    }

    #[test]
    fn content_types_follow_the_resource_kind() {
        assert_eq!(LaunchResource::Configuration.content_type(), CONTENT_TYPE_XML);
        assert_eq!(
            LaunchResource::JarFile("a.jar".into()).content_type(),
            CONTENT_TYPE_JAR
        );
    }
}
