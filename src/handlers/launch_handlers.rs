//! HTTP handlers for the `/{tenant}/launch-resources` routes.
//! File bodies are streamed straight from disk; only `conf.xml` is read
//! into memory because the interceptor rewrites it.

use crate::{
    errors::AppError,
    models::{
        file_info::FileInfo,
        resource::{CONTENT_TYPE_PNG, LaunchResource, LauncherImage},
        tenant::TenantId,
    },
    services::{LaunchServices, repository::RepositoryFolder},
};
use axum::{
    Json,
    body::Body,
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::Response,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

#[derive(Debug, Serialize)]
pub struct JarListing {
    pub tenant: String,
    pub jars: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct JobListing {
    pub tenant: String,
    pub jobs: Vec<String>,
}

/// GET `/{tenant}/launch-resources/images/app-icon.png`
pub async fn fetch_app_icon(
    State(services): State<LaunchServices>,
    Path(tenant): Path<String>,
) -> Result<Response, AppError> {
    fetch_image(&services, &tenant, LauncherImage::AppIcon).await
}

/// GET `/{tenant}/launch-resources/images/splash.png`
pub async fn fetch_splash_image(
    State(services): State<LaunchServices>,
    Path(tenant): Path<String>,
) -> Result<Response, AppError> {
    fetch_image(&services, &tenant, LauncherImage::Splash).await
}

async fn fetch_image(
    services: &LaunchServices,
    tenant: &str,
    image: LauncherImage,
) -> Result<Response, AppError> {
    TenantId::parse(tenant)?;
    let (info, file) = services.images.open(image).await?;
    Ok(stream_file(CONTENT_TYPE_PNG, &info, file))
}

/// GET `/{tenant}/launch-resources/{resource}`: `conf.xml`,
/// `{job}.analysis.xml` or `{filename}.jar`.
pub async fn fetch_launch_resource(
    State(services): State<LaunchServices>,
    Path((tenant, resource)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let tenant = TenantId::parse(&tenant)?;
    let Some(parsed) = LaunchResource::parse(&resource) else {
        return Err(AppError::not_found(format!(
            "no launch resource `{}`",
            resource
        )));
    };

    debug!(%tenant, ?parsed, "serving launch resource");
    match &parsed {
        LaunchResource::Configuration => {
            fetch_configuration(&services, &tenant, parsed.content_type()).await
        }
        LaunchResource::AnalysisJob(job) => {
            let folder = tenant_folder(&services, &tenant).await?;
            let (info, file) = services.jobs.read_job(&folder, job).await?;
            Ok(stream_file(parsed.content_type(), &info, file))
        }
        LaunchResource::JarFile(filename) => {
            fetch_jar_file(&services, filename, parsed.content_type(), &headers).await
        }
    }
}

async fn fetch_configuration(
    services: &LaunchServices,
    tenant: &TenantId,
    content_type: &'static str,
) -> Result<Response, AppError> {
    let folder = tenant_folder(services, tenant).await?;
    let conf_file = folder
        .file("conf.xml")
        .await?
        .ok_or_else(|| AppError::not_found(format!("tenant `{}` has no conf.xml", tenant)))?;

    let conf_xml = conf_file.read_to_string().await?;
    let decorated = services.interceptor.intercept(tenant.as_str(), &conf_xml)?;

    let mut response = Response::new(Body::from(decorated));
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    Ok(response)
}

async fn fetch_jar_file(
    services: &LaunchServices,
    filename: &str,
    content_type: &'static str,
    request_headers: &HeaderMap,
) -> Result<Response, AppError> {
    let (artifact, file) = services.artifacts.read_jar_file(filename).await?;
    let etag = format!("\"{}\"", artifact.etag);

    if if_none_match(request_headers, &etag) {
        debug!(jar = filename, "jar not modified");
        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::NOT_MODIFIED;
        insert_etag(response.headers_mut(), &etag);
        return Ok(response);
    }

    info!(jar = filename, size = artifact.size_bytes, "streaming jar");
    let info = FileInfo {
        name: artifact.filename,
        size_bytes: artifact.size_bytes,
        last_modified: artifact.last_modified,
    };
    let mut response = stream_file(content_type, &info, file);
    insert_etag(response.headers_mut(), &etag);
    Ok(response)
}

/// GET `/{tenant}/launch-resources/jars`: names of downloadable jars.
pub async fn list_jars(
    State(services): State<LaunchServices>,
    Path(tenant): Path<String>,
) -> Result<Json<JarListing>, AppError> {
    let tenant = TenantId::parse(&tenant)?;
    let jars = services.artifacts.jar_filenames().await?;
    Ok(Json(JarListing {
        tenant: tenant.to_string(),
        jars,
    }))
}

/// GET `/{tenant}/launch-resources/jobs`: names of the tenant's jobs.
pub async fn list_jobs(
    State(services): State<LaunchServices>,
    Path(tenant): Path<String>,
) -> Result<Json<JobListing>, AppError> {
    let tenant = TenantId::parse(&tenant)?;
    let folder = tenant_folder(&services, &tenant).await?;
    let jobs = services.jobs.job_names(&folder).await?;
    Ok(Json(JobListing {
        tenant: tenant.to_string(),
        jobs,
    }))
}

async fn tenant_folder(
    services: &LaunchServices,
    tenant: &TenantId,
) -> Result<RepositoryFolder, AppError> {
    services
        .repository
        .folder(tenant.as_str())
        .await?
        .ok_or_else(|| AppError::no_such_tenant(tenant.as_str()))
}

/// Build a 200 response streaming `file` with the usual entity headers.
fn stream_file(content_type: &'static str, info: &FileInfo, file: File) -> Response {
    let body = Body::from_stream(ReaderStream::new(file));
    let mut response = Response::new(body);
    let headers = response.headers_mut();

    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(info.size_bytes));
    if let Some(modified) = info.last_modified {
        if let Ok(value) = HeaderValue::from_str(&http_date(modified)) {
            headers.insert(header::LAST_MODIFIED, value);
        }
    }
    response
}

fn insert_etag(headers: &mut HeaderMap, quoted: &str) {
    if let Ok(value) = HeaderValue::from_str(quoted) {
        headers.insert(header::ETAG, value);
    }
}

/// True when any `If-None-Match` entry names `etag` (weak or strong) or is `*`.
fn if_none_match(headers: &HeaderMap, etag: &str) -> bool {
    headers
        .get_all(header::IF_NONE_MATCH)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .any(|candidate| candidate == "*" || candidate.trim_start_matches("W/") == etag)
}

/// IMF-fixdate as used by `Last-Modified`.
fn http_date(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formats_http_dates() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 8, 5, 9).unwrap();
        assert_eq!(http_date(at), "Fri, 01 Mar 2024 08:05:09 GMT");
    }

    #[test]
    fn matches_if_none_match_lists() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::IF_NONE_MATCH,
            HeaderValue::from_static("\"aaa\", W/\"bbb\""),
        );
        assert!(if_none_match(&headers, "\"aaa\""));
        assert!(if_none_match(&headers, "\"bbb\""));
        assert!(!if_none_match(&headers, "\"ccc\""));
        assert!(!if_none_match(&HeaderMap::new(), "\"aaa\""));
    }
}
