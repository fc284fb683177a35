//! Health & readiness handlers.
//!
//! - GET /healthz  -> simple liveness ("ok")
//! - GET /readyz   -> readiness that checks the repository, artifact and
//!   image directories can be listed

use crate::services::LaunchServices;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use std::{collections::BTreeMap, path::Path};
use tokio::fs;

/// `GET /healthz`
///
/// Liveness probe. Always 200 and never touches the filesystem.
pub async fn healthz() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".into(),
        }),
    )
}

/// `GET /readyz`
///
/// HTTP 200 when every backing directory can be opened for listing,
/// HTTP 503 otherwise. The body reports each check.
pub async fn readyz(State(services): State<LaunchServices>) -> impl IntoResponse {
    let mut checks = BTreeMap::new();
    checks.insert("repository", check_dir(&services.repository.root).await);
    checks.insert("artifacts", check_dir(&services.artifacts.base_path).await);
    checks.insert("images", check_dir(&services.images.base_path).await);

    let overall_ok = checks.values().all(|check| check.ok);
    let body = ReadyResponse {
        status: if overall_ok {
            "ok".into()
        } else {
            "error".into()
        },
        checks,
    };

    let status = if overall_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body))
}

async fn check_dir(path: &Path) -> CheckStatus {
    match fs::read_dir(path).await {
        Ok(_) => CheckStatus {
            ok: true,
            error: None,
        },
        Err(e) => CheckStatus {
            ok: false,
            error: Some(format!("{}: {}", path.display(), e)),
        },
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

#[derive(Serialize)]
struct ReadyResponse {
    status: String,
    checks: BTreeMap<&'static str, CheckStatus>,
}

#[derive(Serialize)]
struct CheckStatus {
    ok: bool,
    error: Option<String>,
}
