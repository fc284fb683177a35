use crate::{
    models::tenant::InvalidTenant,
    services::{
        artifact_provider::ArtifactError, configuration_interceptor::InterceptError,
        images::ImageError, repository::RepositoryError,
    },
};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// A lightweight wrapper for general errors that keeps the message local.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    /// Create a new AppError with a specific status and message.
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }

    /// Shortcut for a 500 Internal Server Error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    /// Shortcut for 404 Not Found
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }

    /// Shortcut for 400 Bad Request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    /// Unknown tenant, with the wording clients already match on.
    pub fn no_such_tenant(tenant: &str) -> Self {
        Self::not_found(format!("No such tenant: {}", tenant))
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, "{}", self.message);
        } else {
            tracing::debug!(status = %self.status, "{}", self.message);
        }

        let body = Json(json!({
            "error": self.message,
            "status": self.status.as_u16()
        }));

        (self.status, body).into_response()
    }
}

impl From<InvalidTenant> for AppError {
    fn from(err: InvalidTenant) -> Self {
        AppError::bad_request(err.to_string())
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::InvalidName(_) => AppError::bad_request(err.to_string()),
            RepositoryError::FileNotFound(_) => AppError::not_found(err.to_string()),
            RepositoryError::Io(_) => AppError::internal(err.to_string()),
        }
    }
}

impl From<ArtifactError> for AppError {
    fn from(err: ArtifactError) -> Self {
        match err {
            ArtifactError::InvalidFilename(_) => AppError::bad_request(err.to_string()),
            ArtifactError::NotFound(_) => AppError::not_found(err.to_string()),
            ArtifactError::Io(_) => AppError::internal(err.to_string()),
        }
    }
}

impl From<ImageError> for AppError {
    fn from(err: ImageError) -> Self {
        match err {
            ImageError::NotFound(_) => AppError::not_found(err.to_string()),
            ImageError::Io(_) => AppError::internal(err.to_string()),
        }
    }
}

impl From<InterceptError> for AppError {
    fn from(err: InterceptError) -> Self {
        AppError::internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn maps_service_errors_to_statuses() {
        let cases = [
            (
                AppError::from(RepositoryError::InvalidName("..".into())),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::from(RepositoryError::FileNotFound("conf.xml".into())),
                StatusCode::NOT_FOUND,
            ),
            (
                AppError::from(ArtifactError::NotFound("a.jar".into())),
                StatusCode::NOT_FOUND,
            ),
            (
                AppError::from(ArtifactError::Io(io::Error::other("disk"))),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (AppError::no_such_tenant("ghost"), StatusCode::NOT_FOUND),
        ];
        for (err, status) in cases {
            assert_eq!(err.status, status, "{}", err);
        }
    }

    #[test]
    fn jar_not_found_keeps_underlying_message() {
        let err = AppError::from(ArtifactError::NotFound("a.jar".into()));
        assert_eq!(err.message, "no such jar file: a.jar");
    }
}
