//! Defines routes for the tenant-scoped launch resources.
//!
//! ## Structure
//! - **Images** (shared by all tenants)
//!   - `GET /{tenant}/launch-resources/images/app-icon.png`
//!   - `GET /{tenant}/launch-resources/images/splash.png`
//!
//! - **Listings**
//!   - `GET /{tenant}/launch-resources/jars`: downloadable jar names
//!   - `GET /{tenant}/launch-resources/jobs`: the tenant's job names
//!
//! - **Resources**
//!   - `GET /{tenant}/launch-resources/{resource}`: `conf.xml`,
//!     `{job}.analysis.xml` or `{filename}.jar`
//!
//! Static segments win over `{resource}`, so a jar literally named `jars`
//! cannot exist (it would need the `.jar` suffix anyway).

use crate::{
    handlers::{
        health_handlers::{healthz, readyz},
        launch_handlers::{
            fetch_app_icon, fetch_launch_resource, fetch_splash_image, list_jars, list_jobs,
        },
    },
    services::LaunchServices,
};
use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

/// Build and return the router for all launch-resource routes.
///
/// The router carries shared state (`LaunchServices`) to all handlers.
pub fn routes() -> Router<LaunchServices> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route(
            "/{tenant}/launch-resources/images/app-icon.png",
            get(fetch_app_icon),
        )
        .route(
            "/{tenant}/launch-resources/images/splash.png",
            get(fetch_splash_image),
        )
        .route("/{tenant}/launch-resources/jars", get(list_jars))
        .route("/{tenant}/launch-resources/jobs", get(list_jobs))
        .route(
            "/{tenant}/launch-resources/{resource}",
            get(fetch_launch_resource),
        )
        .layer(TraceLayer::new_for_http())
}
