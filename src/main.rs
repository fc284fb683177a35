use anyhow::Result;
use axum::Router;
use std::io::ErrorKind;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod config;
mod errors;
mod handlers;
mod models;
mod routes;
mod services;

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "launch_resources=info,tower_http=info".into()),
        )
        .init();

    // --- Parse config ---
    let cfg = config::AppConfig::from_env_and_args()?;

    tracing::info!("Starting launch-resources with config: {:?}", cfg);

    // --- Check resource directories ---
    // Nothing is created here: the repository and artifact store are
    // populated by other systems, so a missing directory is only reported.
    for (label, dir) in [
        ("repository", &cfg.repository_dir),
        ("artifacts", &cfg.artifacts_dir),
        ("images", &cfg.images_dir),
    ] {
        if dir.is_dir() {
            tracing::debug!("{} directory => {}", label, dir.display());
        } else {
            tracing::warn!(
                "{} directory {} does not exist; requests against it will fail",
                label,
                dir.display()
            );
        }
    }

    // --- Initialize services ---
    let services = services::LaunchServices::from_config(&cfg);

    // --- Build router ---
    let app: Router = routes::routes::routes().with_state(services);

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
