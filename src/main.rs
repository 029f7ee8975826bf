use std::{process, sync::Arc};

use thiserror::Error;
use tokio::signal;
use tracing::{dispatcher, error, info};

use foglio::{
    application::{comments::CommentService, sync::ContentSync},
    config::{self, LoadError},
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, state::HttpState},
        remote::RemoteBlogClient,
        telemetry,
    },
};

#[derive(Debug, Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] LoadError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_startup_error(&error);
        process::exit(1);
    }
}

fn report_startup_error(error: &StartupError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "startup error");
    } else {
        eprintln!("startup error: {error}");
    }
}

async fn run() -> Result<(), StartupError> {
    let (_args, settings) = config::load_with_cli()?;
    telemetry::init(&settings.logging)?;

    let database_url = settings
        .database
        .url
        .clone()
        .ok_or_else(|| InfraError::configuration("database.url is required"))?;
    let pool =
        PostgresRepositories::connect(&database_url, settings.database.max_connections.get())
            .await?;
    PostgresRepositories::run_migrations(&pool).await?;
    let repos = Arc::new(PostgresRepositories::new(pool));

    let base_url = settings
        .remote
        .base_url
        .clone()
        .ok_or_else(|| InfraError::configuration("remote.base_url is required"))?;
    let remote = Arc::new(RemoteBlogClient::new(
        &base_url,
        settings.remote.data_timeout,
        settings.remote.stat_timeout,
    )?);
    let remote_base = remote.base().clone();

    let sync = Arc::new(ContentSync::new(
        repos.clone(),
        repos.clone(),
        repos.clone(),
        repos.clone(),
        repos.clone(),
        repos.clone(),
        remote,
        remote_base,
    ));
    let comments = Arc::new(CommentService::new(repos.clone(), repos.clone()));

    let app = http::router(HttpState { sync, comments });

    let listener = tokio::net::TcpListener::bind(settings.server.addr).await?;
    info!(addr = %settings.server.addr, "foglio listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
    info!("shutdown signal received");
}
