//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, object store setup, worker spawning, and
//! Axum server lifecycle.

use crate::application::services::{AssetService, RedirectService, TemplateService};
use crate::config::Config;
use crate::domain::visit_queue::VisitQueue;
use crate::domain::visit_worker::run_visit_worker;
use crate::infrastructure::object_store::FsObjectStore;
use crate::infrastructure::persistence::{
    PgAssetRepository, PgLinkRepository, PgTemplateRepository, PgVisitRepository,
};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::Result;
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool and migrations
/// - Filesystem object store
/// - Background visit worker
/// - Axum HTTP server
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Object store setup fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .connect(&config.database_url)
        .await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations").run(&pool).await?;

    let object_store = FsObjectStore::new(&config.asset_root)
        .await
        .map_err(|e| anyhow::anyhow!("failed to open object store: {}", e))?;
    tracing::info!("Object store ready at {}", config.asset_root);

    let pool = Arc::new(pool);
    let link_repository = Arc::new(PgLinkRepository::new(pool.clone()));
    let template_repository = Arc::new(PgTemplateRepository::new(pool.clone()));
    let asset_repository = Arc::new(PgAssetRepository::new(pool.clone()));
    let visit_repository = Arc::new(PgVisitRepository::new(pool.clone()));

    let asset_service = Arc::new(AssetService::new(
        asset_repository,
        Arc::new(object_store),
        config.asset_inline_max_bytes,
    ));
    let template_service = Arc::new(TemplateService::new(
        template_repository,
        asset_service.clone(),
    ));

    let (visit_queue, visit_rx) = VisitQueue::new(config.visit_queue_capacity);
    tokio::spawn(run_visit_worker(
        visit_rx,
        visit_repository,
        link_repository.clone(),
    ));
    tracing::info!("Visit worker started");

    let redirect_service = Arc::new(RedirectService::new(
        link_repository,
        template_service,
        visit_queue.clone(),
    ));

    let state = AppState {
        redirect_service,
        asset_service,
        visit_queue,
        admin_token: config.admin_token.clone(),
    };

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app)).await?;

    Ok(())
}
