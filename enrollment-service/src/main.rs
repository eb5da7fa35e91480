use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use enrollment_service::engine::Engine;
use enrollment_service::http::{router, with_tracing, AppState};
use enrollment_service::locks::LockRegistry;
use enrollment_service::store::Store;
use enrollment_service::bootstrap;
use shared::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env().context("failed to load configuration")?;

    shared::logger::init(&settings.log_level);

    info!(database_url = %settings.database_url, port = settings.port, "starting enrollment-service");

    let store = Store::connect(&settings.database_url)
        .await
        .context("failed to connect to database")?;
    store
        .run_migrations()
        .await
        .context("failed to run schema migrations")?;

    bootstrap::run(
        &store,
        settings.init_departments,
        settings.init_professors,
        settings.init_courses,
        settings.init_students,
    )
    .await
    .context("failed to seed initial data")?;

    let locks = Arc::new(LockRegistry::new());
    let engine = Engine::new(store, locks, settings.max_credits_per_semester);

    let state = AppState {
        engine,
        settings: Arc::new(settings.clone()),
    };

    let app = with_tracing(router(state));

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(%addr, "listening");

    axum::serve(listener, app)
        .await
        .context("server error")?;

    Ok(())
}
