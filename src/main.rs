use std::sync::Arc;

use regnum_api::config::{AppEnv, Config};
use regnum_api::db::Database;
use regnum_api::db_storage::PgNumberStore;
use regnum_api::enrichment::BatchEnricher;
use regnum_api::handlers::AppState;
use regnum_api::routes::build_router;
use regnum_api::services::CarInfoService;
use regnum_api::store::NumberStore;

/// Main entry point for the application.
///
/// Initializes logging, loads configuration, connects to Postgres, creates
/// the tables, wires the enrichment client and serves until Ctrl-C/SIGTERM.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let env = std::env::var("APP_ENV")
        .ok()
        .and_then(|v| v.parse::<AppEnv>().ok())
        .unwrap_or(AppEnv::Local);
    regnum_api::obs::init_tracing(env);

    let config = Config::from_env()?;
    tracing::info!("Configuration loaded successfully");

    let db = Database::new(&config.database_url, config.db_max_connections).await?;
    tracing::info!("Database connection pool established");

    let store: Arc<dyn NumberStore> =
        Arc::new(PgNumberStore::new(db.pool.clone(), config.store_timeout()));
    store.migrate().await?;
    tracing::info!("Database schema ready");

    let car_info = Arc::new(CarInfoService::from_config(&config)?);
    tracing::info!("Car info client initialized: {}", config.enrichment_api_url);

    let enricher = BatchEnricher::new(Arc::clone(&store), car_info, config.batch_concurrency);
    let app_state = Arc::new(AppState {
        store,
        enricher,
        config: config.clone(),
    });

    let app = build_router(app_state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.pool.close().await;
    tracing::info!("Application stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
