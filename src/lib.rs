pub mod clock;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod planner;
pub mod routes;
pub mod state;
pub mod store;
pub mod study;

use crate::config::Config;
use crate::error::StudyError;
use crate::state::AppState;

/// Bind the configured address and serve the API until Ctrl-C.
pub async fn serve(config: Config, state: AppState) -> Result<(), StudyError> {
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .map_err(|e| StudyError::new(
            format!("Failed to bind {}: {}", config.listen_addr, e),
            "startup"
        ))?;

    tracing::info!(
        addr = %config.listen_addr,
        data_path = ?config.data_path,
        "studypath listening"
    );

    axum::serve(listener, routes::create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| StudyError::new(format!("Server error: {}", e), "serve"))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

pub fn run() -> Result<(), StudyError> {
    let (config, source) = Config::load()?;

    logging::init_logging(&config.log_level, config.log_format);
    tracing::info!("studypath starting");
    source.log();

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| StudyError::new(
            format!("Failed to create async runtime: {}", e),
            "startup"
        ))?;

    let state = AppState::from_config(&config);
    rt.block_on(async {
        // Warm the document cache and surface an unreadable store early
        match study::load_document(&state).await {
            Ok(doc) => tracing::info!(
                days = doc.plan.len(),
                tasks = doc.task_total(),
                "Study document loaded"
            ),
            Err(e) => tracing::warn!(error = %e, "Failed to load study document"),
        }

        serve(config, state).await
    })
}
