use axum::{
    routing::{get, post, put},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::database::{
    DatabaseManager, MemoryOperationRepository, OperationRepository, PgOperationRepository,
};
use crate::handlers;
use crate::notify::{FcmNotifier, NotificationDispatcher};
use crate::services::HistoryService;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub history: Arc<HistoryService>,
}

impl AppState {
    pub fn new(history: HistoryService) -> Self {
        Self { history: Arc::new(history) }
    }

    /// Wire the store and push gateway described by `config`
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let repo: Arc<dyn OperationRepository> = match config.database.url {
            Some(_) => {
                let pool = DatabaseManager::connect(&config.database).await?;
                Arc::new(PgOperationRepository::new(pool))
            }
            None => {
                warn!("DATABASE_URL not set, history is kept in memory only");
                Arc::new(MemoryOperationRepository::new())
            }
        };

        let notifications = if config.push.is_enabled() {
            info!(project_id = ?config.push.project_id, "Push notifications enabled");
            NotificationDispatcher::new(Arc::new(FcmNotifier::from_config(&config.push)?))
        } else {
            info!("Push credentials not configured, notifications disabled");
            NotificationDispatcher::disabled()
        };

        Ok(Self::new(HistoryService::new(
            repo,
            notifications,
            config.features.clone(),
        )))
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/checkProceed", post(handlers::check_proceed))
        .route("/calculate", post(handlers::calculate))
        .merge(history_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

fn history_routes() -> Router<AppState> {
    use handlers::history;

    Router::new()
        .route("/history", get(history::list).delete(history::delete_all))
        .route("/history/:id", put(history::update).delete(history::delete_one))
}

/// Serve until the listener fails or ctrl-c is received
pub async fn serve(listener: TcpListener, state: AppState) -> anyhow::Result<()> {
    let addr: SocketAddr = listener.local_addr()?;
    info!("Calculator history API listening on http://{}", addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
