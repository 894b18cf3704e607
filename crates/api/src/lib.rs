mod alert_log;
mod auth;
pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::sync::watch;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use common::{Result, SubscriptionStore};
use engine::EngineHandle;

pub use alert_log::{AlertLog, AlertRecord};

/// Shared application state injected into every route handler.
#[derive(Clone)]
pub struct AppState {
    pub engine: EngineHandle,
    pub store: Arc<dyn SubscriptionStore>,
    pub alerts: Arc<AlertLog>,
    pub strategy_name: String,
    pub dashboard_token: String,
}

/// The full dashboard router with state applied.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods(Any);

    Router::new()
        .merge(routes::api_router(state.clone()))
        .merge(routes::health_router())
        .with_state(state)
        .layer(cors)
}

/// Build and run the Axum API server until `shutdown` flips.
pub async fn serve(state: AppState, port: u16, mut shutdown: watch::Receiver<bool>) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Dashboard API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.changed().await;
        })
        .await?;

    info!("Dashboard API stopped");
    Ok(())
}
