use axum::{
    extract::{Query, State},
    http::StatusCode,
    middleware,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::{auth::require_auth, AppState};

const DEFAULT_ALERT_LIMIT: usize = 50;

pub fn api_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/status", get(get_status))
        .route("/api/alerts", get(get_alerts))
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}

// ─── Status ───────────────────────────────────────────────────────────────────

async fn get_status(State(state): State<AppState>) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let subs = state.store.snapshot().await.map_err(|e| {
        warn!(error = %e, "Failed to load subscriptions for status");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "subscriptions unavailable"})),
        )
    })?;

    Ok(Json(json!({
        "engine": state.engine.state().await,
        "strategy": state.strategy_name,
        "pairs": subs.pairs,
        "interval": subs.interval,
        "subscribers": subs.chats.len(),
        "last_cycle": state.engine.last_cycle().await,
    })))
}

// ─── Alerts ───────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct AlertsQuery {
    limit: Option<usize>,
}

async fn get_alerts(State(state): State<AppState>, Query(q): Query<AlertsQuery>) -> Json<Value> {
    let limit = q.limit.unwrap_or(DEFAULT_ALERT_LIMIT).min(state.alerts.capacity());
    let alerts = state.alerts.recent(limit).await;
    Json(json!({
        "alerts": alerts,
        "total": state.alerts.len().await,
    }))
}
