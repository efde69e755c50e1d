use crate::state::AppState;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

// Health check endpoint - lightweight, no rate limiting
pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

// Readiness probe: checks DB connectivity with timeout protection
pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    // Add timeout to prevent hanging readiness checks
    let query = sqlx::query("SELECT 1").fetch_one(&state.db);
    match tokio::time::timeout(std::time::Duration::from_secs(5), query).await {
        Ok(Ok(_)) => (StatusCode::OK, "ready").into_response(),
        Ok(Err(e)) => (StatusCode::SERVICE_UNAVAILABLE, format!("not ready: {}", e)).into_response(),
        Err(_) => (StatusCode::SERVICE_UNAVAILABLE, "not ready: timeout").into_response(),
    }
}

// Metrics endpoint: returns JSON snapshot
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.metrics.get_snapshot();
    Json(snapshot)
}

// Prometheus-compatible text exposition format
pub async fn metrics_prometheus(State(state): State<AppState>) -> impl IntoResponse {
    let m = state.metrics.get_snapshot();
    let body = format!(
        "# HELP panelview_fetches_ok Upstream fetches that succeeded\n# TYPE panelview_fetches_ok counter\npanelview_fetches_ok {}\n\
# HELP panelview_fetches_failed Upstream fetches that failed\n# TYPE panelview_fetches_failed counter\npanelview_fetches_failed {}\n\
# HELP panelview_orders_reconciled Orders changed by reconciliation\n# TYPE panelview_orders_reconciled counter\npanelview_orders_reconciled {}\n\
# HELP panelview_order_writes Orders written to the store\n# TYPE panelview_order_writes counter\npanelview_order_writes {}\n\
# HELP panelview_entries_purged Malformed persisted entries removed\n# TYPE panelview_entries_purged counter\npanelview_entries_purged {}\n\
# HELP panelview_listings_built Directory listings rendered\n# TYPE panelview_listings_built counter\npanelview_listings_built {}\n\
# HELP panelview_uptime_seconds Uptime seconds\n# TYPE panelview_uptime_seconds gauge\npanelview_uptime_seconds {}\n",
        m.fetches_ok,
        m.fetches_failed,
        m.orders_reconciled,
        m.order_writes,
        m.entries_purged,
        m.listings_built,
        m.uptime_seconds,
    );
    ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body)
}

// Version/Build info endpoint (JSON)
pub async fn version() -> impl IntoResponse {
    let body = serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "package": {
            "description": env!("CARGO_PKG_DESCRIPTION"),
            "authors": env!("CARGO_PKG_AUTHORS"),
            "license": env!("CARGO_PKG_LICENSE"),
        },
        "build": {
            "profile": if cfg!(debug_assertions) { "debug" } else { "release" },
            "os": std::env::consts::OS,
            "arch": std::env::consts::ARCH,
        }
    });
    (StatusCode::OK, Json(body))
}
