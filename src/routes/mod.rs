//! HTTP route handlers for the panelview API.
//!
//! - `dashboard`: ordered server list, show-all toggle and folders
//! - `files`: file manager listing and selection
//! - `health`: health, readiness, metrics and version endpoints

pub mod dashboard;
pub mod files;
pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::state::AppState;

/// All API routes, with state applied. Layers are added by the caller.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health::healthz))
        .route("/readyz", get(health::readyz))
        .route("/metrics", get(health::metrics))
        .route("/metrics/prometheus", get(health::metrics_prometheus))
        .route("/version", get(health::version))
        .route("/dashboard", get(dashboard::get_dashboard))
        .route("/dashboard/order", put(dashboard::reorder))
        .route("/dashboard/show-all", put(dashboard::set_show_all))
        .route("/dashboard/folders", post(dashboard::create_folder))
        .route("/dashboard/folders/{name}/toggle", post(dashboard::toggle_folder))
        .route("/dashboard/folders/{name}/servers", post(dashboard::move_to_folder))
        .route("/servers/{id}/files", get(files::list_files))
        .route("/servers/{id}/files/selection", put(files::update_selection))
        .with_state(state)
}
