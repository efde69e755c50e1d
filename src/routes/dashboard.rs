use axum::{
    extract::{Path, RawQuery, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    error::AppResult,
    fetch::CacheKey,
    middleware::PanelUser,
    state::{AppState, Session},
    types::{CreateFolderRequest, MoveToFolderRequest, ReorderRequest, ShowAllRequest},
    views::{
        dashboard::{DashboardSnapshot, DashboardView},
        parse_page, query_param, ApplyOutcome,
    },
};

// GET /dashboard?page=N[&refresh=true]
pub async fn get_dashboard(
    State(state): State<AppState>,
    user: PanelUser,
    RawQuery(query): RawQuery,
) -> AppResult<Json<DashboardSnapshot>> {
    let session = state.dashboard(&user.id, user.root_admin).await;
    {
        let mut view = session.lock().await;
        view.set_page(parse_page(query.as_deref()));
        view.load().await;
    }
    let revalidate = matches!(query_param(query.as_deref(), "refresh"), Some("1" | "true"));
    Ok(Json(refresh(&state, &session, revalidate).await))
}

// PUT /dashboard/order
pub async fn reorder(
    State(state): State<AppState>,
    user: PanelUser,
    Json(req): Json<ReorderRequest>,
) -> AppResult<Json<DashboardSnapshot>> {
    let session = state.dashboard(&user.id, user.root_admin).await;
    session.lock().await.reorder(req.source_index, req.destination_index).await?;
    Ok(Json(refresh(&state, &session, false).await))
}

// PUT /dashboard/show-all
pub async fn set_show_all(
    State(state): State<AppState>,
    user: PanelUser,
    Json(req): Json<ShowAllRequest>,
) -> AppResult<Json<DashboardSnapshot>> {
    let session = state.dashboard(&user.id, user.root_admin).await;
    {
        let mut view = session.lock().await;
        view.load().await;
        view.set_show_all(req.enabled).await?;
    }
    Ok(Json(refresh(&state, &session, false).await))
}

// POST /dashboard/folders
pub async fn create_folder(
    State(state): State<AppState>,
    user: PanelUser,
    Json(req): Json<CreateFolderRequest>,
) -> AppResult<impl IntoResponse> {
    let session = state.dashboard(&user.id, user.root_admin).await;
    session.lock().await.create_folder(&req.name).await?;
    Ok((StatusCode::CREATED, Json(refresh(&state, &session, false).await)))
}

// POST /dashboard/folders/{name}/toggle
pub async fn toggle_folder(
    State(state): State<AppState>,
    user: PanelUser,
    Path(name): Path<String>,
) -> AppResult<Json<DashboardSnapshot>> {
    let session = state.dashboard(&user.id, user.root_admin).await;
    session.lock().await.toggle_folder(&name).await?;
    Ok(Json(refresh(&state, &session, false).await))
}

// POST /dashboard/folders/{name}/servers
pub async fn move_to_folder(
    State(state): State<AppState>,
    user: PanelUser,
    Path(name): Path<String>,
    Json(req): Json<MoveToFolderRequest>,
) -> AppResult<Json<DashboardSnapshot>> {
    let session = state.dashboard(&user.id, user.root_admin).await;
    session.lock().await.move_to_folder(&req.uuid, &name).await?;
    Ok(Json(refresh(&state, &session, false).await))
}

/// Fetches the view's current page with the session unlocked, applies it and
/// returns the resulting snapshot. An empty page past the first sends the view
/// back to page 1, which is fetched right away.
async fn refresh(state: &AppState, session: &Session<DashboardView>, revalidate: bool) -> DashboardSnapshot {
    for _ in 0..2 {
        let query = session.lock().await.query();
        let key = CacheKey::servers(&query);
        let result = state.fetcher.servers(&query, revalidate).await;
        let outcome = session.lock().await.apply_fetch(&key, result).await;
        if outcome != ApplyOutcome::PageReset {
            break;
        }
    }
    session.lock().await.snapshot()
}
