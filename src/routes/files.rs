use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::{
    error::{validation, AppError, AppResult},
    middleware::PanelUser,
    state::AppState,
    types::SelectionRequest,
    views::files::FileManagerSnapshot,
};

#[derive(Debug, Default, Deserialize)]
pub struct FilesQuery {
    /// Location hash of the directory, e.g. `#/plugins`.
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub refresh: Option<bool>,
}

// GET /servers/{id}/files?hash=&search=&page=
//
// A changed search term always lands on page 1; `page` only applies while the
// term stays the same.
pub async fn list_files(
    State(state): State<AppState>,
    user: PanelUser,
    Path(server_id): Path<String>,
    Query(q): Query<FilesQuery>,
) -> AppResult<Json<FileManagerSnapshot>> {
    validation::validate_identifier(&server_id, "server_id")?;
    let session = state.file_view(&user.id, &server_id).await;
    let (key, directory) = {
        let mut view = session.lock().await;
        if let Some(hash) = &q.hash {
            view.navigate(hash);
        }
        let search_changed = match &q.search {
            Some(search) => view.set_search(search),
            None => false,
        };
        if let (Some(page), false) = (&q.page, search_changed) {
            let page = page.parse::<usize>().ok().filter(|p| *p > 0).unwrap_or(1);
            view.set_page(page);
        }
        (view.cache_key(), view.directory().to_string())
    };

    let result = state.fetcher.directory(&user.id, &server_id, &directory, q.refresh.unwrap_or(false)).await;

    let mut view = session.lock().await;
    view.apply_fetch(&key, result);
    Ok(Json(view.snapshot()))
}

// PUT /servers/{id}/files/selection
pub async fn update_selection(
    State(state): State<AppState>,
    user: PanelUser,
    Path(server_id): Path<String>,
    Json(req): Json<SelectionRequest>,
) -> AppResult<Json<FileManagerSnapshot>> {
    validation::validate_identifier(&server_id, "server_id")?;
    let session = state.file_view(&user.id, &server_id).await;
    let mut view = session.lock().await;
    match (req.select_all, req.names) {
        (Some(select), _) => view.select_all(select),
        (None, Some(names)) => view.set_selection(names),
        (None, None) => {
            return Err(AppError::BadRequest("expected either select_all or names".to_string()));
        }
    }
    Ok(Json(view.snapshot()))
}
