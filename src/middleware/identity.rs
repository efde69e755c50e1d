use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};

use crate::error::{validation, AppError};

pub const USER_HEADER: &str = "x-panel-user";
pub const ROOT_ADMIN_HEADER: &str = "x-panel-root-admin";

/// Caller identity as forwarded by the panel front end.
///
/// Authentication happens upstream; this service only scopes persisted state
/// by the id it is handed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PanelUser {
    pub id: String,
    pub root_admin: bool,
}

/// Reads the caller identity from request headers.
pub fn extract_user_from_headers(headers: &HeaderMap) -> Result<PanelUser, AppError> {
    let id = headers
        .get(USER_HEADER)
        .and_then(|hv| hv.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Unauthorized(format!("missing {} header", USER_HEADER)))?;
    validation::validate_identifier(id, USER_HEADER)?;

    let root_admin = headers
        .get(ROOT_ADMIN_HEADER)
        .and_then(|hv| hv.to_str().ok())
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false);

    Ok(PanelUser { id: id.to_string(), root_admin })
}

impl<S> FromRequestParts<S> for PanelUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        extract_user_from_headers(&parts.headers)
    }
}
