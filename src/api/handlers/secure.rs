/*
 * Responsibility
 * - /api/{client_id}/data (read/write) and /api/{client_id}/debug handlers
 * - Every handler calls the permission gate first; nothing runs on denial
 * - debug returns the full AuthContext for the same check the read route performs
 * - token_info checks only the bearer token itself (audience), no resource owner
 */
use axum::{
    Json,
    extract::{OriginalUri, Path, State},
    http::HeaderMap,
};

use crate::{
    api::extractors::Principal,
    error::AppError,
    services::authz::{AuthContext, CLIENT_ID_TARGET, PermissionRequest},
    state::AppState,
};

pub const API_READ: &str = "API.Read";
pub const API_WRITE: &str = "API.Write";

pub async fn read_data(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
    OriginalUri(uri): OriginalUri,
    Principal(principal): Principal,
    headers: HeaderMap,
) -> Result<String, AppError> {
    state
        .gate
        .has_permission(
            principal.as_ref(),
            &client_id,
            CLIENT_ID_TARGET,
            API_READ,
            &headers,
        )
        .await
        .map_err(|err| AppError::from_permission(err, uri.path()))?;

    Ok(format!("Request Validated! - {}", client_id))
}

pub async fn write_data(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
    OriginalUri(uri): OriginalUri,
    Principal(principal): Principal,
    headers: HeaderMap,
) -> Result<String, AppError> {
    state
        .gate
        .has_permission(
            principal.as_ref(),
            &client_id,
            CLIENT_ID_TARGET,
            API_WRITE,
            &headers,
        )
        .await
        .map_err(|err| AppError::from_permission(err, uri.path()))?;

    Ok(format!("Request Validated! - {}", client_id))
}

pub async fn debug(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
    OriginalUri(uri): OriginalUri,
    Principal(principal): Principal,
    headers: HeaderMap,
) -> Result<Json<AuthContext>, AppError> {
    let ctx = state
        .gate
        .authorize(PermissionRequest {
            principal: principal.as_ref(),
            client_id: Some(&client_id),
            required_role: Some(API_READ),
            headers: &headers,
        })
        .await
        .map_err(|denial| AppError::forbidden(&denial, uri.path()))?;

    Ok(Json(ctx))
}

pub async fn token_info(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Principal(principal): Principal,
    headers: HeaderMap,
) -> Result<Json<AuthContext>, AppError> {
    let ctx = state
        .gate
        .validate_token(principal.as_ref(), None, &headers)
        .await
        .map_err(|denial| AppError::forbidden(&denial, uri.path()))?;

    Ok(Json(ctx))
}
