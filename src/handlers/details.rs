use axum::{
    Json,
    extract::{Path, State},
    http::HeaderMap,
};
use std::sync::Arc;

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::models::{Detail, DetailKind};
use crate::state::AppState;

pub const DETAIL_TYPE_HEADER: &str = "x-detail-type";

fn parse_kind(raw: &str) -> Result<DetailKind, AppError> {
    raw.parse().map_err(AppError::InvalidInput)
}

// GET /details/{id}, kind comes from the X-Detail-Type header
pub async fn detail_handler(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Detail>, AppError> {
    let raw = headers
        .get(DETAIL_TYPE_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::InvalidInput("Missing X-Detail-Type header".to_string()))?;
    let kind = parse_kind(raw)?;

    state
        .store
        .detail(kind, &id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Not found".to_string()))
}

pub async fn all_details_handler(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    Path(kind): Path<String>,
) -> Result<Json<Vec<Detail>>, AppError> {
    let kind = parse_kind(&kind)?;
    Ok(Json(state.store.details(kind).await?))
}
