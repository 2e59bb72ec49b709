use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::aquariums::owned_aquarium;
use crate::auth::AuthUser;
use crate::error::AppError;
use crate::models::ParameterEntry;
use crate::state::AppState;

pub async fn create_entry_handler(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(aquarium_id): Path<String>,
    payload: Result<Json<ParameterEntry>, JsonRejection>,
) -> Result<(StatusCode, Json<ParameterEntry>), AppError> {
    let user = auth.load(&state).await?;
    owned_aquarium(&state, &user, &aquarium_id).await?;
    let Json(mut entry) = payload?;

    entry.id = Uuid::new_v4().to_string();
    entry.aquarium_id = aquarium_id;
    if entry.timestamp == 0 {
        entry.timestamp = Utc::now().timestamp();
    }

    state.store.create_parameter_entry(&entry).await?;
    info!(aquarium = %entry.aquarium_id, "parameter entry recorded");
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn list_entries_handler(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(aquarium_id): Path<String>,
) -> Result<Json<Vec<ParameterEntry>>, AppError> {
    let user = auth.load(&state).await?;
    owned_aquarium(&state, &user, &aquarium_id).await?;
    Ok(Json(state.store.parameter_entries(&aquarium_id).await?))
}
