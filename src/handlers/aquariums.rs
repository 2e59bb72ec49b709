use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::models::{Aquarium, User};
use crate::state::AppState;
use crate::store::StoreError;

/// Fetches an aquarium and checks that `user` owns it.
pub(super) async fn owned_aquarium(
    state: &AppState,
    user: &User,
    id: &str,
) -> Result<Aquarium, AppError> {
    let aquarium = state
        .store
        .aquarium(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Aquarium not found".to_string()))?;

    if aquarium.user_id != user.id {
        warn!(aquarium = id, user = %user.email, "access to foreign aquarium");
        return Err(AppError::Forbidden("Forbidden".to_string()));
    }
    Ok(aquarium)
}

pub async fn create_aquarium_handler(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    payload: Result<Json<Aquarium>, JsonRejection>,
) -> Result<(StatusCode, Json<Aquarium>), AppError> {
    let user = auth.load(&state).await?;
    let Json(mut aquarium) = payload?;

    aquarium.user_id = user.id;
    if aquarium.id.is_empty() {
        aquarium.id = Uuid::new_v4().to_string();
    }

    state.store.create_aquarium(&aquarium).await.map_err(|e| match e {
        StoreError::AlreadyExists => {
            AppError::InvalidInput("Aquarium id already in use".to_string())
        }
        other => other.into(),
    })?;

    info!(aquarium = %aquarium.id, user = %user.email, "aquarium created");
    Ok((StatusCode::CREATED, Json(aquarium)))
}

pub async fn list_aquariums_handler(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<Vec<Aquarium>>, AppError> {
    let user = auth.load(&state).await?;
    let aquariums = state.store.aquariums_for_user(&user.id).await?;
    Ok(Json(aquariums))
}

pub async fn get_aquarium_handler(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Aquarium>, AppError> {
    let user = auth.load(&state).await?;
    let aquarium = owned_aquarium(&state, &user, &id).await?;
    Ok(Json(aquarium))
}

pub async fn update_aquarium_handler(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<String>,
    payload: Result<Json<Aquarium>, JsonRejection>,
) -> Result<Json<Aquarium>, AppError> {
    let user = auth.load(&state).await?;
    let Json(mut aquarium) = payload?;

    owned_aquarium(&state, &user, &id).await?;

    // path id and owner win over whatever the body says
    aquarium.id = id;
    aquarium.user_id = user.id;

    state.store.update_aquarium(&aquarium).await.map_err(|e| match e {
        StoreError::NotFound => AppError::NotFound("Aquarium not found".to_string()),
        other => other.into(),
    })?;

    info!(aquarium = %aquarium.id, "aquarium updated");
    Ok(Json(aquarium))
}

pub async fn delete_aquarium_handler(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let user = auth.load(&state).await?;

    state
        .store
        .delete_aquarium(&id, &user.id)
        .await
        .map_err(|e| match e {
            StoreError::NotFound => {
                AppError::NotFound("Aquarium not found or not owned by user".to_string())
            }
            other => other.into(),
        })?;

    info!(aquarium = %id, "aquarium deleted");
    Ok(StatusCode::NO_CONTENT)
}
