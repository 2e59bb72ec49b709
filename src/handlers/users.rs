use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use crate::auth::{hash_password, random_hex, verify_password};
use crate::error::AppError;
use crate::models::{Credentials, NewUser, OAuthRequest, TokenResponse};
use crate::state::AppState;
use crate::store::StoreError;

pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<TokenResponse>, AppError> {
    let Json(creds) = payload?;
    let email = creds.email.trim().to_string();

    if email.is_empty() || creds.password.is_empty() {
        return Err(AppError::InvalidInput(
            "Email and password are required".to_string(),
        ));
    }

    if state.store.user_exists(&email).await? {
        warn!(%email, "registration for existing user");
        return Err(AppError::InvalidInput("User already exists".to_string()));
    }

    let password_hash = hash_password(creds.password, state.bcrypt_cost).await?;
    let user = NewUser {
        email,
        password_hash,
        first_name: creds.first_name.unwrap_or_default(),
        username: creds.username.unwrap_or_default(),
        subscribe: creds.subscribe.unwrap_or_else(|| "false".to_string()),
        created_at: creds.created_at.unwrap_or_else(Utc::now),
    };

    // the existence check above can race another registration
    let user = state.store.create_user(user).await.map_err(|e| match e {
        StoreError::AlreadyExists => AppError::InvalidInput("User already exists".to_string()),
        other => other.into(),
    })?;

    let token = state.tokens.issue(&user.email)?;
    info!(email = %user.email, "user registered");
    Ok(Json(TokenResponse {
        token,
        message: None,
    }))
}

pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<TokenResponse>, AppError> {
    let Json(creds) = payload?;
    let email = creds.email.trim();
    let invalid = || AppError::Unauthorized("Invalid credentials".to_string());

    let Some(user) = state.store.user_by_email(email).await? else {
        warn!(%email, "login for unknown user");
        return Err(invalid());
    };

    if !verify_password(creds.password, user.password_hash.clone()).await? {
        warn!(%email, "login with wrong password");
        return Err(invalid());
    }

    let token = state.tokens.issue(&user.email)?;
    info!(email = %user.email, "user logged in");
    Ok(Json(TokenResponse {
        token,
        message: None,
    }))
}

/// Google Sign-In: logs the user in, creating the account on first sight.
pub async fn oauth_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<OAuthRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, AppError> {
    let Json(req) = payload?;

    let verifier = state
        .identity
        .as_ref()
        .ok_or_else(|| AppError::Unauthorized("Google sign-in is not configured".to_string()))?;

    let identity = verifier.verify(&req.token).await.map_err(|e| {
        warn!("Google ID token rejected: {e}");
        AppError::Unauthorized("Invalid token".to_string())
    })?;

    if state.store.user_exists(&identity.email).await? {
        let token = state.tokens.issue(&identity.email)?;
        info!(email = %identity.email, "user logged in with Google");
        return Ok(Json(TokenResponse {
            token,
            message: Some("User logged in successfully".to_string()),
        }));
    }

    // the account can only be used through Google, nobody knows this password
    let password_hash = hash_password(random_hex(32), state.bcrypt_cost).await?;
    let user = NewUser {
        email: identity.email,
        password_hash,
        first_name: identity.given_name,
        username: random_hex(8),
        subscribe: "false".to_string(),
        created_at: Utc::now(),
    };
    let user = state.store.create_user(user).await?;

    let token = state.tokens.issue(&user.email)?;
    info!(email = %user.email, "user registered with Google");
    Ok(Json(TokenResponse {
        token,
        message: Some("User registered and logged in successfully".to_string()),
    }))
}
