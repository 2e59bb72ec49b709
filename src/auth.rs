use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use std::sync::Arc;
use tracing::debug;

use crate::error::AppError;
use crate::models::User;
use crate::state::AppState;

/// Caller identity taken from a verified `Authorization: Bearer` session token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub email: String,
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(|| AppError::Unauthorized("Missing token".to_string()))?;

        let token = header
            .to_str()
            .ok()
            .and_then(|h| h.strip_prefix("Bearer "))
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                AppError::Unauthorized("Invalid authorization header format".to_string())
            })?;

        let email = state.tokens.verify(token)?;
        debug!(user = %email, "authenticated");
        Ok(AuthUser { email })
    }
}

impl AuthUser {
    /// Loads the account behind the token; a token can outlive its user.
    pub async fn load(&self, state: &AppState) -> Result<User, AppError> {
        state
            .store
            .user_by_email(&self.email)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }
}

// bcrypt blocks, run it off the async workers
pub async fn hash_password(password: String, cost: u32) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(|e| AppError::Internal(format!("Error processing password: {e}")))
}

pub async fn verify_password(password: String, hash: String) -> Result<bool, AppError> {
    let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;
    // a malformed stored hash can never match
    Ok(verified.unwrap_or(false))
}

/// Hex string of `len` random characters (`len` is rounded down to even).
pub fn random_hex(len: usize) -> String {
    (0..len / 2)
        .map(|_| format!("{:02x}", rand::random::<u8>()))
        .collect()
}
