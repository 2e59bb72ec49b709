use axum::{
    Json,
    extract::{ConnectInfo, State, rejection::JsonRejection},
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::metrics::{
    QUERY_REJECTED, QUERY_TOTAL, TRACKED_CLIENTS, UPSTREAM_ERRORS, UPSTREAM_LATENCY,
};
use crate::models::{QueryRequest, QueryResponse};
use crate::rate_limit::Admission;
use crate::state::AppState;

/// POST /openai/query
///
/// Session token, then body shape, then admission for the caller's address,
/// then one call to the provider. Nothing reaches the provider unless every
/// earlier step passed.
pub async fn query_handler(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>, AppError> {
    QUERY_TOTAL.inc();
    // a token whose account is gone is a credential failure on this route
    auth.load(&state).await.map_err(|e| match e {
        AppError::NotFound(_) => AppError::Unauthorized("Invalid token".to_string()),
        other => other,
    })?;

    let Json(request) = payload?;
    if request.messages.is_empty() {
        return Err(AppError::InvalidInput(
            "Invalid input. Expected a JSON body with a non-empty 'messages' field.".to_string(),
        ));
    }

    // identity is the peer address only; the port changes per connection
    let client = addr.ip().to_string();
    let admission = state.admission.check(&client);
    TRACKED_CLIENTS.set(state.admission.tracked_clients() as f64);
    match admission {
        Admission::Admitted => {}
        Admission::Cooldown { retry_after } | Admission::QuotaExhausted { retry_after } => {
            QUERY_REJECTED.inc();
            return Err(AppError::TooManyRequests { retry_after });
        }
    }

    let start_time = Instant::now();
    let result = state.llm.complete(&request.messages).await;
    let elapsed = start_time.elapsed();
    UPSTREAM_LATENCY.observe(elapsed.as_secs_f64());

    match result {
        Ok(content) => {
            info!(%client, user = %auth.email, ?elapsed, "LLM query completed");
            Ok(Json(QueryResponse { content }))
        }
        Err(e) => {
            UPSTREAM_ERRORS.inc();
            error!(%client, ?elapsed, "LLM query failed: {e}");
            Err(e.into())
        }
    }
}
