use axum::{
    Router,
    http::{
        HeaderName, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers::{
    all_details_handler, create_aquarium_handler, create_entry_handler, delete_aquarium_handler,
    detail_handler, get_aquarium_handler, health_handler, list_aquariums_handler,
    list_entries_handler, login_handler, metrics_handler, oauth_handler, query_handler,
    register_handler, update_aquarium_handler,
};
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::POST,
            Method::GET,
            Method::OPTIONS,
            Method::PUT,
            Method::DELETE,
        ])
        .allow_headers([
            CONTENT_TYPE,
            AUTHORIZATION,
            HeaderName::from_static("x-api-key"),
            HeaderName::from_static("x-detail-type"),
        ]);

    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/register", post(register_handler))
        .route("/login", post(login_handler))
        .route("/oauth", post(oauth_handler))
        .route("/aquariums", post(create_aquarium_handler))
        .route("/user/aquariums", get(list_aquariums_handler))
        .route(
            "/aquariums/{id}",
            get(get_aquarium_handler)
                .put(update_aquarium_handler)
                .delete(delete_aquarium_handler),
        )
        .route(
            "/aquariums/{id}/parameter-entries",
            post(create_entry_handler).get(list_entries_handler),
        )
        .route("/details/all/{kind}", get(all_details_handler))
        .route("/details/{id}", get(detail_handler))
        .route("/openai/query", post(query_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
