mod auth;
mod clock;
mod config;
mod error;
mod handlers;
mod llm;
mod metrics;
mod models;
mod oauth;
mod rate_limit;
mod routes;
mod state;
mod store;
mod token;

use clap::Parser; // for cli
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::clock::{Clock, SystemClock};
use crate::config::Args;
use crate::llm::OpenAiClient;
use crate::models::Catalog;
use crate::oauth::{GoogleVerifier, IdentityVerifier};
use crate::rate_limit::AdmissionController;
use crate::state::AppState;
use crate::store::MemoryStore;
use crate::token::TokenService;

fn load_catalog(args: &Args) -> Result<Catalog, Box<dyn std::error::Error>> {
    let Some(path) = &args.catalog else {
        return Ok(Catalog::default());
    };
    let raw = std::fs::read_to_string(path)?;
    let catalog: Catalog = serde_json::from_str(&raw)?;
    info!(
        "Loaded catalog from {}: {} species, {} plants, {} equipment",
        path.display(),
        catalog.species.len(),
        catalog.plants.len(),
        catalog.equipment.len()
    );
    Ok(catalog)
}

// this is main async function with tokio
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // parse cli arguments
    let args = Args::parse();
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let llm = OpenAiClient::new(
        &args.openai_base_url,
        args.openai_api_key.clone(),
        args.model.clone(),
        args.max_tokens,
        Duration::from_secs(args.upstream_timeout_secs),
    )?;

    let identity = args.google_client_id.clone().map(|client_id| {
        Arc::new(GoogleVerifier::new(reqwest::Client::new(), client_id))
            as Arc<dyn IdentityVerifier>
    });

    // creating shared state
    let state = Arc::new(AppState {
        store: Arc::new(MemoryStore::with_catalog(load_catalog(&args)?)),
        tokens: TokenService::new(&args.jwt_secret, clock.clone())?,
        admission: AdmissionController::new(
            Duration::from_secs(args.cooldown_secs),
            args.hourly_limit,
            clock,
        ),
        llm: Arc::new(llm),
        identity,
        bcrypt_cost: args.bcrypt_cost,
    });

    let app = routes::router(state);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Backend running on http://localhost:{}", args.port);
    info!("Forwarding LLM queries to {} ({})", args.openai_base_url, args.model);
    info!(
        "LLM admission: {}s cooldown, {} requests per hour per client",
        args.cooldown_secs, args.hourly_limit
    );
    if args.google_client_id.is_none() {
        info!("CLIENT_ID not set, Google sign-in disabled");
    }

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
