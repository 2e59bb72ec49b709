use std::sync::Arc;

use crate::llm::ChatBackend;
use crate::oauth::IdentityVerifier;
use crate::rate_limit::AdmissionController;
use crate::store::Store;
use crate::token::TokenService;

// app's shared state

pub struct AppState {
    pub store: Arc<dyn Store>,
    pub tokens: TokenService,
    pub admission: AdmissionController, // guards the LLM proxy
    pub llm: Arc<dyn ChatBackend>,
    pub identity: Option<Arc<dyn IdentityVerifier>>, // None when no Google client id is configured
    pub bcrypt_cost: u32,
}
