pub mod config;
pub mod logging;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;

use std::sync::Arc;

use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::services::generator::LlmSentenceGenerator;
use crate::services::llm_provider::LLMProvider;
use crate::services::trainer::Trainer;
use crate::state::AppState;
use crate::store::{StoreError, WordStore};

/// Loads the word list named by `config` and wires it to the remote generator.
pub fn build_trainer(config: &Config, provider: LLMProvider) -> Result<Trainer, StoreError> {
    let store = WordStore::open(&config.words_file)?;
    Ok(Trainer::new(store, Arc::new(LlmSentenceGenerator::new(provider))))
}

pub fn create_app(trainer: Trainer) -> axum::Router {
    let state = AppState::new(trainer);

    routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
