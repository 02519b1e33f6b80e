//! Movie agent - conversational catalog assistant
//!
//! Serves a small node-graph agent over HTTP. Each turn either lets the
//! model drive catalog tools and then rewrites the user's memory, or runs
//! a fixed lookup/confirm/insert pipeline for a movie title.

mod api;
mod catalog;
mod config;
mod db;
mod llm;
mod lookup;
mod memory;
mod runtime;
mod state_machine;
mod system_prompt;
mod tools;

use api::{create_router, AppState};
use catalog::{DatabaseCatalog, MovieCatalog};
use config::ServerConfig;
use db::Database;
use llm::{LlmConfig, LlmService};
use lookup::{OmdbLookup, OnlineLookup, PlaceholderLookup};
use memory::DatabaseMemory;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "movie_agent=info,tower_http=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = ServerConfig::from_env()?;

    // Ensure database directory exists
    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    tracing::info!(path = %config.db_path.display(), "Opening database");
    let db = Database::open(&config.db_path)?;
    let catalog: Arc<dyn MovieCatalog> = Arc::new(DatabaseCatalog::new(db.clone()));
    let memory = DatabaseMemory::new(db);

    let lookup: Arc<dyn OnlineLookup> = match config.omdb_api_key.clone() {
        Some(key) => {
            tracing::info!("Online lookup via OMDb");
            Arc::new(OmdbLookup::new(key)?)
        }
        None => Arc::new(PlaceholderLookup),
    };

    let llm_config = LlmConfig::from_env();
    let runner = match llm_config.build()? {
        Some(service) => {
            tracing::info!(
                model = %service.model_id(),
                workflow = %config.workflow,
                "LLM configured"
            );
            Some(runtime::production_runner(
                service,
                catalog.clone(),
                memory.clone(),
                lookup,
                config.workflow,
            ))
        }
        None => {
            tracing::warn!("No LLM API key configured. Set OPENAI_API_KEY.");
            None
        }
    };

    let state = AppState::new(runner, catalog, memory);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Movie agent listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
