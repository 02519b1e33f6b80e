//! HTTP request handlers

use super::types::{
    ErrorResponse, MemoryResponse, MoviesResponse, SessionClearedResponse, TurnRequest,
    TurnResponse,
};
use super::AppState;
use crate::config::AgentConfig;
use crate::lookup::LookupError;
use crate::memory::load_user_memory;
use crate::runtime::TurnError;
use crate::state_machine::ConversationState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Turns
        .route("/api/turn", post(run_turn))
        // Catalog
        .route("/api/movies", get(list_movies))
        // Memory and sessions
        .route("/api/memory/:user_id", get(get_memory))
        .route("/api/sessions/:user_id", delete(clear_session))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Turns
// ============================================================

async fn run_turn(
    State(state): State<AppState>,
    Json(req): Json<TurnRequest>,
) -> Result<Json<TurnResponse>, AppError> {
    if req.text.trim().is_empty() {
        return Err(AppError::BadRequest("text must not be empty".to_string()));
    }

    let runner = state.runner.as_ref().ok_or_else(|| {
        AppError::Unavailable("No LLM configured. Set OPENAI_API_KEY.".to_string())
    })?;

    let config = AgentConfig::resolve(req.configurable.as_ref());

    // Held until the turn finishes
    let mut sessions = state.sessions.lock().await;
    let history = sessions.get(&config.user_id).cloned().unwrap_or_default();

    let outcome = runner
        .run_turn(&config, ConversationState::for_input(history, req.text))
        .await?;

    let response = TurnResponse {
        turn_id: outcome.turn_id.clone(),
        user_id: config.user_id.clone(),
        reply: outcome.reply().map(str::to_string),
        persisted_id: outcome.persisted_id(),
        visited: outcome.visited.clone(),
        memory_written: outcome.memory_written(),
    };

    tracing::debug!(
        user_id = %config.user_id,
        appended = outcome.new_messages().len(),
        "Session history updated"
    );
    sessions.insert(config.user_id, outcome.state.messages);
    Ok(Json(response))
}

// ============================================================
// Catalog
// ============================================================

async fn list_movies(State(state): State<AppState>) -> Result<Json<MoviesResponse>, AppError> {
    let movies = state
        .catalog
        .all()
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(Json(MoviesResponse { movies }))
}

// ============================================================
// Memory and sessions
// ============================================================

async fn get_memory(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<MemoryResponse>, AppError> {
    let record = load_user_memory(&state.memory, &user_id)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .ok_or_else(|| AppError::NotFound(format!("No memory for user {user_id}")))?;

    Ok(Json(MemoryResponse {
        user_id,
        memory: record.memory,
    }))
}

async fn clear_session(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Json<SessionClearedResponse> {
    let cleared = state.sessions.lock().await.remove(&user_id).is_some();
    tracing::info!(user_id = %user_id, cleared, "Session cleared");
    Json(SessionClearedResponse { user_id, cleared })
}

// ============================================================
// Version
// ============================================================

async fn get_version() -> &'static str {
    concat!("movie-agent ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    NotFound(String),
    Unavailable(String),
    Internal(String),
}

impl From<TurnError> for AppError {
    fn from(err: TurnError) -> Self {
        let message = err.to_string();
        match err {
            TurnError::Llm(e) if e.kind.is_upstream() => AppError::Unavailable(message),
            TurnError::Lookup(LookupError::NotFound(_)) => AppError::NotFound(message),
            TurnError::MissingCandidate => AppError::BadRequest(message),
            _ => AppError::Internal(message),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
