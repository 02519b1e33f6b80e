//! API request and response types

use crate::db::Movie;
use crate::state_machine::Node;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Request to run one turn
#[derive(Debug, Deserialize)]
pub struct TurnRequest {
    pub text: String,
    /// Per-invocation settings (`user_id`, `assistant_role`)
    #[serde(default)]
    pub configurable: Option<HashMap<String, String>>,
}

/// Result of a turn
#[derive(Debug, Serialize, Deserialize)]
pub struct TurnResponse {
    pub turn_id: String,
    pub user_id: String,
    pub reply: Option<String>,
    pub persisted_id: Option<i64>,
    pub visited: Vec<Node>,
    pub memory_written: bool,
}

/// Catalog listing
#[derive(Debug, Serialize)]
pub struct MoviesResponse {
    pub movies: Vec<Movie>,
}

/// Stored memory for a user
#[derive(Debug, Serialize)]
pub struct MemoryResponse {
    pub user_id: String,
    pub memory: String,
}

/// Response for clearing a session
#[derive(Debug, Serialize)]
pub struct SessionClearedResponse {
    pub user_id: String,
    /// Whether any history was held
    pub cleared: bool,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
