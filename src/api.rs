//! HTTP API hosting the turn graph

mod handlers;
mod types;

pub use handlers::create_router;

use crate::catalog::MovieCatalog;
use crate::memory::DatabaseMemory;
use crate::runtime::ProductionRunner;
use crate::state_machine::Message;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// `None` when no model is configured; turns are refused
    pub runner: Option<Arc<ProductionRunner>>,
    pub catalog: Arc<dyn MovieCatalog>,
    pub memory: DatabaseMemory,
    /// Retained history per user. Held for the whole turn, so turns run
    /// one at a time.
    pub sessions: Arc<Mutex<HashMap<String, Vec<Message>>>>,
}

impl AppState {
    pub fn new(
        runner: Option<ProductionRunner>,
        catalog: Arc<dyn MovieCatalog>,
        memory: DatabaseMemory,
    ) -> Self {
        Self {
            runner: runner.map(Arc::new),
            catalog,
            memory,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}
