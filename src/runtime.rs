//! Runtime for executing turns
//!
//! The runner is generic over its I/O so tests can swap in mocks; the
//! production wiring uses the database, the configured model and the
//! catalog tool registry.

mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::{TurnError, TurnOutcome, TurnRunner};
pub use traits::*;

use crate::catalog::MovieCatalog;
use crate::llm::LlmService;
use crate::lookup::OnlineLookup;
use crate::memory::DatabaseMemory;
use crate::state_machine::Workflow;
use crate::tools::ToolRegistry;
use std::sync::Arc;

/// Type alias for production runner with concrete implementations
pub type ProductionRunner = TurnRunner<ServiceLlmClient, ToolRegistryExecutor, DatabaseMemory>;

/// Wire a production runner. Catalog capabilities are read here, once.
pub fn production_runner(
    llm: Arc<dyn LlmService>,
    catalog: Arc<dyn MovieCatalog>,
    memory: DatabaseMemory,
    lookup: Arc<dyn OnlineLookup>,
    workflow: Workflow,
) -> ProductionRunner {
    let tools = ToolRegistryExecutor::new(ToolRegistry::new(catalog.clone()));
    TurnRunner::new(ServiceLlmClient::new(llm), tools, memory, catalog, lookup)
        .with_workflow(workflow)
}
