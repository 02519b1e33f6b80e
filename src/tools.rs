//! Catalog tools exposed to the model
//!
//! Each tool parses its own arguments. Arguments that do not parse become an
//! error tool result the model can react to; catalog failures are returned as
//! `Err` and abort the turn.

mod delete_movie;
mod insert_movie;
mod list_movies;
mod search_movies;
mod update_movie;
mod update_price;

pub use delete_movie::DeleteMovieTool;
pub use insert_movie::{upsert, InsertMovieTool};
pub use list_movies::ListMoviesTool;
pub use search_movies::SearchMoviesTool;
pub use update_movie::UpdateMovieTool;
pub use update_price::UpdatePriceTool;

use crate::catalog::{CatalogCapabilities, CatalogError, MovieCatalog};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Result from tool execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub success: bool,
    pub output: String,
}

impl ToolOutput {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            output: message.into(),
        }
    }

    /// Serialize a tool's return value as the result text
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(s) => Self::success(s),
            Err(e) => Self::error(format!("Failed to serialize result: {e}")),
        }
    }
}

/// Everything a tool invocation needs
#[derive(Clone)]
pub struct ToolContext {
    pub catalog: Arc<dyn MovieCatalog>,
    /// Read once when the registry is built
    pub capabilities: CatalogCapabilities,
}

impl ToolContext {
    pub fn new(catalog: Arc<dyn MovieCatalog>) -> Self {
        let capabilities = catalog.capabilities();
        Self {
            catalog,
            capabilities,
        }
    }
}

/// Trait for tools that can be executed by the agent
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;

    /// Tool description for LLM
    fn description(&self) -> String;

    /// JSON schema for tool input
    fn input_schema(&self) -> Value;

    async fn run(&self, input: Value, ctx: ToolContext) -> Result<ToolOutput, CatalogError>;
}

/// Parse tool arguments, or produce the error result sent back to the model
fn parse_input<T: serde::de::DeserializeOwned>(input: Value) -> Result<T, ToolOutput> {
    serde_json::from_value(input).map_err(|e| ToolOutput::error(format!("Invalid input: {e}")))
}

/// The catalog tools bound to one catalog
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    ctx: ToolContext,
}

impl ToolRegistry {
    pub fn new(catalog: Arc<dyn MovieCatalog>) -> Self {
        let ctx = ToolContext::new(catalog);
        tracing::debug!(
            text_search = ctx.capabilities.text_search,
            "Tool registry bound to catalog"
        );

        Self {
            tools: vec![
                Arc::new(ListMoviesTool),
                Arc::new(InsertMovieTool),
                Arc::new(DeleteMovieTool),
                Arc::new(UpdateMovieTool),
                Arc::new(SearchMoviesTool),
                Arc::new(UpdatePriceTool),
            ],
            ctx,
        }
    }

    /// Get all tool definitions for LLM
    pub fn definitions(&self) -> Vec<crate::llm::ToolDefinition> {
        self.tools
            .iter()
            .map(|t| crate::llm::ToolDefinition {
                name: t.name().to_string(),
                description: t.description(),
                input_schema: t.input_schema(),
            })
            .collect()
    }

    /// Execute a tool by name. `Ok(None)` when no tool has that name.
    pub async fn execute(&self, name: &str, input: Value) -> Result<Option<ToolOutput>, CatalogError> {
        for tool in &self.tools {
            if tool.name() == name {
                return tool.run(input, self.ctx.clone()).await.map(Some);
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DatabaseCatalog;
    use crate::db::Database;
    use serde_json::json;

    fn registry() -> ToolRegistry {
        ToolRegistry::new(Arc::new(DatabaseCatalog::new(
            Database::open_in_memory().unwrap(),
        )))
    }

    #[test]
    fn declares_catalog_tools() {
        let defs = registry().definitions();
        let names: Vec<_> = defs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "list_movies",
                "insert_movie",
                "delete_movie_by_id",
                "update_movie",
                "search_movies",
                "update_price",
            ]
        );
        for def in &defs {
            assert_eq!(def.input_schema["type"], "object", "{}", def.name);
        }
    }

    #[tokio::test]
    async fn unknown_tool_is_none() {
        let result = registry().execute("play_trailer", json!({})).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn insert_then_list_through_registry() {
        let registry = registry();
        let out = registry
            .execute("insert_movie", json!({"movie_data": {"name": "Heat", "price": 9.0}}))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(out, ToolOutput::success("1"));

        let out = registry.execute("list_movies", json!({})).await.unwrap().unwrap();
        let rows: Vec<String> = serde_json::from_str(&out.output).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].contains("\"name\":\"Heat\""));
    }
}
