//! Mock implementations for testing
//!
//! These mocks enable turn tests without a model, network or database.

use super::traits::*;
use crate::catalog::{CatalogCapabilities, CatalogError, CatalogResult, MovieCatalog};
use crate::db::{DbError, Movie, MovieFields};
use crate::llm::{LlmError, LlmRequest, LlmResponse, LlmService, ToolDefinition};
use crate::lookup::{LookupError, OnlineLookup, PlaceholderLookup};
use crate::memory::{MemoryError, MemoryStore};
use crate::tools::ToolOutput;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Mutex;

// ============================================================================
// Mock LLM Client
// ============================================================================

/// Mock LLM client that returns queued responses
pub struct MockLlmClient {
    responses: Mutex<VecDeque<Result<LlmResponse, LlmError>>>,
    model_id: String,
    /// Record of all requests made
    pub requests: Mutex<Vec<LlmRequest>>,
}

impl MockLlmClient {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            model_id: model_id.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful response
    pub fn queue_response(&self, response: LlmResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    /// Queue an error response
    pub fn queue_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock response queued")))
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

/// Lets the mock stand in for a provider behind the production wiring
#[async_trait]
impl LlmService for MockLlmClient {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        LlmClient::complete(self, request).await
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

// ============================================================================
// Mock Tool Executor
// ============================================================================

/// Mock tool executor with predefined outputs
pub struct MockToolExecutor {
    outputs: HashMap<String, ToolOutput>,
    definitions: Vec<ToolDefinition>,
    /// Record of tool executions
    pub executions: Mutex<Vec<(String, Value)>>,
}

impl MockToolExecutor {
    pub fn new() -> Self {
        Self {
            outputs: HashMap::new(),
            definitions: Vec::new(),
            executions: Mutex::new(Vec::new()),
        }
    }

    /// Add a tool with a predefined output
    pub fn with_tool(mut self, name: impl Into<String>, output: ToolOutput) -> Self {
        let name = name.into();
        self.definitions.push(ToolDefinition {
            name: name.clone(),
            description: format!("Mock {name}"),
            input_schema: serde_json::json!({ "type": "object", "properties": {} }),
        });
        self.outputs.insert(name, output);
        self
    }

    /// Get recorded executions
    pub fn recorded_executions(&self) -> Vec<(String, Value)> {
        self.executions.lock().unwrap().clone()
    }
}

impl Default for MockToolExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolExecutor for MockToolExecutor {
    async fn execute(&self, name: &str, input: Value) -> Result<Option<ToolOutput>, CatalogError> {
        self.executions
            .lock()
            .unwrap()
            .push((name.to_string(), input));
        Ok(self.outputs.get(name).cloned())
    }

    fn definitions(&self) -> Vec<ToolDefinition> {
        self.definitions.clone()
    }
}

// ============================================================================
// In-Memory Catalog
// ============================================================================

/// Catalog backed by a map, with switchable text search and failure injection
pub struct InMemoryCatalog {
    rows: Mutex<BTreeMap<i64, Movie>>,
    next_id: Mutex<i64>,
    text_search: bool,
    failing: bool,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(BTreeMap::new()),
            next_id: Mutex::new(1),
            text_search: true,
            failing: false,
        }
    }

    /// Report no text-search capability
    pub fn without_text_search(mut self) -> Self {
        self.text_search = false;
        self
    }

    /// Fail every operation with a store error
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    fn check(&self) -> CatalogResult<()> {
        if self.failing {
            return Err(CatalogError::Db(DbError::Poisoned));
        }
        Ok(())
    }
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MovieCatalog for InMemoryCatalog {
    async fn get(&self, id: i64) -> CatalogResult<Option<Movie>> {
        self.check()?;
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn get_by_name(&self, name: &str) -> CatalogResult<Option<Movie>> {
        self.check()?;
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .find(|m| m.name == name)
            .cloned())
    }

    async fn all(&self) -> CatalogResult<Vec<Movie>> {
        self.check()?;
        Ok(self.rows.lock().unwrap().values().cloned().collect())
    }

    async fn save(&self, movie: &Movie) -> CatalogResult<()> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        if let Some(row) = rows.get_mut(&movie.id) {
            *row = movie.clone();
        }
        Ok(())
    }

    async fn create(&self, fields: &MovieFields) -> CatalogResult<i64> {
        self.check()?;
        let mut next_id = self.next_id.lock().unwrap();
        let id = *next_id;
        *next_id += 1;

        let mut movie = Movie::from_fields(fields);
        movie.id = id;
        movie.created_at = Some(Utc::now());
        self.rows.lock().unwrap().insert(id, movie);
        Ok(id)
    }

    async fn delete(&self, id: i64) -> CatalogResult<()> {
        self.check()?;
        self.rows.lock().unwrap().remove(&id);
        Ok(())
    }

    fn capabilities(&self) -> CatalogCapabilities {
        CatalogCapabilities {
            text_search: self.text_search,
        }
    }

    async fn search_by_text(&self, query: &str) -> CatalogResult<Vec<Movie>> {
        self.check()?;
        if !self.text_search {
            return Err(CatalogError::Unsupported("text search"));
        }
        let needle = query.to_lowercase();
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|m| {
                m.name.to_lowercase().contains(&needle)
                    || m.description.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect())
    }
}

// ============================================================================
// In-Memory Memory Store
// ============================================================================

/// Key-value memory held in a map
#[derive(Default)]
pub struct InMemoryMemoryStore {
    items: Mutex<HashMap<(String, String), Value>>,
}

impl InMemoryMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored value, read synchronously
    pub fn value(&self, namespace: &str, key: &str) -> Option<Value> {
        self.items
            .lock()
            .unwrap()
            .get(&(namespace.to_string(), key.to_string()))
            .cloned()
    }
}

#[async_trait]
impl MemoryStore for InMemoryMemoryStore {
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<Value>, MemoryError> {
        Ok(self.value(namespace, key))
    }

    async fn put(&self, namespace: &str, key: &str, value: Value) -> Result<(), MemoryError> {
        self.items
            .lock()
            .unwrap()
            .insert((namespace.to_string(), key.to_string()), value);
        Ok(())
    }
}

// ============================================================================
// Fixed Lookup
// ============================================================================

/// Online lookup returning preset fields, recording every title asked for
pub struct FixedLookup {
    fields: Option<MovieFields>,
    pub queries: Mutex<Vec<String>>,
}

impl FixedLookup {
    pub fn new(fields: MovieFields) -> Self {
        Self {
            fields: Some(fields),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Answer with the placeholder details for whatever title is asked
    pub fn placeholder() -> Self {
        Self {
            fields: None,
            queries: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl OnlineLookup for FixedLookup {
    async fn search(&self, title: &str) -> Result<MovieFields, LookupError> {
        self.queries.lock().unwrap().push(title.to_string());
        match &self.fields {
            Some(fields) => Ok(fields.clone()),
            None => PlaceholderLookup.search(title).await,
        }
    }
}
