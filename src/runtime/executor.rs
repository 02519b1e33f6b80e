//! Turn runner: the driver loop over the node graph

use super::traits::{LlmClient, ToolExecutor};

use crate::catalog::{CatalogError, MovieCatalog};
use crate::config::AgentConfig;
use crate::llm::{ContentBlock, LlmError, LlmMessage, LlmRequest, MessageRole, SystemContent};
use crate::lookup::{LookupError, OnlineLookup};
use crate::memory::{load_user_memory, store_user_memory, MemoryError, MemoryRecord, MemoryStore};
use crate::state_machine::{next_node, ConversationState, Message, Node, TransitionError, Workflow};
use crate::system_prompt::{build_memory_prompt, build_system_prompt};
use crate::tools::upsert;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

const ASSISTANT_MAX_TOKENS: u32 = 4096;
const MEMORY_MAX_TOKENS: u32 = 1024;

/// Closing user message for the memory request
const MEMORY_REQUEST: &str = "Write the updated memory now.";

/// Failures that abort a turn. Nothing is retried.
#[derive(Error, Debug)]
pub enum TurnError {
    #[error("LLM request failed: {0}")]
    Llm(#[from] LlmError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Memory(#[from] MemoryError),
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error("No candidate movie to insert")]
    MissingCandidate,
}

/// Result of a completed turn
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// Correlates the turn's log lines
    pub turn_id: String,
    pub state: ConversationState,
    /// Nodes in execution order, `Start` through `End`
    pub visited: Vec<Node>,
    /// Length of the history when the turn began
    history_len: usize,
}

impl TurnOutcome {
    /// Latest assistant reply produced during this turn
    pub fn reply(&self) -> Option<&str> {
        self.state.messages[self.history_len..]
            .iter()
            .rev()
            .find_map(Message::reply_text)
    }

    pub fn memory_written(&self) -> bool {
        self.visited.contains(&Node::WriteMemory)
    }

    pub fn persisted_id(&self) -> Option<i64> {
        self.state.persisted_id
    }

    /// Messages appended during this turn
    pub fn new_messages(&self) -> &[Message] {
        &self.state.messages[self.history_len..]
    }
}

/// Runs turns for any LLM, tool and memory implementations
pub struct TurnRunner<L, T, M>
where
    L: LlmClient,
    T: ToolExecutor,
    M: MemoryStore,
{
    llm_client: L,
    tool_executor: T,
    memory: M,
    catalog: Arc<dyn MovieCatalog>,
    lookup: Arc<dyn OnlineLookup>,
    workflow: Workflow,
}

impl<L, T, M> TurnRunner<L, T, M>
where
    L: LlmClient,
    T: ToolExecutor,
    M: MemoryStore,
{
    pub fn new(
        llm_client: L,
        tool_executor: T,
        memory: M,
        catalog: Arc<dyn MovieCatalog>,
        lookup: Arc<dyn OnlineLookup>,
    ) -> Self {
        Self {
            llm_client,
            tool_executor,
            memory,
            catalog,
            lookup,
            workflow: Workflow::default(),
        }
    }

    pub fn with_workflow(mut self, workflow: Workflow) -> Self {
        self.workflow = workflow;
        self
    }

    /// Run one turn to completion.
    ///
    /// The state is owned by this call; callers that keep history between
    /// turns must serialize turns for the same user.
    pub async fn run_turn(
        &self,
        config: &AgentConfig,
        mut state: ConversationState,
    ) -> Result<TurnOutcome, TurnError> {
        let turn_id = Uuid::new_v4().to_string();
        let history_len = state.messages.len();
        let mut visited = Vec::new();
        let mut node = Node::Start;

        tracing::info!(
            turn_id = %turn_id,
            user_id = %config.user_id,
            workflow = %self.workflow,
            model = %self.llm_client.model_id(),
            "Starting turn"
        );

        while node != Node::End {
            visited.push(node);
            tracing::debug!(turn_id = %turn_id, node = %node, "Entering node");
            if let Err(e) = self.run_node(node, config, &mut state).await {
                tracing::error!(turn_id = %turn_id, node = %node, error = %e, "Turn aborted");
                return Err(e);
            }
            node = next_node(self.workflow, node, &state)?;
        }
        visited.push(Node::End);

        tracing::info!(
            turn_id = %turn_id,
            user_id = %config.user_id,
            steps = visited.len(),
            persisted_id = ?state.persisted_id,
            "Turn complete"
        );

        Ok(TurnOutcome {
            turn_id,
            state,
            visited,
            history_len,
        })
    }

    async fn run_node(
        &self,
        node: Node,
        config: &AgentConfig,
        state: &mut ConversationState,
    ) -> Result<(), TurnError> {
        match node {
            Node::Start => self.start(config, state).await,
            Node::Assistant => self.assistant(config, state).await,
            Node::Tools => self.tools(state).await,
            Node::WriteMemory => self.write_memory(config, state).await,
            Node::Search => self.search(state).await,
            Node::Build => {
                state.candidate = state.online_info.clone();
                Ok(())
            }
            Node::Confirm => {
                // No human gate yet: every candidate is approved
                state.approved = Some(true);
                Ok(())
            }
            Node::Insert => self.insert(state).await,
            Node::End => Ok(()),
        }
    }

    async fn start(&self, config: &AgentConfig, state: &mut ConversationState) -> Result<(), TurnError> {
        let record = load_user_memory(&self.memory, &config.user_id).await?;
        state.memory = record.map(|r| r.memory);
        Ok(())
    }

    async fn assistant(
        &self,
        config: &AgentConfig,
        state: &mut ConversationState,
    ) -> Result<(), TurnError> {
        let mut system = vec![SystemContent::new(build_system_prompt(
            &config.assistant_role,
            state.memory.as_deref(),
        ))];
        system.extend(state.system_texts().map(SystemContent::new));

        let tools = match self.workflow {
            Workflow::ToolCalling => self.tool_executor.definitions(),
            Workflow::LookupConfirmInsert => Vec::new(),
        };

        let request = LlmRequest {
            system,
            messages: state.llm_messages(),
            tools,
            max_tokens: Some(ASSISTANT_MAX_TOKENS),
        };

        let response = self.llm_client.complete(&request).await?;
        let message = Message::from_response_blocks(&response.content);

        // An empty reply leaves the latest message in place for routing
        if message.reply_text().is_none() && message.pending_tool_calls().is_empty() {
            tracing::debug!("Model returned an empty reply");
            return Ok(());
        }

        state.messages.push(message);
        Ok(())
    }

    async fn tools(&self, state: &mut ConversationState) -> Result<(), TurnError> {
        let calls = state
            .last_message()
            .map(|m| m.pending_tool_calls().to_vec())
            .unwrap_or_default();

        for call in calls {
            let name = call.name().to_string();
            tracing::info!(tool = %name, id = %call.id, "Executing tool");

            let (content, is_error) =
                match self.tool_executor.execute(&name, call.input.to_value()).await? {
                    Some(output) => (output.output, !output.success),
                    None => (format!("Unknown tool: {name}"), true),
                };

            if is_error {
                tracing::warn!(tool = %name, error = %content, "Tool returned an error");
            }

            state.messages.push(Message::ToolResult {
                tool_use_id: call.id,
                content,
                is_error,
            });
        }

        Ok(())
    }

    async fn write_memory(
        &self,
        config: &AgentConfig,
        state: &mut ConversationState,
    ) -> Result<(), TurnError> {
        let mut messages = state.llm_messages();
        messages.push(LlmMessage {
            role: MessageRole::User,
            content: vec![ContentBlock::text(MEMORY_REQUEST)],
        });

        let request = LlmRequest {
            system: vec![SystemContent::new(build_memory_prompt(state.memory.as_deref()))],
            messages,
            tools: Vec::new(),
            max_tokens: Some(MEMORY_MAX_TOKENS),
        };

        let response = self.llm_client.complete(&request).await?;
        let memory = response.text().trim().to_string();

        store_user_memory(&self.memory, &config.user_id, &MemoryRecord::new(memory.clone()))
            .await?;
        tracing::info!(user_id = %config.user_id, len = memory.len(), "Memory updated");

        state.memory = Some(memory);
        Ok(())
    }

    async fn search(&self, state: &mut ConversationState) -> Result<(), TurnError> {
        let Some(title) = state.user_input.as_deref().filter(|t| !t.trim().is_empty()) else {
            return Ok(());
        };

        let info = self.lookup.search(title.trim()).await?;
        tracing::info!(title = %title, name = ?info.name, "Online lookup complete");
        state.online_info = Some(info);
        Ok(())
    }

    async fn insert(&self, state: &mut ConversationState) -> Result<(), TurnError> {
        let candidate = state.candidate.as_ref().ok_or(TurnError::MissingCandidate)?;
        let id = upsert(self.catalog.as_ref(), candidate).await?;
        state.persisted_id = Some(id);
        Ok(())
    }
}
