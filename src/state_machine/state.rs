//! Conversation state types

use crate::db::MovieFields;
use crate::llm::{ContentBlock, LlmMessage, MessageRole};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Tool Input Types - Strongly typed inputs for each tool
// ============================================================================

/// Input for the `search_movies` tool
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchMoviesInput {
    #[serde(default)]
    pub query: Option<String>,
}

/// Input for the `insert_movie` tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertMovieInput {
    pub movie_data: MovieFields,
}

/// Input for the `update_movie` tool. `movie.id` selects the row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateMovieInput {
    pub movie: MovieFields,
}

/// Input for the `update_price` tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdatePriceInput {
    pub movie_id: i64,
    pub new_price: f64,
}

/// Input for the `delete_movie_by_id` tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteMovieInput {
    pub movie_id: i64,
}

/// Strongly typed tool input enum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_tool", rename_all = "snake_case")]
pub enum ToolInput {
    ListMovies,
    SearchMovies(SearchMoviesInput),
    InsertMovie(InsertMovieInput),
    UpdateMovie(UpdateMovieInput),
    UpdatePrice(UpdatePriceInput),
    DeleteMovie(DeleteMovieInput),
    /// Fallback for unknown tools or arguments that failed to parse
    Unknown { name: String, input: Value },
}

impl ToolInput {
    pub fn tool_name(&self) -> &str {
        match self {
            ToolInput::ListMovies => "list_movies",
            ToolInput::SearchMovies(_) => "search_movies",
            ToolInput::InsertMovie(_) => "insert_movie",
            ToolInput::UpdateMovie(_) => "update_movie",
            ToolInput::UpdatePrice(_) => "update_price",
            ToolInput::DeleteMovie(_) => "delete_movie_by_id",
            ToolInput::Unknown { name, .. } => name,
        }
    }

    /// Convert to JSON Value for tool execution
    pub fn to_value(&self) -> Value {
        match self {
            ToolInput::ListMovies => Value::Object(serde_json::Map::new()),
            ToolInput::SearchMovies(input) => serde_json::to_value(input).unwrap_or(Value::Null),
            ToolInput::InsertMovie(input) => serde_json::to_value(input).unwrap_or(Value::Null),
            ToolInput::UpdateMovie(input) => serde_json::to_value(input).unwrap_or(Value::Null),
            ToolInput::UpdatePrice(input) => serde_json::to_value(input).unwrap_or(Value::Null),
            ToolInput::DeleteMovie(input) => serde_json::to_value(input).unwrap_or(Value::Null),
            ToolInput::Unknown { input, .. } => input.clone(),
        }
    }

    /// Parse from tool name and JSON value. Arguments that do not fit the
    /// named tool are kept verbatim as `Unknown` so the tool can report them.
    pub fn from_name_and_value(name: &str, value: Value) -> Self {
        fn parse<T: serde::de::DeserializeOwned>(
            name: &str,
            value: Value,
            wrap: fn(T) -> ToolInput,
        ) -> ToolInput {
            serde_json::from_value(value.clone()).map_or_else(
                |_| ToolInput::Unknown {
                    name: name.to_string(),
                    input: value,
                },
                wrap,
            )
        }

        match name {
            "list_movies" => ToolInput::ListMovies,
            "search_movies" => parse(name, value, ToolInput::SearchMovies),
            "insert_movie" => parse(name, value, ToolInput::InsertMovie),
            "update_movie" => parse(name, value, ToolInput::UpdateMovie),
            "update_price" => parse(name, value, ToolInput::UpdatePrice),
            "delete_movie_by_id" => parse(name, value, ToolInput::DeleteMovie),
            _ => ToolInput::Unknown {
                name: name.to_string(),
                input: value,
            },
        }
    }
}

// ============================================================================
// Tool Call - A tool invocation with ID and typed input
// ============================================================================

/// A tool call from the LLM with typed input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub input: ToolInput,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, input: ToolInput) -> Self {
        Self {
            id: id.into(),
            input,
        }
    }

    pub fn name(&self) -> &str {
        self.input.tool_name()
    }
}

// ============================================================================
// Messages
// ============================================================================

/// One entry of the conversation history. Never mutated once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Message {
    System {
        text: String,
    },
    User {
        text: String,
    },
    Assistant {
        text: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCall>,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(default)]
        is_error: bool,
    },
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Message::User { text: text.into() }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Message::Assistant {
            text: text.into(),
            tool_calls: Vec::new(),
        }
    }

    /// Build an assistant message from model output blocks
    pub fn from_response_blocks(blocks: &[ContentBlock]) -> Self {
        let mut text = String::new();
        let mut tool_calls = Vec::new();

        for block in blocks {
            match block {
                ContentBlock::Text { text: t } => text.push_str(t),
                ContentBlock::ToolUse { id, name, input } => tool_calls.push(ToolCall::new(
                    id.clone(),
                    ToolInput::from_name_and_value(name, input.clone()),
                )),
                ContentBlock::ToolResult { .. } => {}
            }
        }

        Message::Assistant { text, tool_calls }
    }

    /// Tool calls this message asks to have executed
    pub fn pending_tool_calls(&self) -> &[ToolCall] {
        match self {
            Message::Assistant { tool_calls, .. } => tool_calls,
            _ => &[],
        }
    }

    pub fn is_tool_result(&self) -> bool {
        matches!(self, Message::ToolResult { .. })
    }

    /// Reply text of an assistant message
    pub fn reply_text(&self) -> Option<&str> {
        match self {
            Message::Assistant { text, .. } if !text.is_empty() => Some(text),
            _ => None,
        }
    }
}

// ============================================================================
// Conversation State
// ============================================================================

/// State threaded through one turn
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationState {
    pub messages: Vec<Message>,
    /// Raw text for the current turn
    pub user_input: Option<String>,
    /// Memory note loaded at the start of the turn
    pub memory: Option<String>,
    /// Facts fetched online for `user_input`
    pub online_info: Option<MovieFields>,
    /// Fields of the movie to persist; absent fields leave stored values alone
    pub candidate: Option<MovieFields>,
    /// Gate for the insert path
    pub approved: Option<bool>,
    /// Id returned by a completed insert
    pub persisted_id: Option<i64>,
}

impl ConversationState {
    /// Start a turn on top of retained history
    pub fn for_input(history: Vec<Message>, text: impl Into<String>) -> Self {
        let text = text.into();
        let mut messages = history;
        messages.push(Message::user(text.clone()));
        Self {
            messages,
            user_input: Some(text),
            ..Self::default()
        }
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Text of the latest assistant reply
    pub fn reply(&self) -> Option<&str> {
        self.messages.iter().rev().find_map(Message::reply_text)
    }

    /// System messages in history, in order
    pub fn system_texts(&self) -> impl Iterator<Item = &str> {
        self.messages.iter().filter_map(|m| match m {
            Message::System { text } => Some(text.as_str()),
            _ => None,
        })
    }

    /// History in the shape the model expects. System messages are left out
    /// (they travel as system content); consecutive tool results are folded
    /// into one user message.
    pub fn llm_messages(&self) -> Vec<LlmMessage> {
        let mut out: Vec<LlmMessage> = Vec::new();

        for message in &self.messages {
            match message {
                Message::System { .. } => {}
                Message::User { text } => out.push(LlmMessage {
                    role: MessageRole::User,
                    content: vec![ContentBlock::text(text.clone())],
                }),
                Message::Assistant { text, tool_calls } => {
                    let mut content = Vec::new();
                    if !text.is_empty() {
                        content.push(ContentBlock::text(text.clone()));
                    }
                    content.extend(tool_calls.iter().map(|call| {
                        ContentBlock::tool_use(call.id.clone(), call.name(), call.input.to_value())
                    }));
                    out.push(LlmMessage {
                        role: MessageRole::Assistant,
                        content,
                    });
                }
                Message::ToolResult {
                    tool_use_id,
                    content,
                    is_error,
                } => {
                    let block = ContentBlock::tool_result(tool_use_id.clone(), content.clone(), *is_error);
                    match out.last_mut() {
                        Some(last)
                            if last.role == MessageRole::User
                                && last
                                    .content
                                    .iter()
                                    .all(|b| matches!(b, ContentBlock::ToolResult { .. })) =>
                        {
                            last.content.push(block);
                        }
                        _ => out.push(LlmMessage {
                            role: MessageRole::User,
                            content: vec![block],
                        }),
                    }
                }
            }
        }

        out
    }
}
