//! Node and workflow identifiers

use crate::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A processing step in a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    Start,
    /// Invoke the model with instructions, memory and history
    Assistant,
    /// Execute the tool calls requested by the latest message
    Tools,
    /// Rewrite the user's long-term memory
    WriteMemory,
    /// Fetch online facts for `user_input`
    Search,
    /// Turn online facts into a candidate movie
    Build,
    /// Gate the candidate before insertion
    Confirm,
    /// Upsert the candidate into the catalog
    Insert,
    End,
}

impl Node {
    pub fn as_str(self) -> &'static str {
        match self {
            Node::Start => "start",
            Node::Assistant => "assistant",
            Node::Tools => "tools",
            Node::WriteMemory => "write_memory",
            Node::Search => "search",
            Node::Build => "build",
            Node::Confirm => "confirm",
            Node::Insert => "insert",
            Node::End => "end",
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which graph a runner walks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Workflow {
    /// assistant <-> tools loop, then memory write
    #[default]
    ToolCalling,
    /// assistant -> search -> build -> confirm -> insert
    LookupConfirmInsert,
}

impl fmt::Display for Workflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Workflow::ToolCalling => f.write_str("tool_calling"),
            Workflow::LookupConfirmInsert => f.write_str("lookup"),
        }
    }
}

impl FromStr for Workflow {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tool_calling" | "tools" => Ok(Workflow::ToolCalling),
            "lookup" | "lookup_confirm_insert" => Ok(Workflow::LookupConfirmInsert),
            _ => Err(ConfigError::UnknownWorkflow(s.to_string())),
        }
    }
}
