//! Pure routing between nodes
//!
//! Given the node that just ran and the state it produced, decide which node
//! runs next. No I/O happens here.

use super::{ConversationState, Node, Workflow};
use thiserror::Error;

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Turn already ended")]
    AlreadyEnded,
    #[error("Node {node} is not part of the {workflow} workflow")]
    NotInWorkflow { node: Node, workflow: Workflow },
}

/// Route after the assistant step.
///
/// - latest message requests tools: `tools`
/// - latest message is a tool result (the model had nothing to add): `end`,
///   skipping the memory write
/// - otherwise: `write_memory`
pub fn smart_condition(state: &ConversationState) -> Node {
    match state.last_message() {
        Some(message) if !message.pending_tool_calls().is_empty() => Node::Tools,
        Some(message) if message.is_tool_result() => Node::End,
        _ => Node::WriteMemory,
    }
}

/// Route after the confirm step
pub fn is_approved(state: &ConversationState) -> Node {
    if state.approved == Some(true) {
        Node::Insert
    } else {
        Node::Search
    }
}

/// Compute the node that follows `current`
pub fn next_node(
    workflow: Workflow,
    current: Node,
    state: &ConversationState,
) -> Result<Node, TransitionError> {
    let not_in_workflow = || TransitionError::NotInWorkflow {
        node: current,
        workflow,
    };

    match (workflow, current) {
        (_, Node::End) => Err(TransitionError::AlreadyEnded),
        (_, Node::Start) => Ok(Node::Assistant),

        (Workflow::ToolCalling, Node::Assistant) => Ok(smart_condition(state)),
        (Workflow::ToolCalling, Node::Tools) => Ok(Node::Assistant),
        (Workflow::ToolCalling, Node::WriteMemory) => Ok(Node::End),
        (Workflow::ToolCalling, _) => Err(not_in_workflow()),

        (Workflow::LookupConfirmInsert, Node::Assistant) => Ok(Node::Search),
        (Workflow::LookupConfirmInsert, Node::Search) => Ok(Node::Build),
        (Workflow::LookupConfirmInsert, Node::Build) => Ok(Node::Confirm),
        (Workflow::LookupConfirmInsert, Node::Confirm) => Ok(is_approved(state)),
        (Workflow::LookupConfirmInsert, Node::Insert) => Ok(Node::End),
        (Workflow::LookupConfirmInsert, _) => Err(not_in_workflow()),
    }
}
