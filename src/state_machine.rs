//! Turn orchestration as an explicit state machine
//!
//! A turn is a walk over named nodes. Node handlers live in the runtime;
//! this module owns the state they thread and the pure routing between them.

pub mod node;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use node::{Node, Workflow};
pub use state::{ConversationState, Message, ToolCall, ToolInput};
pub use transition::{next_node, TransitionError};
