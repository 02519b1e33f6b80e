//! System prompt construction
//!
//! The assistant step sends the configured role text followed by the
//! user's stored memory. The memory step uses its own instructions to ask
//! the model for a rewritten note.

use std::fmt::Write;

/// Shown in place of the note when the user has none yet
const EMPTY_MEMORY: &str = "(empty)";

/// Instructions for rewriting a user's long-term note
pub const MEMORY_INSTRUCTIONS: &str = r"You maintain a short long-term memory about the user of a movie theater assistant.

Review the existing memory and the conversation that follows. Produce the complete updated memory:
- keep facts that are still true
- add new personal details and preferences the user revealed (favourite genres, IMAX preference, budget, movies they asked about)
- drop anything the user corrected

Reply with the memory text only. If there is nothing worth remembering, reply with the existing memory unchanged.";

/// Build the system prompt for the assistant step
pub fn build_system_prompt(assistant_role: &str, memory: Option<&str>) -> String {
    let mut prompt = assistant_role.trim_end().to_string();

    prompt.push_str("\n\n# Memory\n\n");
    prompt.push_str(
        "Personal details remembered about this user from earlier conversations (the memory may be empty):\n",
    );
    let _ = writeln!(prompt, "{}", render_memory(memory));

    prompt
}

/// Build the system prompt for the memory step
pub fn build_memory_prompt(memory: Option<&str>) -> String {
    let mut prompt = MEMORY_INSTRUCTIONS.to_string();
    let _ = write!(prompt, "\n\n# Existing memory\n\n{}\n", render_memory(memory));
    prompt
}

fn render_memory(memory: Option<&str>) -> &str {
    memory
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(EMPTY_MEMORY)
}
