// Routing predicates evaluated after each agent node
//
// Pure functions over the transcript; the graph maps the result onto
// concrete nodes.

use super::messages::Message;

/// Completion marker for the repository analysis phase
pub const ANALYSIS_COMPLETED: &str = "ANALYSIS COMPLETED";

/// Completion marker for the ticket comment phase
pub const REVIEW_COMPLETED: &str = "REVIEW COMPLETED";

/// Where control goes after an agent node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// The agent requested tool calls
    DispatchTool,
    /// The agent emitted the phase's completion marker
    PhaseDone,
    /// Loop back into the same agent
    Continue,
}

/// Most recent agent-authored message, falling back to the last message
pub fn last_agent_message(messages: &[Message]) -> Option<&Message> {
    messages
        .iter()
        .rev()
        .find(|m| m.is_ai())
        .or_else(|| messages.last())
}

/// Decide the next step for a phase identified by its completion marker
///
/// Tool calls always win over the marker, so an agent that announces
/// completion while still calling tools gets its tools run first.
pub fn route(messages: &[Message], marker: &str) -> Route {
    let Some(message) = last_agent_message(messages) else {
        return Route::Continue;
    };

    if !message.tool_calls().is_empty() {
        Route::DispatchTool
    } else if message.content().contains(marker) {
        Route::PhaseDone
    } else {
        Route::Continue
    }
}
