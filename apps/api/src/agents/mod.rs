// Agent pipeline modules
//
// Two cooperating agents, each paired with a tool node, sequenced by an
// explicit state machine over an append-only transcript.

pub mod agent;
pub mod errors;
pub mod graph;
pub mod messages;
pub mod node;
pub mod prompts;
pub mod retry;
pub mod routing;
pub mod state;
pub mod tool_node;

// Re-export main types
pub use agent::{ChatAgent, LlmAgent};
pub use errors::{AgentError, AgentResult};
pub use graph::{build_workflow, Phase, RunSummary, Workflow, WorkflowConfig};
pub use messages::{Message, ToolCall};
pub use node::AgentNode;
pub use routing::Route;
pub use state::{PipelineState, StateDelta};
pub use tool_node::ToolNode;
