// Two-phase enrichment workflow
//
// ```text
// START -> Repo-Analyzer-Agent <-> repo_analyzer_tools_node
//              | ANALYSIS COMPLETED
//              v
//          Comment-On-Ticket-Agent <-> comment_on_ticket_tools_node
//              | REVIEW COMPLETED
//              v
//             END
// ```
//
// Execution is strictly sequential and bounded by a step ceiling.

use std::sync::Arc;

use super::agent::LlmAgent;
use super::errors::{AgentError, AgentResult};
use super::node::AgentNode;
use super::prompts::library;
use super::routing::{route, Route, ANALYSIS_COMPLETED, REVIEW_COMPLETED};
use super::state::PipelineState;
use super::tool_node::ToolNode;
use crate::config::{ModelBackend, DEFAULT_RECURSION_LIMIT};
use crate::llm::LlmProvider;
use crate::tools::actions::{REPO_ANALYZER_ACTIONS, TICKET_COMMENT_ACTIONS};
use crate::tools::Toolset;

pub const REPO_ANALYZER_AGENT: &str = "Repo-Analyzer-Agent";
pub const COMMENT_ON_TICKET_AGENT: &str = "Comment-On-Ticket-Agent";
pub const REPO_ANALYZER_TOOLS_NODE: &str = "repo_analyzer_tools_node";
pub const COMMENT_ON_TICKET_TOOLS_NODE: &str = "comment_on_ticket_tools_node";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    RepoAnalysis,
    TicketComment,
}

impl Phase {
    pub fn agent_name(&self) -> &'static str {
        match self {
            Phase::RepoAnalysis => REPO_ANALYZER_AGENT,
            Phase::TicketComment => COMMENT_ON_TICKET_AGENT,
        }
    }

    pub fn tools_node_name(&self) -> &'static str {
        match self {
            Phase::RepoAnalysis => REPO_ANALYZER_TOOLS_NODE,
            Phase::TicketComment => COMMENT_ON_TICKET_TOOLS_NODE,
        }
    }

    pub fn marker(&self) -> &'static str {
        match self {
            Phase::RepoAnalysis => ANALYSIS_COMPLETED,
            Phase::TicketComment => REVIEW_COMPLETED,
        }
    }

    /// Phase that follows completion, `None` for the last one
    pub fn next(&self) -> Option<Phase> {
        match self {
            Phase::RepoAnalysis => Some(Phase::TicketComment),
            Phase::TicketComment => None,
        }
    }
}

/// Node identifiers of the workflow state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeId {
    Agent(Phase),
    Tools(Phase),
    End,
}

impl NodeId {
    pub const START: NodeId = NodeId::Agent(Phase::RepoAnalysis);

    pub fn name(&self) -> &'static str {
        match self {
            NodeId::Agent(phase) => phase.agent_name(),
            NodeId::Tools(phase) => phase.tools_node_name(),
            NodeId::End => "__end__",
        }
    }
}

/// Agent and tool node owned by one phase
pub struct PhaseNodes {
    pub agent: AgentNode,
    pub tools: ToolNode,
}

/// Result of a completed run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub state: PipelineState,
    pub steps: usize,
}

pub struct Workflow {
    analysis: PhaseNodes,
    comment: PhaseNodes,
    recursion_limit: usize,
}

impl Workflow {
    pub fn new(analysis: PhaseNodes, comment: PhaseNodes) -> Self {
        Self {
            analysis,
            comment,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        }
    }

    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }

    pub fn recursion_limit(&self) -> usize {
        self.recursion_limit
    }

    fn phase(&self, phase: Phase) -> &PhaseNodes {
        match phase {
            Phase::RepoAnalysis => &self.analysis,
            Phase::TicketComment => &self.comment,
        }
    }

    /// Drive the state machine from START to END
    ///
    /// Every node execution counts as one step; reaching the limit before
    /// END fails the run.
    pub async fn run(&self, mut state: PipelineState) -> AgentResult<RunSummary> {
        let mut node = NodeId::START;
        let mut steps = 0;

        while node != NodeId::End {
            if steps >= self.recursion_limit {
                tracing::error!(
                    limit = self.recursion_limit,
                    node = node.name(),
                    "Recursion limit reached"
                );
                return Err(AgentError::RecursionLimitExceeded {
                    limit: self.recursion_limit,
                });
            }
            steps += 1;

            tracing::debug!(step = steps, node = node.name(), "Executing node");

            node = match node {
                NodeId::Agent(phase) => {
                    let delta = self.phase(phase).agent.invoke(&state).await;
                    state.apply(delta);
                    Self::after_agent(phase, &state)
                }
                NodeId::Tools(phase) => {
                    let delta = self.phase(phase).tools.invoke(&state).await;
                    state.apply(delta);
                    Self::after_tools(phase, &state)?
                }
                NodeId::End => unreachable!("loop exits on End"),
            };
        }

        tracing::info!(steps, messages = state.len(), "Workflow reached END");
        Ok(RunSummary { state, steps })
    }

    fn after_agent(phase: Phase, state: &PipelineState) -> NodeId {
        let decision = route(state.messages(), phase.marker());
        tracing::debug!(agent = phase.agent_name(), route = ?decision, "Routing agent output");

        match decision {
            Route::DispatchTool => NodeId::Tools(phase),
            Route::Continue => NodeId::Agent(phase),
            Route::PhaseDone => phase.next().map(NodeId::Agent).unwrap_or(NodeId::End),
        }
    }

    /// Tool results always go back to the agent that owns the state
    fn after_tools(phase: Phase, state: &PipelineState) -> AgentResult<NodeId> {
        match state.sender() {
            Some(sender) if sender == phase.agent_name() => Ok(NodeId::Agent(phase)),
            other => Err(AgentError::UnknownSender(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}

/// Mermaid flowchart of the workflow topology
pub fn mermaid_diagram() -> String {
    let mut lines = vec![
        "graph TD;".to_string(),
        "\t__start__([__start__]):::first".to_string(),
    ];

    for phase in [Phase::RepoAnalysis, Phase::TicketComment] {
        lines.push(format!("\t{}({})", phase.agent_name(), phase.agent_name()));
        lines.push(format!("\t{}({})", phase.tools_node_name(), phase.tools_node_name()));
    }
    lines.push("\t__end__([__end__]):::last".to_string());

    lines.push(format!("\t__start__ --> {};", REPO_ANALYZER_AGENT));
    for phase in [Phase::RepoAnalysis, Phase::TicketComment] {
        let agent = phase.agent_name();
        let tools = phase.tools_node_name();
        let next = phase.next().map(|p| p.agent_name()).unwrap_or("__end__");

        lines.push(format!("\t{} -.-> {};", agent, tools));
        lines.push(format!("\t{} -. &nbsp;continue&nbsp; .-> {};", agent, agent));
        lines.push(format!("\t{} -. &nbsp;{}&nbsp; .-> {};", agent, phase.marker(), next));
        lines.push(format!("\t{} -.-> {};", tools, agent));
    }

    lines.push("\tclassDef default fill:#f2f0ff,line-height:1.2".to_string());
    lines.push("\tclassDef first fill-opacity:0".to_string());
    lines.push("\tclassDef last fill:#bfb6fc".to_string());
    lines.join("\n")
}

/// Inputs for building the standard two-phase workflow
pub struct WorkflowConfig {
    pub backend: ModelBackend,
    pub recursion_limit: usize,
}

/// Build the enrichment workflow for one run
pub fn build_workflow(
    config: &WorkflowConfig,
    llm: Arc<dyn LlmProvider>,
    toolset: Arc<Toolset>,
) -> Workflow {
    let alternation = config.backend.requires_alternation();
    let analyzer_prompt = library::repo_analyzer();
    let commenter_prompt = library::ticket_comment();

    tracing::debug!(
        analyzer_prompt = %analyzer_prompt.label(),
        commenter_prompt = %commenter_prompt.label(),
        model = llm.model_name(),
        "Building workflow"
    );

    let analyzer = LlmAgent::new(
        analyzer_prompt.system,
        toolset.definitions(REPO_ANALYZER_ACTIONS),
        llm.clone(),
    );
    let commenter = LlmAgent::new(
        commenter_prompt.system,
        toolset.definitions(TICKET_COMMENT_ACTIONS),
        llm,
    );

    Workflow::new(
        PhaseNodes {
            agent: AgentNode::new(REPO_ANALYZER_AGENT, Arc::new(analyzer), alternation),
            tools: ToolNode::new(REPO_ANALYZER_TOOLS_NODE, toolset.clone(), REPO_ANALYZER_ACTIONS),
        },
        PhaseNodes {
            agent: AgentNode::new(COMMENT_ON_TICKET_AGENT, Arc::new(commenter), alternation),
            tools: ToolNode::new(COMMENT_ON_TICKET_TOOLS_NODE, toolset, TICKET_COMMENT_ACTIONS),
        },
    )
    .with_recursion_limit(config.recursion_limit)
}
