// Ticket-created trigger handling
//
// Screens incoming events, resolves the target repository and hands
// accepted tickets to a pipeline runner.

pub mod dispatcher;
pub mod filter;
pub mod runner;

pub use dispatcher::{DispatchOutcome, TicketDispatcher};
pub use filter::{EventFilter, ProjectRegistry, SkipReason};
pub use runner::{EnrichmentRunner, PipelineRunner, RunReport, RunnerSettings};
