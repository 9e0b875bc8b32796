// Ticket domain module
// Contains the ticket value, the trigger payload it is read from, and repository targets

#![allow(clippy::module_inception)]

pub mod ticket;
pub mod value_objects;

// Re-export main types for convenience
pub use ticket::{IssueEvent, Ticket, TriggerEvent};
pub use value_objects::{IssueAction, RepoTarget};
