//! Ticket Enricher Library
//!
//! Listens for newly created tracker tickets, points two cooperating LLM
//! agents at the mapped repository, and posts a comment naming good starting
//! files for the fix.

pub mod agents;
pub mod api;
pub mod config;
pub mod domain;
pub mod llm;
pub mod tools;
pub mod trigger;
