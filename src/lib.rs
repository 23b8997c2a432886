//! Storage Crab desktop client.
//!
//! The session core (credential pair, background renewal, session owner) and
//! the API calls it depends on, plus a presenter-agnostic event-loop
//! controller. `main.rs` wires these to a console front end.

pub mod api;
pub mod app;
pub mod config;
pub mod session;
