//! # Reverie Reasoning
//!
//! The orchestration layer. [`Agent`] wires the emotional, stamina,
//! personality, conversation and catch-up components together and exposes
//! the three entry points a host needs: `handle_event`, `on_wake` and `tick`.

pub mod agent;
pub mod decision;

pub use agent::{Agent, TickReport};
pub use decision::{Decision, Initiation};
