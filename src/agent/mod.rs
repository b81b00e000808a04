//! Agent module - the reasoning loop and its run state
//!
//! Contains the loop controller, the per-iteration reasoning cycle,
//! execution history, and status emission.

pub mod cycle;
pub mod history;
pub mod orchestrator;
pub mod status;

pub use cycle::ReasoningCycle;
pub use history::ExecutionHistory;
pub use orchestrator::{Agent, AgentBuilder, GoalPredicate};
pub use status::{StatusCallback, StatusEmitter};
