//! CLI module - demo agents runnable from the command line
//!
//! The binary assembles one of the demo agents and runs a single goal
//! through it.

pub mod demos;

pub use demos::{email_agent, math_agent, print_status, research_agent, social_agent};
