//! Telos - Goal-Driven Agent Loop
//!
//! A small framework for building AI agents around a core reasoning loop
//! (Plan -> Act -> Reflect). Given a natural-language goal, an agent
//! repeatedly asks a language model to plan, choose a tool-backed action,
//! execute it, and reflect, until the goal is judged complete or an
//! iteration budget is exhausted.
//!
//! # Architecture
//!
//! - **Core**: Shared types, configuration, and error handling
//! - **LLM**: Model invocation boundary with an Ollama implementation
//! - **Tools**: The `Tool` trait, the registry, and example integrations
//! - **Agent**: The loop controller, reasoning cycle, history, and status
//! - **CLI**: Demo agents runnable from the command line
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use telos::agent::Agent;
//! use telos::llm::OllamaInvoker;
//! use telos::tools::math::math_tools;
//! use telos::Config;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::load();
//!     let mut agent = Agent::builder("MathAgent")
//!         .invoker(Arc::new(OllamaInvoker::from_config(&config)))
//!         .description("An agent that solves mathematical problems")
//!         .tools(math_tools())
//!         .build()
//!         .unwrap();
//!
//!     let result = agent.process("Calculate (25 * 4) + 7").await.unwrap();
//!     println!("{}", result);
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod core;
pub mod llm;
pub mod tools;

// Re-export commonly used items
pub use agent::{Agent, AgentBuilder};
pub use self::core::{Config, Result, TelosError};
