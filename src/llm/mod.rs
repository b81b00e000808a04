//! LLM module - model invocation boundary
//!
//! Provides the structured-call abstraction the reasoning loop depends on,
//! with Ollama as the default backend.

pub mod ollama;
pub mod traits;

pub use ollama::OllamaInvoker;
pub use traits::{invoke_as, ModelCall, ModelInvoker};
