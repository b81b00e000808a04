//! Custom error types for Telos
//!
//! Provides a unified error handling system across all modules.

use thiserror::Error;

/// Main error type for Telos operations
#[derive(Error, Debug)]
pub enum TelosError {
    /// Model invocation failures (network, API, or output that does not
    /// match the requested schema). Fatal to the current `process` call.
    #[error("Model invocation '{call}' failed: {message}")]
    ModelInvocation { call: String, message: String },

    /// Tool execution errors. Always recovered by the execute step and
    /// turned into an `error` ActionResult; never aborts the loop.
    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Model not available on the configured backend
    #[error("Model '{0}' not available in Ollama. Run: ollama pull {0}")]
    ModelNotFound(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Generic error for other cases
    #[error("{0}")]
    Other(String),
}

/// Convenience Result type for Telos operations
pub type Result<T> = std::result::Result<T, TelosError>;

impl TelosError {
    /// Create a model invocation error
    pub fn model(call: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ModelInvocation {
            call: call.into(),
            message: message.into(),
        }
    }

    /// Create a tool execution error
    pub fn tool(msg: impl Into<String>) -> Self {
        Self::ToolExecution(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Wrap an error with additional context
    pub fn with_context<E>(context: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::WithContext {
            context: context.into(),
            source: Box::new(error),
        }
    }
}
