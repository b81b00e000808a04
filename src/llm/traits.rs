//! Model invoker trait for abstracting different backends
//!
//! The reasoning loop talks to the language model exclusively through this
//! boundary: a named call with instructions, structured input, and an
//! optional output schema the result must conform to.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::core::{Result, TelosError};

/// A single structured call to the language model.
#[derive(Debug, Clone)]
pub struct ModelCall<'a> {
    /// Name of the call, for tracking and error reporting (e.g. "plan")
    pub name: &'a str,
    /// Instructions for the model
    pub instructions: &'a str,
    /// Structured input data serialized into the prompt
    pub input: Value,
    /// JSON schema the output must conform to; `None` means free-form JSON
    pub output_schema: Option<&'a Value>,
    /// Override of the backend's default model
    pub model: Option<&'a str>,
}

impl<'a> ModelCall<'a> {
    /// Create a call with no output schema and the default model
    pub fn new(name: &'a str, instructions: &'a str, input: Value) -> Self {
        Self {
            name,
            instructions,
            input,
            output_schema: None,
            model: None,
        }
    }

    /// Constrain the output to a JSON schema
    pub fn with_schema(mut self, schema: &'a Value) -> Self {
        self.output_schema = Some(schema);
        self
    }

    /// Use a specific model for this call
    pub fn with_model(mut self, model: &'a str) -> Self {
        self.model = Some(model);
        self
    }
}

/// Trait for model invocation backends
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    /// Perform a structured call and return the validated JSON output.
    ///
    /// Fails with [`TelosError::ModelInvocation`] on network, API, or
    /// schema-validation failure. Callers do not retry.
    async fn invoke(&self, call: ModelCall<'_>) -> Result<Value>;

    /// Get the backend name
    fn name(&self) -> &str;
}

/// Invoke and deserialize the output into a concrete type.
///
/// Output that does not match the target shape is reported as a model
/// invocation failure, never passed through malformed.
pub async fn invoke_as<T: DeserializeOwned>(
    invoker: &dyn ModelInvoker,
    call: ModelCall<'_>,
) -> Result<T> {
    let name = call.name.to_string();
    let value = invoker.invoke(call).await?;
    serde_json::from_value(value).map_err(|e| {
        TelosError::model(name, format!("output did not match the requested shape: {}", e))
    })
}
