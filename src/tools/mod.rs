//! Tools module - capabilities exposed for model-directed invocation
//!
//! Contains the `Tool` trait, the registry, and the example integrations
//! (math, research, email, social).

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::core::Result;

pub mod email;
pub mod math;
pub mod registry;
pub mod search;
pub mod social;

pub use registry::ToolRegistry;

/// A named capability the model can direct the agent to invoke.
///
/// `parameters` maps each parameter name to a human/model-readable
/// type-and-description string, e.g. `"a" -> "float - The first number"`.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name, stable across a run
    fn name(&self) -> &str;

    /// Description of what the tool does, for model consumption
    fn description(&self) -> &str;

    /// Parameter name -> type+description mapping
    fn parameters(&self) -> BTreeMap<String, String>;

    /// Execute with named arguments.
    ///
    /// Any `Err` is caught by the execute step and converted to a
    /// non-fatal `error` ActionResult.
    async fn execute(&self, args: &Value) -> Result<Value>;
}

/// Get a string argument by key
pub fn arg_str<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key).and_then(|v| v.as_str())
}

/// Get a numeric argument by key (integers are widened)
pub fn arg_f64(args: &Value, key: &str) -> Option<f64> {
    args.get(key).and_then(|v| v.as_f64())
}

/// Get an unsigned integer argument by key
pub fn arg_u64(args: &Value, key: &str) -> Option<u64> {
    args.get(key).and_then(|v| v.as_u64())
}
