//! Tool registry - the ordered collection of available tools
//!
//! Insertion order is preserved; lookup is by exact name. Mutations are
//! expected only between reasoning cycles, never during one.

use serde_json::{json, Value};

use crate::tools::Tool;

/// Registry of available tools
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Create a registry from a list of tools
    pub fn with_tools(tools: Vec<Box<dyn Tool>>) -> Self {
        Self { tools }
    }

    /// Append a tool. Duplicate names are permitted; `find` keeps
    /// returning the first match, so callers should avoid duplicates.
    pub fn add(&mut self, tool: Box<dyn Tool>) {
        self.tools.push(tool);
    }

    /// Remove all tools with the given name
    pub fn remove(&mut self, name: &str) {
        self.tools.retain(|t| t.name() != name);
    }

    /// Find a tool by exact name. Absence means "not found", not an error.
    pub fn find(&self, name: &str) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .map(|t| t.as_ref())
    }

    /// All tools, in insertion order
    pub fn list(&self) -> impl Iterator<Item = &dyn Tool> {
        self.tools.iter().map(|t| t.as_ref())
    }

    /// Tool names, in insertion order
    pub fn names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name().to_string()).collect()
    }

    /// Name + description for each tool (planning context)
    pub fn summaries(&self) -> Vec<Value> {
        self.tools
            .iter()
            .map(|t| json!({"name": t.name(), "description": t.description()}))
            .collect()
    }

    /// Name + description + parameters for each tool (action context)
    pub fn specs(&self) -> Vec<Value> {
        self.tools
            .iter()
            .map(|t| {
                json!({
                    "name": t.name(),
                    "description": t.description(),
                    "parameters": t.parameters(),
                })
            })
            .collect()
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use async_trait::async_trait;

    use crate::core::Result;

    struct Named(&'static str, &'static str);

    #[async_trait]
    impl Tool for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn description(&self) -> &str {
            self.1
        }

        fn parameters(&self) -> BTreeMap<String, String> {
            BTreeMap::new()
        }

        async fn execute(&self, _args: &Value) -> Result<Value> {
            Ok(json!(self.1))
        }
    }

    #[test]
    fn test_insertion_order() {
        let mut registry = ToolRegistry::new();
        registry.add(Box::new(Named("b", "second")));
        registry.add(Box::new(Named("a", "third")));
        registry.add(Box::new(Named("c", "first")));

        assert_eq!(registry.names(), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_find_returns_first_match() {
        let mut registry = ToolRegistry::new();
        registry.add(Box::new(Named("dup", "one")));
        registry.add(Box::new(Named("dup", "two")));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.find("dup").unwrap().description(), "one");
    }

    #[test]
    fn test_remove_removes_all_matches() {
        let mut registry = ToolRegistry::new();
        registry.add(Box::new(Named("dup", "one")));
        registry.add(Box::new(Named("keep", "kept")));
        registry.add(Box::new(Named("dup", "two")));

        registry.remove("dup");

        assert_eq!(registry.names(), vec!["keep"]);
        assert!(registry.find("dup").is_none());
    }

    #[test]
    fn test_find_missing_is_none() {
        let registry = ToolRegistry::new();
        assert!(registry.find("nope").is_none());
    }

    #[test]
    fn test_found_tool_executes() {
        let mut registry = ToolRegistry::new();
        registry.add(Box::new(Named("echo", "payload")));

        let tool = registry.find("echo").unwrap();
        let result = tokio_test::block_on(tool.execute(&json!({}))).unwrap();
        assert_eq!(result, json!("payload"));
    }
}
