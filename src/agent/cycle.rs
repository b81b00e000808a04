//! The reasoning cycle
//!
//! One iteration of the loop: Plan -> Decide-Action -> Execute -> Reflect.
//! The three model calls are independent and never retried; a failing call
//! propagates to the loop controller. Tool failures never do.

use serde_json::{json, Value};

use crate::core::{Action, ActionResult, Cycle, Plan, Reflection, Result};
use crate::llm::{invoke_as, ModelCall, ModelInvoker};
use crate::tools::ToolRegistry;

const PLAN_INSTRUCTIONS: &str = "You are a planning assistant. Analyze the goal and create a \
    detailed plan to achieve it. Consider the available tools and any previous execution \
    history. If the goal is already achieved based on the history, set goal_achieved to true.";

const DECIDE_INSTRUCTIONS: &str = "You are an action planner. Based on the current plan and \
    available tools, decide what specific action to take to execute the next step in the plan. \
    Use 'direct_response' as tool_name if you can complete the goal directly without tools.";

const REFLECT_INSTRUCTIONS: &str = "You are a reflection assistant. Analyze what happened with \
    this specific action and its result. Evaluate if the action was successful and what should \
    be done next to progress toward the goal.";

fn plan_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "thoughts": {
                "type": "string",
                "description": "Reasoning about the current situation and what needs to be done"
            },
            "steps": {
                "type": "array",
                "items": {"type": "string"},
                "description": "Ordered list of steps to achieve the goal"
            },
            "current_step": {
                "type": "integer",
                "minimum": 0,
                "description": "Index of the current step to execute (0-based)"
            },
            "goal_achieved": {
                "type": "boolean",
                "description": "Whether the goal has been achieved"
            }
        },
        "required": ["thoughts", "steps", "current_step", "goal_achieved"]
    })
}

fn action_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "thoughts": {
                "type": "string",
                "description": "Reasoning about what action to take and why"
            },
            "tool_name": {
                "type": "string",
                "description": "Name of the tool to use, or 'direct_response' for direct completion"
            },
            "tool_parameters": {
                "type": "object",
                "description": "Parameters to pass to the tool"
            },
            "expected_outcome": {
                "type": "string",
                "description": "What we expect to happen from this action"
            },
            "user_message": {
                "type": "string",
                "description": "A note to the user on what you are about to do"
            }
        },
        "required": ["thoughts", "tool_name", "tool_parameters", "expected_outcome", "user_message"]
    })
}

fn reflection_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "thoughts": {
                "type": "string",
                "description": "Analysis of what happened and what was learned"
            },
            "action_successful": {
                "type": "boolean",
                "description": "Whether the action achieved its expected outcome"
            },
            "lessons_learned": {
                "type": "string",
                "description": "Key insights from this action"
            },
            "next_steps": {
                "type": "string",
                "description": "What should be done next based on this reflection"
            },
            "goal_progress": {
                "type": "string",
                "description": "Assessment of progress toward the overall goal"
            }
        },
        "required": ["thoughts", "action_successful", "lessons_learned", "next_steps", "goal_progress"]
    })
}

/// Runs the four steps of one iteration against the invoker and registry.
pub struct ReasoningCycle<'a> {
    invoker: &'a dyn ModelInvoker,
    tools: &'a ToolRegistry,
    description: &'a str,
}

impl<'a> ReasoningCycle<'a> {
    pub fn new(
        invoker: &'a dyn ModelInvoker,
        tools: &'a ToolRegistry,
        description: &'a str,
    ) -> Self {
        Self {
            invoker,
            tools,
            description,
        }
    }

    /// Plan step: analyze the goal against the recent history.
    ///
    /// `recent` is the trimmed context window, not the full history.
    pub async fn plan(&self, goal: &str, recent: &[Cycle]) -> Result<Plan> {
        let schema = plan_schema();
        let input = json!({
            "goal": goal,
            "agent_description": self.description,
            "available_tools": self.tools.summaries(),
            "execution_history": recent,
        });

        invoke_as(
            self.invoker,
            ModelCall::new("plan", PLAN_INSTRUCTIONS, input).with_schema(&schema),
        )
        .await
    }

    /// Decide-Action step: pick a tool (or direct response) for the plan's
    /// current step.
    pub async fn decide_action(&self, plan: &Plan) -> Result<Action> {
        let schema = action_schema();
        let input = json!({
            "plan": plan,
            "available_tools": self.tools.specs(),
        });

        invoke_as(
            self.invoker,
            ModelCall::new("decide", DECIDE_INSTRUCTIONS, input).with_schema(&schema),
        )
        .await
    }

    /// Execute step: pure dispatch, no model call.
    ///
    /// Missing tools and tool failures are converted to `error` results;
    /// nothing here aborts the loop.
    pub async fn execute_action(&self, action: &Action) -> ActionResult {
        if action.is_direct_response() {
            return ActionResult::direct_response();
        }

        let Some(tool) = self.tools.find(&action.tool_name) else {
            return ActionResult::missing_tool(&action.tool_name);
        };

        match tool.execute(&action.tool_parameters).await {
            Ok(value) => ActionResult::tool_execution(
                &action.tool_name,
                action.tool_parameters.clone(),
                value,
            ),
            Err(e) => {
                ActionResult::tool_error(&action.tool_name, action.tool_parameters.clone(), e)
            }
        }
    }

    /// Reflect step: evaluate the action and its result against the goal.
    pub async fn reflect(
        &self,
        action: &Action,
        action_result: &ActionResult,
        goal: &str,
    ) -> Result<Reflection> {
        let schema = reflection_schema();
        let input = json!({
            "action": action,
            "action_result": action_result,
            "goal": goal,
        });

        invoke_as(
            self.invoker,
            ModelCall::new("reflect", REFLECT_INSTRUCTIONS, input).with_schema(&schema),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use async_trait::async_trait;

    use crate::core::TelosError;
    use crate::tools::Tool;

    struct NoInvoker;

    #[async_trait]
    impl ModelInvoker for NoInvoker {
        async fn invoke(&self, call: ModelCall<'_>) -> Result<Value> {
            Err(TelosError::model(call.name, "not expected in this test"))
        }

        fn name(&self) -> &str {
            "none"
        }
    }

    struct FailingTool;

    #[async_trait]
    impl Tool for FailingTool {
        fn name(&self) -> &str {
            "broken"
        }

        fn description(&self) -> &str {
            "Always fails"
        }

        fn parameters(&self) -> BTreeMap<String, String> {
            BTreeMap::new()
        }

        async fn execute(&self, _args: &Value) -> Result<Value> {
            Err(TelosError::tool("it broke"))
        }
    }

    fn action(tool_name: &str) -> Action {
        Action {
            thoughts: String::new(),
            tool_name: tool_name.to_string(),
            tool_parameters: json!({}),
            expected_outcome: String::new(),
            user_message: String::new(),
        }
    }

    #[tokio::test]
    async fn test_execute_direct_response() {
        let tools = ToolRegistry::new();
        let cycle = ReasoningCycle::new(&NoInvoker, &tools, "test agent");

        let result = cycle.execute_action(&action("direct_response")).await;
        assert!(result.success());
        assert!(matches!(result, ActionResult::DirectResponse { .. }));
    }

    #[tokio::test]
    async fn test_execute_missing_tool_is_nonfatal() {
        let tools = ToolRegistry::new();
        let cycle = ReasoningCycle::new(&NoInvoker, &tools, "test agent");

        let result = cycle.execute_action(&action("multiply")).await;
        assert!(!result.success());
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["type"], "error");
        assert_eq!(value["result"], "Tool 'multiply' not found");
    }

    #[tokio::test]
    async fn test_execute_tool_failure_is_converted() {
        let mut tools = ToolRegistry::new();
        tools.add(Box::new(FailingTool));
        let cycle = ReasoningCycle::new(&NoInvoker, &tools, "test agent");

        let result = cycle.execute_action(&action("broken")).await;
        assert!(!result.success());
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["type"], "error");
        assert_eq!(value["tool_name"], "broken");
        assert!(value["result"]
            .as_str()
            .unwrap()
            .starts_with("Error executing tool:"));
    }
}
