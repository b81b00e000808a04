//! Shared types used across Telos modules
//!
//! Contains the value types produced by each step of the reasoning loop
//! (Plan, Action, ActionResult, Reflection), the recorded Cycle, and the
//! status events surfaced to observers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sentinel tool name meaning "answer directly, no tool call".
pub const DIRECT_RESPONSE: &str = "direct_response";

/// A plan for achieving the goal, produced fresh each iteration.
///
/// `goal_achieved` is the only signal the loop controller consults to stop
/// iterating early; the model is trusted to set it when the history already
/// satisfies the goal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    /// Reasoning about the current situation and what needs to be done
    pub thoughts: String,
    /// Ordered list of steps to achieve the goal
    pub steps: Vec<String>,
    /// Index of the current step to execute (0-based)
    pub current_step: usize,
    /// Whether the goal has already been achieved
    pub goal_achieved: bool,
}

/// An action to be taken, decided from the current plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    /// Reasoning about what action to take and why
    pub thoughts: String,
    /// Name of the tool to use, or `direct_response` for direct completion
    pub tool_name: String,
    /// Parameters to pass to the tool
    pub tool_parameters: Value,
    /// What we expect to happen from this action
    pub expected_outcome: String,
    /// A note to the user on what is about to happen
    pub user_message: String,
}

impl Action {
    /// Whether this action is the direct-response sentinel
    pub fn is_direct_response(&self) -> bool {
        self.tool_name == DIRECT_RESPONSE
    }
}

/// Tagged outcome of executing an Action.
///
/// Tool and lookup failures are represented as the `Error` variant rather
/// than a Rust error; the loop always continues past them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionResult {
    /// The action completed directly without invoking any tool
    DirectResponse { result: String, success: bool },
    /// A registered tool was executed
    ToolExecution {
        tool_name: String,
        parameters: Value,
        result: Value,
        success: bool,
    },
    /// The tool was missing or its execution failed
    Error {
        #[serde(skip_serializing_if = "Option::is_none")]
        tool_name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        parameters: Option<Value>,
        result: String,
        success: bool,
    },
}

impl ActionResult {
    /// Create a direct-response result
    pub fn direct_response() -> Self {
        Self::DirectResponse {
            result: "Task completed directly without tool usage".to_string(),
            success: true,
        }
    }

    /// Create a successful tool execution result
    pub fn tool_execution(
        tool_name: impl Into<String>,
        parameters: Value,
        result: Value,
    ) -> Self {
        Self::ToolExecution {
            tool_name: tool_name.into(),
            parameters,
            result,
            success: true,
        }
    }

    /// Create a result for an action naming an unregistered tool
    pub fn missing_tool(tool_name: &str) -> Self {
        Self::Error {
            tool_name: None,
            parameters: None,
            result: format!("Tool '{}' not found", tool_name),
            success: false,
        }
    }

    /// Create a result for a tool that failed during execution
    pub fn tool_error(
        tool_name: impl Into<String>,
        parameters: Value,
        error: impl std::fmt::Display,
    ) -> Self {
        Self::Error {
            tool_name: Some(tool_name.into()),
            parameters: Some(parameters),
            result: format!("Error executing tool: {}", error),
            success: false,
        }
    }

    /// Whether the action succeeded
    pub fn success(&self) -> bool {
        match self {
            Self::DirectResponse { success, .. }
            | Self::ToolExecution { success, .. }
            | Self::Error { success, .. } => *success,
        }
    }
}

/// Reflection on the result of an action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reflection {
    /// Analysis of what happened and what was learned
    pub thoughts: String,
    /// Whether the action achieved its expected outcome
    pub action_successful: bool,
    /// Key insights from this action
    pub lessons_learned: String,
    /// What should be done next based on this reflection
    pub next_steps: String,
    /// Assessment of progress toward the overall goal
    pub goal_progress: String,
}

/// One completed Plan -> Act -> Reflect unit, the durable unit of history.
///
/// Appended-only: once recorded a cycle is never edited or removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cycle {
    /// 1-based iteration index, strictly increasing within a session
    pub iteration: usize,
    pub plan: Plan,
    pub action: Action,
    pub action_result: ActionResult,
    pub reflection: Reflection,
    pub timestamp: DateTime<Utc>,
}

/// Lifecycle events surfaced to a status observer.
///
/// Emission is fire-and-forget: observers may panic without affecting the
/// reasoning loop.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StatusEvent {
    GoalStart {
        goal: String,
        agent_name: String,
        available_tools: Vec<String>,
    },
    PlanCreated {
        iteration: usize,
        plan: Plan,
    },
    ActionDecided {
        iteration: usize,
        action: Action,
    },
    ActionExecuted {
        iteration: usize,
        action: Action,
        result: ActionResult,
    },
    ReflectionCompleted {
        iteration: usize,
        reflection: Reflection,
    },
    GoalCompleted {
        goal: String,
        achieved: bool,
        iterations: usize,
        final_result: Value,
    },
}

impl StatusEvent {
    /// Stable string identifier for the event type
    pub fn kind(&self) -> &'static str {
        match self {
            Self::GoalStart { .. } => "goal_start",
            Self::PlanCreated { .. } => "plan_created",
            Self::ActionDecided { .. } => "action_decided",
            Self::ActionExecuted { .. } => "action_executed",
            Self::ReflectionCompleted { .. } => "reflection_completed",
            Self::GoalCompleted { .. } => "goal_completed",
        }
    }
}
