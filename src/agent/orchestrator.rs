//! Agent orchestrator
//!
//! The loop controller: drives Plan -> Decide-Action -> Execute -> Reflect
//! iterations up to a configured maximum, accumulates history, decides
//! termination, and produces the final structured result.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::agent::cycle::ReasoningCycle;
use crate::agent::history::ExecutionHistory;
use crate::agent::status::{StatusCallback, StatusEmitter};
use crate::core::{Config, Cycle, Plan, Result, StatusEvent, TelosError};
use crate::llm::{ModelCall, ModelInvoker};
use crate::tools::{Tool, ToolRegistry};

const FINAL_RESULT_INSTRUCTIONS: &str = "You are a result formatter. Based on the goal and \
    execution history, generate a structured final result. Extract the key information and \
    format it according to the required schema. Focus on the main outcomes and insights from \
    the agent's work.";

/// Pluggable predicate deciding whether the goal was achieved, given the
/// goal and the recorded cycles. Used for reporting only, never for loop
/// control.
pub type GoalPredicate = Box<dyn Fn(&str, &[Cycle]) -> bool + Send + Sync>;

/// An agent processing goals through the reasoning loop.
///
/// All run state (`current_goal`, `current_plan`, the execution history)
/// is owned by this value, and `process` takes `&mut self` — one goal at
/// a time per agent, enforced by the borrow checker. Tool registration is
/// expected between runs, never during one.
pub struct Agent {
    name: String,
    description: String,
    tools: ToolRegistry,
    invoker: Arc<dyn ModelInvoker>,
    max_iterations: usize,
    history_window: usize,
    output_schema: Option<Value>,
    emitter: StatusEmitter,
    goal_check: Option<GoalPredicate>,
    current_goal: Option<String>,
    current_plan: Option<Plan>,
    execution_history: ExecutionHistory,
}

impl Agent {
    /// Start building an agent with the given name
    pub fn builder(name: impl Into<String>) -> AgentBuilder {
        AgentBuilder::new(name)
    }

    /// Agent name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Agent description, as shown to the model
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Add a tool to the agent's toolkit
    pub fn add_tool(&mut self, tool: Box<dyn Tool>) {
        self.tools.add(tool);
    }

    /// Remove all tools with the given name
    pub fn remove_tool(&mut self, name: &str) {
        self.tools.remove(name);
    }

    /// Names of the registered tools, in registration order
    pub fn tool_names(&self) -> Vec<String> {
        self.tools.names()
    }

    /// A formatted summary of available tools
    pub fn tools_summary(&self) -> String {
        format!(
            "Agent '{}' tools: {}",
            self.name,
            self.tool_names().join(", ")
        )
    }

    /// The cycles recorded for the most recent `process` call
    pub fn history(&self) -> &[Cycle] {
        self.execution_history.cycles()
    }

    /// The goal passed to the most recent `process` call
    pub fn current_goal(&self) -> Option<&str> {
        self.current_goal.as_deref()
    }

    /// The last plan produced by the most recent `process` call
    pub fn current_plan(&self) -> Option<&Plan> {
        self.current_plan.as_ref()
    }

    /// Whether the goal is achieved, per the configured predicate.
    ///
    /// Default: the last recorded reflection marked its action successful.
    /// This reported status is independent of the plan's `goal_achieved`
    /// flag that stops the loop; the two signals can disagree, and both
    /// are surfaced deliberately.
    pub fn is_goal_achieved(&self, goal: &str) -> bool {
        let history = self.execution_history.cycles();
        match &self.goal_check {
            Some(check) => check(goal, history),
            None => history
                .last()
                .map(|c| c.reflection.action_successful)
                .unwrap_or(false),
        }
    }

    /// Process a goal using the reasoning loop: Plan -> Act -> Reflect,
    /// repeated until the plan reports the goal achieved or the iteration
    /// budget is exhausted.
    ///
    /// Returns the final structured result: the default
    /// `{goal, achieved, iterations, execution_history}` mapping, or a
    /// value shaped to the configured output schema. A failing model call
    /// aborts the whole run with no partial result.
    pub async fn process(&mut self, goal: &str) -> Result<Value> {
        self.current_goal = Some(goal.to_string());
        self.current_plan = None;
        self.execution_history.reset();

        self.emitter.emit(&StatusEvent::GoalStart {
            goal: goal.to_string(),
            agent_name: self.name.clone(),
            available_tools: self.tools.names(),
        });
        info!(agent = %self.name, goal, "starting goal");

        let runner = ReasoningCycle::new(&*self.invoker, &self.tools, &self.description);

        let mut iteration = 0;
        while iteration < self.max_iterations {
            iteration += 1;
            debug!(iteration, max = self.max_iterations, "iteration start");

            // Step 1: Plan
            let plan = runner
                .plan(goal, self.execution_history.recent(self.history_window))
                .await?;
            self.emitter.emit(&StatusEvent::PlanCreated {
                iteration,
                plan: plan.clone(),
            });

            // The plan's flag is the only signal that stops the loop early.
            // The iteration that reports it is not recorded as a cycle.
            if plan.goal_achieved {
                debug!(iteration, "plan reports goal achieved");
                break;
            }

            // Step 2: Decide and execute the action
            let action = runner.decide_action(&plan).await?;
            self.emitter.emit(&StatusEvent::ActionDecided {
                iteration,
                action: action.clone(),
            });

            let action_result = runner.execute_action(&action).await;
            self.emitter.emit(&StatusEvent::ActionExecuted {
                iteration,
                action: action.clone(),
                result: action_result.clone(),
            });

            // Step 3: Reflect on the result
            let reflection = runner.reflect(&action, &action_result, goal).await?;
            self.emitter.emit(&StatusEvent::ReflectionCompleted {
                iteration,
                reflection: reflection.clone(),
            });

            self.execution_history.record(Cycle {
                iteration,
                plan: plan.clone(),
                action,
                action_result,
                reflection,
                timestamp: Utc::now(),
            });
            self.current_plan = Some(plan);
        }

        let final_result = self.generate_final_result(goal).await?;
        let achieved = self.is_goal_achieved(goal);

        self.emitter.emit(&StatusEvent::GoalCompleted {
            goal: goal.to_string(),
            achieved,
            iterations: iteration,
            final_result: final_result.clone(),
        });
        info!(agent = %self.name, achieved, iterations = iteration, "goal processing finished");

        Ok(final_result)
    }

    /// Generate the final structured result.
    ///
    /// Without an output schema this is a plain mapping over the recorded
    /// history; with one, it is one more model call whose failure is fatal.
    async fn generate_final_result(&self, goal: &str) -> Result<Value> {
        let achieved = self.is_goal_achieved(goal);
        let history = self.execution_history.cycles();

        let Some(schema) = &self.output_schema else {
            return Ok(json!({
                "goal": goal,
                "achieved": achieved,
                "iterations": history.len(),
                "execution_history": history,
            }));
        };

        let input = json!({
            "goal": goal,
            "execution_history": history,
            "agent_description": self.description,
            "goal_achieved": achieved,
            "iterations": history.len(),
        });

        self.invoker
            .invoke(
                ModelCall::new("generate_final_result", FINAL_RESULT_INSTRUCTIONS, input)
                    .with_schema(schema),
            )
            .await
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("tools", &self.tools.names())
            .field("max_iterations", &self.max_iterations)
            .finish()
    }
}

/// Builder for [`Agent`]
pub struct AgentBuilder {
    name: String,
    description: Option<String>,
    tools: Vec<Box<dyn Tool>>,
    invoker: Option<Arc<dyn ModelInvoker>>,
    max_iterations: usize,
    history_window: usize,
    output_schema: Option<Value>,
    callback: Option<StatusCallback>,
    goal_check: Option<GoalPredicate>,
}

impl AgentBuilder {
    /// Create a new builder with the given agent name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            tools: Vec::new(),
            invoker: None,
            max_iterations: 10,
            history_window: 3,
            output_schema: None,
            callback: None,
            goal_check: None,
        }
    }

    /// Set the model invoker (required)
    pub fn invoker(mut self, invoker: Arc<dyn ModelInvoker>) -> Self {
        self.invoker = Some(invoker);
        self
    }

    /// Set the agent description shown to the model
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a tool
    pub fn tool(mut self, tool: Box<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    /// Add several tools
    pub fn tools(mut self, tools: Vec<Box<dyn Tool>>) -> Self {
        self.tools.extend(tools);
        self
    }

    /// Set the maximum number of reasoning iterations
    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set how many recent cycles are included in the planning context
    pub fn history_window(mut self, history_window: usize) -> Self {
        self.history_window = history_window;
        self
    }

    /// Shape the final result to a JSON schema via one extra model call
    pub fn output_schema(mut self, schema: Value) -> Self {
        self.output_schema = Some(schema);
        self
    }

    /// Register a status observer callback
    pub fn callback(mut self, callback: StatusCallback) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Override the goal-achieved predicate used for reporting
    pub fn goal_check(mut self, check: GoalPredicate) -> Self {
        self.goal_check = Some(check);
        self
    }

    /// Take iteration limits from configuration
    pub fn config(mut self, config: &Config) -> Self {
        self.max_iterations = config.agent.max_iterations;
        self.history_window = config.agent.history_window;
        self
    }

    /// Build the agent
    pub fn build(self) -> Result<Agent> {
        let invoker = self
            .invoker
            .ok_or_else(|| TelosError::config("an agent requires a model invoker"))?;

        let description = self
            .description
            .unwrap_or_else(|| format!("AI agent named {}", self.name));

        let emitter = match self.callback {
            Some(callback) => StatusEmitter::with_callback(callback),
            None => StatusEmitter::new(),
        };

        Ok(Agent {
            name: self.name,
            description,
            tools: ToolRegistry::with_tools(self.tools),
            invoker,
            max_iterations: self.max_iterations,
            history_window: self.history_window,
            output_schema: self.output_schema,
            emitter,
            goal_check: self.goal_check,
            current_goal: None,
            current_plan: None,
            execution_history: ExecutionHistory::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;

    struct NoInvoker;

    #[async_trait]
    impl ModelInvoker for NoInvoker {
        async fn invoke(&self, call: ModelCall<'_>) -> Result<Value> {
            Err(TelosError::model(call.name, "unused"))
        }

        fn name(&self) -> &str {
            "none"
        }
    }

    #[test]
    fn test_builder_requires_invoker() {
        let err = Agent::builder("a").build().unwrap_err();
        assert!(err.to_string().contains("model invoker"));
    }

    #[test]
    fn test_builder_defaults() {
        let agent = Agent::builder("calc")
            .invoker(Arc::new(NoInvoker))
            .build()
            .unwrap();

        assert_eq!(agent.name(), "calc");
        assert_eq!(agent.description(), "AI agent named calc");
        assert!(agent.history().is_empty());
    }

    #[test]
    fn test_tools_summary() {
        let mut agent = Agent::builder("calc")
            .invoker(Arc::new(NoInvoker))
            .build()
            .unwrap();
        agent.add_tool(Box::new(crate::tools::math::AddTool));
        agent.add_tool(Box::new(crate::tools::math::SubtractTool));

        assert_eq!(agent.tools_summary(), "Agent 'calc' tools: add, subtract");

        agent.remove_tool("add");
        assert_eq!(agent.tool_names(), vec!["subtract"]);
    }
}
