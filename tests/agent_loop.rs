//! Loop-level tests
//!
//! Drives `Agent::process` end to end against a scripted model invoker,
//! checking the iteration budget, history shape, recovery behavior, and
//! the final-result contract.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use telos::agent::Agent;
use telos::core::{Result, TelosError};
use telos::llm::{ModelCall, ModelInvoker};
use telos::tools::math::{AddTool, DivideTool, SubtractTool};

/// Invoker that replays canned responses per call name and records the
/// order of calls it receives.
struct ScriptedInvoker {
    responses: Mutex<HashMap<String, VecDeque<Value>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedInvoker {
    fn new() -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn script(self, call: &str, response: Value) -> Self {
        self.responses
            .lock()
            .unwrap()
            .entry(call.to_string())
            .or_default()
            .push_back(response);
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == call).count()
    }
}

#[async_trait]
impl ModelInvoker for ScriptedInvoker {
    async fn invoke(&self, call: ModelCall<'_>) -> Result<Value> {
        self.calls.lock().unwrap().push(call.name.to_string());
        self.responses
            .lock()
            .unwrap()
            .get_mut(call.name)
            .and_then(|queue| queue.pop_front())
            .ok_or_else(|| TelosError::model(call.name, "no scripted response left"))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

fn plan(goal_achieved: bool) -> Value {
    json!({
        "thoughts": "thinking",
        "steps": ["compute 3+4"],
        "current_step": 0,
        "goal_achieved": goal_achieved,
    })
}

fn action(tool_name: &str, parameters: Value) -> Value {
    json!({
        "thoughts": "acting",
        "tool_name": tool_name,
        "tool_parameters": parameters,
        "expected_outcome": "a result",
        "user_message": "working on it",
    })
}

fn reflection(action_successful: bool) -> Value {
    json!({
        "thoughts": "reflecting",
        "action_successful": action_successful,
        "lessons_learned": "something",
        "next_steps": "continue",
        "goal_progress": "on track",
    })
}

fn agent_with(invoker: Arc<ScriptedInvoker>, max_iterations: usize) -> Agent {
    Agent::builder("TestAgent")
        .invoker(invoker)
        .description("agent under test")
        .tool(Box::new(AddTool))
        .tool(Box::new(SubtractTool))
        .max_iterations(max_iterations)
        .build()
        .unwrap()
}

#[tokio::test]
async fn goal_achieved_on_first_plan_records_no_cycles() {
    let invoker = Arc::new(ScriptedInvoker::new().script("plan", plan(true)));
    let mut agent = agent_with(invoker.clone(), 10);

    let result = agent.process("already done").await.unwrap();

    assert_eq!(invoker.calls(), vec!["plan"]);
    assert_eq!(result["iterations"], 0);
    assert_eq!(result["execution_history"].as_array().unwrap().len(), 0);
    assert_eq!(result["achieved"], false);
    assert!(agent.history().is_empty());
}

#[tokio::test]
async fn add_tool_scenario_returns_default_mapping() {
    let invoker = Arc::new(
        ScriptedInvoker::new()
            .script("plan", plan(false))
            .script("decide", action("add", json!({"a": 3.0, "b": 4.0})))
            .script("reflect", reflection(true))
            .script("plan", plan(true)),
    );
    let mut agent = agent_with(invoker.clone(), 10);

    let result = agent.process("compute 3+4").await.unwrap();

    assert_eq!(invoker.count("plan"), 2);
    assert_eq!(invoker.count("decide"), 1);
    assert_eq!(invoker.count("reflect"), 1);

    assert_eq!(result["goal"], "compute 3+4");
    assert_eq!(result["achieved"], true);
    assert_eq!(result["iterations"], 1);

    let history = result["execution_history"].as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["iteration"], 1);
    assert_eq!(history[0]["action_result"]["type"], "tool_execution");
    assert_eq!(history[0]["action_result"]["result"], 7.0);
    assert_eq!(history[0]["action_result"]["success"], true);
}

#[tokio::test]
async fn missing_tool_yields_error_result_and_still_reflects() {
    let invoker = Arc::new(
        ScriptedInvoker::new()
            .script("plan", plan(false))
            .script("decide", action("multiply", json!({"a": 2.0, "b": 3.0})))
            .script("reflect", reflection(false))
            .script("plan", plan(true)),
    );
    let mut agent = agent_with(invoker.clone(), 10);

    let result = agent.process("compute 2*3").await.unwrap();

    // The reflect step ran on the error result.
    assert_eq!(invoker.count("reflect"), 1);

    let history = result["execution_history"].as_array().unwrap();
    assert_eq!(history[0]["action_result"]["type"], "error");
    assert_eq!(
        history[0]["action_result"]["result"],
        "Tool 'multiply' not found"
    );
    assert_eq!(history[0]["action_result"]["success"], false);
    assert_eq!(result["achieved"], false);
}

#[tokio::test]
async fn tool_failure_never_terminates_the_run() {
    let invoker = Arc::new(
        ScriptedInvoker::new()
            .script("plan", plan(false))
            // divide by zero: a registered tool that fails at execution
            .script("decide", action("divide", json!({"a": 1.0, "b": 0.0})))
            .script("reflect", reflection(false))
            .script("plan", plan(false))
            .script("decide", action("add", json!({"a": 1.0, "b": 1.0})))
            .script("reflect", reflection(true))
            .script("plan", plan(true)),
    );
    let mut agent = Agent::builder("TestAgent")
        .invoker(invoker.clone())
        .tool(Box::new(AddTool))
        .tool(Box::new(DivideTool))
        .max_iterations(10)
        .build()
        .unwrap();

    let result = agent.process("keep going").await.unwrap();

    let history = result["execution_history"].as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["action_result"]["success"], false);
    assert_eq!(history[1]["action_result"]["result"], 2.0);
    assert_eq!(result["achieved"], true);
}

#[tokio::test]
async fn iteration_budget_is_exhausted_without_goal_achieved() {
    let mut invoker = ScriptedInvoker::new();
    for _ in 0..3 {
        invoker = invoker
            .script("plan", plan(false))
            .script("decide", action("add", json!({"a": 1.0, "b": 1.0})))
            .script("reflect", reflection(false));
    }
    let invoker = Arc::new(invoker);
    let mut agent = agent_with(invoker.clone(), 3);

    let result = agent.process("never done").await.unwrap();

    assert_eq!(invoker.count("plan"), 3);
    assert_eq!(result["iterations"], 3);

    let indices: Vec<u64> = result["execution_history"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["iteration"].as_u64().unwrap())
        .collect();
    assert_eq!(indices, vec![1, 2, 3]);
}

#[tokio::test]
async fn zero_max_iterations_runs_no_model_calls() {
    let invoker = Arc::new(ScriptedInvoker::new());
    let mut agent = agent_with(invoker.clone(), 0);

    let result = agent.process("no budget").await.unwrap();

    assert!(invoker.calls().is_empty());
    assert_eq!(result["iterations"], 0);
    assert_eq!(result["achieved"], false);
    assert_eq!(result["execution_history"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn model_failure_aborts_the_run() {
    // No scripted "decide" response: the second call fails.
    let invoker = Arc::new(ScriptedInvoker::new().script("plan", plan(false)));
    let mut agent = agent_with(invoker, 10);

    let err = agent.process("doomed").await.unwrap_err();
    assert!(matches!(err, TelosError::ModelInvocation { .. }));
}

#[tokio::test]
async fn history_resets_between_process_calls() {
    let invoker = Arc::new(
        ScriptedInvoker::new()
            .script("plan", plan(false))
            .script("decide", action("add", json!({"a": 1.0, "b": 1.0})))
            .script("reflect", reflection(true))
            .script("plan", plan(true))
            // Second run: immediately achieved.
            .script("plan", plan(true)),
    );
    let mut agent = agent_with(invoker.clone(), 10);

    let first = agent.process("first goal").await.unwrap();
    assert_eq!(first["execution_history"].as_array().unwrap().len(), 1);

    let second = agent.process("second goal").await.unwrap();
    assert_eq!(second["execution_history"].as_array().unwrap().len(), 0);
    assert!(agent.history().is_empty());
}

#[tokio::test]
async fn panicking_observer_does_not_abort_processing() {
    let invoker = Arc::new(
        ScriptedInvoker::new()
            .script("plan", plan(false))
            .script("decide", action("add", json!({"a": 3.0, "b": 4.0})))
            .script("reflect", reflection(true))
            .script("plan", plan(true)),
    );

    let mut agent = Agent::builder("TestAgent")
        .invoker(invoker)
        .tool(Box::new(AddTool))
        .callback(Box::new(|_| panic!("observer bug")))
        .build()
        .unwrap();

    let result = agent.process("survive the observer").await.unwrap();
    assert_eq!(result["achieved"], true);
}

#[tokio::test]
async fn events_are_emitted_in_lifecycle_order() {
    let invoker = Arc::new(
        ScriptedInvoker::new()
            .script("plan", plan(false))
            .script("decide", action("add", json!({"a": 3.0, "b": 4.0})))
            .script("reflect", reflection(true))
            .script("plan", plan(true)),
    );

    let events = Arc::new(Mutex::new(Vec::new()));
    let seen = events.clone();

    let mut agent = Agent::builder("TestAgent")
        .invoker(invoker)
        .tool(Box::new(AddTool))
        .callback(Box::new(move |event| {
            seen.lock().unwrap().push(event.kind().to_string());
        }))
        .build()
        .unwrap();

    agent.process("compute 3+4").await.unwrap();

    assert_eq!(
        events.lock().unwrap().as_slice(),
        &[
            "goal_start",
            "plan_created",
            "action_decided",
            "action_executed",
            "reflection_completed",
            "plan_created",
            "goal_completed",
        ]
    );
}

#[tokio::test]
async fn output_schema_shapes_the_final_result() {
    let invoker = Arc::new(
        ScriptedInvoker::new()
            .script("plan", plan(false))
            .script("decide", action("add", json!({"a": 3.0, "b": 4.0})))
            .script("reflect", reflection(true))
            .script("plan", plan(true))
            .script("generate_final_result", json!({"answer": 7.0})),
    );

    let mut agent = Agent::builder("TestAgent")
        .invoker(invoker.clone())
        .tool(Box::new(AddTool))
        .output_schema(json!({
            "type": "object",
            "properties": {"answer": {"type": "number"}},
            "required": ["answer"]
        }))
        .build()
        .unwrap();

    let result = agent.process("compute 3+4").await.unwrap();

    assert_eq!(invoker.count("generate_final_result"), 1);
    assert_eq!(result, json!({"answer": 7.0}));
}

#[tokio::test]
async fn final_result_call_failure_is_fatal() {
    let invoker = Arc::new(ScriptedInvoker::new().script("plan", plan(true)));

    let mut agent = Agent::builder("TestAgent")
        .invoker(invoker)
        .output_schema(json!({"type": "object"}))
        .build()
        .unwrap();

    let err = agent.process("doomed finalization").await.unwrap_err();
    assert!(matches!(err, TelosError::ModelInvocation { .. }));
}

#[tokio::test]
async fn custom_goal_check_drives_the_achieved_flag() {
    let invoker = Arc::new(ScriptedInvoker::new().script("plan", plan(true)));

    let checks = Arc::new(AtomicUsize::new(0));
    let counted = checks.clone();

    let mut agent = Agent::builder("TestAgent")
        .invoker(invoker)
        .goal_check(Box::new(move |_, _| {
            counted.fetch_add(1, Ordering::SeqCst);
            true
        }))
        .build()
        .unwrap();

    let result = agent.process("custom check").await.unwrap();

    assert_eq!(result["achieved"], true);
    assert!(checks.load(Ordering::SeqCst) >= 1);
}
