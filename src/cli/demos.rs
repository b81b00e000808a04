//! Demo agents
//!
//! Ready-made agents showing the reasoning loop over each tool family:
//! math, research, email, and social.

use std::sync::Arc;

use serde_json::json;

use crate::agent::Agent;
use crate::core::{Config, Result, StatusEvent, TelosError};
use crate::llm::ModelInvoker;
use crate::tools::email::email_tools;
use crate::tools::math::math_tools;
use crate::tools::search::{AnalyzeContentTool, WebSearchTool};
use crate::tools::social::social_tools;

/// Status callback that prints key events from the loop.
pub fn print_status(event: &StatusEvent) {
    match event {
        StatusEvent::GoalStart {
            goal,
            agent_name,
            available_tools,
        } => {
            println!("Agent: {}", agent_name);
            println!("Goal: {}", goal);
            println!("Available tools: {}", available_tools.join(", "));
        }
        StatusEvent::ActionDecided { action, .. } => {
            if !action.user_message.is_empty() {
                println!("{}", action.user_message);
            }
        }
        StatusEvent::ActionExecuted { action, result, .. } => {
            let marker = if result.success() { "ok" } else { "failed" };
            println!("  [{}] {}", marker, action.tool_name);
        }
        StatusEvent::GoalCompleted {
            achieved,
            iterations,
            ..
        } => {
            println!("Completed in {} iterations (achieved: {})", iterations, achieved);
        }
        _ => {}
    }
}

/// An agent that solves math problems with the arithmetic tools.
pub fn math_agent(config: &Config, invoker: Arc<dyn ModelInvoker>) -> Result<Agent> {
    let output_schema = json!({
        "type": "object",
        "properties": {
            "thoughts": {
                "type": "string",
                "description": "The agent's reasoning about solving the problem"
            },
            "answer": {
                "type": "number",
                "description": "The numerical answer to the math problem"
            },
            "solution_steps": {
                "type": "array",
                "items": {"type": "string"},
                "description": "Step-by-step process used to solve the problem"
            },
            "operations_used": {
                "type": "array",
                "items": {"type": "string"},
                "description": "List of mathematical operations that were performed"
            },
            "confidence": {
                "type": "string",
                "description": "How confident the agent is in the solution (high, medium, low)"
            }
        },
        "required": ["thoughts", "answer", "solution_steps", "operations_used", "confidence"]
    });

    Agent::builder("MathAgent")
        .invoker(invoker)
        .description(
            "An agent that solves mathematical problems using calculation tools and logical reasoning.",
        )
        .tools(math_tools())
        .output_schema(output_schema)
        .callback(Box::new(print_status))
        .config(config)
        .build()
}

/// An agent that researches a topic with web search and content analysis.
pub fn research_agent(config: &Config, invoker: Arc<dyn ModelInvoker>) -> Result<Agent> {
    let output_schema = json!({
        "type": "object",
        "properties": {
            "research_question": {
                "type": "string",
                "description": "The original research question"
            },
            "executive_summary": {
                "type": "string",
                "description": "Executive summary of key findings"
            },
            "key_findings": {
                "type": "array",
                "items": {"type": "string"},
                "description": "List of key findings and insights"
            },
            "confidence_level": {
                "type": "string",
                "description": "Confidence level in the findings: 'high', 'medium', 'low'"
            },
            "sources_used": {
                "type": "array",
                "items": {"type": "string"},
                "description": "List of sources used in the research"
            },
            "detailed_report": {
                "type": "string",
                "description": "Comprehensive detailed report"
            }
        },
        "required": [
            "research_question",
            "executive_summary",
            "key_findings",
            "confidence_level",
            "sources_used",
            "detailed_report"
        ]
    });

    let description = "An AI agent that performs research on any topic by conducting web \
                       searches, analyzing content from multiple sources, and synthesizing \
                       the findings into a report with credibility in mind.";

    Agent::builder("ResearchAgent")
        .invoker(invoker.clone())
        .description(description)
        .tool(Box::new(WebSearchTool::new()))
        .tool(Box::new(AnalyzeContentTool::new(
            invoker,
            Some(config.models.analysis.clone()),
        )))
        .output_schema(output_schema)
        .callback(Box::new(print_status))
        .config(config)
        .build()
}

/// An agent that manages an inbox with the Gmail tools.
pub fn email_agent(config: &Config, invoker: Arc<dyn ModelInvoker>) -> Result<Agent> {
    let token = config
        .integrations
        .gmail_token
        .clone()
        .ok_or_else(|| {
            TelosError::config("GMAIL_ACCESS_TOKEN is required for the email agent")
        })?;

    Agent::builder("EmailAgent")
        .invoker(invoker.clone())
        .description(
            "An agent that manages email: listing messages, generating reply content, \
             and creating draft replies. Drafts are never sent automatically.",
        )
        .tools(email_tools(token, invoker))
        .callback(Box::new(print_status))
        .config(config)
        .build()
}

/// An agent that posts and searches social updates.
pub fn social_agent(config: &Config, invoker: Arc<dyn ModelInvoker>) -> Result<Agent> {
    let token = config
        .integrations
        .x_bearer_token
        .clone()
        .ok_or_else(|| TelosError::config("X_BEARER_TOKEN is required for the social agent"))?;

    Agent::builder("SocialAgent")
        .invoker(invoker)
        .description(
            "An agent that engages on social media: searching recent posts and \
             publishing short updates within the platform limits.",
        )
        .tools(social_tools(token))
        .callback(Box::new(print_status))
        .config(config)
        .build()
}
