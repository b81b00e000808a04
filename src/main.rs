//! Telos - Goal-Driven Agent Loop
//!
//! Main entry point for the demo CLI.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use telos::cli::{email_agent, math_agent, research_agent, social_agent};
use telos::llm::OllamaInvoker;
use telos::{Config, TelosError};

/// Telos - Goal-Driven Agent Loop
#[derive(Parser, Debug)]
#[command(name = "telos")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Model to use for the reasoning calls
    #[arg(long, short = 'm')]
    model: Option<String>,

    /// Maximum reasoning loop iterations
    #[arg(long, short = 'i')]
    max_iterations: Option<usize>,

    /// Enable debug output
    #[arg(long, short = 'd')]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Solve a math problem with the arithmetic tools
    Math {
        /// The goal to process
        goal: Option<String>,
    },
    /// Research a topic with web search and content analysis
    Research {
        /// The goal to process
        goal: Option<String>,
    },
    /// Manage an inbox with the Gmail tools (requires GMAIL_ACCESS_TOKEN)
    Email {
        /// The goal to process
        goal: String,
    },
    /// Post and search social updates (requires X_BEARER_TOKEN)
    Social {
        /// The goal to process
        goal: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Build configuration
    let mut config = Config::load();

    // Apply CLI overrides
    if let Some(ref model) = args.model {
        config.models.default = model.clone();
    }

    if let Some(max_iterations) = args.max_iterations {
        config.agent.max_iterations = max_iterations;
    }

    if args.debug {
        config.agent.debug = true;
    }

    let default_filter = if config.agent.debug {
        "telos=debug"
    } else {
        "telos=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let invoker = Arc::new(OllamaInvoker::from_config(&config));

    // Fail early if the configured model is not present.
    if !invoker.is_model_available(&config.models.default).await? {
        return Err(TelosError::ModelNotFound(config.models.default.clone()).into());
    }

    let (mut agent, goal) = match args.command {
        Command::Math { goal } => (
            math_agent(&config, invoker)?,
            goal.unwrap_or_else(|| "Calculate the result of (25 * 4) + (100 / 5) - 7".to_string()),
        ),
        Command::Research { goal } => (
            research_agent(&config, invoker)?,
            goal.unwrap_or_else(|| {
                "Tell me everything you can find about the Rust programming language".to_string()
            }),
        ),
        Command::Email { goal } => (email_agent(&config, invoker)?, goal),
        Command::Social { goal } => (social_agent(&config, invoker)?, goal),
    };

    let result = agent.process(&goal).await?;

    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}
