//! CLI entrypoint for conductor
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context as _, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use conductor_application::{
    Agent, OrchestrationLimits, OrchestratorAgent, SandboxPort, ToolRegistry,
};
use conductor_domain::{ResultStatus, SecurityPolicy, Task};
use conductor_infrastructure::{
    ChatCompletionsGateway, CodeExecutionTool, ConfigLoader, LlmTool, ReadFileTool,
    SandboxClient, Settings, WriteFileTool,
};

#[derive(Parser, Debug)]
#[command(name = "conductor", version, about = "Multi-agent task orchestration")]
struct Cli {
    /// Task description to process
    task: String,

    /// Success criteria the validator checks the result against
    #[arg(long)]
    criteria: Option<String>,

    /// Path to a config file (overrides discovered configs)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Skip the sandbox entirely; code and file tools are unavailable
    #[arg(long)]
    no_sandbox: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress the report header
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(status) => {
            if status == ResultStatus::Success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<ResultStatus> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let settings = ConfigLoader::load(cli.config.as_ref())
        .map_err(|e| anyhow::anyhow!("failed to load configuration: {e}"))?;

    info!(model = %settings.llm.model, "starting conductor");

    // === Dependency Injection ===
    let gateway = Arc::new(build_gateway(&settings));
    let sandbox: Option<Arc<dyn SandboxPort>> = if cli.no_sandbox {
        None
    } else {
        Some(Arc::new(SandboxClient::new(
            settings.sandbox.clone(),
            SecurityPolicy::default(),
        )))
    };

    let mut registry = ToolRegistry::new();
    registry
        .register(Arc::new(LlmTool::new(gateway)))
        .context("registering llm tool")?;
    if let Some(sandbox) = &sandbox {
        registry
            .register(Arc::new(CodeExecutionTool::new(sandbox.clone())))
            .context("registering code_execution tool")?;
        registry
            .register(Arc::new(ReadFileTool::new(sandbox.clone())))
            .context("registering read_file tool")?;
        registry
            .register(Arc::new(WriteFileTool::new(sandbox.clone())))
            .context("registering write_file tool")?;
    }
    let registry = Arc::new(registry);

    let limits = OrchestrationLimits {
        max_agent_steps: settings.agents.max_steps,
        max_tool_calls: settings.agents.max_tool_calls,
        max_plan_steps: settings.agents.max_plan_steps,
    };
    let mut orchestrator = OrchestratorAgent::with_limits(registry, limits);
    orchestrator
        .initialize()
        .await
        .map_err(|e| anyhow::anyhow!("failed to initialize orchestrator: {e}"))?;

    let mut task = Task::new(&cli.task);
    if let Some(criteria) = &cli.criteria {
        task.add_metadata("success_criteria", criteria.as_str());
    }

    if !cli.quiet {
        println!("Task: {}", cli.task);
        println!();
    }

    let result = orchestrator
        .run(&task)
        .await
        .map_err(|e| anyhow::anyhow!("orchestration failed: {e}"))?;

    println!("{}", result.content);

    if let Some(sandbox) = &sandbox
        && let Err(err) = sandbox.cleanup().await
    {
        warn!(%err, "sandbox cleanup failed");
    }

    Ok(result.status)
}

fn build_gateway(settings: &Settings) -> ChatCompletionsGateway {
    ChatCompletionsGateway::new(
        &settings.llm.base_url,
        settings.llm.api_key.clone(),
        &settings.llm.model,
        settings.llm.max_tokens,
        settings.llm.temperature,
    )
}
