use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;

mod cli;

use chatr::catalog::SharedCatalog;
use chatr::config::GlobalConfig;
use chatr::id::generate_session_id;
use chatr::llm::{Agent, GeminiClient, GeminiConfig};
use chatr::memory::SessionMemory;
use chatr::pipeline::{Orchestrator, PipelineOutcome};
use chatr::router::Router;
use chatr::tools::{HandlerRegistry, ToolExecutor};
use cli::Cli;
use cli::commands::{Commands, ToolCommands};

fn setup_logging() -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("chatr")
        .join("logs");

    std::fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("chatr.log");

    // Setup env_logger with file output
    let target = Box::new(
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

/// Build the catalog handle and handler registry from config
///
/// This much works without an API key; the orchestrator below needs one.
fn build_catalog(config: &GlobalConfig) -> Result<(SharedCatalog, Arc<HandlerRegistry>)> {
    let registry =
        HandlerRegistry::standard(config.tools.workspace_dir.clone()).context("Failed to build tool registry")?;

    let mut tool_catalog = registry.build_catalog().context("Failed to build tool catalog")?;
    for name in &config.tools.disabled {
        if !tool_catalog.set_enabled(name, false) {
            log::warn!("config disables unknown tool '{}'", name);
        }
    }

    Ok((SharedCatalog::new(tool_catalog), Arc::new(registry)))
}

fn build_orchestrator(
    config: &GlobalConfig,
    catalog: SharedCatalog,
    registry: Arc<HandlerRegistry>,
) -> Result<Orchestrator> {
    let gemini_config = GeminiConfig {
        model: config.llm.model.clone(),
        temperature: config.llm.temperature,
        max_tokens: config.llm.max_tokens,
        timeout: Duration::from_secs(config.llm.timeout_secs),
    };
    let client = GeminiClient::new(gemini_config).context("Failed to create LLM client")?;

    let agent = Agent::new(Arc::new(client), SessionMemory::new())
        .with_max_history_turns(config.session.max_history_turns);

    Ok(Orchestrator::new(
        Router::new(catalog.clone()),
        ToolExecutor::new(catalog, registry),
        agent,
    ))
}

fn print_outcome(outcome: &PipelineOutcome, verbose: bool) {
    if outcome.success {
        println!("{}", outcome.response);
    } else {
        println!("{}", outcome.response.red());
    }

    if verbose && !outcome.tool_results.is_empty() {
        println!();
        for (name, result) in &outcome.tool_results {
            let status = if result.success { "ok".green() } else { "failed".red() };
            println!("{} {} [{}]", "tool:".cyan(), name, status);
        }
    }
}

async fn handle_ask(
    catalog: &SharedCatalog,
    orchestrator: &Orchestrator,
    query: &str,
    session: Option<String>,
    tools: Option<Vec<String>>,
    verbose: bool,
) -> Result<()> {
    let session_id = session.unwrap_or_else(generate_session_id);
    let active_tools = tools.unwrap_or_else(|| catalog.active());

    let outcome = orchestrator.run(query, &session_id, active_tools).await;
    print_outcome(&outcome, verbose);
    Ok(())
}

async fn handle_repl(
    catalog: &SharedCatalog,
    orchestrator: &Orchestrator,
    session: Option<String>,
    tools: Option<Vec<String>>,
    verbose: bool,
) -> Result<()> {
    let session_id = session.unwrap_or_else(generate_session_id);
    println!("{} session {}", "chatr".cyan(), session_id);
    println!("Type a query, or 'exit' to quit.");

    let stdin = std::io::stdin();
    loop {
        print!("{} ", ">".green());
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let query = line.trim();

        if query.is_empty() {
            continue;
        }
        if query == "exit" || query == "quit" {
            break;
        }

        // Re-resolve per turn so toggles apply between queries
        let active_tools = tools.clone().unwrap_or_else(|| catalog.active());
        let outcome = orchestrator.run(query, &session_id, active_tools).await;
        print_outcome(&outcome, verbose);
    }

    Ok(())
}

fn handle_tools_command(catalog: &SharedCatalog, command: &ToolCommands) -> Result<()> {
    match command {
        ToolCommands::List => {
            for descriptor in catalog.snapshot().descriptors() {
                let status = if descriptor.enabled {
                    "enabled".green()
                } else {
                    "disabled".yellow()
                };
                println!("{:<16} [{}] {}", descriptor.name, status, descriptor.description);
            }
        }
        ToolCommands::Toggle { name } => match catalog.toggle(name) {
            Some(enabled) => {
                let status = if enabled { "enabled".green() } else { "disabled".yellow() };
                println!("{} is now {}", name, status);
            }
            None => {
                println!("{} unknown tool '{}'", "error:".red(), name);
            }
        },
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Setup logging first
    setup_logging().context("Failed to setup logging")?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = GlobalConfig::load(cli.config.as_ref()).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    info!("Starting with config from: {:?}", cli.config);

    let (catalog, registry) = build_catalog(&config)?;

    match &cli.command {
        Commands::Ask { query, session, tools } => {
            let orchestrator = build_orchestrator(&config, catalog.clone(), registry)?;
            handle_ask(
                &catalog,
                &orchestrator,
                query,
                session.clone(),
                tools.clone(),
                cli.is_verbose(),
            )
            .await
        }
        Commands::Repl { session, tools } => {
            let orchestrator = build_orchestrator(&config, catalog.clone(), registry)?;
            handle_repl(&catalog, &orchestrator, session.clone(), tools.clone(), cli.is_verbose()).await
        }
        Commands::Tools { command } => handle_tools_command(&catalog, command),
    }
}
