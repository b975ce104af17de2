//! Alfred - multi-agent workflow orchestration engine
//!
//! Main entry point for the Alfred CLI.

mod adapters;
mod agents;
mod cli;
mod cmd_workflow;
mod register;
mod tools;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use alfred_config::{Config, ConfigLoader, ConfigValidator, LoggingConfig};
use alfred_core::{AgentRegistry, ToolRegistry, ToolRegistryConfig};
use alfred_orchestrator::{Coordinator, WorkflowEngine};

use crate::adapters::{alfred_dir, engine_config, open_store};
use crate::cli::{Cli, Commands};

/// Initialize tracing with console and rolling file output.
///
/// `RUST_LOG` overrides the configured level.
fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    let log_dir = if logging.dir.is_empty() {
        alfred_dir().join("logs")
    } else {
        PathBuf::from(ConfigLoader::expand_path(&logging.dir))
    };
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("alfred")
        .filename_suffix("log")
        .max_log_files(30)
        .build(&log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Dropping the guard stops the background writer.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_ansi(true)
                .with_writer(std::io::stderr),
        )
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(())
}

/// Refuse to start on configuration errors; warnings are only logged.
fn check_config(config: &Config) -> anyhow::Result<()> {
    let validation = ConfigValidator::validate(config)?;
    for warning in &validation.warnings {
        warn!("Config {}: {}", warning.path, warning.message);
    }
    if let Some(error) = validation.first_error() {
        return Err(error.into());
    }
    Ok(())
}

/// Build the coordinator, its registries and the workflow store.
async fn build_coordinator(config: &Config) -> anyhow::Result<Coordinator> {
    let tools = Arc::new(ToolRegistry::with_config(ToolRegistryConfig {
        log_arguments: config.tools.log_arguments,
    }));
    let agents = Arc::new(AgentRegistry::new());
    let store = open_store(config).await?;

    let engine = Arc::new(
        WorkflowEngine::new(agents, tools, engine_config(config)?).with_store(store),
    );
    let coordinator = Coordinator::new(engine);

    register::register_builtin_agents(&coordinator);
    register::register_builtin_tools(&coordinator, config);

    Ok(coordinator)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = ConfigLoader::load_or_default(cli.config.as_deref())?;
    init_tracing(&config.logging)?;
    check_config(&config)?;

    match cli.command {
        Commands::Run { file, input, wait } => {
            let coordinator = build_coordinator(&config).await?;
            if config.storage.backend == "file" {
                let report = coordinator.engine().recover().await?;
                info!(
                    "Recovered {} workflow(s): {} resumed, {} paused, {} finished",
                    report.definitions, report.resumed, report.paused, report.finished
                );
            }
            cmd_workflow::run_workflow(
                &coordinator,
                &file,
                input.as_deref(),
                Duration::from_secs(wait),
            )
            .await
        }
        Commands::Validate { file } => cmd_workflow::validate_workflow(&file),
        Commands::Tools { category, format } => {
            let coordinator = build_coordinator(&config).await?;
            cmd_workflow::list_tools(&coordinator, category.as_deref(), &format)
        }
    }
}
