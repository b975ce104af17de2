//! CLI definitions for Alfred.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Alfred CLI.
#[derive(Parser)]
#[command(name = "alfred")]
#[command(about = "Multi-agent workflow orchestration engine")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path (default: ~/.alfred/config.toml when present)
    #[arg(short, long, global = true, env = "ALFRED_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Run a workflow file with the built-in agents and print its final status
    Run {
        /// Workflow definition (JSON or YAML)
        file: PathBuf,

        /// Input data as a JSON object
        #[arg(short, long)]
        input: Option<String>,

        /// Seconds to wait for the execution to finish
        #[arg(long, default_value_t = 60)]
        wait: u64,
    },

    /// Validate a workflow file without running it
    Validate {
        /// Workflow definition (JSON or YAML)
        file: PathBuf,
    },

    /// List the built-in tools
    Tools {
        /// Only tools of this category (e.g. utility, analysis)
        #[arg(long)]
        category: Option<String>,

        /// Output format (table, json)
        #[arg(long, default_value = "table")]
        format: String,
    },
}
