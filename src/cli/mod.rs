//! Command-line interface for Atelier.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::classify::ClassifyArgs;
use commands::design::DesignArgs;
use commands::plan::PlanArgs;
use commands::readiness::ReadinessArgs;

/// Top-level arguments.
#[derive(Parser, Debug)]
#[command(name = "atelier")]
#[command(about = "Atelier - Multi-agent design orchestration", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Extra configuration file, layered over the project config
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score how ready a design is to build
    Readiness(ReadinessArgs),
    /// Show the fallback plan for a message
    Plan(PlanArgs),
    /// Classify a compiler or runtime error message
    Classify(ClassifyArgs),
    /// Run a design session with the built-in scripted agents
    Design(DesignArgs),
    /// Print the effective configuration
    Config,
}

/// Print `err` and exit with status 1.
pub fn handle_error(err: anyhow::Error, json: bool) -> ! {
    if json {
        let chain: Vec<String> = err.chain().skip(1).map(ToString::to_string).collect();
        let body = serde_json::json!({
            "error": err.to_string(),
            "caused_by": chain,
        });
        eprintln!(
            "{}",
            serde_json::to_string_pretty(&body).unwrap_or_else(|_| err.to_string())
        );
    } else {
        eprintln!("Error: {err}");
        for cause in err.chain().skip(1) {
            eprintln!("  caused by: {cause}");
        }
    }
    std::process::exit(1)
}
