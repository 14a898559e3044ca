//! `atelier classify`: categorize an error message and show its retry budget.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::io::Read;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Config, ErrorAnalysis};
use crate::domain::ports::ErrorAnalyzer;
use crate::services::{PatternErrorAnalyzer, RetryPolicy};

/// Arguments for `atelier classify`.
#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Error message; reads stdin when omitted or "-"
    pub message: Option<String>,
}

/// Error classification and retry verdict.
#[derive(Debug, Serialize)]
pub struct ClassifyOutput {
    /// Analyzer verdict.
    #[serde(flatten)]
    pub analysis: ErrorAnalysis,
    /// Whether the category is retried.
    pub retryable: bool,
    /// Attempts allowed for the category.
    pub attempt_limit: u32,
}

impl CommandOutput for ClassifyOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![
            format!("Category:   {}", self.analysis.category),
            format!("Root cause: {}", self.analysis.root_cause),
            format!("Suggestion: {}", self.analysis.suggestion),
        ];
        match (self.analysis.line, self.analysis.column) {
            (Some(line), Some(column)) => lines.push(format!("Location:   line {line}, column {column}")),
            (Some(line), None) => lines.push(format!("Location:   line {line}")),
            _ => {}
        }
        if self.retryable {
            lines.push(format!("Retry:      up to {} attempts", self.attempt_limit));
        } else {
            lines.push("Retry:      not retryable".to_string());
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

fn read_message(arg: Option<String>) -> Result<String> {
    match arg {
        Some(message) if message != "-" => Ok(message),
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read error message from stdin")?;
            Ok(buf)
        }
    }
}

/// Classify an error message.
pub async fn execute(args: ClassifyArgs, config: &Config, json: bool) -> Result<()> {
    let message = read_message(args.message)?;
    if message.trim().is_empty() {
        anyhow::bail!("No error message given");
    }

    let analysis = PatternErrorAnalyzer::new().analyze(&message);
    let policy = RetryPolicy::new(config.retry.clone());
    let attempt_limit = policy.attempt_limit(analysis.category);

    let result = ClassifyOutput {
        retryable: attempt_limit > 0,
        attempt_limit,
        analysis,
    };
    output(&result, json);
    Ok(())
}
