//! `atelier readiness`: score a design state.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use super::DesignStateArgs;
use crate::cli::output::{output, table, CommandOutput};
use crate::domain::models::{Config, DesignState, ReadinessDimension, ReadinessScore};
use crate::services::ReadinessEvaluator;

/// Arguments for `atelier readiness`.
#[derive(Args, Debug)]
pub struct ReadinessArgs {
    /// Design facts to score.
    #[command(flatten)]
    pub state: DesignStateArgs,

    /// Override the configured ready-to-build threshold
    #[arg(long)]
    pub threshold: Option<u8>,
}

/// Readiness score and verdict.
#[derive(Debug, Serialize)]
pub struct ReadinessOutput {
    /// Per-dimension and overall score.
    pub score: ReadinessScore,
    /// Lowest-scoring dimension.
    pub weakest: ReadinessDimension,
    /// Threshold applied.
    pub threshold: u8,
    /// Whether the design meets it.
    pub ready_to_build: bool,
}

impl CommandOutput for ReadinessOutput {
    fn to_human(&self) -> String {
        let mut t = table(&["Dimension", "Score"]);
        for (dimension, value) in self.score.dimensions() {
            t.add_row(vec![dimension.to_string(), value.to_string()]);
        }
        t.add_row(vec!["overall".to_string(), self.score.overall.to_string()]);

        let verdict = if self.ready_to_build {
            format!("Ready to build (threshold {})", self.threshold)
        } else {
            format!(
                "Not ready (threshold {}); weakest dimension: {}",
                self.threshold, self.weakest
            )
        };
        format!("{t}\n{verdict}")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Score a design state.
pub async fn execute(args: ReadinessArgs, config: &Config, json: bool) -> Result<()> {
    let threshold = args.threshold.unwrap_or(config.readiness.ready_threshold);
    if threshold > 100 {
        anyhow::bail!("Threshold must be between 0 and 100, got {threshold}");
    }

    let evaluator = ReadinessEvaluator::new();
    let state = DesignState::from(&args.state);
    let score = evaluator.evaluate(&state);

    let result = ReadinessOutput {
        weakest: score.weakest(),
        ready_to_build: evaluator.is_ready_to_build(&score, threshold),
        score,
        threshold,
    };
    output(&result, json);
    Ok(())
}
