//! `atelier design`: run a design session against the scripted agents.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::sync::Arc;

use crate::adapters::agents::{AgentRegistry, ScriptedAgent};
use crate::cli::output::{output, table, truncate, CommandOutput};
use crate::domain::models::{ArtifactSource, Config};
use crate::services::{ActionScheduler, DesignOutcome, DesignSessionManager};

/// Arguments for `atelier design`.
#[derive(Args, Debug)]
pub struct DesignArgs {
    /// What to design
    pub request: String,

    /// Starting confidence of the scripted agents
    #[arg(long, default_value_t = 0.75)]
    pub confidence: f64,

    /// Confidence gained per turn
    #[arg(long, default_value_t = 0.02)]
    pub step: f64,

    /// Override the configured turn ceiling
    #[arg(long)]
    pub max_turns: Option<u32>,
}

/// Result of a design session.
#[derive(Debug, Serialize)]
pub struct DesignOutput {
    /// Session and consensus.
    #[serde(flatten)]
    pub outcome: DesignOutcome,
}

impl CommandOutput for DesignOutput {
    fn to_human(&self) -> String {
        let session = &self.outcome.session;
        let consensus = &self.outcome.consensus;

        let mut turns = table(&["Turn", "Role", "Confidence", "Content"]);
        for c in &session.contributions {
            turns.add_row(vec![
                c.turn.to_string(),
                c.role.to_string(),
                format!("{:.2}", c.confidence),
                truncate(&c.content, 60),
            ]);
        }
        for f in &session.failures {
            turns.add_row(vec![
                f.turn.to_string(),
                f.role.to_string(),
                "-".to_string(),
                format!("failed: {}", truncate(&f.error, 52)),
            ]);
        }

        let mut artifacts = table(&["Artifact", "Source"]);
        for artifact in consensus.artifacts.values() {
            let source = match artifact.source {
                ArtifactSource::Contribution { turn } => format!("turn {turn}"),
                ArtifactSource::Default => "default".to_string(),
            };
            artifacts.add_row(vec![artifact.role.artifact_name().to_string(), source]);
        }

        let confidence = consensus
            .mean_confidence
            .map_or_else(|| "n/a".to_string(), |c| format!("{c:.2}"));
        format!(
            "Session {} {} after {} turns (forced: {}, mean confidence: {confidence})\n{turns}\n{artifacts}",
            session.id, session.status, session.turn, consensus.forced
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Run a design session with the offline scripted agents.
pub async fn execute(args: DesignArgs, config: &Config, json: bool) -> Result<()> {
    let mut session_config = config.session.clone();
    if let Some(max_turns) = args.max_turns {
        session_config.max_turns = max_turns;
    }

    let agent = Arc::new(ScriptedAgent::new(args.confidence, args.step));
    let manager = DesignSessionManager::new(
        Arc::new(AgentRegistry::uniform(agent)),
        session_config,
        ActionScheduler::new(config.scheduler.clone()),
    );

    let outcome = manager
        .run_design_session(&args.request)
        .await
        .context("Design session could not start")?;

    output(&DesignOutput { outcome }, json);
    Ok(())
}
