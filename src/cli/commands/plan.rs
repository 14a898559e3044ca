//! `atelier plan`: show what the fallback planner would do with a message.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use super::DesignStateArgs;
use crate::cli::output::{output, table, truncate, CommandOutput};
use crate::domain::models::{Action, Config, DesignState};
use crate::services::{ActionGraph, FallbackBranch, FallbackPlanner, PlannerState, ReadinessEvaluator};

/// Arguments for `atelier plan`.
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// The user message to plan for
    pub message: String,

    /// Design facts the plan starts from.
    #[command(flatten)]
    pub state: DesignStateArgs,
}

/// The chosen plan branch and its actions.
#[derive(Debug, Serialize)]
pub struct PlanOutput {
    /// Heuristic that fired.
    pub branch: FallbackBranch,
    /// Overall score before planning.
    pub readiness: u8,
    /// Longest dependency chain in the plan.
    pub depth: usize,
    /// Planned actions.
    pub actions: Vec<Action>,
}

impl CommandOutput for PlanOutput {
    fn to_human(&self) -> String {
        if self.actions.is_empty() {
            return format!(
                "Branch: {} (readiness {})\nNo actions planned.",
                self.branch.as_str(),
                self.readiness
            );
        }

        let mut t = table(&["ID", "Role", "Kind", "Priority", "Depends on"]);
        for action in &self.actions {
            let deps = action
                .depends_on
                .iter()
                .map(|id| truncate(&id.to_string(), 8))
                .collect::<Vec<_>>()
                .join(", ");
            t.add_row(vec![
                truncate(&action.id.to_string(), 8),
                action.role.to_string(),
                action.kind.to_string(),
                action.priority.to_string(),
                deps,
            ]);
        }
        format!(
            "Branch: {} (readiness {}, depth {})\n{t}",
            self.branch.as_str(),
            self.readiness,
            self.depth
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Show the fallback plan for a message.
pub async fn execute(args: PlanArgs, config: &Config, json: bool) -> Result<()> {
    let state = DesignState::from(&args.state);
    let readiness = ReadinessEvaluator::new().evaluate(&state);
    let planner = FallbackPlanner::new(config.readiness.ready_threshold);
    let plan = planner.plan(&args.message, &PlannerState::from_design(&state, readiness));

    let depth = ActionGraph::new()
        .depth(&plan.actions)
        .context("Fallback plan is not a valid action graph")?;

    let result = PlanOutput {
        branch: plan.branch,
        readiness: readiness.overall,
        depth,
        actions: plan.actions,
    };
    output(&result, json);
    Ok(())
}
