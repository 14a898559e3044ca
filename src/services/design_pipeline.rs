//! One user message through plan, execute and score.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::models::{Action, DesignState, ExecutionReport, ReadinessScore};
use crate::domain::ports::{ActionPlanner, AgentResolver};
use crate::services::action_scheduler::ActionScheduler;
use crate::services::fallback_planner::{FallbackBranch, FallbackPlanner, PlannerState};
use crate::services::readiness_evaluator::ReadinessEvaluator;

/// Where a plan came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum PlanSource {
    /// The configured planner.
    Primary,
    /// The heuristic planner.
    Fallback {
        /// Heuristic that fired.
        branch: FallbackBranch,
        /// Why the primary planner was not used.
        reason: String,
    },
}

impl PlanSource {
    /// Whether the heuristic planner produced the plan.
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

/// Result of processing one message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutcome {
    /// Which planner produced the actions.
    pub plan_source: PlanSource,
    /// Planned actions.
    pub actions: Vec<Action>,
    /// Execution report.
    pub report: ExecutionReport,
    /// Score before the actions.
    pub readiness: ReadinessScore,
    /// Forecast after the actions land; see `ReadinessEvaluator::project`.
    pub projected: ReadinessScore,
    /// Whether the current score meets the threshold.
    pub ready_to_build: bool,
}

/// Plans and executes the actions a user message calls for.
pub struct DesignPipeline {
    planner: Option<Arc<dyn ActionPlanner>>,
    fallback: FallbackPlanner,
    evaluator: ReadinessEvaluator,
    scheduler: ActionScheduler,
    resolver: Arc<dyn AgentResolver>,
}

impl DesignPipeline {
    /// Create a pipeline.
    pub fn new(
        resolver: Arc<dyn AgentResolver>,
        scheduler: ActionScheduler,
        ready_threshold: u8,
    ) -> Self {
        Self {
            planner: None,
            fallback: FallbackPlanner::new(ready_threshold),
            evaluator: ReadinessEvaluator::new(),
            scheduler,
            resolver,
        }
    }

    /// Use `planner` first; the fallback planner covers its failures.
    pub fn with_planner(mut self, planner: Arc<dyn ActionPlanner>) -> Self {
        self.planner = Some(planner);
        self
    }

    async fn plan(
        &self,
        message: &str,
        state: &DesignState,
        readiness: &ReadinessScore,
    ) -> (PlanSource, Vec<Action>) {
        let planner_state = PlannerState::from_design(state, *readiness);
        let reason = match &self.planner {
            None => "no primary planner configured".to_string(),
            Some(planner) => match planner.plan(message, state, readiness).await {
                Ok(actions) if actions.is_empty() && planner_state.missing_required_artifact() => {
                    "primary planner returned no actions while artifacts are missing".to_string()
                }
                Ok(actions) => return (PlanSource::Primary, actions),
                Err(e) => e.to_string(),
            },
        };

        let plan = self.fallback.plan(message, &planner_state);
        warn!(
            branch = plan.branch.as_str(),
            reason = %reason,
            "Using fallback planner"
        );
        (
            PlanSource::Fallback {
                branch: plan.branch,
                reason,
            },
            plan.actions,
        )
    }

    /// Plan for `message`, run the plan, and report readiness.
    pub async fn process_message(&self, message: &str, state: &DesignState) -> PipelineOutcome {
        let readiness = self.evaluator.evaluate(state);
        let (plan_source, actions) = self.plan(message, state, &readiness).await;

        let affected = self.evaluator.affected_dimensions(&actions);
        let projected =
            self.evaluator
                .project(&readiness, self.evaluator.change_kind(state), &affected);

        let report = self
            .scheduler
            .execute_parallel(actions.clone(), self.resolver.as_ref())
            .await;

        info!(
            actions = actions.len(),
            succeeded = report.succeeded(),
            failed = report.failed(),
            readiness = readiness.overall,
            projected = projected.overall,
            fallback = plan_source.is_fallback(),
            "Message processed"
        );

        PipelineOutcome {
            plan_source,
            ready_to_build: self
                .evaluator
                .is_ready_to_build(&readiness, self.fallback.ready_threshold()),
            actions,
            report,
            readiness,
            projected,
        }
    }
}

impl std::fmt::Debug for DesignPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DesignPipeline")
            .field("has_primary_planner", &self.planner.is_some())
            .field("fallback", &self.fallback)
            .field("scheduler", &self.scheduler)
            .finish_non_exhaustive()
    }
}
