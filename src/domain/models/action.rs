//! Actions, their results, and the report of a scheduled execution.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use uuid::Uuid;

use super::agent::AgentResponse;
use super::readiness::ReadinessDimension;
use super::role::AgentRole;

/// What an action asks its agent to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Draft the data schema.
    DesignSchema,
    /// Draft the UI layout.
    DesignLayout,
    /// Draft the workflows.
    DesignWorkflow,
    /// Adjust an existing schema.
    RefineSchema,
    /// Adjust an existing layout.
    RefineLayout,
    /// Adjust existing workflows.
    RefineWorkflow,
    /// Check the design as a whole.
    Review,
    /// One turn of a design session.
    Contribute,
}

impl ActionKind {
    /// Stable snake_case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DesignSchema => "design_schema",
            Self::DesignLayout => "design_layout",
            Self::DesignWorkflow => "design_workflow",
            Self::RefineSchema => "refine_schema",
            Self::RefineLayout => "refine_layout",
            Self::RefineWorkflow => "refine_workflow",
            Self::Review => "review",
            Self::Contribute => "contribute",
        }
    }

    /// The role that normally performs this kind of action.
    pub fn default_role(&self) -> AgentRole {
        match self {
            Self::DesignSchema | Self::RefineSchema => AgentRole::DataModeler,
            Self::DesignLayout | Self::RefineLayout => AgentRole::UxDesigner,
            Self::DesignWorkflow | Self::RefineWorkflow => AgentRole::WorkflowDesigner,
            Self::Review | Self::Contribute => AgentRole::Reviewer,
        }
    }

    /// Readiness dimension the action moves, if any.
    pub fn dimension(&self) -> Option<ReadinessDimension> {
        match self {
            Self::DesignSchema | Self::RefineSchema => Some(ReadinessDimension::Schema),
            Self::DesignLayout | Self::RefineLayout => Some(ReadinessDimension::Ui),
            Self::DesignWorkflow | Self::RefineWorkflow => Some(ReadinessDimension::Workflow),
            Self::Review | Self::Contribute => None,
        }
    }

    /// Whether this kind refines an existing artifact.
    pub fn is_refinement(&self) -> bool {
        matches!(
            self,
            Self::RefineSchema | Self::RefineLayout | Self::RefineWorkflow
        )
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit of work assigned to a role, with declared dependencies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Unique id.
    pub id: Uuid,
    /// Role that performs the action.
    pub role: AgentRole,
    /// What the role is asked to do.
    pub kind: ActionKind,
    /// Priority (0-10, higher runs first within a wave's dispatch order).
    pub priority: u8,
    /// Actions that must have completed (successfully or not) first.
    #[serde(default)]
    pub depends_on: BTreeSet<Uuid>,
    /// Planner's duration estimate.
    pub estimated_duration_secs: Option<u64>,
    /// Opaque payload handed to the agent.
    #[serde(default)]
    pub context: Value,
}

impl Action {
    /// Priority given to new actions.
    pub const DEFAULT_PRIORITY: u8 = 5;
    /// Highest accepted priority.
    pub const MAX_PRIORITY: u8 = 10;

    /// Create an action for `role`.
    pub fn new(role: AgentRole, kind: ActionKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            kind,
            priority: Self::DEFAULT_PRIORITY,
            depends_on: BTreeSet::new(),
            estimated_duration_secs: None,
            context: Value::Null,
        }
    }

    /// Create an action performed by the kind's usual role.
    pub fn of_kind(kind: ActionKind) -> Self {
        Self::new(kind.default_role(), kind)
    }

    /// Override the generated id.
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    /// Set the priority, clamped to `MAX_PRIORITY`.
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority.min(Self::MAX_PRIORITY);
        self
    }

    /// Add one dependency.
    pub fn with_dependency(mut self, id: Uuid) -> Self {
        self.depends_on.insert(id);
        self
    }

    /// Add several dependencies.
    pub fn with_dependencies(mut self, ids: impl IntoIterator<Item = Uuid>) -> Self {
        self.depends_on.extend(ids);
        self
    }

    /// Set the duration estimate in seconds.
    pub fn with_estimated_duration(mut self, secs: u64) -> Self {
        self.estimated_duration_secs = Some(secs);
        self
    }

    /// Attach context passed to the agent.
    pub fn with_context(mut self, context: Value) -> Self {
        self.context = context;
        self
    }

    /// Whether every dependency is in `completed`.
    pub fn is_runnable(&self, completed: &HashSet<Uuid>) -> bool {
        self.depends_on.iter().all(|dep| completed.contains(dep))
    }
}

/// How an action ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ActionOutcome {
    /// The agent answered.
    Completed {
        /// The agent's answer.
        response: AgentResponse,
    },
    /// The agent or the dispatch failed.
    Failed {
        /// Failure message.
        error: String,
    },
}

/// The result of one executed action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    /// Id of the executed action.
    pub action_id: Uuid,
    /// Role that ran it.
    pub role: AgentRole,
    /// Kind of the action.
    pub kind: ActionKind,
    /// Response or error.
    pub outcome: ActionOutcome,
    /// Wall time of the invocation.
    pub duration_ms: u64,
    /// 1-based wave the action was dispatched in.
    pub wave: usize,
}

impl ActionResult {
    /// Result for an action that returned a response.
    pub fn completed(action: &Action, response: AgentResponse, duration_ms: u64, wave: usize) -> Self {
        Self {
            action_id: action.id,
            role: action.role,
            kind: action.kind,
            outcome: ActionOutcome::Completed { response },
            duration_ms,
            wave,
        }
    }

    /// Result for an action that failed.
    pub fn failed(action: &Action, error: impl Into<String>, duration_ms: u64, wave: usize) -> Self {
        Self {
            action_id: action.id,
            role: action.role,
            kind: action.kind,
            outcome: ActionOutcome::Failed {
                error: error.into(),
            },
            duration_ms,
            wave,
        }
    }

    /// Whether the action succeeded.
    pub fn success(&self) -> bool {
        matches!(self.outcome, ActionOutcome::Completed { .. })
    }

    /// The agent response, if any.
    pub fn response(&self) -> Option<&AgentResponse> {
        match &self.outcome {
            ActionOutcome::Completed { response } => Some(response),
            ActionOutcome::Failed { .. } => None,
        }
    }

    /// The failure message, if any.
    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            ActionOutcome::Completed { .. } => None,
            ActionOutcome::Failed { error } => Some(error),
        }
    }
}

/// Details recorded when the scheduler stops on a deadlock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadlockInfo {
    /// Actions that could never become runnable.
    pub pending: Vec<Uuid>,
    /// A dependency cycle among the pending actions, when one exists.
    pub cycle: Option<Vec<Uuid>>,
}

/// Everything the scheduler knows after an execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionReport {
    /// One result per executed action, in wave order.
    pub results: Vec<ActionResult>,
    /// Ids dispatched in each wave.
    pub waves: Vec<Vec<Uuid>>,
    /// Ids that were never dispatched.
    pub unexecuted: Vec<Uuid>,
    /// Set when execution stopped early.
    pub deadlock: Option<DeadlockInfo>,
    /// Wall time of the whole execution.
    pub total_duration_ms: u64,
}

impl ExecutionReport {
    /// Whether execution stopped on a deadlock.
    pub fn is_deadlocked(&self) -> bool {
        self.deadlock.is_some()
    }

    /// Number of waves dispatched.
    pub fn wave_count(&self) -> usize {
        self.waves.len()
    }

    /// Count of successful results.
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.success()).count()
    }

    /// Count of failed results.
    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }

    /// Result for one action.
    pub fn result_for(&self, action_id: Uuid) -> Option<&ActionResult> {
        self.results.iter().find(|r| r.action_id == action_id)
    }

    /// Wave number an action ran in, if it ran.
    pub fn wave_of(&self, action_id: Uuid) -> Option<usize> {
        self.waves
            .iter()
            .position(|wave| wave.contains(&action_id))
            .map(|idx| idx + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_is_clamped() {
        let action = Action::of_kind(ActionKind::Review).with_priority(42);
        assert_eq!(action.priority, Action::MAX_PRIORITY);
    }

    #[test]
    fn test_is_runnable() {
        let dep = Uuid::new_v4();
        let action = Action::of_kind(ActionKind::DesignLayout).with_dependency(dep);

        let mut completed = HashSet::new();
        assert!(!action.is_runnable(&completed));
        completed.insert(dep);
        assert!(action.is_runnable(&completed));
        assert!(Action::of_kind(ActionKind::DesignSchema).is_runnable(&HashSet::new()));
    }

    #[test]
    fn test_result_accessors() {
        let action = Action::of_kind(ActionKind::DesignSchema);
        let ok = ActionResult::completed(&action, AgentResponse::new("done", 0.9), 10, 1);
        assert!(ok.success());
        assert_eq!(ok.response().map(|r| r.content.as_str()), Some("done"));
        assert!(ok.error().is_none());

        let failed = ActionResult::failed(&action, "boom", 5, 1);
        assert!(!failed.success());
        assert_eq!(failed.error(), Some("boom"));
    }

    #[test]
    fn test_outcome_serializes_tagged() {
        let action = Action::of_kind(ActionKind::Review);
        let failed = ActionResult::failed(&action, "timeout", 0, 2);
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["outcome"]["status"], "failed");
        assert_eq!(json["outcome"]["error"], "timeout");
    }
}
