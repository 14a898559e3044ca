//! Deterministic planner used when the primary planner fails.
//!
//! Keyword and regex driven, with no I/O. Never returns an empty plan while
//! the schema or layout is missing.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::debug;

use crate::domain::models::{
    Action, ActionKind, DesignState, ReadinessDimension, ReadinessScore,
};

static BUILD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(build|generate|ship|deploy)\b|\bcreate\s+the\s+app\b")
        .expect("valid build regex")
});

static SCHEMA_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(schema|fields?|entit(y|ies)|tables?|columns?|relationships?|data\s+model|attributes?)\b",
    )
    .expect("valid schema regex")
});

static UI_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(ui|layout|pages?|screens?|components?|buttons?|forms?|views?|dashboards?|colou?rs?|design)\b",
    )
    .expect("valid ui regex")
});

static WORKFLOW_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(workflows?|automations?|triggers?|notif(y|ications?)|approvals?|steps?|process(es)?|emails?)\b",
    )
    .expect("valid workflow regex")
});

/// Design facts the fallback planner decides on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannerState {
    /// A schema exists.
    pub has_schema: bool,
    /// A layout exists.
    pub has_layout: bool,
    /// Workflows exist.
    pub has_workflow: bool,
    /// Current score.
    pub readiness: ReadinessScore,
}

impl PlannerState {
    /// Capture the planner inputs from a design and its score.
    pub fn from_design(state: &DesignState, readiness: ReadinessScore) -> Self {
        Self {
            has_schema: state.has_schema,
            has_layout: state.has_layout,
            has_workflow: state.has_workflow,
            readiness,
        }
    }

    /// Schema or layout still absent.
    pub fn missing_required_artifact(&self) -> bool {
        !self.has_schema || !self.has_layout
    }
}

/// Which heuristic produced a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackBranch {
    /// Nothing to do; the design can be built.
    ReadyToBuild,
    /// Draft every artifact for a new request.
    NewRequest,
    /// Draft the first missing artifact.
    NextMissingArtifact,
    /// Refine what the message mentions.
    KeywordRefinement,
    /// Improve the weakest dimension.
    DefaultProgress,
}

impl FallbackBranch {
    /// Stable snake_case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReadyToBuild => "ready_to_build",
            Self::NewRequest => "new_request",
            Self::NextMissingArtifact => "next_missing_artifact",
            Self::KeywordRefinement => "keyword_refinement",
            Self::DefaultProgress => "default_progress",
        }
    }
}

/// Output of the fallback planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackPlan {
    /// Heuristic that fired.
    pub branch: FallbackBranch,
    /// Planned actions.
    pub actions: Vec<Action>,
}

impl FallbackPlan {
    fn new(branch: FallbackBranch, actions: Vec<Action>) -> Self {
        Self { branch, actions }
    }
}

/// Keyword-driven planner with a fixed branch order.
#[derive(Debug, Clone, Copy)]
pub struct FallbackPlanner {
    ready_threshold: u8,
}

impl Default for FallbackPlanner {
    fn default() -> Self {
        Self::new(70)
    }
}

impl FallbackPlanner {
    /// Create a planner with the given ready threshold.
    pub fn new(ready_threshold: u8) -> Self {
        Self { ready_threshold }
    }

    /// Overall score at which the design counts as ready.
    pub fn ready_threshold(&self) -> u8 {
        self.ready_threshold
    }

    /// Pick a branch for `message` and emit its actions.
    pub fn plan(&self, message: &str, state: &PlannerState) -> FallbackPlan {
        let plan = if self.is_build_request(message, state) {
            FallbackPlan::new(FallbackBranch::ReadyToBuild, Vec::new())
        } else if !state.has_schema && !state.has_layout {
            FallbackPlan::new(FallbackBranch::NewRequest, new_design_actions(message))
        } else if !state.has_schema {
            FallbackPlan::new(
                FallbackBranch::NextMissingArtifact,
                vec![Action::of_kind(ActionKind::DesignSchema).with_context(request_context(message))],
            )
        } else if !state.has_layout {
            FallbackPlan::new(
                FallbackBranch::NextMissingArtifact,
                vec![Action::of_kind(ActionKind::DesignLayout).with_context(request_context(message))],
            )
        } else {
            let matched = matched_dimensions(message);
            if matched.is_empty() {
                FallbackPlan::new(
                    FallbackBranch::DefaultProgress,
                    self.default_progress(message, state),
                )
            } else {
                FallbackPlan::new(
                    FallbackBranch::KeywordRefinement,
                    refinement_actions(message, &matched),
                )
            }
        };

        debug!(
            branch = plan.branch.as_str(),
            actions = plan.actions.len(),
            "Fallback plan selected"
        );
        plan
    }

    fn is_build_request(&self, message: &str, state: &PlannerState) -> bool {
        state.has_schema
            && state.has_layout
            && state.readiness.overall >= self.ready_threshold
            && BUILD_PATTERN.is_match(message)
    }

    fn default_progress(&self, message: &str, state: &PlannerState) -> Vec<Action> {
        let action = if state.readiness.overall < self.ready_threshold {
            Action::of_kind(refine_kind(state.readiness.weakest()))
        } else {
            Action::of_kind(ActionKind::Review)
        };
        vec![action.with_context(request_context(message))]
    }
}

fn request_context(message: &str) -> serde_json::Value {
    serde_json::json!({ "message": message })
}

fn refine_kind(dimension: ReadinessDimension) -> ActionKind {
    match dimension {
        ReadinessDimension::Schema => ActionKind::RefineSchema,
        ReadinessDimension::Ui => ActionKind::RefineLayout,
        ReadinessDimension::Workflow => ActionKind::RefineWorkflow,
    }
}

/// Dimensions whose keywords appear in the message, in canonical order.
pub fn matched_dimensions(message: &str) -> Vec<ReadinessDimension> {
    ReadinessDimension::ALL
        .into_iter()
        .filter(|dimension| match dimension {
            ReadinessDimension::Schema => SCHEMA_PATTERN.is_match(message),
            ReadinessDimension::Ui => UI_PATTERN.is_match(message),
            ReadinessDimension::Workflow => WORKFLOW_PATTERN.is_match(message),
        })
        .collect()
}

// schema -> (layout, workflow) -> review
fn new_design_actions(message: &str) -> Vec<Action> {
    let context = request_context(message);
    let schema = Action::of_kind(ActionKind::DesignSchema)
        .with_priority(Action::MAX_PRIORITY)
        .with_context(context.clone());
    let layout = Action::of_kind(ActionKind::DesignLayout)
        .with_priority(8)
        .with_dependency(schema.id)
        .with_context(context.clone());
    let workflow = Action::of_kind(ActionKind::DesignWorkflow)
        .with_priority(7)
        .with_dependency(schema.id)
        .with_context(context.clone());
    let review = Action::of_kind(ActionKind::Review)
        .with_dependencies([layout.id, workflow.id])
        .with_context(context);
    vec![schema, layout, workflow, review]
}

fn refinement_actions(message: &str, dimensions: &[ReadinessDimension]) -> Vec<Action> {
    let context = request_context(message);
    let mut actions: Vec<Action> = dimensions
        .iter()
        .map(|d| Action::of_kind(refine_kind(*d)).with_context(context.clone()))
        .collect();
    if actions.len() > 1 {
        let review = Action::of_kind(ActionKind::Review)
            .with_dependencies(actions.iter().map(|a| a.id))
            .with_context(context);
        actions.push(review);
    }
    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ActionGraph;

    fn complete_state(overall: u32) -> PlannerState {
        PlannerState {
            has_schema: true,
            has_layout: true,
            has_workflow: true,
            readiness: ReadinessScore::from_dimensions(overall, overall, overall),
        }
    }

    fn kinds(plan: &FallbackPlan) -> Vec<ActionKind> {
        plan.actions.iter().map(|a| a.kind).collect()
    }

    #[test]
    fn test_new_request_builds_dag() {
        let planner = FallbackPlanner::default();
        let plan = planner.plan("a booking app for a dog groomer", &PlannerState::default());

        assert_eq!(plan.branch, FallbackBranch::NewRequest);
        assert_eq!(
            kinds(&plan),
            vec![
                ActionKind::DesignSchema,
                ActionKind::DesignLayout,
                ActionKind::DesignWorkflow,
                ActionKind::Review,
            ]
        );
        let schema = plan.actions[0].id;
        assert!(plan.actions[1].depends_on.contains(&schema));
        assert!(plan.actions[2].depends_on.contains(&schema));
        assert_eq!(plan.actions[3].depends_on.len(), 2);

        let graph = ActionGraph::new();
        assert!(graph.validate(&plan.actions).is_ok());
        assert_eq!(graph.depth(&plan.actions).unwrap(), 3);
    }

    #[test]
    fn test_build_request_when_ready() {
        let planner = FallbackPlanner::new(70);
        let plan = planner.plan("Looks good, build it", &complete_state(80));
        assert_eq!(plan.branch, FallbackBranch::ReadyToBuild);
        assert!(plan.actions.is_empty());

        let plan = planner.plan("please create the app now", &complete_state(80));
        assert_eq!(plan.branch, FallbackBranch::ReadyToBuild);
    }

    #[test]
    fn test_build_request_below_threshold_keeps_working() {
        let planner = FallbackPlanner::new(70);
        let plan = planner.plan("build it", &complete_state(40));
        assert_ne!(plan.branch, FallbackBranch::ReadyToBuild);
        assert!(!plan.actions.is_empty());
    }

    #[test]
    fn test_build_request_without_layout_is_not_ready() {
        let planner = FallbackPlanner::new(0);
        let state = PlannerState {
            has_layout: false,
            ..complete_state(100)
        };
        let plan = planner.plan("ship it", &state);
        assert_eq!(plan.branch, FallbackBranch::NextMissingArtifact);
        assert_eq!(kinds(&plan), vec![ActionKind::DesignLayout]);
    }

    #[test]
    fn test_next_missing_schema() {
        let planner = FallbackPlanner::default();
        let state = PlannerState {
            has_layout: true,
            ..PlannerState::default()
        };
        let plan = planner.plan("anything", &state);
        assert_eq!(plan.branch, FallbackBranch::NextMissingArtifact);
        assert_eq!(kinds(&plan), vec![ActionKind::DesignSchema]);
    }

    #[test]
    fn test_single_keyword_refinement() {
        let planner = FallbackPlanner::default();
        let plan = planner.plan("add a due date field", &complete_state(50));
        assert_eq!(plan.branch, FallbackBranch::KeywordRefinement);
        assert_eq!(kinds(&plan), vec![ActionKind::RefineSchema]);
    }

    #[test]
    fn test_multi_keyword_refinement_adds_review() {
        let planner = FallbackPlanner::default();
        let plan = planner.plan(
            "add a status field and show it on the dashboard",
            &complete_state(50),
        );
        assert_eq!(plan.branch, FallbackBranch::KeywordRefinement);
        assert_eq!(
            kinds(&plan),
            vec![ActionKind::RefineSchema, ActionKind::RefineLayout, ActionKind::Review]
        );
        let review = &plan.actions[2];
        assert!(review.depends_on.contains(&plan.actions[0].id));
        assert!(review.depends_on.contains(&plan.actions[1].id));
    }

    #[test]
    fn test_default_progress_refines_weakest() {
        let planner = FallbackPlanner::new(70);
        let state = PlannerState {
            readiness: ReadinessScore::from_dimensions(80, 60, 10),
            ..complete_state(0)
        };
        let plan = planner.plan("hmm, not sure", &state);
        assert_eq!(plan.branch, FallbackBranch::DefaultProgress);
        assert_eq!(kinds(&plan), vec![ActionKind::RefineWorkflow]);
    }

    #[test]
    fn test_default_progress_reviews_when_ready() {
        let planner = FallbackPlanner::new(70);
        let plan = planner.plan("what do you think?", &complete_state(90));
        assert_eq!(plan.branch, FallbackBranch::DefaultProgress);
        assert_eq!(kinds(&plan), vec![ActionKind::Review]);
    }

    #[test]
    fn test_keyword_matching_is_word_bounded() {
        assert!(matched_dimensions("rebuilding").is_empty());
        assert!(!BUILD_PATTERN.is_match("rebuilding"));
        assert_eq!(
            matched_dimensions("send an email notification"),
            vec![ReadinessDimension::Workflow]
        );
    }
}
