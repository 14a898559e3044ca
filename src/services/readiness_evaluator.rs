//! Readiness scoring over accumulated design state.
//!
//! All functions here are pure. Scores use fixed breakpoints plus additive
//! bonuses and are clamped to [0, 100].

use crate::domain::models::{Action, ChangeKind, DesignState, ReadinessDimension, ReadinessScore};

/// Tier for a count: `(minimum, score)` pairs, highest minimum first.
const SCHEMA_FIELD_TIERS: [(u32, u32); 3] = [(5, 70), (3, 50), (1, 30)];
const UI_COMPONENT_TIERS: [(u32, u32); 3] = [(5, 70), (3, 50), (1, 30)];
const WORKFLOW_TIERS: [(u32, u32); 3] = [(3, 90), (2, 75), (1, 50)];

const RELATIONSHIP_BONUS: u32 = 15;
const COMPUTED_FIELD_BONUS: u32 = 15;
const UI_DESCRIPTION_BONUS: u32 = 10;
const RICH_UI_COMPONENTS: u32 = 8;
const RICH_UI_BONUS: u32 = 20;
const WORKFLOW_DESCRIPTION_BONUS: u32 = 10;

fn tier(count: u32, tiers: &[(u32, u32)]) -> u32 {
    tiers
        .iter()
        .find(|(minimum, _)| count >= *minimum)
        .map_or(0, |(_, score)| *score)
}

fn bonus(condition: bool, points: u32) -> u32 {
    if condition {
        points
    } else {
        0
    }
}

/// Pure readiness scoring.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadinessEvaluator;

impl ReadinessEvaluator {
    /// Create an evaluator.
    pub fn new() -> Self {
        Self
    }

    /// Score the data schema dimension (0-100).
    pub fn schema_score(&self, state: &DesignState) -> u32 {
        tier(state.field_count, &SCHEMA_FIELD_TIERS)
            + bonus(state.has_relationships, RELATIONSHIP_BONUS)
            + bonus(state.has_computed_fields, COMPUTED_FIELD_BONUS)
    }

    /// Score the UI layout dimension (0-100).
    pub fn ui_score(&self, state: &DesignState) -> u32 {
        tier(state.component_count, &UI_COMPONENT_TIERS)
            + bonus(state.has_description, UI_DESCRIPTION_BONUS)
            + bonus(state.component_count >= RICH_UI_COMPONENTS, RICH_UI_BONUS)
    }

    /// Score the workflow dimension (0-100).
    pub fn workflow_score(&self, state: &DesignState) -> u32 {
        tier(state.workflow_count, &WORKFLOW_TIERS)
            + bonus(
                state.has_description && state.workflow_count > 0,
                WORKFLOW_DESCRIPTION_BONUS,
            )
    }

    /// Score a design state. Each dimension is clamped to 100.
    pub fn evaluate(&self, state: &DesignState) -> ReadinessScore {
        ReadinessScore::from_dimensions(
            self.schema_score(state),
            self.ui_score(state),
            self.workflow_score(state),
        )
    }

    /// Estimate readiness after a change touching `affected` dimensions.
    ///
    /// Adds a flat delta per affected dimension; this is a forecast, not a
    /// recomputation from the resulting design.
    pub fn project(
        &self,
        current: &ReadinessScore,
        change: ChangeKind,
        affected: &[ReadinessDimension],
    ) -> ReadinessScore {
        let delta = change.expected_delta();
        let bump = |dimension: ReadinessDimension| {
            let base = u32::from(current.get(dimension));
            if affected.contains(&dimension) {
                base + delta
            } else {
                base
            }
        };
        ReadinessScore::from_dimensions(
            bump(ReadinessDimension::Schema),
            bump(ReadinessDimension::Ui),
            bump(ReadinessDimension::Workflow),
        )
    }

    /// Dimensions touched by a set of actions, deduplicated, in canonical order.
    pub fn affected_dimensions(&self, actions: &[Action]) -> Vec<ReadinessDimension> {
        ReadinessDimension::ALL
            .into_iter()
            .filter(|d| actions.iter().any(|a| a.kind.dimension() == Some(*d)))
            .collect()
    }

    /// Whether a change is a fresh design or a refinement.
    pub fn change_kind(&self, state: &DesignState) -> ChangeKind {
        if state.has_schema || state.has_layout {
            ChangeKind::Refinement
        } else {
            ChangeKind::NewRequest
        }
    }

    /// True when the overall score meets the threshold.
    pub fn is_ready_to_build(&self, score: &ReadinessScore, threshold: u8) -> bool {
        score.overall >= threshold
    }
}
