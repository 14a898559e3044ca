//! Readiness scores and the design state they are computed from.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bound of every readiness score.
pub const MAX_SCORE: u8 = 100;

/// A scored aspect of the design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessDimension {
    /// Data model completeness.
    Schema,
    /// Layout completeness.
    Ui,
    /// Workflow completeness.
    Workflow,
}

impl ReadinessDimension {
    /// Every dimension.
    pub const ALL: [Self; 3] = [Self::Schema, Self::Ui, Self::Workflow];

    /// Weight of the dimension in the overall score.
    pub fn weight(&self) -> f64 {
        match self {
            Self::Schema | Self::Ui => 0.4,
            Self::Workflow => 0.2,
        }
    }

    /// Stable snake_case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Schema => "schema",
            Self::Ui => "ui",
            Self::Workflow => "workflow",
        }
    }
}

impl fmt::Display for ReadinessDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-dimension readiness plus the weighted overall score, all in [0, 100].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessScore {
    /// Schema score.
    pub schema: u8,
    /// UI score.
    pub ui: u8,
    /// Workflow score.
    pub workflow: u8,
    /// Weighted overall score.
    pub overall: u8,
}

impl ReadinessScore {
    /// Build a score from dimension values, clamping each and deriving `overall`.
    pub fn from_dimensions(schema: u32, ui: u32, workflow: u32) -> Self {
        let schema = clamp_score(schema);
        let ui = clamp_score(ui);
        let workflow = clamp_score(workflow);
        let weighted = f64::from(schema) * ReadinessDimension::Schema.weight()
            + f64::from(ui) * ReadinessDimension::Ui.weight()
            + f64::from(workflow) * ReadinessDimension::Workflow.weight();
        Self {
            schema,
            ui,
            workflow,
            overall: clamp_score(weighted.round() as u32),
        }
    }

    /// Score for one dimension.
    pub fn get(&self, dimension: ReadinessDimension) -> u8 {
        match dimension {
            ReadinessDimension::Schema => self.schema,
            ReadinessDimension::Ui => self.ui,
            ReadinessDimension::Workflow => self.workflow,
        }
    }

    /// The dimension with the lowest score. Ties go to the earlier dimension.
    pub fn weakest(&self) -> ReadinessDimension {
        ReadinessDimension::ALL
            .into_iter()
            .min_by_key(|d| self.get(*d))
            .unwrap_or(ReadinessDimension::Schema)
    }

    /// Iterate over per-dimension scores.
    pub fn dimensions(&self) -> impl Iterator<Item = (ReadinessDimension, u8)> + '_ {
        ReadinessDimension::ALL.into_iter().map(|d| (d, self.get(d)))
    }
}

fn clamp_score(value: u32) -> u8 {
    value.min(u32::from(MAX_SCORE)) as u8
}

/// Accumulated design facts the readiness evaluator scores.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignState {
    /// Fields defined in the schema.
    pub field_count: u32,
    /// Components in the layout.
    pub component_count: u32,
    /// Workflows defined.
    pub workflow_count: u32,
    /// A description was given.
    pub has_description: bool,
    /// The schema links entities.
    pub has_relationships: bool,
    /// The schema has derived fields.
    pub has_computed_fields: bool,
    /// A schema artifact exists.
    pub has_schema: bool,
    /// A layout artifact exists.
    pub has_layout: bool,
    /// A workflow artifact exists.
    pub has_workflow: bool,
}

/// Whether a change starts a design or adjusts an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// Starts a new design.
    NewRequest,
    /// Adjusts an existing design.
    Refinement,
}

impl ChangeKind {
    /// Flat readiness gain assumed for each affected dimension.
    pub fn expected_delta(&self) -> u32 {
        match self {
            Self::NewRequest => 40,
            Self::Refinement => 20,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_dimensions_weights() {
        let score = ReadinessScore::from_dimensions(100, 50, 0);
        assert_eq!(score.overall, 60);
    }

    #[test]
    fn test_from_dimensions_clamps() {
        let score = ReadinessScore::from_dimensions(250, 101, 1000);
        assert_eq!(score.schema, 100);
        assert_eq!(score.ui, 100);
        assert_eq!(score.workflow, 100);
        assert_eq!(score.overall, 100);
    }

    #[test]
    fn test_weakest() {
        let score = ReadinessScore::from_dimensions(70, 30, 50);
        assert_eq!(score.weakest(), ReadinessDimension::Ui);
        let tied = ReadinessScore::from_dimensions(0, 0, 0);
        assert_eq!(tied.weakest(), ReadinessDimension::Schema);
    }
}
