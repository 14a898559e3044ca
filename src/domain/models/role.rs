//! Design agent roles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::readiness::ReadinessDimension;

/// The closed set of roles that take part in a design.
///
/// Adding a role is a compile-time change: every `match` below must be
/// extended, and the registry has to learn a capability for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    /// Owns the data schema (entities, fields, relationships).
    DataModeler,
    /// Owns the screen layout and components.
    UxDesigner,
    /// Owns automations and approval flows.
    WorkflowDesigner,
    /// Cross-checks the other artifacts.
    Reviewer,
}

impl AgentRole {
    /// Every role, in the default speaking order.
    pub const ALL: [Self; 4] = [
        Self::DataModeler,
        Self::UxDesigner,
        Self::WorkflowDesigner,
        Self::Reviewer,
    ];

    /// Stable snake_case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DataModeler => "data_modeler",
            Self::UxDesigner => "ux_designer",
            Self::WorkflowDesigner => "workflow_designer",
            Self::Reviewer => "reviewer",
        }
    }

    /// Name of the sub-artifact this role contributes to a consensus.
    pub fn artifact_name(&self) -> &'static str {
        match self {
            Self::DataModeler => "schema",
            Self::UxDesigner => "layout",
            Self::WorkflowDesigner => "workflow",
            Self::Reviewer => "review",
        }
    }

    /// The role that answers this one during the refinement phase.
    pub fn responds_to(self) -> Self {
        match self {
            Self::DataModeler => Self::UxDesigner,
            Self::UxDesigner => Self::WorkflowDesigner,
            Self::WorkflowDesigner => Self::Reviewer,
            Self::Reviewer => Self::DataModeler,
        }
    }

    /// Readiness dimension this role moves, if any.
    pub fn dimension(self) -> Option<ReadinessDimension> {
        match self {
            Self::DataModeler => Some(ReadinessDimension::Schema),
            Self::UxDesigner => Some(ReadinessDimension::Ui),
            Self::WorkflowDesigner => Some(ReadinessDimension::Workflow),
            Self::Reviewer => None,
        }
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "data_modeler" | "schema" => Ok(Self::DataModeler),
            "ux_designer" | "layout" | "ui" => Ok(Self::UxDesigner),
            "workflow_designer" | "workflow" => Ok(Self::WorkflowDesigner),
            "reviewer" | "review" => Ok(Self::Reviewer),
            other => Err(format!("unknown agent role: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_responds_to_cycles_through_every_role() {
        let mut role = AgentRole::DataModeler;
        let mut seen = Vec::new();
        for _ in 0..AgentRole::ALL.len() {
            seen.push(role);
            role = role.responds_to();
        }
        assert_eq!(role, AgentRole::DataModeler);
        seen.sort();
        assert_eq!(seen, AgentRole::ALL.to_vec());
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!("ux-designer".parse::<AgentRole>(), Ok(AgentRole::UxDesigner));
        assert_eq!("Schema".parse::<AgentRole>(), Ok(AgentRole::DataModeler));
        assert!("painter".parse::<AgentRole>().is_err());
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&AgentRole::WorkflowDesigner).unwrap();
        assert_eq!(json, "\"workflow_designer\"");
    }
}
