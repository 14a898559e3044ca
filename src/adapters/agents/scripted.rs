//! Offline agent that answers every role with a deterministic skeleton.
//!
//! Used by the CLI to exercise sessions without an LLM backend.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::domain::errors::AgentError;
use crate::domain::models::{AgentRequest, AgentResponse, AgentRole};
use crate::domain::ports::AgentCapability;

/// Empty sub-artifact for a role. Also the default factory for synthesis.
pub fn default_artifact(role: AgentRole) -> Value {
    match role {
        AgentRole::DataModeler => json!({ "entities": [], "relationships": [] }),
        AgentRole::UxDesigner => json!({ "pages": [], "components": [] }),
        AgentRole::WorkflowDesigner => json!({ "workflows": [] }),
        AgentRole::Reviewer => json!({ "issues": [], "approved": false }),
    }
}

/// Deterministic stand-in for a design agent.
///
/// Confidence starts at `base_confidence` and rises by `step` per turn
/// (read from the request context), capped at 0.95.
#[derive(Debug, Clone)]
pub struct ScriptedAgent {
    base_confidence: f64,
    step: f64,
}

impl ScriptedAgent {
    const CONFIDENCE_CAP: f64 = 0.95;

    /// Agent whose confidence climbs by `step` per turn.
    pub fn new(base_confidence: f64, step: f64) -> Self {
        Self {
            base_confidence: base_confidence.clamp(0.0, 1.0),
            step: step.max(0.0),
        }
    }

    fn confidence_for_turn(&self, turn: u64) -> f64 {
        let raised = self.base_confidence + self.step * turn.saturating_sub(1) as f64;
        raised.min(Self::CONFIDENCE_CAP)
    }
}

impl Default for ScriptedAgent {
    fn default() -> Self {
        Self::new(0.75, 0.02)
    }
}

#[async_trait]
impl AgentCapability for ScriptedAgent {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn invoke(&self, request: AgentRequest) -> Result<AgentResponse, AgentError> {
        let turn = request.context.get("turn").and_then(Value::as_u64).unwrap_or(1);
        let subject = request
            .context
            .get("request")
            .and_then(Value::as_str)
            .unwrap_or(request.prompt.as_str())
            .to_string();

        let mut artifact = default_artifact(request.role);
        if let Value::Object(ref mut map) = artifact {
            map.insert("subject".to_string(), Value::String(subject.clone()));
            map.insert("revision".to_string(), json!(turn));
        }

        Ok(AgentResponse::new(
            format!("{} proposal (turn {turn}) for: {subject}", request.role.artifact_name()),
            self.confidence_for_turn(turn),
        )
        .with_structured_output(artifact))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_reply_shape() {
        let agent = ScriptedAgent::default();
        let request = AgentRequest::new(AgentRole::DataModeler, "contribute")
            .with_context(json!({ "turn": 3, "request": "inventory tracker" }));
        let response = agent.invoke(request).await.unwrap().validate().unwrap();

        let output = response.structured_output.unwrap();
        assert_eq!(output["subject"], "inventory tracker");
        assert_eq!(output["revision"], 3);
        assert!(output.get("entities").is_some());
    }

    #[test]
    fn test_confidence_rises_and_caps() {
        let agent = ScriptedAgent::new(0.7, 0.1);
        assert!((agent.confidence_for_turn(1) - 0.7).abs() < 1e-9);
        assert!((agent.confidence_for_turn(2) - 0.8).abs() < 1e-9);
        assert!((agent.confidence_for_turn(10) - 0.95).abs() < 1e-9);
    }

    #[test]
    fn test_default_artifact_per_role() {
        for role in AgentRole::ALL {
            assert!(default_artifact(role).is_object());
        }
    }
}
