//! Request and response shapes exchanged with agent capabilities.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::role::AgentRole;
use crate::domain::errors::AgentError;

/// A single invocation of an agent capability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRequest {
    /// Role being asked.
    pub role: AgentRole,
    /// Instruction text.
    pub prompt: String,
    /// Structured context.
    #[serde(default)]
    pub context: Value,
}

impl AgentRequest {
    /// Create a request for `role`.
    pub fn new(role: AgentRole, prompt: impl Into<String>) -> Self {
        Self {
            role,
            prompt: prompt.into(),
            context: Value::Null,
        }
    }

    /// Attach structured context.
    pub fn with_context(mut self, context: Value) -> Self {
        self.context = context;
        self
    }
}

/// Validated output of an agent capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    /// Free-form text the agent produced.
    pub content: String,
    /// Typed payload, when the agent produced one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured_output: Option<Value>,
    /// Self-reported confidence in [0, 1].
    pub confidence: f64,
}

impl AgentResponse {
    /// Create a response with the stated confidence.
    pub fn new(content: impl Into<String>, confidence: f64) -> Self {
        Self {
            content: content.into(),
            structured_output: None,
            confidence,
        }
    }

    /// Attach the structured artifact.
    pub fn with_structured_output(mut self, output: Value) -> Self {
        self.structured_output = Some(output);
        self
    }

    /// Check the response against the capability contract.
    ///
    /// Confidence must be finite and within [0, 1]. Out-of-range values are
    /// malformed output, not clamped.
    pub fn validate(self) -> Result<Self, AgentError> {
        if !self.confidence.is_finite() {
            return Err(AgentError::MalformedOutput(
                "confidence is not a finite number".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(AgentError::MalformedOutput(format!(
                "confidence {} outside [0, 1]",
                self.confidence
            )));
        }
        Ok(self)
    }

    /// Parse raw agent JSON into a validated response.
    pub fn from_json(raw: &str) -> Result<Self, AgentError> {
        let parsed: Self = serde_json::from_str(raw)
            .map_err(|e| AgentError::MalformedOutput(e.to_string()))?;
        parsed.validate()
    }
}
