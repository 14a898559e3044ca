//! Primary planner port.

use async_trait::async_trait;

use crate::domain::errors::AgentError;
use crate::domain::models::{Action, DesignState, ReadinessScore};

/// Decides which actions a user message calls for.
///
/// The production planner is LLM-driven and may fail; callers fall back to
/// the deterministic `FallbackPlanner` when it does.
#[async_trait]
pub trait ActionPlanner: Send + Sync {
    /// Plan the actions a message calls for.
    async fn plan(
        &self,
        message: &str,
        state: &DesignState,
        readiness: &ReadinessScore,
    ) -> Result<Vec<Action>, AgentError>;
}
