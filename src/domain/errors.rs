//! Domain errors for the Atelier orchestration core.

use thiserror::Error;
use uuid::Uuid;

use super::models::{AgentRole, FeedbackStatus};

/// Format a cycle path as a human-readable string: `A -> B -> C -> A`.
fn format_cycle_path(path: &[Uuid]) -> String {
    path.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Configuration and graph errors that callers must handle.
///
/// Leaf failures (a single agent invocation, a deadlocked wave) are never
/// reported through this type; they are absorbed into structured results.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A required role has no capability.
    #[error("No agent capability registered for required role: {0}")]
    NoCapabilityRegistered(AgentRole),

    /// Session limits rejected before the first turn.
    #[error("Invalid session configuration: {0}")]
    InvalidSessionConfig(String),

    /// Actions depend on each other in a loop.
    #[error("Action dependency cycle detected: {}", format_cycle_path(.0))]
    DependencyCycle(Vec<Uuid>),

    /// An action depends on an id not in the plan.
    #[error("Action {action} depends on unknown action {dependency}")]
    UnknownDependency {
        /// The dependent action.
        action: Uuid,
        /// The missing id.
        dependency: Uuid,
    },

    /// JSON encoding or decoding failed.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Result alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}

/// Failure reported by an agent capability.
///
/// Every variant is recoverable from the orchestrator's point of view: the
/// scheduler turns it into a failed `ActionResult`.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AgentError {
    /// The agent did not answer in time.
    #[error("Agent timed out after {after_secs}s")]
    Timeout {
        /// Seconds waited.
        after_secs: u64,
    },

    /// The agent answered with unusable output.
    #[error("Agent returned malformed output: {0}")]
    MalformedOutput(String),

    /// The agent backend throttled the request.
    #[error("Agent rate limited{}", .retry_after_secs.map(|s| format!(" (retry after {s}s)")).unwrap_or_default())]
    RateLimited {
        /// Backend's retry hint.
        retry_after_secs: Option<u64>,
    },

    /// The agent backend is unreachable.
    #[error("Agent unavailable: {0}")]
    Unavailable(String),
}

/// Invariant violations on a feedback session.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FeedbackError {
    /// The session is already resolved or failed.
    #[error("Feedback session is closed (status: {0})")]
    SessionClosed(FeedbackStatus),

    /// No error has been recorded yet.
    #[error("Feedback session has no iteration to fix")]
    NoIteration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_path_display() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let err = DomainError::DependencyCycle(vec![a, b, a]);
        let msg = err.to_string();
        assert!(msg.contains(&format!("{a} -> {b} -> {a}")));
    }

    #[test]
    fn test_rate_limited_display() {
        let err = AgentError::RateLimited {
            retry_after_secs: Some(30),
        };
        assert_eq!(err.to_string(), "Agent rate limited (retry after 30s)");

        let err = AgentError::RateLimited {
            retry_after_secs: None,
        };
        assert_eq!(err.to_string(), "Agent rate limited");
    }

    #[test]
    fn test_session_closed_display() {
        let err = FeedbackError::SessionClosed(FeedbackStatus::Failed);
        assert_eq!(err.to_string(), "Feedback session is closed (status: failed)");
    }
}
