//! Common test utilities for integration tests
//!
//! Provides shared fixtures, helpers, and test utilities used across
//! multiple integration test files.

use std::sync::Arc;
use tempfile::TempDir;

use atelier::adapters::agents::{AgentRegistry, MockAgent, MockReply};
use atelier::domain::models::{Action, ActionKind, AgentRole};

/// Create a temporary directory for test isolation
///
/// Returns a TempDir that will be cleaned up when dropped.
#[allow(dead_code)]
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
/// Call this at the beginning of tests that need logging.
#[allow(dead_code)]
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// A mock agent answering every role, and a registry that serves it.
#[allow(dead_code)]
pub fn mock_registry(reply: MockReply) -> (Arc<MockAgent>, Arc<AgentRegistry>) {
    let agent = Arc::new(MockAgent::with_default_reply(reply));
    let registry = Arc::new(AgentRegistry::uniform(agent.clone()));
    (agent, registry)
}

/// A registry serving `agent` for only the given roles.
#[allow(dead_code)]
pub fn partial_registry(agent: Arc<MockAgent>, roles: &[AgentRole]) -> Arc<AgentRegistry> {
    let mut registry = AgentRegistry::new();
    for role in roles {
        registry.register(*role, agent.clone());
    }
    Arc::new(registry)
}

/// Action graph fixtures
pub mod graphs {
    use super::*;

    /// `a -> {b, c} -> d`, returned as `[a, b, c, d]`.
    #[allow(dead_code)]
    pub fn diamond() -> Vec<Action> {
        let a = Action::of_kind(ActionKind::DesignSchema);
        let b = Action::of_kind(ActionKind::DesignLayout).with_dependency(a.id);
        let c = Action::of_kind(ActionKind::DesignWorkflow).with_dependency(a.id);
        let d = Action::of_kind(ActionKind::Review).with_dependencies([b.id, c.id]);
        vec![a, b, c, d]
    }

    /// A linear chain of `len` actions, each depending on the previous one.
    #[allow(dead_code)]
    pub fn chain(len: usize) -> Vec<Action> {
        let mut actions: Vec<Action> = Vec::with_capacity(len);
        for _ in 0..len {
            let action = Action::of_kind(ActionKind::RefineSchema);
            let action = match actions.last() {
                Some(prev) => action.with_dependency(prev.id),
                None => action,
            };
            actions.push(action);
        }
        actions
    }

    /// `n` independent actions.
    #[allow(dead_code)]
    pub fn independent(n: usize) -> Vec<Action> {
        (0..n).map(|_| Action::of_kind(ActionKind::Review)).collect()
    }
}
