//! Design session scenarios: consensus timing, forced synthesis, configuration errors.

mod common;

use std::sync::Arc;

use atelier::adapters::agents::{AgentRegistry, MockAgent, MockReply, ScriptedAgent};
use atelier::domain::errors::{AgentError, DomainError};
use atelier::domain::models::{AgentRole, ArtifactSource, SessionConfig, SessionStatus};
use atelier::services::{ActionScheduler, DesignSessionManager};
use serde_json::json;

fn manager(registry: Arc<AgentRegistry>, config: SessionConfig) -> DesignSessionManager {
    DesignSessionManager::new(registry, config, ActionScheduler::with_defaults())
}

#[tokio::test]
async fn test_consensus_lands_at_min_turns() {
    common::setup_test_logging();
    let (agent, registry) = common::mock_registry(MockReply::confident(0.85));
    let config = SessionConfig {
        min_turns: 4,
        max_turns: 12,
        ..SessionConfig::default()
    };

    let outcome = manager(registry, config)
        .run_design_session("an inventory tracker for a bakery")
        .await
        .unwrap();

    assert_eq!(outcome.session.turn, 4);
    assert_eq!(outcome.session.status, SessionStatus::Complete);
    assert!(!outcome.forced());
    assert_eq!(agent.invocation_count(), 4);
    assert!(outcome.consensus.defaulted_roles().is_empty());
    assert!(outcome.session.consensus.is_some());
}

#[tokio::test]
async fn test_consensus_waits_for_min_turns() {
    let (agent, registry) = common::mock_registry(MockReply::confident(0.95));
    let config = SessionConfig {
        min_turns: 6,
        max_turns: 12,
        ..SessionConfig::default()
    };

    let outcome = manager(registry, config)
        .run_design_session("a volunteer rota")
        .await
        .unwrap();

    // Every role was confident after turn 4, but the session kept going.
    assert_eq!(outcome.session.turn, 6);
    assert_eq!(agent.invocation_count(), 6);
    assert!(!outcome.forced());
}

#[tokio::test]
async fn test_low_confidence_runs_to_ceiling() {
    let (_agent, registry) = common::mock_registry(MockReply::confident(0.4));
    let config = SessionConfig {
        max_turns: 7,
        ..SessionConfig::default()
    };

    let outcome = manager(registry, config)
        .run_design_session("a festival schedule")
        .await
        .unwrap();

    assert_eq!(outcome.session.turn, 7);
    assert!(outcome.forced());
    assert_eq!(outcome.session.status, SessionStatus::Failed);
    // Roles still contributed, so nothing is defaulted.
    assert!(outcome.consensus.defaulted_roles().is_empty());
    assert_eq!(outcome.session.contributions.len(), 7);
}

#[tokio::test]
async fn test_all_agents_failing_forces_default_consensus() {
    let (agent, registry) = common::mock_registry(MockReply::failure(AgentError::Timeout {
        after_secs: 30,
    }));
    let config = SessionConfig {
        max_turns: 5,
        ..SessionConfig::default()
    };

    let outcome = manager(registry, config)
        .run_design_session("a gym class booking site")
        .await
        .unwrap();

    assert_eq!(agent.invocation_count(), 5);
    assert_eq!(outcome.session.turn, 5);
    assert!(outcome.session.contributions.is_empty());
    assert_eq!(outcome.session.failures.len(), 5);
    assert!(outcome.forced());
    assert_eq!(outcome.session.status, SessionStatus::Failed);

    let mut defaulted = outcome.consensus.defaulted_roles();
    defaulted.sort();
    let mut all = AgentRole::ALL.to_vec();
    all.sort();
    assert_eq!(defaulted, all);
    assert_eq!(outcome.consensus.mean_confidence, None);
}

#[tokio::test]
async fn test_missing_capability_rejected_before_any_turn() {
    let agent = Arc::new(MockAgent::new());
    let registry = common::partial_registry(
        agent.clone(),
        &[
            AgentRole::DataModeler,
            AgentRole::UxDesigner,
            AgentRole::Reviewer,
        ],
    );

    let err = manager(registry, SessionConfig::default())
        .run_design_session("a homework planner")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DomainError::NoCapabilityRegistered(AgentRole::WorkflowDesigner)
    ));
    assert_eq!(agent.invocation_count(), 0);
}

#[tokio::test]
async fn test_subset_of_roles_only_needs_their_capabilities() {
    let agent = Arc::new(MockAgent::with_default_reply(MockReply::confident(0.9)));
    let registry = common::partial_registry(
        agent.clone(),
        &[AgentRole::DataModeler, AgentRole::UxDesigner],
    );
    let config = SessionConfig {
        required_roles: vec![AgentRole::DataModeler, AgentRole::UxDesigner],
        min_turns: 2,
        max_turns: 6,
        ..SessionConfig::default()
    };

    let outcome = manager(registry, config)
        .run_design_session("a reading list")
        .await
        .unwrap();

    assert_eq!(outcome.session.turn, 2);
    assert_eq!(outcome.consensus.artifacts.len(), 2);
    assert!(outcome.consensus.artifact(AgentRole::Reviewer).is_none());
}

#[tokio::test]
async fn test_one_silent_role_is_defaulted_with_custom_factory() {
    let (agent, registry) = common::mock_registry(MockReply::confident(0.9));
    agent.set_reply_for_role(
        AgentRole::WorkflowDesigner,
        MockReply::failure(AgentError::MalformedOutput("not json".to_string())),
    );
    let config = SessionConfig {
        max_turns: 6,
        ..SessionConfig::default()
    };

    let outcome = manager(registry, config)
        .with_defaults(|role| json!({ "placeholder": role.artifact_name() }))
        .run_design_session("a plant watering reminder")
        .await
        .unwrap();

    assert!(outcome.forced());
    let workflow = outcome
        .consensus
        .artifact(AgentRole::WorkflowDesigner)
        .expect("workflow artifact");
    assert_eq!(workflow.source, ArtifactSource::Default);
    assert_eq!(
        workflow.output,
        json!({ "placeholder": AgentRole::WorkflowDesigner.artifact_name() })
    );
    assert_eq!(
        outcome.consensus.defaulted_roles(),
        vec![AgentRole::WorkflowDesigner]
    );
}

#[tokio::test]
async fn test_scripted_agents_reach_consensus() {
    let registry = Arc::new(AgentRegistry::uniform(Arc::new(ScriptedAgent::default())));

    let outcome = manager(registry, SessionConfig::default())
        .run_design_session("a community garden plot tracker")
        .await
        .unwrap();

    assert_eq!(outcome.session.status, SessionStatus::Complete);
    assert_eq!(outcome.session.turn, 4);
    for artifact in outcome.consensus.artifacts.values() {
        assert_eq!(artifact.output["subject"], "a community garden plot tracker");
    }
}

#[tokio::test]
async fn test_invalid_turn_limits_rejected() {
    let (agent, registry) = common::mock_registry(MockReply::default());
    let config = SessionConfig {
        min_turns: 9,
        max_turns: 3,
        ..SessionConfig::default()
    };

    let err = manager(registry, config)
        .run_design_session("anything")
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::InvalidSessionConfig(_)));
    assert_eq!(agent.invocation_count(), 0);
}
