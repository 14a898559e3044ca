//! Turn-based design dialogue.
//!
//! Each turn asks one role for a contribution, run through the scheduler as a
//! single-action wave. The loop stops when the consensus predicate holds or
//! the turn ceiling is reached; either way every required role ends up with a
//! sub-artifact in the synthesized consensus.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::adapters::agents::default_artifact;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    Action, ActionKind, ActionOutcome, AgentRole, Consensus, DesignSession, SessionConfig,
};
use crate::domain::ports::AgentResolver;
use crate::services::action_scheduler::ActionScheduler;

/// Builds the sub-artifact for a role that never contributed.
pub type DefaultArtifactFactory = Arc<dyn Fn(AgentRole) -> Value + Send + Sync>;

/// A finished session and its synthesized artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignOutcome {
    /// Final session state.
    pub session: DesignSession,
    /// Synthesized design.
    pub consensus: Consensus,
}

impl DesignOutcome {
    /// Whether synthesis was forced by the turn ceiling.
    pub fn forced(&self) -> bool {
        self.consensus.forced
    }
}

/// Runs design sessions against a set of role capabilities.
pub struct DesignSessionManager {
    resolver: Arc<dyn AgentResolver>,
    config: SessionConfig,
    scheduler: ActionScheduler,
    defaults: DefaultArtifactFactory,
}

impl DesignSessionManager {
    /// Create a manager resolving roles through `resolver`.
    pub fn new(
        resolver: Arc<dyn AgentResolver>,
        config: SessionConfig,
        scheduler: ActionScheduler,
    ) -> Self {
        Self {
            resolver,
            config,
            scheduler,
            defaults: Arc::new(default_artifact),
        }
    }

    /// Replace the factory used for roles that never contributed.
    pub fn with_defaults<F>(mut self, defaults: F) -> Self
    where
        F: Fn(AgentRole) -> Value + Send + Sync + 'static,
    {
        self.defaults = Arc::new(defaults);
        self
    }

    /// Session limits in effect.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn ensure_capabilities(&self, roles: &[AgentRole]) -> DomainResult<()> {
        match roles.iter().find(|role| self.resolver.resolve(**role).is_none()) {
            Some(role) => Err(DomainError::NoCapabilityRegistered(*role)),
            None => Ok(()),
        }
    }

    /// Agent context for the turn about to run.
    fn turn_context(session: &DesignSession, role: AgentRole) -> Value {
        let phase = if session.turn as usize <= session.required_roles.len() {
            "initial"
        } else {
            "refinement"
        };
        let previous = session.contributions.last().map(|c| {
            json!({
                "role": c.role,
                "turn": c.turn,
                "content": c.content,
                "structured_output": c.structured_output,
            })
        });
        let own_latest = session
            .latest_from(role)
            .map(|c| c.structured_output.clone());
        json!({
            "session_id": session.id,
            "request": session.request,
            "turn": session.turn,
            "max_turns": session.max_turns,
            "phase": phase,
            "previous": previous,
            "own_latest": own_latest,
        })
    }

    /// Run one turn: pick the role, invoke it, record the outcome.
    async fn run_turn(&self, session: &mut DesignSession) {
        let role = session.next_role();
        let turn = session.advance_turn();
        let action = Action::new(role, ActionKind::Contribute)
            .with_context(Self::turn_context(session, role));

        debug!(session_id = %session.id, turn, role = %role, "Running design turn");
        let report = self
            .scheduler
            .execute_parallel(vec![action], self.resolver.as_ref())
            .await;

        match report.results.into_iter().next().map(|r| r.outcome) {
            Some(ActionOutcome::Completed { response }) => {
                let contribution = session.record_contribution(role, response);
                debug!(
                    turn,
                    role = %role,
                    confidence = contribution.confidence,
                    "Contribution recorded"
                );
            }
            Some(ActionOutcome::Failed { error }) => {
                warn!(session_id = %session.id, turn, role = %role, error = %error, "Design turn failed");
                session.record_failure(role, error);
            }
            None => {
                warn!(session_id = %session.id, turn, role = %role, "Design turn produced no result");
                session.record_failure(role, "turn produced no result");
            }
        }
    }

    /// Run a session for `request` until consensus or the turn ceiling.
    ///
    /// Configuration problems are returned before any turn runs. Agent
    /// failures never abort the session.
    pub async fn run_design_session(&self, request: &str) -> DomainResult<DesignOutcome> {
        let mut session = DesignSession::new(request, &self.config)?;
        self.ensure_capabilities(&session.required_roles)?;

        info!(
            session_id = %session.id,
            roles = session.required_roles.len(),
            min_turns = session.min_turns,
            max_turns = session.max_turns,
            "Design session started"
        );

        let mut forced = true;
        while !session.at_turn_ceiling() {
            self.run_turn(&mut session).await;
            if session.has_consensus() {
                session.mark_consensus_reached();
                forced = false;
                break;
            }
        }

        let defaults = Arc::clone(&self.defaults);
        let consensus = session.synthesize(|role| defaults(role), forced).clone();
        let defaulted = consensus.defaulted_roles();

        if forced {
            warn!(
                session_id = %session.id,
                turns = session.turn,
                failures = session.failures.len(),
                defaulted = ?defaulted,
                "Turn ceiling reached; consensus forced"
            );
        } else {
            info!(
                session_id = %session.id,
                turns = session.turn,
                mean_confidence = ?consensus.mean_confidence,
                "Consensus reached"
            );
        }

        Ok(DesignOutcome { session, consensus })
    }
}

impl std::fmt::Debug for DesignSessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DesignSessionManager")
            .field("config", &self.config)
            .field("scheduler", &self.scheduler)
            .finish_non_exhaustive()
    }
}
