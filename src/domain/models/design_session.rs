//! Design sessions: the turn-based dialogue between design roles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use super::agent::AgentResponse;
use super::config::SessionConfig;
use super::role::AgentRole;
use crate::domain::errors::{DomainError, DomainResult};

/// Lifecycle of a design session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Turns still running.
    Active,
    /// Consensus found, synthesis pending.
    ConsensusReached,
    /// Synthesized after organic consensus.
    Complete,
    /// The turn ceiling was hit before consensus; the artifact was forced.
    Failed,
}

impl SessionStatus {
    /// Stable snake_case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::ConsensusReached => "consensus_reached",
            Self::Complete => "complete",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One role's output during one turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    /// Unique id.
    pub id: Uuid,
    /// Contributing role.
    pub role: AgentRole,
    /// Turn the contribution was made in.
    pub turn: u32,
    /// Free-text answer.
    pub content: String,
    /// Structured artifact.
    pub structured_output: Value,
    /// Clamped to [0, 1].
    pub confidence: f64,
    /// When it was recorded.
    pub timestamp: DateTime<Utc>,
}

/// A turn whose agent invocation failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnFailure {
    /// Role whose turn failed.
    pub role: AgentRole,
    /// Failed turn.
    pub turn: u32,
    /// Failure message.
    pub error: String,
    /// When it was recorded.
    pub timestamp: DateTime<Utc>,
}

/// Where a synthesized sub-artifact came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArtifactSource {
    /// Taken from the role's latest contribution.
    Contribution {
        /// Turn of that contribution.
        turn: u32,
    },
    /// Built by the default factory.
    Default,
}

/// A role's piece of the synthesized design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubArtifact {
    /// Owning role.
    pub role: AgentRole,
    /// Artifact body.
    pub output: Value,
    /// Provenance.
    pub source: ArtifactSource,
}

/// The converged design, one sub-artifact per required role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consensus {
    /// Sub-artifacts by role.
    pub artifacts: BTreeMap<AgentRole, SubArtifact>,
    /// True when the turn ceiling forced synthesis.
    pub forced: bool,
    /// Mean confidence of the last round, if any contribution exists.
    pub mean_confidence: Option<f64>,
    /// Synthesis time.
    pub synthesized_at: DateTime<Utc>,
}

impl Consensus {
    /// Artifact for one role.
    pub fn artifact(&self, role: AgentRole) -> Option<&SubArtifact> {
        self.artifacts.get(&role)
    }

    /// Roles whose artifact came from the default factory.
    pub fn defaulted_roles(&self) -> Vec<AgentRole> {
        self.artifacts
            .values()
            .filter(|a| a.source == ArtifactSource::Default)
            .map(|a| a.role)
            .collect()
    }
}

/// A turn-based design dialogue.
///
/// Owned by a single caller at a time; the manager's loop holds it by value
/// and returns it when the session ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignSession {
    /// Unique id.
    pub id: Uuid,
    /// The user's design request.
    pub request: String,
    /// Lifecycle state.
    pub status: SessionStatus,
    /// Number of turns taken so far. Never decreases.
    pub turn: u32,
    /// Turns required before consensus counts.
    pub min_turns: u32,
    /// Turn ceiling.
    pub max_turns: u32,
    /// Confidence every role must reach.
    pub consensus_threshold: f64,
    /// Roles that take turns, in order.
    pub required_roles: Vec<AgentRole>,
    /// Successful turns, oldest first.
    pub contributions: Vec<Contribution>,
    /// Failed turns, oldest first.
    pub failures: Vec<TurnFailure>,
    /// Synthesized design once the session ends.
    pub consensus: Option<Consensus>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl DesignSession {
    /// Start a session, rejecting configurations that could never converge.
    pub fn new(request: impl Into<String>, config: &SessionConfig) -> DomainResult<Self> {
        if config.required_roles.is_empty() {
            return Err(DomainError::InvalidSessionConfig(
                "required_roles cannot be empty".to_string(),
            ));
        }
        let mut seen = Vec::with_capacity(config.required_roles.len());
        for role in &config.required_roles {
            if seen.contains(role) {
                return Err(DomainError::InvalidSessionConfig(format!(
                    "role {role} listed more than once"
                )));
            }
            seen.push(*role);
        }
        if config.max_turns == 0 {
            return Err(DomainError::InvalidSessionConfig(
                "max_turns must be at least 1".to_string(),
            ));
        }
        if config.min_turns > config.max_turns {
            return Err(DomainError::InvalidSessionConfig(format!(
                "min_turns ({}) exceeds max_turns ({})",
                config.min_turns, config.max_turns
            )));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            request: request.into(),
            status: SessionStatus::Active,
            turn: 0,
            min_turns: config.min_turns,
            max_turns: config.max_turns,
            consensus_threshold: config.consensus_threshold.clamp(0.0, 1.0),
            required_roles: config.required_roles.clone(),
            contributions: Vec::new(),
            failures: Vec::new(),
            consensus: None,
            created_at: Utc::now(),
        })
    }

    /// Whether more turns may run.
    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    /// Whether `max_turns` has been reached.
    pub fn at_turn_ceiling(&self) -> bool {
        self.turn >= self.max_turns
    }

    /// The role that speaks on the next turn.
    ///
    /// The first `R` turns visit each required role once, in order. After
    /// that, the role answering the last contributor speaks, skipping roles
    /// that are not required.
    pub fn next_role(&self) -> AgentRole {
        let r = self.required_roles.len();
        let next_turn = self.turn as usize + 1;
        if next_turn <= r {
            return self.required_roles[next_turn - 1];
        }

        match self.contributions.last() {
            Some(last) => {
                let mut role = last.role.responds_to();
                for _ in 0..AgentRole::ALL.len() {
                    if self.required_roles.contains(&role) {
                        return role;
                    }
                    role = role.responds_to();
                }
                self.required_roles[(next_turn - 1) % r]
            }
            None => self.required_roles[(next_turn - 1) % r],
        }
    }

    /// Move to the next turn and return its number.
    pub fn advance_turn(&mut self) -> u32 {
        self.turn += 1;
        self.turn
    }

    /// Append a contribution for the current turn.
    pub fn record_contribution(&mut self, role: AgentRole, response: AgentResponse) -> &Contribution {
        self.contributions.push(Contribution {
            id: Uuid::new_v4(),
            role,
            turn: self.turn,
            content: response.content,
            structured_output: response.structured_output.unwrap_or(Value::Null),
            confidence: response.confidence.clamp(0.0, 1.0),
            timestamp: Utc::now(),
        });
        let last = self.contributions.len() - 1;
        &self.contributions[last]
    }

    /// Note that the current turn's agent failed.
    pub fn record_failure(&mut self, role: AgentRole, error: impl Into<String>) {
        self.failures.push(TurnFailure {
            role,
            turn: self.turn,
            error: error.into(),
            timestamp: Utc::now(),
        });
    }

    /// Whether `role` has contributed at least once.
    pub fn has_contributed(&self, role: AgentRole) -> bool {
        self.contributions.iter().any(|c| c.role == role)
    }

    /// Most recent contribution from `role`.
    pub fn latest_from(&self, role: AgentRole) -> Option<&Contribution> {
        self.contributions.iter().rev().find(|c| c.role == role)
    }

    /// Mean confidence of the last `R` contributions (fewer if fewer exist).
    pub fn recent_confidence(&self) -> Option<f64> {
        let window = self.required_roles.len().min(self.contributions.len());
        if window == 0 {
            return None;
        }
        let recent = &self.contributions[self.contributions.len() - window..];
        Some(recent.iter().map(|c| c.confidence).sum::<f64>() / window as f64)
    }

    /// The consensus predicate.
    ///
    /// True iff every required role has contributed, the minimum number of
    /// turns has elapsed, and the last round's mean confidence meets the
    /// threshold. Never true with fewer than `R` contributions.
    pub fn has_consensus(&self) -> bool {
        if self.contributions.len() < self.required_roles.len() {
            return false;
        }
        if self.turn < self.min_turns {
            return false;
        }
        if !self.required_roles.iter().all(|r| self.has_contributed(*r)) {
            return false;
        }
        self.recent_confidence()
            .is_some_and(|mean| mean >= self.consensus_threshold)
    }

    /// Record organic consensus.
    pub fn mark_consensus_reached(&mut self) {
        if self.is_active() {
            self.status = SessionStatus::ConsensusReached;
        }
    }

    /// Build the consensus artifact and close the session.
    ///
    /// Each required role contributes its latest structured output; roles that
    /// never contributed are filled from `defaults`. A forced synthesis marks
    /// the session `Failed`, an organic one `Complete`.
    pub fn synthesize<F>(&mut self, defaults: F, forced: bool) -> &Consensus
    where
        F: Fn(AgentRole) -> Value,
    {
        let artifacts = self
            .required_roles
            .iter()
            .map(|&role| {
                let artifact = match self.latest_from(role) {
                    Some(c) => SubArtifact {
                        role,
                        output: c.structured_output.clone(),
                        source: ArtifactSource::Contribution { turn: c.turn },
                    },
                    None => SubArtifact {
                        role,
                        output: defaults(role),
                        source: ArtifactSource::Default,
                    },
                };
                (role, artifact)
            })
            .collect();

        let mean_confidence = self.recent_confidence();
        self.status = if forced {
            SessionStatus::Failed
        } else {
            SessionStatus::Complete
        };

        self.consensus.insert(Consensus {
            artifacts,
            forced,
            mean_confidence,
            synthesized_at: Utc::now(),
        })
    }
}
