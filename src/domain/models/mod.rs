//! Domain models.

pub mod action;
pub mod agent;
pub mod config;
pub mod design_session;
pub mod feedback;
pub mod readiness;
pub mod role;

pub use action::{Action, ActionKind, ActionOutcome, ActionResult, DeadlockInfo, ExecutionReport};
pub use agent::{AgentRequest, AgentResponse};
pub use config::{
    CategoryRetryRule, Config, ContextConfig, LoggingConfig, ReadinessConfig, RetryConfig,
    SchedulerConfig, SessionConfig,
};
pub use design_session::{
    ArtifactSource, Consensus, Contribution, DesignSession, SessionStatus, SubArtifact,
    TurnFailure,
};
pub use feedback::{
    CodeError, ContextWindow, ErrorAnalysis, ErrorCategory, ErrorClassification, FeedbackSession,
    FeedbackStatus, FixRequest, FixResult, FixStrategy, GeneratedFix, Iteration,
};
pub use readiness::{ChangeKind, DesignState, ReadinessDimension, ReadinessScore};
pub use role::AgentRole;
