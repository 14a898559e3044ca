//! Atelier - Multi-agent design orchestration
//!
//! Atelier coordinates role-specialized design agents (data modeler, UX
//! designer, workflow designer, reviewer). It schedules their actions in
//! dependency waves, runs turn-based design sessions to consensus, scores
//! how ready a design is to build, and drives a bounded fix loop over
//! generated code.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Pure models, errors and port traits
//! - **Service Layer** (`services`): Scheduling, planning, sessions and feedback
//! - **Adapters** (`adapters`): In-process agent capabilities and the role registry
//! - **Infrastructure Layer** (`infrastructure`): Configuration and logging
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use atelier::adapters::agents::{AgentRegistry, ScriptedAgent};
//! use atelier::services::{ActionScheduler, DesignSessionManager};
//! use atelier::SessionConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let registry = AgentRegistry::uniform(Arc::new(ScriptedAgent::default()));
//!     let manager = DesignSessionManager::new(
//!         Arc::new(registry),
//!         SessionConfig::default(),
//!         ActionScheduler::with_defaults(),
//!     );
//!     let outcome = manager.run_design_session("a recipe sharing app").await?;
//!     println!("{:?}", outcome.consensus);
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{AgentError, DomainError, DomainResult, FeedbackError};
pub use domain::models::{
    Action, ActionKind, ActionResult, AgentRequest, AgentResponse, AgentRole, Config, Consensus,
    DesignSession, DesignState, ExecutionReport, FeedbackSession, FeedbackStatus, ReadinessScore,
    SessionConfig,
};
pub use domain::ports::{
    ActionPlanner, AgentCapability, AgentResolver, CodeValidator, ContextExtractor, ErrorAnalyzer,
    FixGenerator,
};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{
    ActionScheduler, DesignPipeline, DesignSessionManager, FallbackPlanner, FeedbackEngine,
    ReadinessEvaluator,
};
