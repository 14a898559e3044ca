//! Agent capability port - interface for design agents.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::errors::AgentError;
use crate::domain::models::{AgentRequest, AgentResponse, AgentRole};

/// A design agent that can be invoked for a role.
///
/// Implementations wrap an LLM backend (or a scripted stand-in). Any failure
/// is reported as an `AgentError`; the scheduler never lets one escape.
#[async_trait]
pub trait AgentCapability: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Run one request to completion.
    async fn invoke(&self, request: AgentRequest) -> Result<AgentResponse, AgentError>;
}

/// Maps roles to the capability that serves them.
pub trait AgentResolver: Send + Sync {
    /// The capability for `role`, or `None` when nothing is registered.
    fn resolve(&self, role: AgentRole) -> Option<Arc<dyn AgentCapability>>;
}
