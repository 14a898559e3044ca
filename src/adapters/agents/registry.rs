//! Role-keyed agent registry.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::AgentRole;
use crate::domain::ports::{AgentCapability, AgentResolver};

/// Registry of the capability serving each role.
#[derive(Clone, Default)]
pub struct AgentRegistry {
    agents: HashMap<AgentRole, Arc<dyn AgentCapability>>,
}

impl AgentRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the capability for a role.
    pub fn register(&mut self, role: AgentRole, agent: Arc<dyn AgentCapability>) -> &mut Self {
        self.agents.insert(role, agent);
        self
    }

    /// Register `agent` for `role`.
    pub fn with_agent(mut self, role: AgentRole, agent: Arc<dyn AgentCapability>) -> Self {
        self.agents.insert(role, agent);
        self
    }

    /// Serve every role with the same capability.
    pub fn uniform(agent: Arc<dyn AgentCapability>) -> Self {
        let mut registry = Self::new();
        for role in AgentRole::ALL {
            registry.register(role, Arc::clone(&agent));
        }
        registry
    }

    /// Whether `role` has a capability.
    pub fn contains(&self, role: AgentRole) -> bool {
        self.agents.contains_key(&role)
    }

    /// Fail on the first role that has no capability.
    pub fn ensure_roles(&self, roles: &[AgentRole]) -> DomainResult<()> {
        match roles.iter().find(|role| !self.contains(**role)) {
            Some(role) => Err(DomainError::NoCapabilityRegistered(*role)),
            None => Ok(()),
        }
    }

    /// Registered roles.
    pub fn roles(&self) -> Vec<AgentRole> {
        let mut roles: Vec<_> = self.agents.keys().copied().collect();
        roles.sort();
        roles
    }
}

impl AgentResolver for AgentRegistry {
    fn resolve(&self, role: AgentRole) -> Option<Arc<dyn AgentCapability>> {
        self.agents.get(&role).cloned()
    }
}

impl std::fmt::Debug for AgentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentRegistry")
            .field("roles", &self.roles())
            .finish()
    }
}
