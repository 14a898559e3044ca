//! Fix generator port.

use async_trait::async_trait;

use crate::domain::errors::AgentError;
use crate::domain::models::{FixRequest, GeneratedFix};

/// Produces corrected code for a failing iteration.
#[async_trait]
pub trait FixGenerator: Send + Sync {
    /// Produce corrected code for the request.
    async fn generate_fix(&self, request: FixRequest) -> Result<GeneratedFix, AgentError>;
}
