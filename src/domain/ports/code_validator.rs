//! Code validator port.

use async_trait::async_trait;

/// Checks generated code (compile, lint, preview build).
#[async_trait]
pub trait CodeValidator: Send + Sync {
    /// The first error found, or `None` when the code is clean.
    async fn validate(&self, code: &str) -> Option<String>;
}
