//! Context extractor port.

use crate::domain::models::{CodeError, ContextWindow};

/// Cuts the part of the code a fix generator needs to see.
pub trait ContextExtractor: Send + Sync {
    /// `iteration` is 1-based; later iterations may see more context.
    fn extract(&self, code: &str, error: &CodeError, iteration: u32) -> ContextWindow;
}
