//! Error analyzer port.

use crate::domain::models::ErrorAnalysis;

/// Classifies an error message. Must be pure and deterministic.
pub trait ErrorAnalyzer: Send + Sync {
    /// Classify an error message.
    fn analyze(&self, message: &str) -> ErrorAnalysis;
}
