//! Feedback sessions: the record of an error-driven code repair loop.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Lifecycle of a feedback session.
///
/// `Resolved` and `Failed` are terminal: no further iterations or fixes
/// are accepted once a session reaches either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackStatus {
    /// Accepting iterations.
    Active,
    /// The code validated cleanly.
    Resolved,
    /// Out of attempts or hit a fatal error.
    Failed,
}

impl FeedbackStatus {
    /// Stable snake_case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Resolved => "resolved",
            Self::Failed => "failed",
        }
    }

    /// Whether no further iterations are accepted.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Active)
    }
}

impl fmt::Display for FeedbackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Broad class of a code error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Parse errors.
    Syntax,
    /// Type mismatches.
    Type,
    /// Undefined names.
    Reference,
    /// Unresolvable modules.
    Import,
    /// Errors raised while running.
    Runtime,
    /// Environment or build configuration problems.
    Configuration,
    /// Nothing matched.
    Unknown,
}

impl ErrorCategory {
    /// Every category, in classification order.
    pub const ALL: [Self; 7] = [
        Self::Syntax,
        Self::Type,
        Self::Reference,
        Self::Import,
        Self::Runtime,
        Self::Configuration,
        Self::Unknown,
    ];

    /// Stable snake_case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Syntax => "syntax",
            Self::Type => "type",
            Self::Reference => "reference",
            Self::Import => "import",
            Self::Runtime => "runtime",
            Self::Configuration => "configuration",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an error analyzer reports about an error message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorAnalysis {
    /// Error class.
    pub category: ErrorCategory,
    /// First line of the message, truncated.
    pub root_cause: String,
    /// Hint for the fix generator.
    pub suggestion: String,
    /// 1-based line, if found.
    pub line: Option<u32>,
    /// 1-based column, if found.
    pub column: Option<u32>,
}

/// The error an iteration is trying to fix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeError {
    /// Raw error text.
    pub message: String,
    /// 1-based line, if found.
    pub line: Option<u32>,
    /// 1-based column, if found.
    pub column: Option<u32>,
}

/// Category, root cause and suggestion attached to an iteration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorClassification {
    /// Error class.
    pub category: ErrorCategory,
    /// Short cause.
    pub root_cause: String,
    /// Hint for the fix generator.
    pub suggestion: String,
}

impl From<&ErrorAnalysis> for ErrorClassification {
    fn from(analysis: &ErrorAnalysis) -> Self {
        Self {
            category: analysis.category,
            root_cause: analysis.root_cause.clone(),
            suggestion: analysis.suggestion.clone(),
        }
    }
}

/// How a fix is attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixStrategy {
    /// Patch a bounded region around the error.
    Incremental,
    /// Regenerate the whole artifact from the original prompt.
    FullRegeneration,
}

/// A bounded slice of the code handed to the fix generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextWindow {
    /// Lines inside the window.
    pub snippet: String,
    /// 1-based, inclusive.
    pub start_line: u32,
    /// 1-based, inclusive.
    pub end_line: u32,
    /// Token estimate for the snippet.
    pub estimated_tokens: u64,
}

/// Outcome of a single fix attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixResult {
    /// Whether new code was produced.
    pub success: bool,
    /// Strategy used.
    pub strategy: FixStrategy,
    /// Replacement code on success.
    pub code: Option<String>,
    /// Generator's note.
    pub explanation: Option<String>,
    /// Generator failure, if any.
    pub error: Option<String>,
    /// Tokens reported by the generator.
    pub tokens_used: u64,
    /// When the fix was requested.
    pub attempted_at: DateTime<Utc>,
}

/// One error observed and (possibly) fixed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Iteration {
    /// 1-based.
    pub number: u32,
    /// Code the error was observed in.
    pub code: String,
    /// The observed error.
    pub error: CodeError,
    /// Analyzer verdict.
    pub classification: ErrorClassification,
    /// Strategy chosen for this iteration.
    pub strategy: FixStrategy,
    /// Window sent for incremental fixes.
    pub context: Option<ContextWindow>,
    /// Token estimate for the fix payload.
    pub estimated_tokens: u64,
    /// Fix attempt, once made.
    pub fix: Option<FixResult>,
    /// When the error was recorded.
    pub created_at: DateTime<Utc>,
}

/// What the fix generator is asked to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum FixRequest {
    /// Patch the window around the error.
    Incremental {
        /// Error to fix.
        error: CodeError,
        /// Analyzer verdict.
        classification: ErrorClassification,
        /// Code around the error.
        context: ContextWindow,
        /// Iteration number.
        iteration: u32,
    },
    /// Rewrite the code from the original prompt.
    FullRegeneration {
        /// Prompt the code was generated from.
        original_prompt: String,
        /// Current code.
        code: String,
        /// Latest error.
        error: CodeError,
        /// Analyzer verdict.
        classification: ErrorClassification,
        /// Every error seen so far, oldest first.
        previous_errors: Vec<String>,
    },
}

impl FixRequest {
    /// Fix strategy this request uses.
    pub fn strategy(&self) -> FixStrategy {
        match self {
            Self::Incremental { .. } => FixStrategy::Incremental,
            Self::FullRegeneration { .. } => FixStrategy::FullRegeneration,
        }
    }
}

/// Code returned by the fix generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedFix {
    /// The full corrected code.
    pub code: String,
    /// Generator's note.
    pub explanation: Option<String>,
    /// Tokens spent.
    pub tokens_used: u64,
}

/// The retry loop that progressively fixes generated code.
///
/// Owned by exactly one `FeedbackEngine`; all mutation goes through it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackSession {
    /// Unique id.
    pub id: Uuid,
    /// Prompt the code was generated from.
    pub original_prompt: String,
    /// Recorded iterations, oldest first.
    pub iterations: Vec<Iteration>,
    /// Iteration ceiling.
    pub max_iterations: u32,
    /// Lifecycle state.
    pub status: FeedbackStatus,
    /// Tokens estimated and spent so far.
    pub total_tokens: u64,
    /// Latest code, updated on each successful fix.
    pub current_code: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last mutation time.
    pub updated_at: DateTime<Utc>,
}

impl FeedbackSession {
    /// Start an active session over `code`.
    pub fn new(original_prompt: impl Into<String>, code: impl Into<String>, max_iterations: u32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            original_prompt: original_prompt.into(),
            iterations: Vec::new(),
            max_iterations,
            status: FeedbackStatus::Active,
            total_tokens: 0,
            current_code: code.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the session accepts iterations.
    pub fn is_active(&self) -> bool {
        self.status == FeedbackStatus::Active
    }

    /// Iterations recorded so far.
    pub fn iteration_count(&self) -> u32 {
        self.iterations.len() as u32
    }

    /// Iterations that may still be added before the ceiling.
    pub fn remaining_attempts(&self) -> u32 {
        if self.status.is_terminal() {
            return 0;
        }
        self.max_iterations.saturating_sub(self.iteration_count())
    }

    /// Most recent iteration.
    pub fn latest_iteration(&self) -> Option<&Iteration> {
        self.iterations.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_active() {
        let session = FeedbackSession::new("build a todo app", "fn main() {}", 3);
        assert!(session.is_active());
        assert_eq!(session.remaining_attempts(), 3);
        assert!(session.latest_iteration().is_none());
    }

    #[test]
    fn test_terminal_session_has_no_remaining_attempts() {
        let mut session = FeedbackSession::new("p", "c", 3);
        session.status = FeedbackStatus::Resolved;
        assert_eq!(session.remaining_attempts(), 0);
        assert!(!session.is_active());
    }

    #[test]
    fn test_fix_request_strategy() {
        let error = CodeError {
            message: "x".into(),
            line: None,
            column: None,
        };
        let classification = ErrorClassification {
            category: ErrorCategory::Unknown,
            root_cause: String::new(),
            suggestion: String::new(),
        };
        let request = FixRequest::FullRegeneration {
            original_prompt: "p".into(),
            code: "c".into(),
            error,
            classification,
            previous_errors: vec![],
        };
        assert_eq!(request.strategy(), FixStrategy::FullRegeneration);
    }
}
