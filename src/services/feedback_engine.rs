//! Error-driven code repair loop.
//!
//! A `FeedbackEngine` owns one `FeedbackSession` and is the only thing that
//! mutates it. Each observed error becomes an `Iteration`; each fix attempt
//! is recorded on the latest iteration. Early iterations get an incremental
//! fix over a bounded context window. Once the same error keeps coming back
//! the engine switches to full regeneration from the original prompt.
//!
//! The session fails when it reaches `max_iterations`, or when the retry
//! policy refuses another attempt inside `run_fix_loop`.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::errors::FeedbackError;
use crate::domain::models::{
    CodeError, ContextConfig, ErrorCategory, ErrorClassification, FeedbackSession, FeedbackStatus,
    FixRequest, FixResult, FixStrategy, Iteration, RetryConfig,
};
use crate::domain::ports::{CodeValidator, ContextExtractor, ErrorAnalyzer, FixGenerator};
use crate::services::context_extractor::{estimate_tokens, LineWindowExtractor};
use crate::services::error_analyzer::PatternErrorAnalyzer;
use crate::services::retry_policy::RetryPolicy;

/// Snapshot of a feedback session for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackSummary {
    /// Session id.
    pub session_id: Uuid,
    /// Lifecycle state.
    pub status: FeedbackStatus,
    /// Iterations recorded.
    pub iterations: u32,
    /// Iterations left before the ceiling.
    pub remaining_attempts: u32,
    /// Tokens estimated and spent.
    pub total_tokens: u64,
    /// Iterations per error category.
    pub categories: BTreeMap<ErrorCategory, u32>,
    /// Iterations using incremental fixes.
    pub incremental_fixes: u32,
    /// Iterations using full regeneration.
    pub full_regenerations: u32,
    /// Fix attempts that produced code.
    pub successful_fixes: u32,
    /// Most recent error message.
    pub latest_error: Option<String>,
}

/// Lowercase, digits to `#`, punctuation removed, split on whitespace.
fn normalize_tokens(message: &str) -> HashSet<String> {
    let cleaned: String = message
        .to_lowercase()
        .chars()
        .filter_map(|c| {
            if c.is_ascii_digit() {
                Some('#')
            } else if c.is_alphanumeric() || c.is_whitespace() || c == '_' {
                Some(c)
            } else if c.is_ascii_punctuation() {
                Some(' ')
            } else {
                None
            }
        })
        .collect();
    cleaned.split_whitespace().map(str::to_string).collect()
}

/// Token Jaccard similarity of two messages after normalization.
pub fn message_similarity(a: &str, b: &str) -> f64 {
    let left = normalize_tokens(a);
    let right = normalize_tokens(b);
    let union = left.union(&right).count();
    if union == 0 {
        return 0.0;
    }
    left.intersection(&right).count() as f64 / union as f64
}

/// Drives one feedback session from reported errors to fix requests.
pub struct FeedbackEngine {
    session: FeedbackSession,
    policy: RetryPolicy,
    analyzer: Arc<dyn ErrorAnalyzer>,
    extractor: Arc<dyn ContextExtractor>,
    fixer: Arc<dyn FixGenerator>,
}

impl FeedbackEngine {
    /// Create an engine over explicit collaborators.
    pub fn new(
        original_prompt: impl Into<String>,
        code: impl Into<String>,
        policy: RetryPolicy,
        analyzer: Arc<dyn ErrorAnalyzer>,
        extractor: Arc<dyn ContextExtractor>,
        fixer: Arc<dyn FixGenerator>,
    ) -> Self {
        let session = FeedbackSession::new(original_prompt, code, policy.config().max_iterations);
        Self {
            session,
            policy,
            analyzer,
            extractor,
            fixer,
        }
    }

    /// Engine with the pattern analyzer and line-window extractor.
    pub fn with_defaults(
        original_prompt: impl Into<String>,
        code: impl Into<String>,
        retry: RetryConfig,
        context: ContextConfig,
        fixer: Arc<dyn FixGenerator>,
    ) -> Self {
        Self::new(
            original_prompt,
            code,
            RetryPolicy::new(retry),
            Arc::new(PatternErrorAnalyzer::new()),
            Arc::new(LineWindowExtractor::new(context)),
            fixer,
        )
    }

    /// The session being driven.
    pub fn session(&self) -> &FeedbackSession {
        &self.session
    }

    /// Consume the engine, returning its session.
    pub fn into_session(self) -> FeedbackSession {
        self.session
    }

    fn ensure_active(&self) -> Result<(), FeedbackError> {
        if self.session.is_active() {
            Ok(())
        } else {
            Err(FeedbackError::SessionClosed(self.session.status))
        }
    }

    /// Record a new error against `code`.
    ///
    /// The iteration's strategy is decided after it is appended, so a repeat
    /// of the same error counts itself. Reaching `max_iterations` fails the
    /// session.
    pub fn add_iteration(
        &mut self,
        code: impl Into<String>,
        error_message: &str,
    ) -> Result<&Iteration, FeedbackError> {
        self.ensure_active()?;

        let analysis = self.analyzer.analyze(error_message);
        let code = code.into();
        let number = self.session.iteration_count() + 1;

        self.session.iterations.push(Iteration {
            number,
            code: code.clone(),
            error: CodeError {
                message: error_message.to_string(),
                line: analysis.line,
                column: analysis.column,
            },
            classification: ErrorClassification::from(&analysis),
            strategy: FixStrategy::Incremental,
            context: None,
            estimated_tokens: 0,
            fix: None,
            created_at: Utc::now(),
        });

        let strategy = if self.should_use_incremental_fix() {
            FixStrategy::Incremental
        } else {
            FixStrategy::FullRegeneration
        };
        if let Some(iteration) = self.session.iterations.last_mut() {
            iteration.strategy = strategy;
        }
        self.session.current_code = code;
        self.session.updated_at = Utc::now();

        debug!(
            session_id = %self.session.id,
            iteration = number,
            category = %analysis.category,
            strategy = ?strategy,
            "Feedback iteration recorded"
        );

        if self.session.iteration_count() >= self.session.max_iterations {
            self.session.status = FeedbackStatus::Failed;
            warn!(
                session_id = %self.session.id,
                max_iterations = self.session.max_iterations,
                "Feedback session reached its iteration ceiling"
            );
        }

        self.session.latest_iteration().ok_or(FeedbackError::NoIteration)
    }

    fn errors_match(&self, a: &Iteration, b: &Iteration) -> bool {
        a.error.message == b.error.message
            || (a.classification.category == b.classification.category
                && message_similarity(&a.error.message, &b.error.message)
                    > self.policy.config().similarity_threshold)
    }

    /// Whether the latest iteration should get an incremental fix.
    pub fn should_use_incremental_fix(&self) -> bool {
        let config = self.policy.config();
        let iterations = &self.session.iterations;
        if iterations.len() as u32 <= config.incremental_threshold {
            return true;
        }
        let Some(latest) = iterations.last() else {
            return true;
        };
        let repeats = iterations
            .iter()
            .filter(|it| self.errors_match(it, latest))
            .count() as u32;
        repeats < config.same_error_threshold
    }

    /// Ask the fix generator to repair the latest iteration.
    ///
    /// A generator failure is recorded as an unsuccessful `FixResult`, not
    /// returned as an error.
    pub async fn attempt_fix(&mut self) -> Result<FixResult, FeedbackError> {
        self.ensure_active()?;
        let latest = self
            .session
            .latest_iteration()
            .cloned()
            .ok_or(FeedbackError::NoIteration)?;

        let (request, context) = match latest.strategy {
            FixStrategy::Incremental => {
                let context =
                    self.extractor
                        .extract(&self.session.current_code, &latest.error, latest.number);
                let request = FixRequest::Incremental {
                    error: latest.error.clone(),
                    classification: latest.classification.clone(),
                    context: context.clone(),
                    iteration: latest.number,
                };
                (request, Some(context))
            }
            FixStrategy::FullRegeneration => {
                let request = FixRequest::FullRegeneration {
                    original_prompt: self.session.original_prompt.clone(),
                    code: self.session.current_code.clone(),
                    error: latest.error.clone(),
                    classification: latest.classification.clone(),
                    previous_errors: self
                        .session
                        .iterations
                        .iter()
                        .map(|it| it.error.message.clone())
                        .collect(),
                };
                (request, None)
            }
        };
        let estimated_tokens = match &context {
            Some(window) => window.estimated_tokens,
            None => {
                estimate_tokens(&self.session.original_prompt)
                    + estimate_tokens(&self.session.current_code)
            }
        };

        info!(
            session_id = %self.session.id,
            iteration = latest.number,
            strategy = ?latest.strategy,
            estimated_tokens,
            "Attempting fix"
        );

        let result = match self.fixer.generate_fix(request).await {
            Ok(fix) => {
                self.session.current_code.clone_from(&fix.code);
                FixResult {
                    success: true,
                    strategy: latest.strategy,
                    code: Some(fix.code),
                    explanation: fix.explanation,
                    error: None,
                    tokens_used: fix.tokens_used,
                    attempted_at: Utc::now(),
                }
            }
            Err(e) => {
                warn!(
                    session_id = %self.session.id,
                    iteration = latest.number,
                    error = %e,
                    "Fix generation failed"
                );
                FixResult {
                    success: false,
                    strategy: latest.strategy,
                    code: None,
                    explanation: None,
                    error: Some(e.to_string()),
                    tokens_used: 0,
                    attempted_at: Utc::now(),
                }
            }
        };

        self.session.total_tokens += estimated_tokens + result.tokens_used;
        self.session.updated_at = Utc::now();
        if let Some(iteration) = self.session.iterations.last_mut() {
            iteration.context = context;
            iteration.estimated_tokens = estimated_tokens;
            iteration.fix = Some(result.clone());
        }
        Ok(result)
    }

    /// Whether another fix attempt is allowed.
    pub fn should_retry(&self) -> bool {
        if !self.session.is_active() {
            return false;
        }
        let category = self
            .session
            .latest_iteration()
            .map_or(ErrorCategory::Unknown, |it| it.classification.category);
        self.policy
            .should_retry(self.session.iteration_count(), category)
    }

    /// Mark the session resolved once the code validates cleanly.
    pub fn mark_resolved(&mut self) -> Result<(), FeedbackError> {
        self.ensure_active()?;
        self.session.status = FeedbackStatus::Resolved;
        self.session.updated_at = Utc::now();
        info!(
            session_id = %self.session.id,
            iterations = self.session.iteration_count(),
            "Feedback session resolved"
        );
        Ok(())
    }

    fn mark_failed(&mut self) {
        if self.session.is_active() {
            self.session.status = FeedbackStatus::Failed;
            self.session.updated_at = Utc::now();
        }
    }

    /// Summarize iterations, fixes and error categories so far.
    pub fn get_summary(&self) -> FeedbackSummary {
        let mut categories = BTreeMap::new();
        let mut incremental_fixes = 0;
        let mut full_regenerations = 0;
        let mut successful_fixes = 0;
        for iteration in &self.session.iterations {
            *categories.entry(iteration.classification.category).or_insert(0) += 1;
            match iteration.strategy {
                FixStrategy::Incremental => incremental_fixes += 1,
                FixStrategy::FullRegeneration => full_regenerations += 1,
            }
            if iteration.fix.as_ref().is_some_and(|fix| fix.success) {
                successful_fixes += 1;
            }
        }

        FeedbackSummary {
            session_id: self.session.id,
            status: self.session.status,
            iterations: self.session.iteration_count(),
            remaining_attempts: self.session.remaining_attempts(),
            total_tokens: self.session.total_tokens,
            categories,
            incremental_fixes,
            full_regenerations,
            successful_fixes,
            latest_error: self
                .session
                .latest_iteration()
                .map(|it| it.error.message.clone()),
        }
    }

    /// Validate, record, fix, repeat until the code is clean or the session fails.
    pub async fn run_fix_loop(&mut self, validator: &dyn CodeValidator) -> FeedbackStatus {
        while self.session.is_active() {
            let Some(error) = validator.validate(&self.session.current_code).await else {
                if let Err(e) = self.mark_resolved() {
                    debug!(error = %e, "Session closed before it could resolve");
                }
                break;
            };

            let code = self.session.current_code.clone();
            if let Err(e) = self.add_iteration(code, &error) {
                debug!(error = %e, "Fix loop stopped");
                break;
            }
            if !self.should_retry() {
                self.mark_failed();
                break;
            }
            if let Err(e) = self.attempt_fix().await {
                debug!(error = %e, "Fix loop stopped");
                break;
            }
        }

        info!(
            session_id = %self.session.id,
            status = %self.session.status,
            iterations = self.session.iteration_count(),
            total_tokens = self.session.total_tokens,
            "Fix loop finished"
        );
        self.session.status
    }
}

impl std::fmt::Debug for FeedbackEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedbackEngine")
            .field("session", &self.session)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
