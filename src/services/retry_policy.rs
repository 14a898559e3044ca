use crate::domain::models::{CategoryRetryRule, ErrorCategory, RetryConfig};

/// Retry decisions for the feedback loop
///
/// Combines a global attempt cap with a per-category table. A category
/// missing from the table is retryable up to `max_retries`.
///
/// # Retry Decision
/// - Retry while attempts are below both the global cap and the category cap
/// - Never retry a non-retryable category, whatever budget remains
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(RetryConfig::default())
    }
}

impl RetryPolicy {
    /// Create a policy from retry settings.
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// The underlying retry settings.
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Rule for a category, falling back to the global cap
    pub fn rule_for(&self, category: ErrorCategory) -> CategoryRetryRule {
        self.config
            .per_category
            .get(&category)
            .copied()
            .unwrap_or_else(|| CategoryRetryRule::retry(self.config.max_retries))
    }

    /// Attempts allowed for a category
    pub fn attempt_limit(&self, category: ErrorCategory) -> u32 {
        let rule = self.rule_for(category);
        if rule.retryable {
            rule.max_attempts.min(self.config.max_retries)
        } else {
            0
        }
    }

    /// Whether another attempt is allowed after `attempts` so far
    pub fn should_retry(&self, attempts: u32, category: ErrorCategory) -> bool {
        attempts < self.attempt_limit(category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_default_table() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.attempt_limit(ErrorCategory::Syntax), 5);
        assert_eq!(policy.attempt_limit(ErrorCategory::Import), 3);
        assert_eq!(policy.attempt_limit(ErrorCategory::Unknown), 2);
        assert_eq!(policy.attempt_limit(ErrorCategory::Configuration), 0);
    }

    #[test]
    fn test_should_retry_respects_category_cap() {
        let policy = RetryPolicy::default();
        assert!(policy.should_retry(0, ErrorCategory::Unknown));
        assert!(policy.should_retry(1, ErrorCategory::Unknown));
        assert!(!policy.should_retry(2, ErrorCategory::Unknown));
    }

    #[test]
    fn test_fatal_category_never_retries() {
        let policy = RetryPolicy::default();
        assert!(!policy.should_retry(0, ErrorCategory::Configuration));
    }

    #[test]
    fn test_global_cap_wins_over_category() {
        let policy = RetryPolicy::new(RetryConfig {
            max_retries: 2,
            ..RetryConfig::default()
        });
        assert_eq!(policy.attempt_limit(ErrorCategory::Syntax), 2);
        assert!(!policy.should_retry(2, ErrorCategory::Syntax));
    }

    #[test]
    fn test_unlisted_category_uses_global_cap() {
        let policy = RetryPolicy::new(RetryConfig {
            max_retries: 4,
            per_category: BTreeMap::new(),
            ..RetryConfig::default()
        });
        assert_eq!(policy.rule_for(ErrorCategory::Runtime), CategoryRetryRule::retry(4));
        assert!(policy.should_retry(3, ErrorCategory::Runtime));
        assert!(!policy.should_retry(4, ErrorCategory::Runtime));
    }
}
