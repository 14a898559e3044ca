use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::feedback::ErrorCategory;
use super::role::AgentRole;

/// Main configuration structure for Atelier
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Parallel action scheduler
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Design session turn and consensus settings
    #[serde(default)]
    pub session: SessionConfig,

    /// Readiness thresholds
    #[serde(default)]
    pub readiness: ReadinessConfig,

    /// Feedback loop retry policy
    #[serde(default)]
    pub retry: RetryConfig,

    /// Context window extraction around errors
    #[serde(default)]
    pub context: ContextConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Scheduler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SchedulerConfig {
    /// Maximum actions running at once within a wave (1-64)
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

const fn default_max_concurrency() -> usize {
    8
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
        }
    }
}

/// Design session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SessionConfig {
    /// Roles that must each contribute, in first-pass speaking order
    #[serde(default = "default_required_roles")]
    pub required_roles: Vec<AgentRole>,

    /// Earliest turn at which consensus may be declared
    #[serde(default = "default_min_turns")]
    pub min_turns: u32,

    /// Hard turn ceiling; reaching it forces synthesis
    #[serde(default = "default_max_turns")]
    pub max_turns: u32,

    /// Minimum mean confidence over the last round of contributions
    #[serde(default = "default_consensus_threshold")]
    pub consensus_threshold: f64,
}

fn default_required_roles() -> Vec<AgentRole> {
    AgentRole::ALL.to_vec()
}

const fn default_min_turns() -> u32 {
    4
}

const fn default_max_turns() -> u32 {
    12
}

const fn default_consensus_threshold() -> f64 {
    0.7
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            required_roles: default_required_roles(),
            min_turns: default_min_turns(),
            max_turns: default_max_turns(),
            consensus_threshold: default_consensus_threshold(),
        }
    }
}

/// Readiness configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ReadinessConfig {
    /// Overall score at which a design counts as ready to build (0-100)
    #[serde(default = "default_ready_threshold")]
    pub ready_threshold: u8,
}

const fn default_ready_threshold() -> u8 {
    70
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            ready_threshold: default_ready_threshold(),
        }
    }
}

/// Per-category retry rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CategoryRetryRule {
    /// Whether errors of this category may be retried at all
    pub retryable: bool,
    /// Attempts allowed for this category
    pub max_attempts: u32,
}

impl CategoryRetryRule {
    /// Retry up to `max_attempts` times.
    pub const fn retry(max_attempts: u32) -> Self {
        Self {
            retryable: true,
            max_attempts,
        }
    }

    /// Never retry.
    pub const fn fatal() -> Self {
        Self {
            retryable: false,
            max_attempts: 0,
        }
    }
}

/// Feedback loop retry policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RetryConfig {
    /// Iteration ceiling for a feedback session
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Global attempt cap applied on top of the per-category table
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Iterations that always use incremental fixes
    #[serde(default = "default_incremental_threshold")]
    pub incremental_threshold: u32,

    /// Repeats of the same error that force full regeneration
    #[serde(default = "default_same_error_threshold")]
    pub same_error_threshold: u32,

    /// Token Jaccard similarity above which two messages of the same category match
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,

    /// Category-specific rules; categories not listed use `max_retries`
    #[serde(default = "default_per_category")]
    pub per_category: BTreeMap<ErrorCategory, CategoryRetryRule>,
}

const fn default_max_iterations() -> u32 {
    5
}

const fn default_max_retries() -> u32 {
    5
}

const fn default_incremental_threshold() -> u32 {
    2
}

const fn default_same_error_threshold() -> u32 {
    3
}

const fn default_similarity_threshold() -> f64 {
    0.5
}

fn default_per_category() -> BTreeMap<ErrorCategory, CategoryRetryRule> {
    BTreeMap::from([
        (ErrorCategory::Syntax, CategoryRetryRule::retry(5)),
        (ErrorCategory::Type, CategoryRetryRule::retry(4)),
        (ErrorCategory::Reference, CategoryRetryRule::retry(4)),
        (ErrorCategory::Import, CategoryRetryRule::retry(3)),
        (ErrorCategory::Runtime, CategoryRetryRule::retry(3)),
        (ErrorCategory::Configuration, CategoryRetryRule::fatal()),
        (ErrorCategory::Unknown, CategoryRetryRule::retry(2)),
    ])
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            max_retries: default_max_retries(),
            incremental_threshold: default_incremental_threshold(),
            same_error_threshold: default_same_error_threshold(),
            similarity_threshold: default_similarity_threshold(),
            per_category: default_per_category(),
        }
    }
}

/// Context window extraction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ContextConfig {
    /// Lines either side of the error on the first iteration
    #[serde(default = "default_base_radius")]
    pub base_radius: u32,

    /// Extra lines either side per later iteration
    #[serde(default = "default_growth_per_iteration")]
    pub growth_per_iteration: u32,

    /// Radius cap
    #[serde(default = "default_max_radius")]
    pub max_radius: u32,

    /// Lines sent when the error carries no line number
    #[serde(default = "default_unlocated_line_limit")]
    pub unlocated_line_limit: u32,
}

const fn default_base_radius() -> u32 {
    10
}

const fn default_growth_per_iteration() -> u32 {
    5
}

const fn default_max_radius() -> u32 {
    40
}

const fn default_unlocated_line_limit() -> u32 {
    200
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            base_radius: default_base_radius(),
            growth_per_iteration: default_growth_per_iteration(),
            max_radius: default_max_radius(),
            unlocated_line_limit: default_unlocated_line_limit(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rotated log files; stderr only when unset
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Rotation: daily, hourly or never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_is_fatal_by_default() {
        let retry = RetryConfig::default();
        let rule = retry.per_category[&ErrorCategory::Configuration];
        assert!(!rule.retryable);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = "session:\n  max_turns: 6\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.session.max_turns, 6);
        assert_eq!(config.session.min_turns, 4);
        assert_eq!(config.session.required_roles, AgentRole::ALL.to_vec());
        assert_eq!(config.scheduler.max_concurrency, 8);
    }
}
