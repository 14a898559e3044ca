use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Scheduler concurrency out of range.
    #[error("Invalid max_concurrency: {0}. Must be between 1 and 64")]
    InvalidMaxConcurrency(usize),

    /// Session role list empty or duplicated.
    #[error("Invalid session roles: {0}")]
    InvalidSessionRoles(String),

    /// Turn limits inconsistent.
    #[error("Invalid turn limits: min_turns ({0}) must be <= max_turns ({1}) and max_turns must be at least 1")]
    InvalidTurnLimits(u32, u32),

    /// Consensus threshold outside [0, 1].
    #[error("Invalid consensus_threshold: {0}. Must be between 0.0 and 1.0")]
    InvalidConsensusThreshold(f64),

    /// Ready threshold above 100.
    #[error("Invalid ready_threshold: {0}. Must be at most 100")]
    InvalidReadyThreshold(u8),

    /// A retry setting that must be positive is zero.
    #[error("Invalid {0}: cannot be 0")]
    ZeroRetrySetting(&'static str),

    /// Similarity threshold outside [0, 1].
    #[error("Invalid similarity_threshold: {0}. Must be between 0.0 and 1.0")]
    InvalidSimilarityThreshold(f64),

    /// Context radii inconsistent.
    #[error("Invalid context radius: base_radius ({0}) must be <= max_radius ({1})")]
    InvalidContextRadius(u32, u32),

    /// Unknown log level.
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    /// Unknown log format.
    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    /// Unknown log rotation.
    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidLogRotation(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Project config, created by the user
    pub const PROJECT_CONFIG: &'static str = ".atelier/config.yaml";
    /// Local overrides, usually not committed
    pub const LOCAL_CONFIG: &'static str = ".atelier/local.yaml";
    /// Environment variable prefix; nested keys use `__`
    pub const ENV_PREFIX: &'static str = "ATELIER_";

    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .atelier/config.yaml
    /// 3. .atelier/local.yaml (optional)
    /// 4. Environment variables (ATELIER_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        Self::load_with(None)
    }

    /// Like [`ConfigLoader::load`], with an extra file merged above the
    /// project files and below the environment.
    pub fn load_with(extra: Option<&Path>) -> Result<Config> {
        let mut figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(Self::PROJECT_CONFIG))
            .merge(Yaml::file(Self::LOCAL_CONFIG));
        if let Some(path) = extra {
            if !path.is_file() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            figment = figment.merge(Yaml::file(path));
        }
        let config: Config = figment
            .merge(Env::prefixed(Self::ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let max_concurrency = config.scheduler.max_concurrency;
        if max_concurrency == 0 || max_concurrency > 64 {
            return Err(ConfigError::InvalidMaxConcurrency(max_concurrency));
        }

        let session = &config.session;
        if session.required_roles.is_empty() {
            return Err(ConfigError::InvalidSessionRoles(
                "required_roles cannot be empty".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        if let Some(duplicate) = session.required_roles.iter().find(|r| !seen.insert(**r)) {
            return Err(ConfigError::InvalidSessionRoles(format!(
                "role {duplicate} listed more than once"
            )));
        }
        if session.max_turns == 0 || session.min_turns > session.max_turns {
            return Err(ConfigError::InvalidTurnLimits(
                session.min_turns,
                session.max_turns,
            ));
        }
        if !(0.0..=1.0).contains(&session.consensus_threshold) {
            return Err(ConfigError::InvalidConsensusThreshold(
                session.consensus_threshold,
            ));
        }

        if config.readiness.ready_threshold > 100 {
            return Err(ConfigError::InvalidReadyThreshold(
                config.readiness.ready_threshold,
            ));
        }

        // Validate retry config
        let retry = &config.retry;
        for (name, value) in [
            ("max_iterations", retry.max_iterations),
            ("max_retries", retry.max_retries),
            ("same_error_threshold", retry.same_error_threshold),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroRetrySetting(name));
            }
        }
        if !(0.0..=1.0).contains(&retry.similarity_threshold) {
            return Err(ConfigError::InvalidSimilarityThreshold(
                retry.similarity_threshold,
            ));
        }

        if config.context.base_radius > config.context.max_radius {
            return Err(ConfigError::InvalidContextRadius(
                config.context.base_radius,
                config.context.max_radius,
            ));
        }

        // Validate logging config
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidLogRotation(
                config.logging.rotation.clone(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{AgentRole, ErrorCategory};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn yaml_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{contents}").unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.scheduler.max_concurrency, 8);
        assert_eq!(config.session.min_turns, 4);
        assert_eq!(config.session.max_turns, 12);
        assert!((config.session.consensus_threshold - 0.7).abs() < f64::EPSILON);
        assert_eq!(config.readiness.ready_threshold, 70);
        assert_eq!(config.retry.incremental_threshold, 2);
        assert_eq!(config.logging.level, "info");
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r"
scheduler:
  max_concurrency: 4
session:
  required_roles: [data_modeler, reviewer]
  min_turns: 2
  max_turns: 6
  consensus_threshold: 0.8
retry:
  max_iterations: 3
  per_category:
    runtime:
      retryable: false
      max_attempts: 0
logging:
  level: debug
  format: json
";

        let config: Config = serde_yaml::from_str(yaml).expect("YAML should parse");

        assert_eq!(config.scheduler.max_concurrency, 4);
        assert_eq!(
            config.session.required_roles,
            vec![AgentRole::DataModeler, AgentRole::Reviewer]
        );
        assert_eq!(config.session.max_turns, 6);
        assert_eq!(config.retry.max_iterations, 3);
        assert!(!config.retry.per_category[&ErrorCategory::Runtime].retryable);
        assert_eq!(config.logging.format, "json");

        ConfigLoader::validate(&config).expect("Parsed config should be valid");
    }

    #[test]
    fn test_validate_max_concurrency() {
        let mut config = Config::default();
        config.scheduler.max_concurrency = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidMaxConcurrency(0))
        ));

        config.scheduler.max_concurrency = 65;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidMaxConcurrency(65))
        ));
    }

    #[test]
    fn test_validate_session_roles() {
        let mut config = Config::default();
        config.session.required_roles = vec![];
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidSessionRoles(_))
        ));

        config.session.required_roles = vec![AgentRole::Reviewer, AgentRole::Reviewer];
        match ConfigLoader::validate(&config) {
            Err(ConfigError::InvalidSessionRoles(msg)) => assert!(msg.contains("reviewer")),
            other => panic!("Expected InvalidSessionRoles error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_turn_limits() {
        let mut config = Config::default();
        config.session.min_turns = 8;
        config.session.max_turns = 4;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidTurnLimits(8, 4))
        ));
    }

    #[test]
    fn test_validate_thresholds() {
        let mut config = Config::default();
        config.session.consensus_threshold = 1.5;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidConsensusThreshold(_))
        ));

        let mut config = Config::default();
        config.readiness.ready_threshold = 101;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidReadyThreshold(101))
        ));
    }

    #[test]
    fn test_validate_zero_retry_settings() {
        let mut config = Config::default();
        config.retry.max_iterations = 0;
        match ConfigLoader::validate(&config) {
            Err(ConfigError::ZeroRetrySetting(name)) => assert_eq!(name, "max_iterations"),
            other => panic!("Expected ZeroRetrySetting error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_context_radius() {
        let mut config = Config::default();
        config.context.base_radius = 50;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidContextRadius(50, 40))
        ));
    }

    #[test]
    fn test_validate_logging() {
        let mut config = Config::default();
        config.logging.level = "invalid".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidLogLevel(_))
        ));

        let mut config = Config::default();
        config.logging.format = "xml".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidLogFormat(_))
        ));

        let mut config = Config::default();
        config.logging.rotation = "weekly".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidLogRotation(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let file = yaml_file("session:\n  max_turns: 8\nreadiness:\n  ready_threshold: 60\n");
        let config = ConfigLoader::load_from_file(file.path()).unwrap();
        assert_eq!(config.session.max_turns, 8);
        assert_eq!(config.session.min_turns, 4);
        assert_eq!(config.readiness.ready_threshold, 60);
    }

    #[test]
    fn test_load_from_file_rejects_invalid() {
        let file = yaml_file("scheduler:\n  max_concurrency: 0\n");
        let err = ConfigLoader::load_from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("max_concurrency"));
    }

    #[test]
    fn test_load_with_missing_extra_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.yaml");
        let err = ConfigLoader::load_with(Some(&missing)).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_hierarchical_merging() {
        let base_file = yaml_file("session:\n  min_turns: 2\n  max_turns: 10\nlogging:\n  level: info\n  format: json\n");
        let override_file = yaml_file("session:\n  max_turns: 5\nlogging:\n  level: debug\n");

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(base_file.path()))
            .merge(Yaml::file(override_file.path()))
            .extract()
            .unwrap();

        assert_eq!(config.session.max_turns, 5, "Override should win");
        assert_eq!(config.session.min_turns, 2, "Base value should persist");
        assert_eq!(
            config.logging.level, "debug",
            "Override should win for nested fields"
        );
        assert_eq!(
            config.logging.format, "json",
            "Base value should persist when not overridden"
        );
    }
}
