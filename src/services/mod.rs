//! Application services.

pub mod action_graph;
pub mod action_scheduler;
pub mod context_extractor;
pub mod design_pipeline;
pub mod design_session_manager;
pub mod error_analyzer;
pub mod fallback_planner;
pub mod feedback_engine;
pub mod readiness_evaluator;
pub mod retry_policy;

pub use action_graph::ActionGraph;
pub use action_scheduler::{ActionScheduler, SchedulerEvent};
pub use context_extractor::{estimate_tokens, LineWindowExtractor};
pub use design_pipeline::{DesignPipeline, PipelineOutcome, PlanSource};
pub use design_session_manager::{DefaultArtifactFactory, DesignOutcome, DesignSessionManager};
pub use error_analyzer::PatternErrorAnalyzer;
pub use fallback_planner::{FallbackBranch, FallbackPlan, FallbackPlanner, PlannerState};
pub use feedback_engine::{FeedbackEngine, FeedbackSummary};
pub use readiness_evaluator::ReadinessEvaluator;
pub use retry_policy::RetryPolicy;
