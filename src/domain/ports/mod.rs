//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines the interfaces of the collaborators the orchestration
//! core consumes but does not implement:
//! - AgentCapability: invokes a design agent for one role
//! - AgentResolver: maps a role to its capability
//! - ActionPlanner: the primary (LLM-driven) planner
//! - ErrorAnalyzer: classifies code errors
//! - ContextExtractor: cuts a bounded context window around an error
//! - FixGenerator: produces corrected code
//! - CodeValidator: checks code and reports the first error
//!
//! These traits keep the services independent of any particular LLM backend.

pub mod action_planner;
pub mod agent_capability;
pub mod code_validator;
pub mod context_extractor;
pub mod error_analyzer;
pub mod fix_generator;

pub use action_planner::ActionPlanner;
pub use agent_capability::{AgentCapability, AgentResolver};
pub use code_validator::CodeValidator;
pub use context_extractor::ContextExtractor;
pub use error_analyzer::ErrorAnalyzer;
pub use fix_generator::FixGenerator;
