//! Subcommand handlers.

pub mod classify;
pub mod config;
pub mod design;
pub mod plan;
pub mod readiness;

use clap::Args;

use crate::domain::models::DesignState;

/// Design facts given on the command line.
#[derive(Args, Debug, Clone, Default)]
pub struct DesignStateArgs {
    /// Number of schema fields
    #[arg(long, default_value_t = 0)]
    pub fields: u32,
    /// Number of layout components
    #[arg(long, default_value_t = 0)]
    pub components: u32,
    /// Number of workflows
    #[arg(long, default_value_t = 0)]
    pub workflows: u32,
    /// The schema has a description
    #[arg(long)]
    pub description: bool,
    /// The schema has relationships
    #[arg(long)]
    pub relationships: bool,
    /// The schema has computed fields
    #[arg(long)]
    pub computed_fields: bool,
    /// A schema artifact exists
    #[arg(long)]
    pub schema: bool,
    /// A layout artifact exists
    #[arg(long)]
    pub layout: bool,
    /// A workflow artifact exists
    #[arg(long)]
    pub workflow: bool,
}

impl From<&DesignStateArgs> for DesignState {
    fn from(args: &DesignStateArgs) -> Self {
        Self {
            field_count: args.fields,
            component_count: args.components,
            workflow_count: args.workflows,
            has_description: args.description,
            has_relationships: args.relationships,
            has_computed_fields: args.computed_fields,
            has_schema: args.schema,
            has_layout: args.layout,
            has_workflow: args.workflow,
        }
    }
}
