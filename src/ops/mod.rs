//! High-level operations.
//!
//! This module contains the implementation of Quay commands.

pub mod configure;
pub mod package;
pub mod plan;

pub use configure::{
    configure_project, load_catalog, plan_project, ConfiguredPlatform, ProjectPlan,
};
pub use package::{package, PackageOptions, PackageResult};
pub use plan::{format_plan, PlanSummary};
