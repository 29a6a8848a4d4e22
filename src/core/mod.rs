//! Core data structures for Quay.
//!
//! This module contains the foundational types used throughout Quay:
//! - Declared dependencies and module coordinates
//! - Exclusion rules
//! - Source sets and their naming conventions
//! - Platforms

pub mod dependency;
pub mod error;
pub mod exclusion;
pub mod platform;
pub mod source_set;

pub use dependency::{ConfigurationType, Coordinate, DependencyConfiguration};
pub use error::{ConfigurationError, NamingCollisionError, PlanError};
pub use exclusion::ExclusionRule;
pub use platform::{Language, Platform, WrapperGeneratorRef};
pub use source_set::SourceSet;
