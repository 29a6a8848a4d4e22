//! Quay - multi-platform packaging for user-defined functions
//!
//! One body of UDF code is packaged for several target runtimes. For each
//! platform Quay derives filtered dependency configurations, describes the
//! tasks producing its shaded jar, thin jar or distribution archives, and
//! runs those tasks.

pub mod builder;
pub mod catalog;
pub mod configuration;
pub mod core;
pub mod ops;
pub mod packaging;
pub mod resolver;
pub mod util;

/// Fixtures for Quay unit tests: jar and class file builders and an
/// in-memory resolver.
#[cfg(test)]
pub mod test_support;

pub use builder::{Executor, Project};
pub use catalog::{Catalog, VersionManifest};
pub use configuration::{Configuration, ConfigurationContainer};
pub use core::{Coordinate, Platform};
pub use packaging::Packaging;
pub use util::context::GlobalContext;
