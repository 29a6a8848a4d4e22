//! Host build model and task execution.
//!
//! Packaging strategies describe work into a [`Project`]: tasks in its
//! [`TaskGraph`], published artifacts in its [`ArtifactContainer`]. The
//! [`Executor`] later turns that description into jars and archives.

pub mod archive;
pub mod artifacts;
pub mod executor;
pub mod jar;
pub mod plan;
pub mod project;
pub mod relocate;

pub use artifacts::{ArtifactContainer, PublishedArtifact, ARCHIVES_CONFIGURATION};
pub use executor::{ExecutionReport, Executor};
pub use plan::{Task, TaskAction, TaskGraph, TaskHandle};
pub use project::Project;
pub use relocate::Relocator;
