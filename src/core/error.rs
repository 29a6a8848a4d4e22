//! Errors raised while describing a build.
//!
//! Everything here is reported synchronously, before any task runs.
//! Resolution failures happen later and live in [`crate::resolver::errors`].

use std::path::PathBuf;

use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};

/// Fatal configuration problem detected while building the catalog or
/// describing a platform's tasks.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("malformed exclusion `{rule}`: {reason}")]
    MalformedExclusion { rule: String, reason: String },

    #[error("malformed coordinate `{coordinate}`: {reason}")]
    MalformedCoordinate { coordinate: String, reason: String },

    #[error("version manifest has no `{key}` entry (required by `{platform}`)")]
    MissingVersionKey { platform: String, key: String },

    #[error("failed to read version manifest {}", path.display())]
    ManifestUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed version manifest line {line_no}: `{line}`")]
    MalformedManifestLine { line_no: usize, line: String },

    #[error("platform `{name}` is declared more than once")]
    DuplicatePlatform { name: String },

    #[error("platform `{name}` has no packaging strategy")]
    EmptyPackaging { name: String },

    #[error("unknown platform `{name}`")]
    UnknownPlatform { name: String, available: Vec<String> },

    #[error("unknown configuration `{name}`")]
    UnknownConfiguration { name: String },
}

impl ConfigurationError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.to_string());
        match self {
            ConfigurationError::MissingVersionKey { key, .. } => diag.with_suggestion(format!(
                "Add `{}=<version>` to the version manifest",
                key
            )),
            ConfigurationError::UnknownPlatform { available, .. } => diag
                .with_context(format!("available platforms: {}", available.join(", ")))
                .with_suggestion(suggestions::LIST_PLATFORMS),
            ConfigurationError::MalformedExclusion { .. } => diag.with_suggestion(
                "Exclusions are either `group` or `group:module`",
            ),
            _ => diag,
        }
    }
}

/// A name that must be unique was registered twice.
///
/// The naming scheme guarantees this never happens under correct use, so
/// callers treat it as an invariant violation and stop.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NamingCollisionError {
    #[error("configuration `{name}` already exists")]
    Configuration { name: String },

    #[error("task `{name}` already exists")]
    Task { name: String },

    #[error("an artifact with classifier `{classifier}` and extension `{extension}` is already published")]
    Artifact { classifier: String, extension: String },
}

/// Any error raised while describing tasks.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Collision(#[from] NamingCollisionError),

    #[error("task `{task}` depends on unknown task `{dependency}`")]
    UnknownDependency { task: String, dependency: String },

    #[error("task graph contains a cycle through `{task}`")]
    Cycle { task: String },
}
