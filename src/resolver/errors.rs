//! Resolution error types and diagnostics.

use std::path::PathBuf;

use thiserror::Error;

use crate::util::diagnostic::Diagnostic;

/// Error raised while resolving a configuration's artifacts.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("could not find `{coordinate}` (required by `{configuration}`)")]
    ArtifactNotFound {
        coordinate: String,
        configuration: String,
    },

    #[error("artifact file for `{coordinate}` is missing: {}", path.display())]
    MissingFile { coordinate: String, path: PathBuf },

    #[error("failed to read repository index {}: {message}", path.display())]
    Index { path: PathBuf, message: String },
}

impl ResolutionError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ResolutionError::ArtifactNotFound {
                coordinate,
                configuration,
            } => Diagnostic::error(format!("could not resolve `{}`", coordinate))
                .with_context(format!("required by configuration `{}`", configuration))
                .with_suggestion("Check that the artifact is listed in the repository index")
                .with_suggestion("Check the version manifest for a mistyped version"),

            ResolutionError::MissingFile { coordinate, path } => {
                Diagnostic::error(format!("artifact file for `{}` is missing", coordinate))
                    .with_location(path.clone())
                    .with_suggestion("Restore the file or fix the `file` entry in index.toml")
            }

            ResolutionError::Index { path, message } => {
                Diagnostic::error(format!("unreadable repository index: {}", message))
                    .with_location(path.clone())
                    .with_suggestion("Verify `[repository] path` in Quay.toml")
            }
        }
    }
}
