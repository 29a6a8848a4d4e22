//! Dependency resolution.
//!
//! Quay does not pick versions. It walks a configuration's declared
//! coordinates through a [`DependencyResolver`], applies the configuration's
//! exclusion rules, and returns the flat artifact list. Resolution is a pure
//! function of the configuration and the resolver's answers.

pub mod errors;
pub mod local;

pub use errors::ResolutionError;
pub use local::LocalRepository;

use std::collections::{HashSet, VecDeque};
use std::path::PathBuf;

use serde::Serialize;

use crate::configuration::Configuration;
use crate::core::dependency::Coordinate;

/// What the resolver knows about one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDescriptor {
    /// Fully versioned coordinate
    pub coordinate: Coordinate,

    /// Artifact file on disk
    pub file: PathBuf,

    /// Direct dependencies
    pub dependencies: Vec<Coordinate>,
}

/// The dependency-resolution collaborator.
pub trait DependencyResolver: Send + Sync {
    /// Look up one module. `coordinate` may be versionless.
    fn describe(&self, coordinate: &Coordinate) -> Result<Option<ModuleDescriptor>, ResolutionError>;
}

/// One resolved artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedArtifact {
    pub coordinate: Coordinate,
    pub file: PathBuf,
}

impl ResolvedArtifact {
    /// The artifact's file name.
    pub fn file_name(&self) -> String {
        self.file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.coordinate.module().to_string())
    }
}

/// Resolve every artifact a configuration contributes.
///
/// Declared dependencies are visited breadth first. A module matched by any
/// effective exclusion is dropped along with everything only reachable
/// through it. The first module seen for a `group:module[:classifier]` wins.
pub fn resolve_configuration(
    configuration: &Configuration,
    resolver: &dyn DependencyResolver,
) -> Result<Vec<ResolvedArtifact>, ResolutionError> {
    let mut queue: VecDeque<Coordinate> = configuration.all_dependencies().into();
    let mut seen = HashSet::new();
    let mut artifacts = Vec::new();

    while let Some(coordinate) = queue.pop_front() {
        if configuration.is_excluded(&coordinate) {
            tracing::debug!("`{}` excluded from `{}`", coordinate, configuration.name());
            continue;
        }
        if !seen.insert(coordinate.module_key()) {
            continue;
        }

        let descriptor =
            resolver
                .describe(&coordinate)?
                .ok_or_else(|| ResolutionError::ArtifactNotFound {
                    coordinate: coordinate.to_string(),
                    configuration: configuration.name().to_string(),
                })?;

        if !descriptor.file.is_file() {
            return Err(ResolutionError::MissingFile {
                coordinate: descriptor.coordinate.to_string(),
                path: descriptor.file,
            });
        }

        queue.extend(descriptor.dependencies.iter().cloned());
        artifacts.push(ResolvedArtifact {
            coordinate: descriptor.coordinate,
            file: descriptor.file,
        });
    }

    tracing::debug!(
        "resolved {} artifact(s) for `{}`",
        artifacts.len(),
        configuration.name()
    );
    Ok(artifacts)
}
