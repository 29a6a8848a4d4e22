//! File-backed repository.
//!
//! A local repository is a directory holding artifact files and an
//! `index.toml` describing them:
//!
//! ```toml
//! [[artifact]]
//! coordinate = "org.apache.hadoop:hadoop-common:2.7.0"
//! file = "org/apache/hadoop/hadoop-common-2.7.0.jar"
//! dependencies = ["commons-io:commons-io:2.4"]
//! ```
//!
//! `file` is relative to the repository root.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::core::dependency::Coordinate;
use crate::resolver::{DependencyResolver, ModuleDescriptor, ResolutionError};

/// Name of the index file at the repository root.
pub const INDEX_FILE: &str = "index.toml";

#[derive(Debug, Deserialize)]
struct Index {
    #[serde(default, rename = "artifact")]
    artifacts: Vec<IndexEntry>,
}

#[derive(Debug, Deserialize)]
struct IndexEntry {
    coordinate: Coordinate,
    file: PathBuf,
    #[serde(default)]
    dependencies: Vec<Coordinate>,
}

/// A repository read once from disk.
#[derive(Debug, Clone)]
pub struct LocalRepository {
    root: PathBuf,
    modules: Vec<ModuleDescriptor>,
}

impl LocalRepository {
    /// Load `<root>/index.toml`.
    pub fn open(root: &Path) -> Result<Self, ResolutionError> {
        let index_path = root.join(INDEX_FILE);
        let contents =
            std::fs::read_to_string(&index_path).map_err(|e| ResolutionError::Index {
                path: index_path.clone(),
                message: e.to_string(),
            })?;
        let index: Index = toml::from_str(&contents).map_err(|e| ResolutionError::Index {
            path: index_path.clone(),
            message: e.to_string(),
        })?;

        let modules = index
            .artifacts
            .into_iter()
            .map(|entry| {
                if entry.coordinate.version().is_none() {
                    return Err(ResolutionError::Index {
                        path: index_path.clone(),
                        message: format!("`{}` has no version", entry.coordinate),
                    });
                }
                Ok(ModuleDescriptor {
                    file: root.join(&entry.file),
                    coordinate: entry.coordinate,
                    dependencies: entry.dependencies,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            "loaded {} module(s) from {}",
            modules.len(),
            index_path.display()
        );
        Ok(LocalRepository {
            root: root.to_path_buf(),
            modules,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl DependencyResolver for LocalRepository {
    fn describe(&self, coordinate: &Coordinate) -> Result<Option<ModuleDescriptor>, ResolutionError> {
        Ok(self
            .modules
            .iter()
            .find(|m| coordinate.matches(&m.coordinate))
            .cloned())
    }
}
