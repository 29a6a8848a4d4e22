//! Configuration file support for Quay.
//!
//! Settings come from two files:
//! - Global: `~/.quay/config.toml`, user-wide defaults for `[repository]`
//!   and `[build]`
//! - Project: `Quay.toml` at the project root
//!
//! Project values take precedence over global ones.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::builder::plan::TarCompression;
use crate::util::fs::read_to_string;

/// Name of the project file.
pub const PROJECT_FILE: &str = "Quay.toml";

/// Version manifest used when `[versions] manifest` is unset.
pub const DEFAULT_MANIFEST: &str = "version-info.properties";

/// Local repository used when `[repository] path` is unset.
pub const DEFAULT_REPOSITORY: &str = "repo";

/// Build directory used when `[build] dir` is unset.
pub const DEFAULT_BUILD_DIR: &str = "build";

/// Quay configuration, as read from one file or merged from several.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project identity; only meaningful in `Quay.toml`
    pub project: Option<ProjectConfig>,

    pub platforms: PlatformsConfig,

    pub versions: VersionsConfig,

    pub repository: RepositoryConfig,

    pub build: BuildConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformsConfig {
    /// Platforms to configure; empty selects the whole catalog
    pub active: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VersionsConfig {
    /// Version manifest, relative to the project root
    pub manifest: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Local artifact repository, relative to the project root
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BuildConfig {
    /// Output directory, relative to the project root
    pub dir: Option<PathBuf>,

    /// Tasks run at once (None = one per CPU)
    pub jobs: Option<usize>,

    pub tar_compression: Option<TarCompression>,

    /// Package prefix for relocated classes
    pub shade_prefix: Option<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = read_to_string(path)?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if the file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.project.is_some() {
            self.project = other.project;
        }
        if !other.platforms.active.is_empty() {
            self.platforms.active = other.platforms.active;
        }
        if other.versions.manifest.is_some() {
            self.versions.manifest = other.versions.manifest;
        }
        if other.repository.path.is_some() {
            self.repository.path = other.repository.path;
        }
        if other.build.dir.is_some() {
            self.build.dir = other.build.dir;
        }
        if other.build.jobs.is_some() {
            self.build.jobs = other.build.jobs;
        }
        if other.build.tar_compression.is_some() {
            self.build.tar_compression = other.build.tar_compression;
        }
        if other.build.shade_prefix.is_some() {
            self.build.shade_prefix = other.build.shade_prefix;
        }
    }

    /// Version manifest path, resolved against `root`.
    pub fn manifest_path(&self, root: &Path) -> PathBuf {
        root.join(
            self.versions
                .manifest
                .as_deref()
                .unwrap_or(Path::new(DEFAULT_MANIFEST)),
        )
    }

    /// Repository path, resolved against `root`.
    pub fn repository_path(&self, root: &Path) -> PathBuf {
        root.join(
            self.repository
                .path
                .as_deref()
                .unwrap_or(Path::new(DEFAULT_REPOSITORY)),
        )
    }

    /// Build directory, resolved against `root`.
    pub fn build_dir(&self, root: &Path) -> PathBuf {
        root.join(self.build.dir.as_deref().unwrap_or(Path::new(DEFAULT_BUILD_DIR)))
    }
}

/// Load the project file, layered over the global config when one exists.
///
/// Only `[repository]` and `[build]` are taken from the global file.
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Result<Config> {
    let mut config = Config::default();

    if let Some(global_path) = global_path.filter(|p| p.exists()) {
        let global = Config::load_or_default(global_path);
        config.repository = global.repository;
        config.build = global.build;
    }

    config.merge(Config::load(project_path)?);
    Ok(config)
}
