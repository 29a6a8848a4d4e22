//! The host project packaging strategies write into.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::builder::artifacts::ArtifactContainer;
use crate::builder::plan::{TarCompression, TaskGraph};
use crate::configuration::ConfigurationContainer;
use crate::core::source_set::SourceSet;

/// A project being packaged.
///
/// Holds the source sets, the configuration registry, the task graph and
/// the published artifacts. Every name registered here is unique.
#[derive(Debug, Clone)]
pub struct Project {
    name: String,
    version: String,
    project_dir: PathBuf,
    build_dir: PathBuf,
    tar_compression: TarCompression,
    shade_prefix: Option<String>,
    source_sets: BTreeMap<String, SourceSet>,
    configurations: ConfigurationContainer,
    tasks: TaskGraph,
    artifacts: ArtifactContainer,
}

impl Project {
    /// Create an empty project. `build_dir` is usually `<project_dir>/build`.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        project_dir: impl Into<PathBuf>,
        build_dir: impl Into<PathBuf>,
    ) -> Self {
        Project {
            name: name.into(),
            version: version.into(),
            project_dir: project_dir.into(),
            build_dir: build_dir.into(),
            tar_compression: TarCompression::default(),
            shade_prefix: None,
            source_sets: BTreeMap::new(),
            configurations: ConfigurationContainer::new(),
            tasks: TaskGraph::new(),
            artifacts: ArtifactContainer::new(),
        }
    }

    pub fn with_tar_compression(mut self, compression: TarCompression) -> Self {
        self.tar_compression = compression;
        self
    }

    pub fn with_shade_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.shade_prefix = Some(prefix.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    pub fn tar_compression(&self) -> TarCompression {
        self.tar_compression
    }

    /// Package prefix relocated classes move under.
    ///
    /// Defaults to the project name with every character that cannot appear
    /// in a Java identifier replaced by `_`.
    pub fn shade_prefix(&self) -> String {
        match &self.shade_prefix {
            Some(prefix) => prefix.clone(),
            None => identifier_safe(&self.name),
        }
    }

    /// Directory jars are written to.
    pub fn libs_dir(&self) -> PathBuf {
        self.build_dir.join("libs")
    }

    /// Directory distribution archives are written to.
    pub fn distributions_dir(&self) -> PathBuf {
        self.build_dir.join("distributions")
    }

    /// Staging directory for a named distribution.
    pub fn install_dir(&self, distribution: &str) -> PathBuf {
        self.build_dir
            .join("install")
            .join(format!("{}-{}", self.name, distribution))
    }

    /// `<name>-<version>[-<classifier>].<extension>`
    pub fn archive_file_name(&self, classifier: Option<&str>, extension: &str) -> String {
        match classifier {
            Some(classifier) => format!(
                "{}-{}-{}.{}",
                self.name, self.version, classifier, extension
            ),
            None => format!("{}-{}.{}", self.name, self.version, extension),
        }
    }

    /// Root directory entries of a distribution archive are placed under.
    pub fn archive_root_dir(&self) -> String {
        format!("{}-{}", self.name, self.version)
    }

    /// Register a source set with the conventional layout, or return the
    /// existing one.
    pub fn create_source_set(&mut self, name: &str) -> &SourceSet {
        let project_dir = &self.project_dir;
        let build_dir = &self.build_dir;
        self.source_sets
            .entry(name.to_string())
            .or_insert_with(|| SourceSet::new(name, project_dir, build_dir))
    }

    pub fn source_set(&self, name: &str) -> Option<&SourceSet> {
        self.source_sets.get(name)
    }

    pub fn source_sets(&self) -> impl Iterator<Item = &SourceSet> {
        self.source_sets.values()
    }

    pub fn configurations(&self) -> &ConfigurationContainer {
        &self.configurations
    }

    pub fn configurations_mut(&mut self) -> &mut ConfigurationContainer {
        &mut self.configurations
    }

    pub fn tasks(&self) -> &TaskGraph {
        &self.tasks
    }

    pub fn tasks_mut(&mut self) -> &mut TaskGraph {
        &mut self.tasks
    }

    pub fn artifacts(&self) -> &ArtifactContainer {
        &self.artifacts
    }

    pub fn artifacts_mut(&mut self) -> &mut ArtifactContainer {
        &mut self.artifacts
    }
}

fn identifier_safe(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}
