//! Dependency configurations.
//!
//! A Configuration is an immutable, named set of declared dependencies that
//! may extend other configurations. Layering is explicit: a configuration
//! holds shared references to its parents and its own exclusion rules, and
//! every query walks the chain read-only. Nothing ever edits a configuration
//! after it is built, so several derivations can share one base safely.

pub mod derive;

pub use derive::{apply_excludes, derive, ConfigurationNamer};

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use serde::Serialize;

use crate::core::dependency::Coordinate;
use crate::core::error::{ConfigurationError, NamingCollisionError};
use crate::core::exclusion::ExclusionRule;

/// A named, resolvable set of dependencies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    name: String,
    dependencies: Vec<Coordinate>,
    extends_from: Vec<Arc<Configuration>>,
    excludes: Vec<ExclusionRule>,
}

impl Configuration {
    /// Create an empty configuration.
    pub fn new(name: impl Into<String>) -> Self {
        Configuration {
            name: name.into(),
            dependencies: Vec::new(),
            extends_from: Vec::new(),
            excludes: Vec::new(),
        }
    }

    /// Add a declared dependency.
    pub fn with_dependency(mut self, coordinate: Coordinate) -> Self {
        self.dependencies.push(coordinate);
        self
    }

    /// Add several declared dependencies.
    pub fn with_dependencies(mut self, coordinates: impl IntoIterator<Item = Coordinate>) -> Self {
        self.dependencies.extend(coordinates);
        self
    }

    /// Inherit every dependency and exclusion of `parent`.
    pub fn extending(mut self, parent: Arc<Configuration>) -> Self {
        self.extends_from.push(parent);
        self
    }

    /// Add an exclusion rule local to this configuration.
    pub fn excluding(mut self, rule: ExclusionRule) -> Self {
        self.excludes.push(rule);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dependencies declared directly on this configuration.
    pub fn dependencies(&self) -> &[Coordinate] {
        &self.dependencies
    }

    pub fn extends_from(&self) -> &[Arc<Configuration>] {
        &self.extends_from
    }

    /// Exclusion rules declared directly on this configuration.
    pub fn excludes(&self) -> &[ExclusionRule] {
        &self.excludes
    }

    /// Own dependencies followed by every ancestor's, first occurrence wins.
    pub fn all_dependencies(&self) -> Vec<Coordinate> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for config in self.hierarchy() {
            for dep in &config.dependencies {
                if seen.insert(dep.clone()) {
                    out.push(dep.clone());
                }
            }
        }
        out
    }

    /// Own exclusion rules plus every ancestor's.
    pub fn all_excludes(&self) -> Vec<ExclusionRule> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for config in self.hierarchy() {
            for rule in &config.excludes {
                if seen.insert(rule.clone()) {
                    out.push(rule.clone());
                }
            }
        }
        out
    }

    /// Check whether any effective exclusion removes the coordinate.
    pub fn is_excluded(&self, coordinate: &Coordinate) -> bool {
        self.hierarchy()
            .iter()
            .any(|c| c.excludes.iter().any(|rule| rule.matches(coordinate)))
    }

    /// This configuration and all ancestors, depth first, each listed once.
    pub fn hierarchy(&self) -> Vec<&Configuration> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(config) = stack.pop() {
            if !seen.insert(config.name.as_str()) {
                continue;
            }
            out.push(config);
            for parent in config.extends_from.iter().rev() {
                stack.push(parent.as_ref());
            }
        }
        out
    }
}

/// Serializable view of a configuration, used by `quay plan --json`.
#[derive(Debug, Serialize)]
pub struct ConfigurationSummary<'a> {
    pub name: &'a str,
    pub extends_from: Vec<&'a str>,
    pub dependencies: &'a [Coordinate],
    pub excludes: &'a [ExclusionRule],
}

impl<'a> From<&'a Configuration> for ConfigurationSummary<'a> {
    fn from(config: &'a Configuration) -> Self {
        ConfigurationSummary {
            name: &config.name,
            extends_from: config.extends_from.iter().map(|c| c.name()).collect(),
            dependencies: &config.dependencies,
            excludes: &config.excludes,
        }
    }
}

/// Project-wide registry of configurations.
///
/// Registration is the only write and it never replaces an existing entry.
#[derive(Debug, Default, Clone)]
pub struct ConfigurationContainer {
    configurations: BTreeMap<String, Arc<Configuration>>,
}

impl ConfigurationContainer {
    pub fn new() -> Self {
        ConfigurationContainer::default()
    }

    /// Register a configuration under its own name.
    pub fn register(
        &mut self,
        configuration: Configuration,
    ) -> Result<Arc<Configuration>, NamingCollisionError> {
        if self.configurations.contains_key(configuration.name()) {
            return Err(NamingCollisionError::Configuration {
                name: configuration.name().to_string(),
            });
        }
        let configuration = Arc::new(configuration);
        self.configurations
            .insert(configuration.name().to_string(), Arc::clone(&configuration));
        Ok(configuration)
    }

    pub fn get(&self, name: &str) -> Option<Arc<Configuration>> {
        self.configurations.get(name).cloned()
    }

    /// Look up a configuration that must exist.
    pub fn require(&self, name: &str) -> Result<Arc<Configuration>, ConfigurationError> {
        self.get(name)
            .ok_or_else(|| ConfigurationError::UnknownConfiguration {
                name: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.configurations.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Configuration>> {
        self.configurations.values()
    }

    pub fn len(&self) -> usize {
        self.configurations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configurations.is_empty()
    }
}
