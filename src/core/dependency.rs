//! Declared dependencies.
//!
//! A DependencyConfiguration pairs a module coordinate with the bucket it is
//! declared in. Buckets decide whether the dependency is visible at compile
//! time, at run time, or to annotation processors.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::ConfigurationError;

/// Kind of configuration a dependency lives in.
///
/// The first four are declarable buckets. The classpath kinds are derived
/// from them and only ever extended, never declared into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigurationType {
    CompileOnly,
    Implementation,
    AnnotationProcessor,
    RuntimeOnly,
    CompileClasspath,
    RuntimeClasspath,
}

impl ConfigurationType {
    /// The declarable buckets, in declaration order.
    pub const DECLARABLE: [ConfigurationType; 4] = [
        ConfigurationType::CompileOnly,
        ConfigurationType::Implementation,
        ConfigurationType::AnnotationProcessor,
        ConfigurationType::RuntimeOnly,
    ];

    /// Name of this configuration for the `main` source set.
    pub fn base_name(&self) -> &'static str {
        match self {
            ConfigurationType::CompileOnly => "compileOnly",
            ConfigurationType::Implementation => "implementation",
            ConfigurationType::AnnotationProcessor => "annotationProcessor",
            ConfigurationType::RuntimeOnly => "runtimeOnly",
            ConfigurationType::CompileClasspath => "compileClasspath",
            ConfigurationType::RuntimeClasspath => "runtimeClasspath",
        }
    }

    /// Check if dependencies may be declared directly into this bucket.
    pub fn is_declarable(&self) -> bool {
        Self::DECLARABLE.contains(self)
    }
}

impl fmt::Display for ConfigurationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.base_name())
    }
}

/// A module coordinate: `group:module[:version[:classifier]]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coordinate {
    group: String,
    module: String,
    version: Option<String>,
    classifier: Option<String>,
}

impl Coordinate {
    /// Create a versionless coordinate.
    pub fn new(group: impl Into<String>, module: impl Into<String>) -> Self {
        Coordinate {
            group: group.into(),
            module: module.into(),
            version: None,
            classifier: None,
        }
    }

    /// Set the version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Set the classifier.
    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = Some(classifier.into());
        self
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn classifier(&self) -> Option<&str> {
        self.classifier.as_deref()
    }

    /// Identity of the module regardless of version: `group:module[:classifier]`.
    ///
    /// Two coordinates with the same key are the same artifact as far as
    /// resolution is concerned.
    pub fn module_key(&self) -> String {
        match &self.classifier {
            Some(c) => format!("{}:{}:{}", self.group, self.module, c),
            None => format!("{}:{}", self.group, self.module),
        }
    }

    /// Check whether `other` names the same artifact, treating a missing
    /// version on either side as a wildcard.
    pub fn matches(&self, other: &Coordinate) -> bool {
        self.group == other.group
            && self.module == other.module
            && self.classifier == other.classifier
            && match (&self.version, &other.version) {
                (Some(a), Some(b)) => a == b,
                _ => true,
            }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.module)?;
        if let Some(version) = &self.version {
            write!(f, ":{}", version)?;
        }
        if let Some(classifier) = &self.classifier {
            // A classifier without a version keeps its slot empty.
            if self.version.is_none() {
                f.write_str(":")?;
            }
            write!(f, ":{}", classifier)?;
        }
        Ok(())
    }
}

impl FromStr for Coordinate {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = |reason: &str| ConfigurationError::MalformedCoordinate {
            coordinate: s.to_string(),
            reason: reason.to_string(),
        };

        let parts: Vec<&str> = s.trim().split(':').collect();
        if parts.len() < 2 {
            return Err(malformed("expected at least `group:module`"));
        }
        if parts.len() > 4 {
            return Err(malformed("expected at most `group:module:version:classifier`"));
        }
        if parts[0].is_empty() || parts[1].is_empty() {
            return Err(malformed("group and module must not be empty"));
        }

        let mut coordinate = Coordinate::new(parts[0], parts[1]);
        if let Some(version) = parts.get(2).filter(|v| !v.is_empty()) {
            coordinate = coordinate.with_version(*version);
        }
        if let Some(classifier) = parts.get(3) {
            if classifier.is_empty() {
                return Err(malformed("classifier must not be empty"));
            }
            coordinate = coordinate.with_classifier(*classifier);
        }
        Ok(coordinate)
    }
}

impl Serialize for Coordinate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Coordinate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A single declared dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyConfiguration {
    bucket: ConfigurationType,
    coordinate: Coordinate,
}

impl DependencyConfiguration {
    /// Create a new declared dependency.
    pub fn new(bucket: ConfigurationType, coordinate: Coordinate) -> Self {
        DependencyConfiguration { bucket, coordinate }
    }

    /// The bucket this dependency is declared in.
    pub fn bucket(&self) -> ConfigurationType {
        self.bucket
    }

    /// The declared coordinate.
    pub fn coordinate(&self) -> &Coordinate {
        &self.coordinate
    }
}

impl fmt::Display for DependencyConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.bucket, self.coordinate)
    }
}
