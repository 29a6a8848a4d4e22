//! Target platforms.
//!
//! A Platform binds a runtime name to the dependencies its wrappers need and
//! the packaging strategies that turn its compiled output into artifacts.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::dependency::DependencyConfiguration;
use crate::core::error::ConfigurationError;
use crate::packaging::Packaging;

/// Language the platform's wrappers are generated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Java,
    Scala,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Java => "java",
            Language::Scala => "scala",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to the external generator producing a platform's wrapper
/// sources. Quay records it and never invokes it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WrapperGeneratorRef(String);

impl WrapperGeneratorRef {
    pub fn new(name: impl Into<String>) -> Self {
        WrapperGeneratorRef(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WrapperGeneratorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A target runtime and everything needed to package for it.
#[derive(Debug, Clone)]
pub struct Platform {
    name: String,
    language: Language,
    wrapper_generator: WrapperGeneratorRef,
    main_dependencies: Vec<DependencyConfiguration>,
    test_dependencies: Vec<DependencyConfiguration>,
    packaging: Vec<Packaging>,
}

impl Platform {
    /// Create a platform. At least one packaging strategy is required, and
    /// every exclusion the strategies carry must parse.
    pub fn new(
        name: impl Into<String>,
        language: Language,
        wrapper_generator: WrapperGeneratorRef,
        main_dependencies: Vec<DependencyConfiguration>,
        test_dependencies: Vec<DependencyConfiguration>,
        packaging: Vec<Packaging>,
    ) -> Result<Self, ConfigurationError> {
        let name = name.into();
        if packaging.is_empty() {
            return Err(ConfigurationError::EmptyPackaging { name });
        }
        for strategy in &packaging {
            strategy.validate()?;
        }
        Ok(Platform {
            name,
            language,
            wrapper_generator,
            main_dependencies,
            test_dependencies,
            packaging,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn wrapper_generator(&self) -> &WrapperGeneratorRef {
        &self.wrapper_generator
    }

    pub fn main_dependencies(&self) -> &[DependencyConfiguration] {
        &self.main_dependencies
    }

    pub fn test_dependencies(&self) -> &[DependencyConfiguration] {
        &self.test_dependencies
    }

    /// Packaging strategies in configuration order.
    pub fn packaging(&self) -> &[Packaging] {
        &self.packaging
    }

    /// Name of the platform's test source set.
    pub fn test_source_set_name(&self) -> String {
        format!("{}Test", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packaging::{ShadedJarPackaging, ThinJarPackaging};

    #[test]
    fn test_platform_requires_packaging() {
        let err = Platform::new(
            "hive",
            Language::Java,
            WrapperGeneratorRef::new("HiveWrapperGenerator"),
            vec![],
            vec![],
            vec![],
        )
        .unwrap_err();
        assert!(matches!(err, ConfigurationError::EmptyPackaging { name } if name == "hive"));
    }

    #[test]
    fn test_platform_rejects_malformed_exclusion() {
        let err = Platform::new(
            "hive",
            Language::Java,
            WrapperGeneratorRef::new("HiveWrapperGenerator"),
            vec![],
            vec![],
            vec![ShadedJarPackaging::new(["org.apache:hive:exec"]).into()],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::MalformedExclusion { rule, .. } if rule == "org.apache:hive:exec"
        ));
    }

    #[test]
    fn test_platform_accessors() {
        let platform = Platform::new(
            "spark",
            Language::Scala,
            WrapperGeneratorRef::new("SparkWrapperGenerator"),
            vec![],
            vec![],
            vec![Packaging::ThinJar(ThinJarPackaging)],
        )
        .unwrap();
        assert_eq!(platform.name(), "spark");
        assert_eq!(platform.language().as_str(), "scala");
        assert_eq!(platform.test_source_set_name(), "sparkTest");
        assert_eq!(platform.packaging().len(), 1);
    }
}
