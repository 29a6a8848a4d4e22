//! The platform catalog.
//!
//! A [`Catalog`] is the immutable list of platforms Quay can package for,
//! together with the dependencies shared by every platform's `main` and
//! `test` source sets. The default catalog is built from a
//! [`VersionManifest`] passed in by the caller.

pub mod defaults;
pub mod versions;

pub use versions::VersionManifest;

use std::collections::HashSet;

use crate::core::dependency::DependencyConfiguration;
use crate::core::error::ConfigurationError;
use crate::core::platform::Platform;

#[derive(Debug, Clone)]
pub struct Catalog {
    platforms: Vec<Platform>,
    main_dependencies: Vec<DependencyConfiguration>,
    test_dependencies: Vec<DependencyConfiguration>,
}

impl Catalog {
    /// Create a catalog. Platform names must be unique.
    pub fn new(
        platforms: Vec<Platform>,
        main_dependencies: Vec<DependencyConfiguration>,
        test_dependencies: Vec<DependencyConfiguration>,
    ) -> Result<Self, ConfigurationError> {
        let mut seen = HashSet::new();
        for platform in &platforms {
            if !seen.insert(platform.name()) {
                return Err(ConfigurationError::DuplicatePlatform {
                    name: platform.name().to_string(),
                });
            }
        }
        Ok(Catalog {
            platforms,
            main_dependencies,
            test_dependencies,
        })
    }

    /// The default catalog with versions filled in from `manifest`.
    ///
    /// Every platform is built, so a missing version key fails here even if
    /// that platform is never selected.
    pub fn from_manifest(manifest: &VersionManifest) -> Result<Self, ConfigurationError> {
        Catalog::new(
            defaults::platforms(manifest)?,
            defaults::main_dependencies(manifest)?,
            defaults::test_dependencies(manifest)?,
        )
    }

    /// Every platform, in catalog order.
    pub fn platforms(&self) -> &[Platform] {
        &self.platforms
    }

    pub fn platform(&self, name: &str) -> Option<&Platform> {
        self.platforms.iter().find(|p| p.name() == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.platforms.iter().map(|p| p.name()).collect()
    }

    pub fn main_dependencies(&self) -> &[DependencyConfiguration] {
        &self.main_dependencies
    }

    pub fn test_dependencies(&self) -> &[DependencyConfiguration] {
        &self.test_dependencies
    }

    /// The platforms named in `names`, in catalog order.
    ///
    /// An empty selection means every platform.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<&Platform>, ConfigurationError> {
        if names.is_empty() {
            return Ok(self.platforms.iter().collect());
        }
        for name in names {
            let name = name.as_ref();
            if self.platform(name).is_none() {
                return Err(ConfigurationError::UnknownPlatform {
                    name: name.to_string(),
                    available: self.names().into_iter().map(str::to_string).collect(),
                });
            }
        }
        Ok(self
            .platforms
            .iter()
            .filter(|p| names.iter().any(|n| n.as_ref() == p.name()))
            .collect())
    }
}
