//! Packaging strategies.
//!
//! Each strategy turns one platform's compiled output into publishable
//! artifacts by describing tasks in the project. Strategies never run
//! anything themselves.

pub mod distribution;
pub mod shaded;
pub mod thin;

pub use distribution::DistributionPackaging;
pub use shaded::ShadedJarPackaging;
pub use thin::ThinJarPackaging;

use std::fmt;
use std::sync::Arc;

use crate::builder::plan::TaskHandle;
use crate::builder::project::Project;
use crate::configuration::{Configuration, ConfigurationNamer};
use crate::core::dependency::ConfigurationType;
use crate::core::error::{ConfigurationError, PlanError};
use crate::core::exclusion::ExclusionRule;
use crate::core::platform::Platform;
use crate::core::source_set::SourceSet;

/// How a platform's artifacts are packaged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packaging {
    /// One jar with every non-excluded runtime dependency unpacked into it
    ShadedJar(ShadedJarPackaging),
    /// A thin jar plus tar and zip archives of it and its dependencies
    Distribution(DistributionPackaging),
    /// Only the platform's own classes and resources
    ThinJar(ThinJarPackaging),
}

impl Packaging {
    /// Describe this strategy's tasks for `platform`.
    ///
    /// Returns the tasks producing the final artifacts. Derived
    /// configurations are named by `namer`.
    pub fn configure(
        &self,
        project: &mut Project,
        platform: &Platform,
        platform_source_set: &SourceSet,
        main_source_set: &SourceSet,
        namer: &ConfigurationNamer,
    ) -> Result<Vec<TaskHandle>, PlanError> {
        match self {
            Packaging::ShadedJar(p) => {
                p.configure(project, platform, platform_source_set, main_source_set, namer)
            }
            Packaging::Distribution(p) => {
                p.configure(project, platform, platform_source_set, main_source_set, namer)
            }
            Packaging::ThinJar(p) => {
                p.configure(project, platform, platform_source_set, main_source_set, namer)
            }
        }
    }

    /// Check that every exclusion string parses.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let rules: &[String] = match self {
            Packaging::ShadedJar(p) => p.excluded_groups(),
            Packaging::Distribution(p) => p.excluded_dependencies(),
            Packaging::ThinJar(_) => &[],
        };
        for rule in rules {
            ExclusionRule::parse(rule)?;
        }
        Ok(())
    }

    /// Short name used in listings.
    pub fn kind(&self) -> &'static str {
        match self {
            Packaging::ShadedJar(_) => "shaded-jar",
            Packaging::Distribution(_) => "distribution",
            Packaging::ThinJar(_) => "thin-jar",
        }
    }
}

impl fmt::Display for Packaging {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Packaging::ShadedJar(p) if !p.excluded_groups().is_empty() => {
                write!(f, "shaded-jar (excluding {})", p.excluded_groups().join(", "))
            }
            Packaging::Distribution(p) if !p.classifier_suffix().is_empty() => {
                write!(f, "distribution `{}`", p.classifier_suffix())
            }
            other => f.write_str(other.kind()),
        }
    }
}

impl From<ShadedJarPackaging> for Packaging {
    fn from(p: ShadedJarPackaging) -> Self {
        Packaging::ShadedJar(p)
    }
}

impl From<DistributionPackaging> for Packaging {
    fn from(p: DistributionPackaging) -> Self {
        Packaging::Distribution(p)
    }
}

impl From<ThinJarPackaging> for Packaging {
    fn from(p: ThinJarPackaging) -> Self {
        Packaging::ThinJar(p)
    }
}

/// The platform source set's runtime classpath.
fn runtime_classpath(
    project: &Project,
    source_set: &SourceSet,
) -> Result<Arc<Configuration>, PlanError> {
    let name = source_set.configuration_name(ConfigurationType::RuntimeClasspath);
    Ok(project.configurations().require(&name)?)
}
