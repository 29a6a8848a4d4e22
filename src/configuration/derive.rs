//! Exclude-and-clone.
//!
//! Packaging strategies need a base configuration minus some modules. The
//! base may be filtered differently by several strategies on one platform,
//! so derivation produces a new child configuration and leaves the base
//! alone.

use std::sync::Arc;

use crate::configuration::{Configuration, ConfigurationContainer};
use crate::core::error::PlanError;
use crate::core::exclusion::ExclusionRule;

/// Deterministic names for derived configurations.
///
/// Seeded at the call site with the platform and the strategy's position in
/// the platform's packaging list, which is unique within one configuration
/// pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationNamer {
    platform: String,
    strategy_index: usize,
}

impl ConfigurationNamer {
    pub fn new(platform: impl Into<String>, strategy_index: usize) -> Self {
        ConfigurationNamer {
            platform: platform.into(),
            strategy_index,
        }
    }

    /// `<base>_<platform>_<strategyIndex>`
    pub fn name_for(&self, base: &str) -> String {
        format!("{}_{}_{}", base, self.platform, self.strategy_index)
    }

    pub fn platform(&self) -> &str {
        &self.platform
    }

    pub fn strategy_index(&self) -> usize {
        self.strategy_index
    }
}

/// Build a child of `base` named `name` that excludes every rule in
/// `exclusions`. The base is only read.
pub fn derive<S: AsRef<str>>(
    base: &Arc<Configuration>,
    exclusions: &[S],
    name: impl Into<String>,
) -> Result<Configuration, PlanError> {
    let mut derived = Configuration::new(name).extending(Arc::clone(base));
    for exclusion in exclusions {
        let rule = ExclusionRule::parse(exclusion.as_ref())?;
        match &rule {
            ExclusionRule::Group { group } => tracing::info!(
                "excluding every artifact of group `{}` from `{}`",
                group,
                base.name()
            ),
            ExclusionRule::Module { group, module } => tracing::info!(
                "excluding `{}:{}` from `{}`",
                group,
                module,
                base.name()
            ),
        }
        derived = derived.excluding(rule);
    }
    Ok(derived)
}

/// Derive a filtered copy of `base` and register it in `container`.
///
/// Registration never overwrites; a clash on the derived name is reported as
/// a naming collision.
pub fn apply_excludes<S: AsRef<str>>(
    container: &mut ConfigurationContainer,
    base: &Arc<Configuration>,
    exclusions: &[S],
    namer: &ConfigurationNamer,
) -> Result<Arc<Configuration>, PlanError> {
    let name = namer.name_for(base.name());
    let derived = derive(base, exclusions, name)?;
    tracing::debug!(
        "derived `{}` from `{}` with {} exclusion(s)",
        derived.name(),
        base.name(),
        derived.excludes().len()
    );
    Ok(container.register(derived)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dependency::Coordinate;
    use crate::core::error::NamingCollisionError;

    fn runtime_classpath() -> Arc<Configuration> {
        Arc::new(
            Configuration::new("prestoRuntimeClasspath")
                .with_dependency("org.apache.hadoop:hadoop-common:2.7.0".parse().unwrap())
                .with_dependency("com.google.guava:guava:24.1".parse().unwrap()),
        )
    }

    #[test]
    fn test_derive_empty_is_identity() {
        let base = runtime_classpath();
        let derived = derive::<&str>(&base, &[], "copy").unwrap();
        assert_eq!(derived.all_dependencies(), base.all_dependencies());
        assert!(derived.all_excludes().is_empty());
        assert_eq!(derived.extends_from()[0].name(), "prestoRuntimeClasspath");
    }

    #[test]
    fn test_derive_leaves_base_untouched() {
        let base = runtime_classpath();
        let before = (*base).clone();

        let without_hadoop = derive(&base, &["org.apache.hadoop"], "a").unwrap();
        let without_guava = derive(&base, &["com.google.guava:guava"], "b").unwrap();

        assert_eq!(*base, before);
        assert!(base.excludes().is_empty());

        let hadoop: Coordinate = "org.apache.hadoop:hadoop-common".parse().unwrap();
        let guava: Coordinate = "com.google.guava:guava".parse().unwrap();
        assert!(without_hadoop.is_excluded(&hadoop));
        assert!(!without_hadoop.is_excluded(&guava));
        assert!(without_guava.is_excluded(&guava));
        assert!(!without_guava.is_excluded(&hadoop));
    }

    #[test]
    fn test_derive_rejects_malformed_exclusion() {
        let base = runtime_classpath();
        let err = derive(&base, &["a:b:c"], "bad").unwrap_err();
        assert!(matches!(err, PlanError::Configuration(_)));
    }

    #[test]
    fn test_apply_excludes_registers_named_copy() {
        let mut container = ConfigurationContainer::new();
        let base = container
            .register((*runtime_classpath()).clone())
            .unwrap();

        let first = apply_excludes(
            &mut container,
            &base,
            &["org.apache.hadoop"],
            &ConfigurationNamer::new("presto", 1),
        )
        .unwrap();

        assert_eq!(first.name(), "prestoRuntimeClasspath_presto_1");
        assert!(container.contains("prestoRuntimeClasspath_presto_1"));
        assert!(!Arc::ptr_eq(&first, &base));
    }

    #[test]
    fn test_apply_excludes_same_seed_collides() {
        let mut container = ConfigurationContainer::new();
        let base = container
            .register((*runtime_classpath()).clone())
            .unwrap();
        let namer = ConfigurationNamer::new("presto", 0);

        apply_excludes::<&str>(&mut container, &base, &[], &namer).unwrap();
        let err = apply_excludes::<&str>(&mut container, &base, &[], &namer).unwrap_err();
        assert!(matches!(
            err,
            PlanError::Collision(NamingCollisionError::Configuration { .. })
        ));
    }
}
