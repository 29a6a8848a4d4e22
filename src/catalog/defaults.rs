//! The built-in catalog: presto, hive and spark.
//!
//! Coordinates are fixed; versions come from the manifest key
//! `<name>-version` of the component they belong to.

use crate::catalog::versions::VersionManifest;
use crate::core::dependency::{ConfigurationType, Coordinate, DependencyConfiguration};
use crate::core::error::ConfigurationError;
use crate::core::platform::{Language, Platform, WrapperGeneratorRef};
use crate::packaging::{DistributionPackaging, Packaging, ShadedJarPackaging};

use ConfigurationType::*;

const TRANSPORT: &str = "transport";

/// Declares dependencies with versions taken from one manifest.
struct Declarer<'a> {
    manifest: &'a VersionManifest,
}

impl Declarer<'_> {
    fn declare(
        &self,
        bucket: ConfigurationType,
        module: &str,
        version_of: &str,
    ) -> Result<DependencyConfiguration, ConfigurationError> {
        let coordinate: Coordinate = module.parse()?;
        let version = self.manifest.version_of(version_of)?;
        Ok(DependencyConfiguration::new(
            bucket,
            coordinate.with_version(version),
        ))
    }

    fn declare_classified(
        &self,
        bucket: ConfigurationType,
        module: &str,
        version_of: &str,
        classifier: &str,
    ) -> Result<DependencyConfiguration, ConfigurationError> {
        let dependency = self.declare(bucket, module, version_of)?;
        Ok(DependencyConfiguration::new(
            bucket,
            dependency.coordinate().clone().with_classifier(classifier),
        ))
    }
}

/// Dependencies of the shared `main` source set.
pub fn main_dependencies(
    manifest: &VersionManifest,
) -> Result<Vec<DependencyConfiguration>, ConfigurationError> {
    let d = Declarer { manifest };
    Ok(vec![
        d.declare(Implementation, "com.linkedin.transport:transportable-udfs-api", TRANSPORT)?,
        d.declare(
            AnnotationProcessor,
            "com.linkedin.transport:transportable-udfs-annotation-processor",
            TRANSPORT,
        )?,
        // IDE integration wants a scala-library even without scala sources
        d.declare(CompileOnly, "org.scala-lang:scala-library", "scala")?,
    ])
}

/// Dependencies of the shared `test` source set.
pub fn test_dependencies(
    manifest: &VersionManifest,
) -> Result<Vec<DependencyConfiguration>, ConfigurationError> {
    let d = Declarer { manifest };
    Ok(vec![
        d.declare(
            Implementation,
            "com.linkedin.transport:transportable-udfs-test-api",
            TRANSPORT,
        )?,
        d.declare(
            RuntimeOnly,
            "com.linkedin.transport:transportable-udfs-test-generic",
            TRANSPORT,
        )?,
    ])
}

/// Every built-in platform, in catalog order.
pub fn platforms(manifest: &VersionManifest) -> Result<Vec<Platform>, ConfigurationError> {
    Ok(vec![presto(manifest)?, hive(manifest)?, spark(manifest)?])
}

fn presto(manifest: &VersionManifest) -> Result<Platform, ConfigurationError> {
    let d = Declarer { manifest };
    Platform::new(
        "presto",
        Language::Java,
        WrapperGeneratorRef::new("PrestoWrapperGenerator"),
        vec![
            d.declare(
                Implementation,
                "com.linkedin.transport:transportable-udfs-presto",
                TRANSPORT,
            )?,
            d.declare(CompileOnly, "io.prestosql:presto-main", "presto")?,
        ],
        vec![
            d.declare(
                RuntimeOnly,
                "com.linkedin.transport:transportable-udfs-test-presto",
                TRANSPORT,
            )?,
            // already transitive through transportable-udfs-test-presto, but
            // some repository converters drop classified dependencies
            d.declare_classified(RuntimeOnly, "io.prestosql:presto-main", "presto", "tests")?,
        ],
        vec![
            Packaging::from(DistributionPackaging::default()),
            Packaging::from(DistributionPackaging::new(
                "WithoutHadoop",
                ["org.apache.hadoop"],
            )),
        ],
    )
}

fn hive(manifest: &VersionManifest) -> Result<Platform, ConfigurationError> {
    let d = Declarer { manifest };
    Platform::new(
        "hive",
        Language::Java,
        WrapperGeneratorRef::new("HiveWrapperGenerator"),
        vec![
            d.declare(
                Implementation,
                "com.linkedin.transport:transportable-udfs-hive",
                TRANSPORT,
            )?,
            d.declare(CompileOnly, "org.apache.hive:hive-exec", "hive")?,
        ],
        vec![d.declare(
            RuntimeOnly,
            "com.linkedin.transport:transportable-udfs-test-hive",
            TRANSPORT,
        )?],
        vec![Packaging::from(ShadedJarPackaging::new([
            "org.apache.hadoop",
            "org.apache.hive",
        ]))],
    )
}

fn spark(manifest: &VersionManifest) -> Result<Platform, ConfigurationError> {
    let d = Declarer { manifest };
    Platform::new(
        "spark",
        Language::Scala,
        WrapperGeneratorRef::new("SparkWrapperGenerator"),
        vec![
            d.declare(
                Implementation,
                "com.linkedin.transport:transportable-udfs-spark",
                TRANSPORT,
            )?,
            d.declare(CompileOnly, "org.apache.spark:spark-sql_2.11", "spark")?,
        ],
        vec![d.declare(
            RuntimeOnly,
            "com.linkedin.transport:transportable-udfs-test-spark",
            TRANSPORT,
        )?],
        vec![Packaging::from(
            ShadedJarPackaging::new(["org.apache.hadoop", "org.apache.spark"])
                .relocating(["com.linkedin.transport.spark.**"]),
        )],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest() -> VersionManifest {
        VersionManifest::from_pairs([
            ("transport-version", "0.0.80"),
            ("scala-version", "2.11.8"),
            ("presto-version", "333"),
            ("hive-version", "1.2.2"),
            ("spark-version", "2.3.0"),
        ])
    }

    #[test]
    fn test_main_dependencies() {
        let deps = main_dependencies(&manifest()).unwrap();
        let rendered: Vec<_> = deps.iter().map(|d| d.to_string()).collect();
        assert_eq!(
            rendered,
            vec![
                "implementation com.linkedin.transport:transportable-udfs-api:0.0.80",
                "annotationProcessor com.linkedin.transport:transportable-udfs-annotation-processor:0.0.80",
                "compileOnly org.scala-lang:scala-library:2.11.8",
            ]
        );
    }

    #[test]
    fn test_presto_test_dependency_keeps_classifier() {
        let presto = presto(&manifest()).unwrap();
        let classified = &presto.test_dependencies()[1];
        assert_eq!(classified.bucket(), RuntimeOnly);
        assert_eq!(
            classified.coordinate().to_string(),
            "io.prestosql:presto-main:333:tests"
        );
    }

    #[test]
    fn test_platform_packaging() {
        let platforms = platforms(&manifest()).unwrap();
        let names: Vec<_> = platforms.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["presto", "hive", "spark"]);

        let presto = &platforms[0];
        assert_eq!(presto.packaging().len(), 2);
        assert_eq!(
            presto.packaging()[1],
            Packaging::from(DistributionPackaging::new("WithoutHadoop", ["org.apache.hadoop"]))
        );

        let spark = &platforms[2];
        assert_eq!(spark.language(), Language::Scala);
        match &spark.packaging()[0] {
            Packaging::ShadedJar(p) => {
                assert_eq!(p.excluded_groups(), ["org.apache.hadoop", "org.apache.spark"]);
                assert_eq!(p.relocation_patterns(), ["com.linkedin.transport.spark.**"]);
            }
            other => panic!("unexpected packaging {}", other),
        }
    }

    #[test]
    fn test_missing_platform_version() {
        let manifest = VersionManifest::from_pairs([
            ("transport-version", "0.0.80"),
            ("scala-version", "2.11.8"),
            ("presto-version", "333"),
            ("spark-version", "2.3.0"),
        ]);
        let err = platforms(&manifest).unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::MissingVersionKey { platform, key }
                if platform == "hive" && key == "hive-version"
        ));
    }
}
