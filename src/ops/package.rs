//! Implementation of `quay package`.

use anyhow::{Context, Result};

use crate::builder::executor::{ExecutionReport, Executor};
use crate::ops::configure::{plan_project, ConfiguredPlatform};
use crate::resolver::LocalRepository;
use crate::util::context::ProjectContext;

/// Options for the package command.
#[derive(Debug, Clone, Default)]
pub struct PackageOptions {
    /// Platforms to package (empty = `[platforms] active`, then every platform)
    pub platforms: Vec<String>,

    /// Maximum number of tasks running at once
    pub jobs: Option<usize>,
}

/// Outcome of a package run.
#[derive(Debug)]
pub struct PackageResult {
    pub platforms: Vec<ConfiguredPlatform>,
    pub report: ExecutionReport,
}

/// Configure the project and run its whole task graph.
///
/// Configuration problems abort before anything runs. Task failures are
/// reported in the result instead.
pub fn package(ctx: &ProjectContext, opts: &PackageOptions) -> Result<PackageResult> {
    let plan = plan_project(ctx, &opts.platforms)?;

    let repository_path = ctx.config.repository_path(&ctx.root);
    let repository = LocalRepository::open(&repository_path)
        .with_context(|| format!("failed to open repository {}", repository_path.display()))?;

    let jobs = opts.jobs.or(ctx.config.build.jobs);
    tracing::debug!(
        "packaging with {} module(s) available, jobs = {:?}",
        repository.len(),
        jobs
    );
    let report = Executor::new(&plan.project, &repository)
        .jobs(jobs)
        .execute()?;

    Ok(PackageResult {
        platforms: plan.platforms,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    use tempfile::TempDir;

    use crate::test_support::{jar_entries, minimal_class_bytes, write_jar};
    use crate::util::config::load_config;

    const MANIFEST: &str = "\
transport-version=0.0.80
scala-version=2.11.8
presto-version=333
hive-version=1.2.2
spark-version=2.3.0
";

    fn write(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    /// A hive-only project whose repository holds the hive runtime classpath.
    fn hive_project(dir: &Path) -> ProjectContext {
        write(
            &dir.join("Quay.toml"),
            "[project]\nname = \"example-udfs\"\nversion = \"1.0.0\"\n\n[platforms]\nactive = [\"hive\"]\n",
        );
        write(&dir.join("version-info.properties"), MANIFEST);

        let repo = dir.join("repo");
        write_jar(
            &repo.join("transportable-udfs-api-0.0.80.jar"),
            &[("com/linkedin/transport/api/StdUDF.class", b"api".as_slice())],
        );
        write_jar(
            &repo.join("transportable-udfs-hive-0.0.80.jar"),
            &[("com/linkedin/transport/hive/StdUdfWrapper.class", b"hive".as_slice())],
        );
        write(
            &repo.join("index.toml"),
            r#"
[[artifact]]
coordinate = "com.linkedin.transport:transportable-udfs-api:0.0.80"
file = "transportable-udfs-api-0.0.80.jar"

[[artifact]]
coordinate = "com.linkedin.transport:transportable-udfs-hive:0.0.80"
file = "transportable-udfs-hive-0.0.80.jar"
dependencies = ["com.linkedin.transport:transportable-udfs-api:0.0.80"]
"#,
        );

        let classes = dir.join("build/classes");
        fs::create_dir_all(classes.join("main/com/example")).unwrap();
        fs::write(
            classes.join("main/com/example/Udf.class"),
            minimal_class_bytes("com/example/Udf", &[]),
        )
        .unwrap();
        fs::create_dir_all(classes.join("hive/com/example/hive")).unwrap();
        fs::write(
            classes.join("hive/com/example/hive/UdfWrapper.class"),
            minimal_class_bytes("com/example/hive/UdfWrapper", &["com/example/Udf"]),
        )
        .unwrap();

        ProjectContext {
            root: dir.to_path_buf(),
            config: load_config(None, &dir.join("Quay.toml")).unwrap(),
        }
    }

    #[test]
    fn test_package_hive_shaded_jar() {
        let tmp = TempDir::new().unwrap();
        let ctx = hive_project(tmp.path());

        let result = package(&ctx, &PackageOptions::default()).unwrap();
        assert!(result.report.is_success(), "{:?}", result.report.failed);
        assert_eq!(result.platforms.len(), 1);

        let shaded = tmp.path().join("build/libs/example-udfs-1.0.0-hive.jar");
        let entries = jar_entries(&shaded);
        assert!(entries.contains(&"com/example/hive/UdfWrapper.class".to_string()));
        assert!(entries.contains(&"com/example/Udf.class".to_string()));
        assert!(entries.contains(&"com/linkedin/transport/api/StdUDF.class".to_string()));
        assert!(entries.contains(&"com/linkedin/transport/hive/StdUdfWrapper.class".to_string()));
        assert!(result
            .report
            .produced
            .iter()
            .any(|a| a.path == shaded && a.sha256.is_some()));
    }

    #[test]
    fn test_missing_platform_classes_skip_dependents() {
        let tmp = TempDir::new().unwrap();
        let ctx = hive_project(tmp.path());
        fs::remove_dir_all(tmp.path().join("build/classes/hive")).unwrap();

        let result = package(&ctx, &PackageOptions::default()).unwrap();
        assert!(!result.report.is_success());
        assert_eq!(result.report.failed[0].task, "hiveClasses");
        assert!(result.report.skipped.iter().any(|s| s.task == "shadeHiveJar"));
        // the main jar does not depend on hive classes
        assert!(tmp.path().join("build/libs/example-udfs-1.0.0.jar").is_file());
    }

    #[test]
    fn test_missing_repository_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let ctx = hive_project(tmp.path());
        fs::remove_file(tmp.path().join("repo/index.toml")).unwrap();

        let err = package(&ctx, &PackageOptions::default()).unwrap_err();
        assert!(format!("{:#}", err).contains("failed to open repository"));
    }
}
