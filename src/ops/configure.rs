//! Wiring the catalog into a project.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::builder::artifacts::ARCHIVES_CONFIGURATION;
use crate::builder::plan::{CompileSpec, JarSpec, Task, TaskAction, TaskHandle};
use crate::builder::project::Project;
use crate::catalog::{Catalog, VersionManifest};
use crate::configuration::{Configuration, ConfigurationContainer, ConfigurationNamer};
use crate::core::dependency::{ConfigurationType, DependencyConfiguration};
use crate::core::error::PlanError;
use crate::core::platform::{Language, Platform};
use crate::core::source_set::{SourceSet, MAIN_SOURCE_SET, TEST_SOURCE_SET};
use crate::util::config::ProjectConfig;
use crate::util::context::ProjectContext;

use ConfigurationType::*;

/// What was configured for one platform.
#[derive(Debug, Clone, Serialize)]
pub struct ConfiguredPlatform {
    pub name: String,
    pub language: Language,
    pub wrapper_generator: String,
    /// Where the wrapper generator writes its sources
    pub generated_dir: PathBuf,
    /// Tasks producing the platform's final artifacts
    pub artifact_tasks: Vec<TaskHandle>,
}

/// A project with every selected platform configured.
#[derive(Debug, Clone)]
pub struct ProjectPlan {
    pub project: Project,
    pub platforms: Vec<ConfiguredPlatform>,
}

/// Create the shared source sets and every selected platform's source sets,
/// configurations and tasks.
///
/// Platforms are configured in catalog order and each platform's packaging
/// strategies in declaration order. Any error stops the pass.
pub fn configure_project<S: AsRef<str>>(
    project: &mut Project,
    catalog: &Catalog,
    selection: &[S],
) -> Result<Vec<ConfiguredPlatform>, PlanError> {
    let platforms = catalog.select(selection)?;

    let main = project.create_source_set(MAIN_SOURCE_SET).clone();
    let test = project.create_source_set(TEST_SOURCE_SET).clone();
    register_configurations(
        project.configurations_mut(),
        &main,
        catalog.main_dependencies(),
        |_| Vec::new(),
    )?;
    register_configurations(
        project.configurations_mut(),
        &test,
        catalog.test_dependencies(),
        |kind| vec![main.configuration_name(kind)],
    )?;
    configure_main_tasks(project, &main)?;

    let mut configured = Vec::with_capacity(platforms.len());
    for platform in platforms {
        configured.push(configure_platform(project, platform, &main, &test)?);
    }
    Ok(configured)
}

fn configure_platform(
    project: &mut Project,
    platform: &Platform,
    main: &SourceSet,
    test: &SourceSet,
) -> Result<ConfiguredPlatform, PlanError> {
    tracing::debug!("configuring platform `{}`", platform.name());
    let source_set = project.create_source_set(platform.name()).clone();
    let test_source_set = project
        .create_source_set(&platform.test_source_set_name())
        .clone();

    register_configurations(
        project.configurations_mut(),
        &source_set,
        platform.main_dependencies(),
        |kind| match kind {
            Implementation | AnnotationProcessor => vec![main.configuration_name(kind)],
            _ => Vec::new(),
        },
    )?;
    register_configurations(
        project.configurations_mut(),
        &test_source_set,
        platform.test_dependencies(),
        |kind| {
            vec![
                source_set.configuration_name(kind),
                test.configuration_name(kind),
            ]
        },
    )?;

    project
        .tasks_mut()
        .register(compile_task(&source_set))?;

    let mut artifact_tasks = Vec::new();
    for (index, packaging) in platform.packaging().iter().enumerate() {
        let namer = ConfigurationNamer::new(platform.name(), index);
        tracing::debug!("applying {} packaging to `{}`", packaging, platform.name());
        artifact_tasks.extend(packaging.configure(
            project,
            platform,
            &source_set,
            main,
            &namer,
        )?);
    }

    Ok(ConfiguredPlatform {
        name: platform.name().to_string(),
        language: platform.language(),
        wrapper_generator: platform.wrapper_generator().to_string(),
        generated_dir: source_set.generated_dir().to_path_buf(),
        artifact_tasks,
    })
}

/// Register a source set's four declarable configurations and its two
/// classpaths.
///
/// `parents` names, per bucket, the already registered configurations the
/// bucket extends.
fn register_configurations(
    container: &mut ConfigurationContainer,
    source_set: &SourceSet,
    dependencies: &[DependencyConfiguration],
    parents: impl Fn(ConfigurationType) -> Vec<String>,
) -> Result<(), PlanError> {
    let mut buckets = BTreeMap::new();
    for kind in ConfigurationType::DECLARABLE {
        let mut configuration = Configuration::new(source_set.configuration_name(kind))
            .with_dependencies(
                dependencies
                    .iter()
                    .filter(|d| d.bucket() == kind)
                    .map(|d| d.coordinate().clone()),
            );
        for parent in parents(kind) {
            configuration = configuration.extending(container.require(&parent)?);
        }
        buckets.insert(kind, container.register(configuration)?);
    }

    let classpath = |kind: ConfigurationType, from: [ConfigurationType; 2]| {
        from.iter().fold(
            Configuration::new(source_set.configuration_name(kind)),
            |config, parent| config.extending(Arc::clone(&buckets[parent])),
        )
    };
    container.register(classpath(CompileClasspath, [CompileOnly, Implementation]))?;
    container.register(classpath(RuntimeClasspath, [Implementation, RuntimeOnly]))?;
    Ok(())
}

fn compile_task(source_set: &SourceSet) -> Task {
    Task::new(
        source_set.classes_task_name(),
        TaskAction::Compile(CompileSpec {
            source_set: source_set.name().to_string(),
            classes_dir: source_set.classes_dir().to_path_buf(),
        }),
    )
    .with_description(format!("Checks the compiled {} classes", source_set.name()))
}

/// `classes` and `jar` for the main source set. The main jar is published
/// without a classifier.
fn configure_main_tasks(project: &mut Project, main: &SourceSet) -> Result<(), PlanError> {
    project.tasks_mut().register(compile_task(main))?;

    let output = project
        .libs_dir()
        .join(project.archive_file_name(None, "jar"));
    let mut spec = JarSpec::of_dirs(output.clone(), main.output_dirs());
    spec.manifest.insert(
        "Implementation-Title".to_string(),
        project.name().to_string(),
    );
    spec.manifest.insert(
        "Implementation-Version".to_string(),
        project.version().to_string(),
    );

    let jar = Task::new(main.jar_task_name(), TaskAction::Jar(spec))
        .with_description("Assembles a jar archive containing the main classes")
        .depends_on(main.classes_task_name());
    let handle = project.tasks_mut().register(jar)?;
    project
        .artifacts_mut()
        .add(ARCHIVES_CONFIGURATION, &handle, None, "jar", output)?;
    Ok(())
}

/// Build the catalog from the project's version manifest.
pub fn load_catalog(ctx: &ProjectContext) -> Result<Catalog> {
    let manifest_path = ctx.config.manifest_path(&ctx.root);
    let manifest = VersionManifest::load(&manifest_path)
        .with_context(|| format!("failed to load versions from {}", manifest_path.display()))?;
    Ok(Catalog::from_manifest(&manifest)?)
}

/// Load the catalog and configure a project from `Quay.toml`.
///
/// `platforms` overrides `[platforms] active` when non-empty.
pub fn plan_project(ctx: &ProjectContext, platforms: &[String]) -> Result<ProjectPlan> {
    let config = &ctx.config;
    let ProjectConfig { name, version } = config
        .project
        .clone()
        .context("`Quay.toml` has no [project] table")?;

    let catalog = load_catalog(ctx)?;

    let mut project = Project::new(name, version, &ctx.root, config.build_dir(&ctx.root))
        .with_tar_compression(config.build.tar_compression.unwrap_or_default());
    if let Some(prefix) = &config.build.shade_prefix {
        project = project.with_shade_prefix(prefix);
    }

    let selection = if platforms.is_empty() {
        config.platforms.active.as_slice()
    } else {
        platforms
    };
    let configured = configure_project(&mut project, &catalog, selection)?;
    tracing::info!(
        "configured {} platform(s), {} task(s)",
        configured.len(),
        project.tasks().len()
    );

    Ok(ProjectPlan {
        project,
        platforms: configured,
    })
}
