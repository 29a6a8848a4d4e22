//! Shaded (fat) jar packaging.

use std::collections::BTreeMap;

use crate::builder::artifacts::ARCHIVES_CONFIGURATION;
use crate::builder::jar::SIGNATURE_EXCLUDES;
use crate::builder::plan::{JarSpec, RelocationSpec, Task, TaskAction, TaskHandle};
use crate::builder::project::Project;
use crate::configuration::{apply_excludes, ConfigurationNamer};
use crate::core::error::PlanError;
use crate::core::platform::Platform;
use crate::core::source_set::SourceSet;
use crate::packaging::runtime_classpath;

/// Bundles the platform's classes, the main classes and every non-excluded
/// runtime dependency into a single jar.
///
/// Classes matching `relocation_patterns` are moved under a package prefix
/// so they cannot clash with copies already present in the target runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShadedJarPackaging {
    excluded_groups: Vec<String>,
    relocation_patterns: Vec<String>,
    shade_prefix: Option<String>,
}

impl ShadedJarPackaging {
    pub fn new(excluded_groups: impl IntoIterator<Item = impl Into<String>>) -> Self {
        ShadedJarPackaging {
            excluded_groups: excluded_groups.into_iter().map(Into::into).collect(),
            relocation_patterns: Vec::new(),
            shade_prefix: None,
        }
    }

    /// Relocate classes matching these dotted patterns.
    pub fn relocating(mut self, patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.relocation_patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Override the project's shade prefix.
    pub fn with_shade_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.shade_prefix = Some(prefix.into());
        self
    }

    pub fn excluded_groups(&self) -> &[String] {
        &self.excluded_groups
    }

    pub fn relocation_patterns(&self) -> &[String] {
        &self.relocation_patterns
    }

    pub fn configure(
        &self,
        project: &mut Project,
        platform: &Platform,
        platform_source_set: &SourceSet,
        main_source_set: &SourceSet,
        namer: &ConfigurationNamer,
    ) -> Result<Vec<TaskHandle>, PlanError> {
        let base = runtime_classpath(project, platform_source_set)?;
        let filtered = apply_excludes(
            project.configurations_mut(),
            &base,
            &self.excluded_groups,
            namer,
        )?;

        let relocation = if self.relocation_patterns.is_empty() {
            None
        } else {
            Some(RelocationSpec {
                prefix: self
                    .shade_prefix
                    .clone()
                    .unwrap_or_else(|| project.shade_prefix()),
                patterns: self.relocation_patterns.clone(),
            })
        };

        let classifier = platform.name();
        let output = project
            .libs_dir()
            .join(project.archive_file_name(Some(classifier), "jar"));
        let main_jar = main_source_set.jar_task_name();
        let mut from_dirs = platform_source_set.output_dirs();
        from_dirs.extend(main_source_set.output_dirs());

        let spec = JarSpec {
            output: output.clone(),
            from_dirs,
            unpack_configuration: Some(filtered.name().to_string()),
            manifest: BTreeMap::new(),
            manifest_from: Some(main_jar.clone()),
            excludes: SIGNATURE_EXCLUDES.iter().map(|s| s.to_string()).collect(),
            relocation,
        };

        let task = Task::new(
            platform_source_set.task_name(Some("shade"), Some("jar")),
            TaskAction::Jar(spec),
        )
        .with_description(format!(
            "Assembles a shaded jar archive of the {} classes and their runtime dependencies",
            platform.name()
        ))
        .depends_on(platform_source_set.classes_task_name())
        .depends_on(main_jar)
        .with_classifier(classifier);

        let handle = project.tasks_mut().register(task)?;
        project.artifacts_mut().add(
            ARCHIVES_CONFIGURATION,
            &handle,
            Some(classifier),
            "jar",
            output,
        )?;
        Ok(vec![handle])
    }
}
