//! Thin jar packaging.

use crate::builder::artifacts::ARCHIVES_CONFIGURATION;
use crate::builder::plan::{JarSpec, Task, TaskAction, TaskHandle};
use crate::builder::project::Project;
use crate::configuration::ConfigurationNamer;
use crate::core::error::PlanError;
use crate::core::platform::Platform;
use crate::core::source_set::SourceSet;

/// Packages only the platform's own classes and resources. The target
/// runtime is expected to provide every dependency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThinJarPackaging;

impl ThinJarPackaging {
    pub fn configure(
        &self,
        project: &mut Project,
        platform: &Platform,
        platform_source_set: &SourceSet,
        _main_source_set: &SourceSet,
        _namer: &ConfigurationNamer,
    ) -> Result<Vec<TaskHandle>, PlanError> {
        let classifier = format!("{}Thin", platform.name());
        let output = project
            .libs_dir()
            .join(project.archive_file_name(Some(&classifier), "jar"));

        let task = Task::new(
            platform_source_set.task_name(None, Some("thinJar")),
            TaskAction::Jar(JarSpec::of_dirs(
                output.clone(),
                platform_source_set.output_dirs(),
            )),
        )
        .with_description(format!(
            "Assembles a thin jar archive containing the {} classes",
            platform.name()
        ))
        .depends_on(platform_source_set.classes_task_name())
        .with_classifier(classifier.as_str());

        let handle = project.tasks_mut().register(task)?;
        project.artifacts_mut().add(
            ARCHIVES_CONFIGURATION,
            &handle,
            Some(&classifier),
            "jar",
            output,
        )?;
        Ok(vec![handle])
    }
}
