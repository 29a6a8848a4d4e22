//! Distribution packaging: a thin jar shipped next to the main jar and its
//! runtime dependencies in tar and zip archives.

use crate::builder::artifacts::ARCHIVES_CONFIGURATION;
use crate::builder::plan::{
    ArchiveFormat, ArchiveSpec, BundleSpec, JarSpec, Task, TaskAction, TaskHandle,
};
use crate::builder::project::Project;
use crate::configuration::{apply_excludes, ConfigurationNamer};
use crate::core::error::PlanError;
use crate::core::platform::Platform;
use crate::core::source_set::{capitalize, SourceSet};
use crate::packaging::runtime_classpath;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistributionPackaging {
    classifier_suffix: String,
    excluded_dependencies: Vec<String>,
}

impl DistributionPackaging {
    /// A distribution whose artifacts are classified `<platform><suffix>`
    /// and which leaves out `excluded_dependencies`.
    pub fn new(
        classifier_suffix: impl Into<String>,
        excluded_dependencies: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        DistributionPackaging {
            classifier_suffix: classifier_suffix.into(),
            excluded_dependencies: excluded_dependencies.into_iter().map(Into::into).collect(),
        }
    }

    pub fn classifier_suffix(&self) -> &str {
        &self.classifier_suffix
    }

    pub fn excluded_dependencies(&self) -> &[String] {
        &self.excluded_dependencies
    }

    pub fn configure(
        &self,
        project: &mut Project,
        platform: &Platform,
        platform_source_set: &SourceSet,
        main_source_set: &SourceSet,
        namer: &ConfigurationNamer,
    ) -> Result<Vec<TaskHandle>, PlanError> {
        let pwc = format!("{}{}", platform.name(), self.classifier_suffix);

        let thin_classifier = format!("{}Thin", pwc);
        let thin_output = project
            .libs_dir()
            .join(project.archive_file_name(Some(&thin_classifier), "jar"));
        let thin = Task::new(
            format!("{}ThinJar", pwc),
            TaskAction::Jar(JarSpec::of_dirs(
                thin_output,
                platform_source_set.output_dirs(),
            )),
        )
        .with_description(format!(
            "Assembles a thin jar archive containing the {} classes to be included in the {} distribution",
            platform.name(),
            pwc
        ))
        .depends_on(platform_source_set.classes_task_name())
        .with_classifier(thin_classifier);
        let thin = project.tasks_mut().register(thin)?;

        let base = runtime_classpath(project, platform_source_set)?;
        let filtered = apply_excludes(
            project.configurations_mut(),
            &base,
            &self.excluded_dependencies,
            namer,
        )?;

        let main_jar = main_source_set.jar_task_name();
        let install = Task::new(
            format!("install{}Dist", capitalize(&pwc)),
            TaskAction::Bundle(BundleSpec {
                distribution: pwc.clone(),
                destination: project.install_dir(&pwc),
                from_tasks: vec![thin.name().to_string(), main_jar.clone()],
                configurations: vec![filtered.name().to_string()],
            }),
        )
        .with_description(format!(
            "Installs the {} distribution as a directory of jars",
            pwc
        ))
        .depends_on(thin.name())
        .depends_on(main_jar);
        let install = project.tasks_mut().register(install)?;

        let mut handles = Vec::with_capacity(2);
        for (suffix, format) in [
            ("DistTar", ArchiveFormat::Tar(project.tar_compression())),
            ("DistZip", ArchiveFormat::Zip),
        ] {
            let extension = format.extension();
            let output = project
                .distributions_dir()
                .join(project.archive_file_name(Some(&pwc), extension));
            let task = Task::new(
                format!("{}{}", pwc, suffix),
                TaskAction::Archive(ArchiveSpec {
                    output: output.clone(),
                    bundle_task: install.name().to_string(),
                    root_dir: project.archive_root_dir(),
                    format,
                }),
            )
            .with_description(format!("Bundles the {} distribution as a {}", pwc, extension))
            .depends_on(install.name())
            .with_classifier(pwc.as_str());

            let handle = project.tasks_mut().register(task)?;
            project.artifacts_mut().add(
                ARCHIVES_CONFIGURATION,
                &handle,
                Some(&pwc),
                extension,
                output,
            )?;
            handles.push(handle);
        }
        Ok(handles)
    }
}
