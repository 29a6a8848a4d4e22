//! Task graph execution.
//!
//! Tasks run wave by wave; every task in a wave only depends on tasks of
//! earlier waves, so a wave runs in parallel on a rayon pool. A failed task
//! takes its dependents down with it, everything else keeps going.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use rayon::prelude::*;
use serde::Serialize;

use crate::builder::archive::{stage_files, write_archive};
use crate::builder::jar::JarContents;
use crate::builder::plan::{ArchiveSpec, BundleSpec, CompileSpec, JarSpec, Task, TaskAction};
use crate::builder::project::Project;
use crate::builder::relocate::Relocator;
use crate::resolver::{resolve_configuration, DependencyResolver, ResolutionError};
use crate::util::diagnostic::Diagnostic;
use crate::util::hash::sha256_file;

/// A file or directory a task produced.
#[derive(Debug, Clone, Serialize)]
pub struct ProducedArtifact {
    pub task: String,
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
    /// Checksum of produced files; staged directories have none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

/// A task that failed.
#[derive(Debug, Clone, Serialize)]
pub struct TaskFailure {
    pub task: String,
    pub message: String,
    #[serde(skip)]
    pub diagnostic: Option<Diagnostic>,
}

/// A task that never ran because a dependency failed.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedTask {
    pub task: String,
    /// The failed task that caused the skip
    pub cause: String,
}

/// What happened when a graph was executed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExecutionReport {
    pub produced: Vec<ProducedArtifact>,
    /// External compile steps whose outputs were found
    pub checked: Vec<String>,
    pub failed: Vec<TaskFailure>,
    pub skipped: Vec<SkippedTask>,
}

impl ExecutionReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Runs a project's task graph.
pub struct Executor<'a> {
    project: &'a Project,
    resolver: &'a dyn DependencyResolver,
    jobs: Option<usize>,
}

impl<'a> Executor<'a> {
    pub fn new(project: &'a Project, resolver: &'a dyn DependencyResolver) -> Self {
        Executor {
            project,
            resolver,
            jobs: None,
        }
    }

    /// Limit the number of tasks running at once.
    pub fn jobs(mut self, jobs: Option<usize>) -> Self {
        self.jobs = jobs;
        self
    }

    /// Run every task of the project.
    ///
    /// Only errors in the graph itself are returned; task failures are
    /// recorded in the report.
    pub fn execute(&self) -> Result<ExecutionReport> {
        let start = Instant::now();
        let waves = self.project.tasks().waves()?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs.unwrap_or(0))
            .build()
            .context("failed to start worker pool")?;

        let mut report = ExecutionReport::default();
        // task name -> failed task it is blocked by
        let mut blocked: HashMap<String, String> = HashMap::new();

        for wave in waves {
            let mut runnable = Vec::new();
            for task in wave {
                match blocked.get(&task.name) {
                    Some(cause) => {
                        tracing::warn!("skipping `{}`: `{}` failed", task.name, cause);
                        report.skipped.push(SkippedTask {
                            task: task.name.clone(),
                            cause: cause.clone(),
                        });
                    }
                    None => runnable.push(task),
                }
            }

            let results: Vec<(&Task, Result<Option<ProducedArtifact>>)> = pool.install(|| {
                runnable
                    .par_iter()
                    .map(|task| (*task, self.run(task).and_then(|out| self.produced(task, out))))
                    .collect()
            });

            for (task, result) in results {
                match result {
                    Ok(Some(artifact)) => {
                        tracing::info!("produced {}", artifact.path.display());
                        report.produced.push(artifact);
                    }
                    Ok(None) => report.checked.push(task.name.clone()),
                    Err(e) => {
                        tracing::debug!("`{}` failed: {:#}", task.name, e);
                        for dependent in self.project.tasks().dependents_of(&task.name) {
                            blocked
                                .entry(dependent)
                                .or_insert_with(|| task.name.clone());
                        }
                        report.failed.push(TaskFailure {
                            task: task.name.clone(),
                            message: format!("{:#}", e),
                            diagnostic: e
                                .downcast_ref::<ResolutionError>()
                                .map(ResolutionError::to_diagnostic),
                        });
                    }
                }
            }
        }

        tracing::debug!(
            "executed {} task(s) in {:.2}s",
            self.project.tasks().len(),
            start.elapsed().as_secs_f64()
        );
        Ok(report)
    }

    fn run(&self, task: &Task) -> Result<Option<PathBuf>> {
        tracing::debug!("running `{}`", task.name);
        match &task.action {
            TaskAction::Compile(spec) => self.check_compiled(spec).map(|_| None),
            TaskAction::Jar(spec) => self
                .jar(spec)
                .with_context(|| format!("task `{}` failed", task.name))
                .map(|_| Some(spec.output.clone())),
            TaskAction::Bundle(spec) => self
                .bundle(spec)
                .with_context(|| format!("task `{}` failed", task.name))
                .map(|_| Some(spec.destination.clone())),
            TaskAction::Archive(spec) => self
                .archive(spec)
                .with_context(|| format!("task `{}` failed", task.name))
                .map(|_| Some(spec.output.clone())),
        }
    }

    /// Describe a task's output, hashing it when it is a file.
    fn produced(&self, task: &Task, output: Option<PathBuf>) -> Result<Option<ProducedArtifact>> {
        let Some(path) = output else {
            return Ok(None);
        };
        let sha256 = if path.is_file() {
            Some(
                sha256_file(&path)
                    .with_context(|| format!("task `{}` produced an unreadable file", task.name))?,
            )
        } else {
            None
        };
        Ok(Some(ProducedArtifact {
            task: task.name.clone(),
            path,
            classifier: task.classifier.clone(),
            sha256,
        }))
    }

    fn check_compiled(&self, spec: &CompileSpec) -> Result<()> {
        if !spec.classes_dir.is_dir() {
            bail!(
                "compiled classes for source set `{}` not found at {}",
                spec.source_set,
                spec.classes_dir.display()
            );
        }
        Ok(())
    }

    fn resolve(&self, configuration: &str) -> Result<Vec<PathBuf>> {
        let configuration = self.project.configurations().require(configuration)?;
        let artifacts = resolve_configuration(&configuration, self.resolver)?;
        Ok(artifacts.into_iter().map(|a| a.file).collect())
    }

    /// Manifest attributes of `spec`, layered over those it inherits.
    fn manifest(&self, spec: &JarSpec) -> BTreeMap<String, String> {
        let mut attributes = BTreeMap::new();
        if let Some(from) = &spec.manifest_from {
            if let Some(TaskAction::Jar(parent)) = self.project.tasks().get(from).map(|t| &t.action) {
                attributes.extend(self.manifest(parent));
            }
        }
        attributes.extend(spec.manifest.clone());
        attributes
    }

    fn jar(&self, spec: &JarSpec) -> Result<()> {
        let mut contents = JarContents::new(&spec.excludes)?;
        for dir in &spec.from_dirs {
            contents.add_dir(dir)?;
        }
        if let Some(configuration) = &spec.unpack_configuration {
            for file in self.resolve(configuration)? {
                contents.add_jar(&file)?;
            }
        }
        if let Some(relocation) = &spec.relocation {
            let relocator = Relocator::new(&relocation.prefix, &relocation.patterns)?;
            contents.relocate(&relocator)?;
        }
        contents.write(&spec.output, &self.manifest(spec))?;
        tracing::debug!(
            "wrote {} entries to {}",
            contents.len(),
            spec.output.display()
        );
        Ok(())
    }

    fn task_output(&self, name: &str) -> Result<&Path> {
        self.project
            .tasks()
            .get(name)
            .and_then(Task::output)
            .with_context(|| format!("task `{}` has no output", name))
    }

    fn bundle(&self, spec: &BundleSpec) -> Result<()> {
        let mut files = Vec::new();
        for task in &spec.from_tasks {
            files.push(self.task_output(task)?.to_path_buf());
        }
        for configuration in &spec.configurations {
            files.extend(self.resolve(configuration)?);
        }
        let staged = stage_files(&spec.destination, &files)?;
        tracing::debug!(
            "staged {} file(s) for distribution `{}`",
            staged,
            spec.distribution
        );
        Ok(())
    }

    fn archive(&self, spec: &ArchiveSpec) -> Result<()> {
        let staging = self.task_output(&spec.bundle_task)?;
        write_archive(staging, &spec.output, &spec.root_dir, spec.format)?;
        Ok(())
    }
}
