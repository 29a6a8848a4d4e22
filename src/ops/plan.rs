//! Implementation of `quay plan`.

use std::fmt::Write as _;

use anyhow::Result;
use serde::Serialize;

use crate::builder::artifacts::PublishedArtifact;
use crate::builder::plan::{Task, TaskAction};
use crate::configuration::ConfigurationSummary;
use crate::ops::configure::{ConfiguredPlatform, ProjectPlan};

/// Serializable view of a configured project.
#[derive(Debug, Serialize)]
pub struct PlanSummary<'a> {
    pub project: &'a str,
    pub version: &'a str,
    pub platforms: &'a [ConfiguredPlatform],
    /// Tasks in execution order
    pub tasks: Vec<&'a Task>,
    pub configurations: Vec<ConfigurationSummary<'a>>,
    pub artifacts: Vec<&'a PublishedArtifact>,
}

impl<'a> PlanSummary<'a> {
    pub fn new(plan: &'a ProjectPlan) -> Result<Self> {
        let project = &plan.project;
        let mut configurations: Vec<ConfigurationSummary<'a>> = project
            .configurations()
            .iter()
            .map(|c| ConfigurationSummary::from(c.as_ref()))
            .collect();
        configurations.sort_by(|a, b| a.name.cmp(b.name));

        Ok(PlanSummary {
            project: project.name(),
            version: project.version(),
            platforms: &plan.platforms,
            tasks: project.tasks().execution_order()?,
            configurations,
            artifacts: project.artifacts().iter().collect(),
        })
    }
}

fn action_kind(action: &TaskAction) -> &'static str {
    match action {
        TaskAction::Compile(_) => "compile",
        TaskAction::Jar(_) => "jar",
        TaskAction::Bundle(_) => "bundle",
        TaskAction::Archive(_) => "archive",
    }
}

/// Format a plan for the terminal.
pub fn format_plan(summary: &PlanSummary<'_>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} {}", summary.project, summary.version);

    for platform in summary.platforms {
        let _ = writeln!(
            out,
            "\nplatform {} ({}, wrappers from {})",
            platform.name, platform.language, platform.wrapper_generator
        );
        for task in &platform.artifact_tasks {
            let _ = writeln!(out, "  -> {}", task);
        }
    }

    let _ = writeln!(out, "\ntasks:");
    for task in &summary.tasks {
        let _ = write!(out, "  {:<36} {:<8}", task.name, action_kind(&task.action));
        if !task.depends_on.is_empty() {
            let deps: Vec<_> = task.depends_on.iter().map(String::as_str).collect();
            let _ = write!(out, " after {}", deps.join(", "));
        }
        out.push('\n');
    }

    let _ = writeln!(out, "\nartifacts:");
    for artifact in &summary.artifacts {
        let _ = writeln!(out, "  {}", artifact.file.display());
    }
    out
}
