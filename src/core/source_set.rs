//! Source sets and their naming conventions.
//!
//! Every task and configuration name quay produces is derived from a source
//! set name, so the conventions here are what keep platforms apart.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::dependency::ConfigurationType;

/// Name of the platform-neutral source set.
pub const MAIN_SOURCE_SET: &str = "main";

/// Name of the platform-neutral test source set.
pub const TEST_SOURCE_SET: &str = "test";

/// A named unit of compilation with its own outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceSet {
    name: String,
    classes_dir: PathBuf,
    resources_dir: PathBuf,
    generated_dir: PathBuf,
}

impl SourceSet {
    /// Create a source set using the conventional layout under a project.
    pub fn new(name: impl Into<String>, project_dir: &Path, build_dir: &Path) -> Self {
        let name = name.into();
        SourceSet {
            classes_dir: build_dir.join("classes").join(&name),
            resources_dir: project_dir.join("src").join(&name).join("resources"),
            generated_dir: build_dir.join("generatedWrappers").join(&name),
            name,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Directory the compile step writes class files to.
    pub fn classes_dir(&self) -> &Path {
        &self.classes_dir
    }

    pub fn resources_dir(&self) -> &Path {
        &self.resources_dir
    }

    /// Directory the wrapper generator writes platform sources to.
    pub fn generated_dir(&self) -> &Path {
        &self.generated_dir
    }

    /// Compiled classes followed by resources.
    pub fn output_dirs(&self) -> Vec<PathBuf> {
        vec![self.classes_dir.clone(), self.resources_dir.clone()]
    }

    pub fn is_main(&self) -> bool {
        self.name == MAIN_SOURCE_SET
    }

    /// Build a task name from an optional verb and target.
    ///
    /// `main` is left out of names, so `task_name(Some("shade"), Some("jar"))`
    /// is `shadeJar` for `main` and `shadeHiveJar` for `hive`.
    pub fn task_name(&self, verb: Option<&str>, target: Option<&str>) -> String {
        let mut parts: Vec<&str> = Vec::new();
        if let Some(verb) = verb {
            parts.push(verb);
        }
        if !self.is_main() {
            parts.push(&self.name);
        }
        if let Some(target) = target {
            parts.push(target);
        }
        camel_case(&parts)
    }

    /// Name of the task compiling this source set.
    pub fn classes_task_name(&self) -> String {
        self.task_name(None, Some("classes"))
    }

    /// Name of the task jarring this source set's output.
    pub fn jar_task_name(&self) -> String {
        self.task_name(None, Some("jar"))
    }

    /// Name of this source set's configuration of the given kind.
    pub fn configuration_name(&self, kind: ConfigurationType) -> String {
        if self.is_main() {
            kind.base_name().to_string()
        } else {
            format!("{}{}", self.name, capitalize(kind.base_name()))
        }
    }
}

/// Uppercase the first character.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Join parts into lower camel case; the first part keeps its case.
fn camel_case(parts: &[&str]) -> String {
    let mut out = String::new();
    for part in parts.iter().filter(|p| !p.is_empty()) {
        if out.is_empty() {
            out.push_str(part);
        } else {
            out.push_str(&capitalize(part));
        }
    }
    out
}
