//! Task graph.
//!
//! Packaging strategies describe work as named tasks with explicit
//! dependency edges. Nothing here runs anything; the executor walks the
//! graph later and only relies on the declared edges for ordering.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};

use crate::core::error::{NamingCollisionError, PlanError};

/// Handle to a registered task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TaskHandle(String);

impl TaskHandle {
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A described step.
#[derive(Debug, Clone, Serialize)]
pub struct Task {
    /// Unique task name
    pub name: String,

    /// Human readable summary
    pub description: String,

    /// Tasks that must finish first
    pub depends_on: BTreeSet<String>,

    /// Classifier of the produced artifact, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,

    /// What the task does
    pub action: TaskAction,
}

impl Task {
    /// Create a task with no dependencies.
    pub fn new(name: impl Into<String>, action: TaskAction) -> Self {
        Task {
            name: name.into(),
            description: String::new(),
            depends_on: BTreeSet::new(),
            classifier: None,
            action,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn depends_on(mut self, task: impl Into<String>) -> Self {
        self.depends_on.insert(task.into());
        self
    }

    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = Some(classifier.into());
        self
    }

    /// The file or directory this task produces.
    pub fn output(&self) -> Option<&Path> {
        match &self.action {
            TaskAction::Compile(_) => None,
            TaskAction::Jar(spec) => Some(&spec.output),
            TaskAction::Bundle(spec) => Some(&spec.destination),
            TaskAction::Archive(spec) => Some(&spec.output),
        }
    }
}

/// The work a task performs.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskAction {
    /// Compilation done by the host build; only its outputs are checked
    Compile(CompileSpec),
    /// Write a jar
    Jar(JarSpec),
    /// Stage files into a distribution directory
    Bundle(BundleSpec),
    /// Pack a staged distribution into an archive
    Archive(ArchiveSpec),
}

/// An external compilation step.
#[derive(Debug, Clone, Serialize)]
pub struct CompileSpec {
    /// Source set being compiled
    pub source_set: String,

    /// Directory the compiled classes must appear in
    pub classes_dir: PathBuf,
}

/// A jar to write.
#[derive(Debug, Clone, Serialize)]
pub struct JarSpec {
    /// Output jar
    pub output: PathBuf,

    /// Directories copied in as-is (missing ones are skipped)
    pub from_dirs: Vec<PathBuf>,

    /// Configuration whose resolved artifacts are unpacked into the jar
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unpack_configuration: Option<String>,

    /// Manifest attributes
    pub manifest: BTreeMap<String, String>,

    /// Jar task whose manifest attributes are inherited
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest_from: Option<String>,

    /// Entry patterns never copied
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub excludes: Vec<String>,

    /// Class relocation applied to every class entry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relocation: Option<RelocationSpec>,
}

impl JarSpec {
    /// A jar of some directories and nothing else.
    pub fn of_dirs(output: PathBuf, from_dirs: Vec<PathBuf>) -> Self {
        JarSpec {
            output,
            from_dirs,
            unpack_configuration: None,
            manifest: BTreeMap::new(),
            manifest_from: None,
            excludes: Vec::new(),
            relocation: None,
        }
    }
}

/// Relocation settings for a shaded jar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelocationSpec {
    /// Package prefix relocated classes move under
    pub prefix: String,

    /// Dotted class-name patterns (`*` one segment, `**` any depth)
    pub patterns: Vec<String>,
}

/// A staged distribution directory.
#[derive(Debug, Clone, Serialize)]
pub struct BundleSpec {
    /// Distribution name
    pub distribution: String,

    /// Staging directory (recreated on every run)
    pub destination: PathBuf,

    /// Tasks whose output files are copied in
    pub from_tasks: Vec<String>,

    /// Configurations whose resolved files are copied in
    pub configurations: Vec<String>,
}

/// An archive of a staged distribution.
#[derive(Debug, Clone, Serialize)]
pub struct ArchiveSpec {
    /// Output archive
    pub output: PathBuf,

    /// Bundle task providing the contents
    pub bundle_task: String,

    /// Directory every entry is placed under
    pub root_dir: String,

    pub format: ArchiveFormat,
}

/// Archive container format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveFormat {
    Tar(TarCompression),
    Zip,
}

impl ArchiveFormat {
    /// File extension used for artifacts of this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ArchiveFormat::Tar(TarCompression::None) => "tar",
            ArchiveFormat::Tar(TarCompression::Gzip) => "tar.gz",
            ArchiveFormat::Zip => "zip",
        }
    }
}

/// Compression applied to tar archives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TarCompression {
    #[default]
    None,
    Gzip,
}

/// All described tasks, keyed by name.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct TaskGraph {
    tasks: BTreeMap<String, Task>,
}

impl TaskGraph {
    pub fn new() -> Self {
        TaskGraph::default()
    }

    /// Register a task. Names are never reused.
    pub fn register(&mut self, task: Task) -> Result<TaskHandle, NamingCollisionError> {
        if self.tasks.contains_key(&task.name) {
            return Err(NamingCollisionError::Task { name: task.name });
        }
        let handle = TaskHandle(task.name.clone());
        self.tasks.insert(task.name.clone(), task);
        Ok(handle)
    }

    pub fn get(&self, name: &str) -> Option<&Task> {
        self.tasks.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Build the petgraph view, with an edge from each dependency to its
    /// dependent.
    fn graph(&self) -> Result<(DiGraph<&str, ()>, HashMap<&str, NodeIndex>), PlanError> {
        let mut graph = DiGraph::new();
        let mut nodes = HashMap::new();
        for name in self.tasks.keys() {
            nodes.insert(name.as_str(), graph.add_node(name.as_str()));
        }
        for task in self.tasks.values() {
            for dep in &task.depends_on {
                let from = nodes.get(dep.as_str()).ok_or_else(|| PlanError::UnknownDependency {
                    task: task.name.clone(),
                    dependency: dep.clone(),
                })?;
                graph.add_edge(*from, nodes[task.name.as_str()], ());
            }
        }
        Ok((graph, nodes))
    }

    /// Every task, dependencies first.
    ///
    /// Fails if an edge names an unknown task or the graph has a cycle.
    pub fn execution_order(&self) -> Result<Vec<&Task>, PlanError> {
        let (graph, _) = self.graph()?;
        let order = toposort(&graph, None).map_err(|cycle| PlanError::Cycle {
            task: graph[cycle.node_id()].to_string(),
        })?;
        Ok(order.into_iter().map(|n| &self.tasks[graph[n]]).collect())
    }

    /// Tasks grouped into waves: every task's dependencies sit in earlier
    /// waves. Tasks within a wave are independent and sorted by name.
    pub fn waves(&self) -> Result<Vec<Vec<&Task>>, PlanError> {
        let mut level: HashMap<&str, usize> = HashMap::new();
        let mut waves: Vec<Vec<&Task>> = Vec::new();

        for task in self.execution_order()? {
            let depth = task
                .depends_on
                .iter()
                .map(|d| level[d.as_str()] + 1)
                .max()
                .unwrap_or(0);
            level.insert(task.name.as_str(), depth);
            if waves.len() <= depth {
                waves.resize_with(depth + 1, Vec::new);
            }
            waves[depth].push(task);
        }

        for wave in &mut waves {
            wave.sort_by(|a, b| a.name.cmp(&b.name));
        }
        Ok(waves)
    }

    /// Every task that directly or transitively depends on `name`.
    pub fn dependents_of(&self, name: &str) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        let mut stack = vec![name.to_string()];
        while let Some(current) = stack.pop() {
            for task in self.tasks.values() {
                if task.depends_on.contains(&current) && out.insert(task.name.clone()) {
                    stack.push(task.name.clone());
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(name: &str) -> Task {
        Task::new(
            name,
            TaskAction::Compile(CompileSpec {
                source_set: name.to_string(),
                classes_dir: PathBuf::from("/build/classes").join(name),
            }),
        )
    }

    fn jar(name: &str) -> Task {
        Task::new(
            name,
            TaskAction::Jar(JarSpec::of_dirs(PathBuf::from(format!("/build/libs/{}.jar", name)), vec![])),
        )
    }

    fn distribution_graph() -> TaskGraph {
        let mut graph = TaskGraph::new();
        graph.register(compile("prestoClasses")).unwrap();
        graph
            .register(jar("prestoThinJar").depends_on("prestoClasses"))
            .unwrap();
        graph
            .register(
                Task::new(
                    "installPrestoDist",
                    TaskAction::Bundle(BundleSpec {
                        distribution: "presto".to_string(),
                        destination: PathBuf::from("/build/install/p-presto"),
                        from_tasks: vec!["prestoThinJar".to_string()],
                        configurations: vec![],
                    }),
                )
                .depends_on("prestoThinJar"),
            )
            .unwrap();
        for (name, format) in [
            ("prestoDistTar", ArchiveFormat::Tar(TarCompression::None)),
            ("prestoDistZip", ArchiveFormat::Zip),
        ] {
            graph
                .register(
                    Task::new(
                        name,
                        TaskAction::Archive(ArchiveSpec {
                            output: PathBuf::from("/build/distributions/out"),
                            bundle_task: "installPrestoDist".to_string(),
                            root_dir: "p-1.0".to_string(),
                            format,
                        }),
                    )
                    .depends_on("installPrestoDist"),
                )
                .unwrap();
        }
        graph
    }

    #[test]
    fn test_register_rejects_duplicate_names() {
        let mut graph = TaskGraph::new();
        graph.register(compile("hiveClasses")).unwrap();
        let err = graph.register(compile("hiveClasses")).unwrap_err();
        assert_eq!(
            err,
            NamingCollisionError::Task {
                name: "hiveClasses".to_string()
            }
        );
    }

    #[test]
    fn test_execution_order_respects_edges() {
        let graph = distribution_graph();
        let order: Vec<&str> = graph
            .execution_order()
            .unwrap()
            .into_iter()
            .map(|t| t.name.as_str())
            .collect();
        let pos = |n: &str| order.iter().position(|x| *x == n).unwrap();

        assert!(pos("prestoClasses") < pos("prestoThinJar"));
        assert!(pos("prestoThinJar") < pos("installPrestoDist"));
        assert!(pos("installPrestoDist") < pos("prestoDistTar"));
        assert!(pos("installPrestoDist") < pos("prestoDistZip"));
    }

    #[test]
    fn test_waves_group_independent_tasks() {
        let graph = distribution_graph();
        let waves: Vec<Vec<&str>> = graph
            .waves()
            .unwrap()
            .into_iter()
            .map(|w| w.into_iter().map(|t| t.name.as_str()).collect())
            .collect();
        assert_eq!(
            waves,
            vec![
                vec!["prestoClasses"],
                vec!["prestoThinJar"],
                vec!["installPrestoDist"],
                vec!["prestoDistTar", "prestoDistZip"],
            ]
        );
    }

    #[test]
    fn test_unknown_dependency_is_reported() {
        let mut graph = TaskGraph::new();
        graph.register(jar("hiveThinJar").depends_on("hiveClasses")).unwrap();
        assert!(matches!(
            graph.execution_order(),
            Err(PlanError::UnknownDependency { dependency, .. }) if dependency == "hiveClasses"
        ));
    }

    #[test]
    fn test_cycle_is_reported() {
        let mut graph = TaskGraph::new();
        graph.register(jar("a").depends_on("b")).unwrap();
        graph.register(jar("b").depends_on("a")).unwrap();
        assert!(matches!(graph.execution_order(), Err(PlanError::Cycle { .. })));
    }

    #[test]
    fn test_dependents_of_is_transitive() {
        let graph = distribution_graph();
        let dependents = graph.dependents_of("prestoThinJar");
        assert!(dependents.contains("installPrestoDist"));
        assert!(dependents.contains("prestoDistTar"));
        assert!(dependents.contains("prestoDistZip"));
        assert!(!dependents.contains("prestoClasses"));
    }

    #[test]
    fn test_graph_serializes_to_json() {
        let graph = distribution_graph();
        let json = serde_json::to_string(&graph).unwrap();
        assert!(json.contains("\"installPrestoDist\""));
        assert!(json.contains("\"type\":\"archive\""));
    }

    #[test]
    fn test_archive_extensions() {
        assert_eq!(ArchiveFormat::Zip.extension(), "zip");
        assert_eq!(ArchiveFormat::Tar(TarCompression::Gzip).extension(), "tar.gz");
    }
}
