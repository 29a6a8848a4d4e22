//! Published artifacts.

use std::path::PathBuf;

use serde::Serialize;

use crate::builder::plan::TaskHandle;
use crate::core::error::NamingCollisionError;

/// Configuration published artifacts are added to.
pub const ARCHIVES_CONFIGURATION: &str = "archives";

/// An artifact the project would publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishedArtifact {
    pub configuration: String,
    pub task: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
    pub extension: String,
    pub file: PathBuf,
}

/// Every artifact registered for publishing.
///
/// Artifacts of one project are told apart by classifier and extension, so
/// that pair must be unique.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ArtifactContainer {
    artifacts: Vec<PublishedArtifact>,
}

impl ArtifactContainer {
    pub fn new() -> Self {
        ArtifactContainer::default()
    }

    /// Register the output of `task` as a published artifact.
    pub fn add(
        &mut self,
        configuration: &str,
        task: &TaskHandle,
        classifier: Option<&str>,
        extension: &str,
        file: PathBuf,
    ) -> Result<(), NamingCollisionError> {
        let clash = self
            .artifacts
            .iter()
            .any(|a| a.classifier.as_deref() == classifier && a.extension == extension);
        if clash {
            return Err(NamingCollisionError::Artifact {
                classifier: classifier.unwrap_or_default().to_string(),
                extension: extension.to_string(),
            });
        }

        tracing::debug!(
            "publishing `{}` as {} (classifier: {})",
            task,
            extension,
            classifier.unwrap_or("<none>")
        );
        self.artifacts.push(PublishedArtifact {
            configuration: configuration.to_string(),
            task: task.name().to_string(),
            classifier: classifier.map(str::to_string),
            extension: extension.to_string(),
            file,
        });
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &PublishedArtifact> {
        self.artifacts.iter()
    }

    /// Artifacts produced by one task.
    pub fn for_task<'a>(&'a self, task: &'a str) -> impl Iterator<Item = &'a PublishedArtifact> {
        self.artifacts.iter().filter(move |a| a.task == task)
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::plan::{Task, TaskAction, TaskGraph, JarSpec};

    fn handle(graph: &mut TaskGraph, name: &str) -> TaskHandle {
        graph
            .register(Task::new(
                name,
                TaskAction::Jar(JarSpec::of_dirs(PathBuf::from("out.jar"), vec![])),
            ))
            .unwrap()
    }

    #[test]
    fn test_same_classifier_different_extension_is_allowed() {
        let mut graph = TaskGraph::new();
        let tar = handle(&mut graph, "prestoDistTar");
        let zip = handle(&mut graph, "prestoDistZip");

        let mut artifacts = ArtifactContainer::new();
        artifacts
            .add(ARCHIVES_CONFIGURATION, &tar, Some("presto"), "tar", PathBuf::from("a.tar"))
            .unwrap();
        artifacts
            .add(ARCHIVES_CONFIGURATION, &zip, Some("presto"), "zip", PathBuf::from("a.zip"))
            .unwrap();
        assert_eq!(artifacts.len(), 2);
        assert_eq!(artifacts.for_task("prestoDistZip").count(), 1);
    }

    #[test]
    fn test_duplicate_classifier_is_rejected() {
        let mut graph = TaskGraph::new();
        let a = handle(&mut graph, "a");
        let b = handle(&mut graph, "b");

        let mut artifacts = ArtifactContainer::new();
        artifacts
            .add(ARCHIVES_CONFIGURATION, &a, Some("hive"), "jar", PathBuf::from("a.jar"))
            .unwrap();
        let err = artifacts
            .add(ARCHIVES_CONFIGURATION, &b, Some("hive"), "jar", PathBuf::from("b.jar"))
            .unwrap_err();
        assert!(matches!(err, NamingCollisionError::Artifact { classifier, .. } if classifier == "hive"));
    }
}
