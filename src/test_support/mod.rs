//! Fixtures for quay unit tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use quay::test_support::TestRepo;
//!
//! #[test]
//! fn test_example() {
//!     let mut repo = TestRepo::new();
//!     repo.add("org.apache.hadoop:hadoop-common:2.7.0", &["commons-io:commons-io:2.4"]);
//!     repo.add("commons-io:commons-io:2.4", &[]);
//!
//!     let resolver = repo.resolver();
//!     // Resolve configurations against `resolver`...
//! }
//! ```

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use zip::write::FileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::builder::plan::{CompileSpec, JarSpec, Task, TaskAction};
use crate::builder::project::Project;
use crate::configuration::Configuration;
use crate::core::dependency::Coordinate;
use crate::core::source_set::{SourceSet, MAIN_SOURCE_SET};
use crate::resolver::{DependencyResolver, ModuleDescriptor, ResolutionError};

/// In-memory resolver answering from a fixed module list.
#[derive(Debug, Clone, Default)]
pub struct MapResolver {
    modules: Vec<ModuleDescriptor>,
}

impl MapResolver {
    pub fn new(modules: Vec<ModuleDescriptor>) -> Self {
        MapResolver { modules }
    }
}

impl DependencyResolver for MapResolver {
    fn describe(&self, coordinate: &Coordinate) -> Result<Option<ModuleDescriptor>, ResolutionError> {
        Ok(self
            .modules
            .iter()
            .find(|m| coordinate.matches(&m.coordinate))
            .cloned())
    }
}

/// A throwaway repository of real jar files.
#[derive(Debug)]
pub struct TestRepo {
    root: PathBuf,
    modules: Vec<ModuleDescriptor>,
    _tmp: Option<TempDir>,
}

impl TestRepo {
    /// A repository in its own temporary directory.
    pub fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        TestRepo {
            root: tmp.path().to_path_buf(),
            modules: Vec::new(),
            _tmp: Some(tmp),
        }
    }

    /// A repository rooted at `root`, which is created if needed.
    pub fn in_dir(root: PathBuf) -> Self {
        fs::create_dir_all(&root).unwrap();
        TestRepo {
            root,
            modules: Vec::new(),
            _tmp: None,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Add a module whose jar holds a single text entry.
    pub fn add(&mut self, coordinate: &str, dependencies: &[&str]) -> PathBuf {
        let coord: Coordinate = coordinate.parse().unwrap();
        let entry = format!("{}.txt", coord.module());
        self.add_jar(coord, dependencies, &[(entry.as_str(), coordinate.as_bytes())])
    }

    /// Add a module whose jar holds one minimal class per internal name.
    pub fn add_with_classes(
        &mut self,
        coordinate: &str,
        dependencies: &[&str],
        classes: &[&str],
    ) -> PathBuf {
        let coord: Coordinate = coordinate.parse().unwrap();
        let bodies: Vec<(String, Vec<u8>)> = classes
            .iter()
            .map(|c| (format!("{}.class", c), minimal_class_bytes(c, &[])))
            .collect();
        let entries: Vec<(&str, &[u8])> = bodies
            .iter()
            .map(|(n, b)| (n.as_str(), b.as_slice()))
            .collect();
        self.add_jar(coord, dependencies, &entries)
    }

    fn add_jar(
        &mut self,
        coordinate: Coordinate,
        dependencies: &[&str],
        entries: &[(&str, &[u8])],
    ) -> PathBuf {
        let file = self.root.join(format!(
            "{}-{}.jar",
            coordinate.module(),
            coordinate.version().unwrap_or("0")
        ));
        write_jar(&file, entries);
        self.modules.push(ModuleDescriptor {
            coordinate,
            file: file.clone(),
            dependencies: dependencies.iter().map(|d| d.parse().unwrap()).collect(),
        });
        file
    }

    pub fn resolver(&self) -> MapResolver {
        MapResolver::new(self.modules.clone())
    }
}

impl Default for TestRepo {
    fn default() -> Self {
        Self::new()
    }
}

/// A project with `main` and `<platform>` source sets, their classes
/// tasks, the main `jar` task and an empty `<platform>RuntimeClasspath`.
///
/// Returns the project with the main and platform source sets.
pub fn platform_project(platform: &str) -> (Project, SourceSet, SourceSet) {
    let mut project = Project::new("example-udfs", "1.0.0", "/work", "/work/build");
    let main = project.create_source_set(MAIN_SOURCE_SET).clone();
    let source_set = project.create_source_set(platform).clone();
    project
        .configurations_mut()
        .register(Configuration::new(format!("{}RuntimeClasspath", platform)))
        .unwrap();
    for s in [&main, &source_set] {
        project
            .tasks_mut()
            .register(Task::new(
                s.classes_task_name(),
                TaskAction::Compile(CompileSpec {
                    source_set: s.name().to_string(),
                    classes_dir: s.classes_dir().to_path_buf(),
                }),
            ))
            .unwrap();
    }
    let main_jar = project.libs_dir().join("example-udfs-1.0.0.jar");
    project
        .tasks_mut()
        .register(
            Task::new(
                main.jar_task_name(),
                TaskAction::Jar(JarSpec::of_dirs(main_jar, main.output_dirs())),
            )
            .depends_on(main.classes_task_name()),
        )
        .unwrap();
    (project, main, source_set)
}

/// Write a jar with the given entries, creating parent directories.
pub fn write_jar(path: &Path, entries: &[(&str, &[u8])]) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let file = File::create(path).unwrap();
    let mut zip = ZipWriter::new(file);
    for (name, data) in entries {
        zip.start_file(*name, FileOptions::default()).unwrap();
        zip.write_all(data).unwrap();
    }
    zip.finish().unwrap();
    path.to_path_buf()
}

/// Entry names of a jar or zip, in archive order.
pub fn jar_entries(path: &Path) -> Vec<String> {
    let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}

/// Contents of one jar entry.
pub fn read_jar_entry(path: &Path, name: &str) -> Vec<u8> {
    let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut entry = archive.by_name(name).unwrap();
    let mut data = Vec::new();
    entry.read_to_end(&mut data).unwrap();
    data
}

/// A minimal but well-formed class file.
///
/// Its constant pool holds the class itself, `java/lang/Object`, a long
/// constant (two slots) and one class constant per entry of `references`.
pub fn minimal_class_bytes(name: &str, references: &[&str]) -> Vec<u8> {
    let mut pool: Vec<u8> = Vec::new();
    let mut count: u16 = 1;
    let utf8 = |pool: &mut Vec<u8>, value: &str| {
        pool.push(1);
        pool.extend_from_slice(&(value.len() as u16).to_be_bytes());
        pool.extend_from_slice(value.as_bytes());
    };

    // #1 Utf8 name, #2 Class #1
    utf8(&mut pool, name);
    pool.extend_from_slice(&[7, 0, 1]);
    // #3 Utf8 java/lang/Object, #4 Class #3
    utf8(&mut pool, "java/lang/Object");
    pool.extend_from_slice(&[7, 0, 3]);
    // #5-#6 Long
    pool.push(5);
    pool.extend_from_slice(&42u64.to_be_bytes());
    count += 6;

    for reference in references {
        utf8(&mut pool, reference);
        pool.push(7);
        pool.extend_from_slice(&count.to_be_bytes());
        count += 2;
    }

    let mut bytes = vec![0xCA, 0xFE, 0xBA, 0xBE, 0, 0, 0, 52];
    bytes.extend_from_slice(&count.to_be_bytes());
    bytes.extend_from_slice(&pool);
    // access flags, this #2, super #4, no interfaces, fields, methods or attributes
    bytes.extend_from_slice(&[0x00, 0x21, 0, 2, 0, 4, 0, 0, 0, 0, 0, 0, 0, 0]);
    bytes
}

/// Every UTF-8 constant of a class file.
pub fn class_constants(bytes: &[u8]) -> Vec<String> {
    let count = u16::from_be_bytes([bytes[8], bytes[9]]);
    let mut pos = 10;
    let mut index = 1;
    let mut out = Vec::new();
    while index < count {
        let tag = bytes[pos];
        pos += 1;
        match tag {
            1 => {
                let len = u16::from_be_bytes([bytes[pos], bytes[pos + 1]]) as usize;
                out.push(String::from_utf8(bytes[pos + 2..pos + 2 + len].to_vec()).unwrap());
                pos += 2 + len;
            }
            7 | 8 | 16 | 19 | 20 => pos += 2,
            15 => pos += 3,
            3 | 4 | 9 | 10 | 11 | 12 | 17 | 18 => pos += 4,
            5 | 6 => {
                pos += 8;
                index += 1;
            }
            other => panic!("unexpected tag {}", other),
        }
        index += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_class_round_trips_constants() {
        let bytes = minimal_class_bytes("a/B", &["c/D", "e/F"]);
        assert_eq!(
            class_constants(&bytes),
            vec!["a/B", "java/lang/Object", "c/D", "e/F"]
        );
    }

    #[test]
    fn test_repo_resolver_finds_modules() {
        let mut repo = TestRepo::new();
        let file = repo.add("a:b:1", &["c:d:2"]);
        assert!(file.is_file());
        let found = repo
            .resolver()
            .describe(&"a:b".parse().unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(found.dependencies.len(), 1);
    }
}
