//! Jar assembly.
//!
//! Entries are collected in memory first so that duplicates, excludes and
//! relocation can be applied before anything touches the output path. The
//! jar is then written to a temporary file next to the output and renamed
//! into place.

use std::collections::{BTreeMap, HashSet};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use glob::Pattern;
use tempfile::NamedTempFile;
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::builder::relocate::Relocator;
use crate::util::fs::ensure_dir;

/// Path of the manifest inside a jar.
pub const MANIFEST_PATH: &str = "META-INF/MANIFEST.MF";

/// Entries never copied out of dependency jars.
pub const SIGNATURE_EXCLUDES: [&str; 4] = [
    "META-INF/INDEX.LIST",
    "META-INF/*.SF",
    "META-INF/*.DSA",
    "META-INF/*.RSA",
];

/// The contents of a jar being assembled.
#[derive(Debug)]
pub struct JarContents {
    entries: Vec<(String, Vec<u8>)>,
    names: HashSet<String>,
    excludes: Vec<Pattern>,
}

impl JarContents {
    /// Start an empty jar that drops entries matching `excludes`.
    pub fn new(excludes: &[String]) -> Result<Self> {
        let excludes = excludes
            .iter()
            .map(|p| Pattern::new(p).with_context(|| format!("invalid exclude pattern `{}`", p)))
            .collect::<Result<Vec<_>>>()?;
        Ok(JarContents {
            entries: Vec::new(),
            names: HashSet::new(),
            excludes,
        })
    }

    fn is_excluded(&self, name: &str) -> bool {
        name == MANIFEST_PATH || self.excludes.iter().any(|p| p.matches(name))
    }

    /// Add one entry. The first entry with a given name wins.
    pub fn add(&mut self, name: impl Into<String>, data: Vec<u8>) -> bool {
        let name = name.into();
        if self.is_excluded(&name) || self.names.contains(&name) {
            return false;
        }
        self.names.insert(name.clone());
        self.entries.push((name, data));
        true
    }

    /// Copy every file under `dir`, keyed by its path relative to `dir`.
    ///
    /// A missing directory contributes nothing.
    pub fn add_dir(&mut self, dir: &Path) -> Result<usize> {
        if !dir.is_dir() {
            tracing::debug!("skipping missing directory {}", dir.display());
            return Ok(0);
        }

        let mut added = 0;
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.with_context(|| format!("failed to walk {}", dir.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = entry
                .path()
                .strip_prefix(dir)
                .with_context(|| format!("{} is outside {}", entry.path().display(), dir.display()))?;
            let name = rel.to_string_lossy().replace('\\', "/");
            let data = fs::read(entry.path())
                .with_context(|| format!("failed to read {}", entry.path().display()))?;
            if self.add(name, data) {
                added += 1;
            }
        }
        Ok(added)
    }

    /// Unpack every file entry of another jar.
    pub fn add_jar(&mut self, jar: &Path) -> Result<usize> {
        let file = File::open(jar).with_context(|| format!("failed to open {}", jar.display()))?;
        let mut archive = ZipArchive::new(file)
            .with_context(|| format!("failed to read jar {}", jar.display()))?;

        let mut added = 0;
        for i in 0..archive.len() {
            let mut entry = archive
                .by_index(i)
                .with_context(|| format!("corrupt entry in {}", jar.display()))?;
            if entry.is_dir() {
                continue;
            }
            let name = entry.name().to_string();
            let mut data = Vec::new();
            entry
                .read_to_end(&mut data)
                .with_context(|| format!("failed to read `{}` from {}", name, jar.display()))?;
            if self.add(name, data) {
                added += 1;
            }
        }
        tracing::debug!("unpacked {} entries from {}", added, jar.display());
        Ok(added)
    }

    /// Move relocated classes under the relocator's prefix and rewrite the
    /// references in every class.
    pub fn relocate(&mut self, relocator: &Relocator) -> Result<()> {
        let mut relocated = 0;
        for (name, data) in &mut self.entries {
            if !name.ends_with(".class") {
                continue;
            }
            *data = relocator
                .rewrite_class(data)
                .with_context(|| format!("failed to relocate `{}`", name))?;
            if let Some(new_name) = relocator.relocate_entry(name) {
                *name = new_name;
                relocated += 1;
            }
        }
        // a relocated name may now clash with an entry already under the prefix
        let mut names = HashSet::new();
        self.entries.retain(|(name, _)| {
            let first = names.insert(name.clone());
            if !first {
                tracing::warn!("dropping duplicate `{}` after relocation", name);
            }
            first
        });
        self.names = names;
        tracing::debug!("relocated {} class(es)", relocated);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Write the jar with a manifest carrying `attributes`.
    ///
    /// Nothing appears at `output` unless the whole jar was written.
    pub fn write(&self, output: &Path, attributes: &BTreeMap<String, String>) -> Result<()> {
        let parent = output
            .parent()
            .with_context(|| format!("{} has no parent directory", output.display()))?;
        ensure_dir(parent)?;

        let mut tmp = NamedTempFile::new_in(parent)
            .with_context(|| format!("failed to create temporary file in {}", parent.display()))?;
        {
            let mut zip = ZipWriter::new(tmp.as_file_mut());
            let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

            zip.start_file(MANIFEST_PATH, options)?;
            zip.write_all(manifest(attributes).as_bytes())?;

            for (name, data) in &self.entries {
                zip.start_file(name.as_str(), options)
                    .with_context(|| format!("failed to add `{}`", name))?;
                zip.write_all(data)?;
            }
            zip.finish()
                .with_context(|| format!("failed to finish {}", output.display()))?;
        }

        tmp.persist(output)
            .with_context(|| format!("failed to write {}", output.display()))?;
        Ok(())
    }
}

/// Render manifest attributes. `Manifest-Version` always comes first.
pub fn manifest(attributes: &BTreeMap<String, String>) -> String {
    let mut out = String::from("Manifest-Version: 1.0\r\n");
    for (key, value) in attributes {
        if key == "Manifest-Version" {
            continue;
        }
        out.push_str(&format!("{}: {}\r\n", key, value));
    }
    out.push_str("\r\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        class_constants, jar_entries, minimal_class_bytes, read_jar_entry, write_jar,
    };
    use tempfile::TempDir;

    fn signature_excludes() -> Vec<String> {
        SIGNATURE_EXCLUDES.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_first_entry_wins_and_excludes_apply() {
        let tmp = TempDir::new().unwrap();
        let dep = write_jar(
            &tmp.path().join("dep.jar"),
            &[
                ("com/acme/Util.class", b"dep".as_slice()),
                ("META-INF/ACME.SF", b"sig".as_slice()),
                ("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0\r\n".as_slice()),
            ],
        );

        let mut contents = JarContents::new(&signature_excludes()).unwrap();
        contents.add("com/acme/Util.class", b"own".to_vec());
        assert_eq!(contents.add_jar(&dep).unwrap(), 0);
        assert_eq!(contents.len(), 1);
        assert!(!contents.contains("META-INF/ACME.SF"));

        let out = tmp.path().join("libs/out.jar");
        contents.write(&out, &BTreeMap::new()).unwrap();
        assert_eq!(read_jar_entry(&out, "com/acme/Util.class"), b"own");
    }

    #[test]
    fn test_relocation_keeps_first_of_clashing_entries() {
        let tmp = TempDir::new().unwrap();
        let mut contents = JarContents::new(&[]).unwrap();
        contents.add("com/acme/A.class", minimal_class_bytes("com/acme/A", &[]));
        contents.add(
            "shaded/com/acme/A.class",
            minimal_class_bytes("shaded/com/acme/A", &["java/util/List"]),
        );

        let relocator = Relocator::new("shaded", &["com.acme.*".to_string()]).unwrap();
        contents.relocate(&relocator).unwrap();
        assert_eq!(contents.len(), 1);
        assert!(contents.contains("shaded/com/acme/A.class"));

        let out = tmp.path().join("shaded.jar");
        contents.write(&out, &BTreeMap::new()).unwrap();
        assert_eq!(
            jar_entries(&out),
            vec![MANIFEST_PATH.to_string(), "shaded/com/acme/A.class".to_string()]
        );
        let constants = class_constants(&read_jar_entry(&out, "shaded/com/acme/A.class"));
        assert!(!constants.contains(&"java/util/List".to_string()));
    }

    #[test]
    fn test_add_dir_uses_relative_paths() {
        let tmp = TempDir::new().unwrap();
        let classes = tmp.path().join("classes");
        fs::create_dir_all(classes.join("com/example")).unwrap();
        fs::write(classes.join("com/example/MyUdf.class"), b"x").unwrap();

        let mut contents = JarContents::new(&[]).unwrap();
        assert_eq!(contents.add_dir(&classes).unwrap(), 1);
        assert_eq!(contents.add_dir(&tmp.path().join("missing")).unwrap(), 0);
        assert!(contents.contains("com/example/MyUdf.class"));
    }

    #[test]
    fn test_manifest_is_first_entry() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("a.jar");
        let mut attributes = BTreeMap::new();
        attributes.insert("Implementation-Title".to_string(), "example-udfs".to_string());

        let mut contents = JarContents::new(&[]).unwrap();
        contents.add("a.txt", b"a".to_vec());
        contents.write(&out, &attributes).unwrap();

        let names = jar_entries(&out);
        assert_eq!(names[0], MANIFEST_PATH);
        let manifest = String::from_utf8(read_jar_entry(&out, MANIFEST_PATH)).unwrap();
        assert!(manifest.starts_with("Manifest-Version: 1.0\r\n"));
        assert!(manifest.contains("Implementation-Title: example-udfs\r\n"));
    }

    #[test]
    fn test_failed_write_leaves_no_file() {
        let tmp = TempDir::new().unwrap();
        // The output path is an existing directory, so the rename fails.
        let out = tmp.path().join("taken.jar");
        fs::create_dir_all(out.join("child")).unwrap();

        let contents = JarContents::new(&[]).unwrap();
        assert!(contents.write(&out, &BTreeMap::new()).is_err());
        let leftovers: Vec<_> = fs::read_dir(tmp.path()).unwrap().collect();
        assert_eq!(leftovers.len(), 1);
    }
}
