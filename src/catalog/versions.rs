//! Version manifest.
//!
//! A flat `key=value` file in the properties style, e.g.
//!
//! ```text
//! # versions applied to the default catalog
//! transport-version=0.0.80
//! presto-version = 333
//! hive-version: 1.2.2
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::core::error::ConfigurationError;

/// Versions keyed by `<name>-version`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionManifest {
    entries: BTreeMap<String, String>,
}

impl VersionManifest {
    /// Read a manifest from disk. A missing file is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigurationError> {
        let content =
            fs::read_to_string(path).map_err(|source| ConfigurationError::ManifestUnreadable {
                path: path.to_path_buf(),
                source,
            })?;
        let manifest = Self::parse(&content)?;
        tracing::debug!(
            "loaded {} version(s) from {}",
            manifest.entries.len(),
            path.display()
        );
        Ok(manifest)
    }

    /// Parse manifest text.
    ///
    /// Lines starting with `#` or `!` are comments. The first `=` or `:`
    /// separates key and value; both are trimmed. Later keys win.
    pub fn parse(content: &str) -> Result<Self, ConfigurationError> {
        let mut entries = BTreeMap::new();
        for (idx, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            let split = line
                .find(['=', ':'])
                .map(|pos| (line[..pos].trim(), line[pos + 1..].trim()));
            match split {
                Some((key, value)) if !key.is_empty() => {
                    entries.insert(key.to_string(), value.to_string());
                }
                _ => {
                    return Err(ConfigurationError::MalformedManifestLine {
                        line_no: idx + 1,
                        line: raw.to_string(),
                    })
                }
            }
        }
        Ok(VersionManifest { entries })
    }

    /// Build a manifest from key/value pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        VersionManifest {
            entries: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// The version for `name`, read from `<name>-version`.
    pub fn version_of(&self, name: &str) -> Result<&str, ConfigurationError> {
        let key = format!("{}-version", name);
        self.get(&key)
            .ok_or(ConfigurationError::MissingVersionKey {
                platform: name.to_string(),
                key,
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
