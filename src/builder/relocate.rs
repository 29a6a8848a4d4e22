//! Binary class relocation.
//!
//! Moves classes matching a set of patterns under a package prefix and
//! rewrites every reference to them. Only the constant pool is touched:
//! every class name, descriptor and signature a class file refers to lives
//! in a `CONSTANT_Utf8` entry, so rewriting those entries and leaving the
//! indices alone keeps the rest of the file valid.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

const CLASS_MAGIC: u32 = 0xCAFE_BABE;

static INTERNAL_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[\w$]+/)+[\w$]+$").unwrap());
static DOTTED_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[\w$]+\.)+[\w$]+$").unwrap());
static DESCRIPTOR_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"L((?:[\w$]+/)*[\w$]+)([;<])").unwrap());

/// Error raised while relocating classes.
#[derive(Debug, Error)]
pub enum RelocationError {
    #[error("invalid relocation pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("not a class file (bad magic)")]
    BadMagic,

    #[error("class file truncated at offset {offset}")]
    Truncated { offset: usize },

    #[error("unknown constant pool tag {tag} at index {index}")]
    UnknownTag { tag: u8, index: u16 },

    #[error("relocated constant `{value}` is longer than 65535 bytes")]
    ConstantTooLong { value: String },
}

/// Relocates classes whose dotted name matches one of its patterns.
#[derive(Debug, Clone)]
pub struct Relocator {
    /// Internal-form prefix, always ending in `/`
    prefix: String,
    patterns: Vec<Regex>,
}

impl Relocator {
    /// Create a relocator moving matches under `prefix` (dotted or slashed).
    ///
    /// In patterns, `*` matches within one package segment and `**` matches
    /// across segments.
    pub fn new(prefix: &str, patterns: &[String]) -> Result<Self, RelocationError> {
        let trimmed = prefix.trim_matches(|c| c == '.' || c == '/');
        if trimmed.is_empty() {
            return Err(RelocationError::InvalidPattern {
                pattern: prefix.to_string(),
                reason: "relocation prefix is empty".to_string(),
            });
        }

        let patterns = patterns
            .iter()
            .map(|p| compile_pattern(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Relocator {
            prefix: format!("{}/", trimmed.replace('.', "/")),
            patterns,
        })
    }

    /// Whether a dotted class name is relocated.
    pub fn matches(&self, dotted: &str) -> bool {
        !dotted.starts_with(&self.dotted_prefix()) && self.patterns.iter().any(|p| p.is_match(dotted))
    }

    fn dotted_prefix(&self) -> String {
        self.prefix.replace('/', ".")
    }

    /// Relocated internal name (`a/b/C`), if the class is relocated.
    pub fn relocate_internal(&self, internal: &str) -> Option<String> {
        self.matches(&internal.replace('/', "."))
            .then(|| format!("{}{}", self.prefix, internal))
    }

    /// Relocated jar entry path, if the entry is a relocated class.
    pub fn relocate_entry(&self, entry: &str) -> Option<String> {
        let internal = entry.strip_suffix(".class")?;
        self.relocate_internal(internal)
            .map(|name| format!("{}.class", name))
    }

    /// Rewrite one constant-pool string.
    fn relocate_constant(&self, value: &str) -> Option<String> {
        if INTERNAL_NAME.is_match(value) {
            return self.relocate_internal(value);
        }
        if DOTTED_NAME.is_match(value) {
            return self
                .matches(value)
                .then(|| format!("{}{}", self.dotted_prefix(), value));
        }

        let mut changed = false;
        let rewritten = DESCRIPTOR_REF
            .replace_all(value, |caps: &regex::Captures<'_>| {
                match self.relocate_internal(&caps[1]) {
                    Some(name) => {
                        changed = true;
                        format!("L{}{}", name, &caps[2])
                    }
                    None => caps[0].to_string(),
                }
            })
            .into_owned();
        changed.then_some(rewritten)
    }

    /// Rewrite every constant-pool reference to a relocated class.
    pub fn rewrite_class(&self, bytes: &[u8]) -> Result<Vec<u8>, RelocationError> {
        let mut reader = ClassReader { bytes, pos: 0 };
        if reader.u32()? != CLASS_MAGIC {
            return Err(RelocationError::BadMagic);
        }
        // minor and major version
        reader.take(4)?;
        let pool_count = reader.u16()?;

        let mut out = Vec::with_capacity(bytes.len());
        out.extend_from_slice(&bytes[..reader.pos]);

        let mut index = 1;
        while index < pool_count {
            let start = reader.pos;
            let tag = reader.u8()?;
            match tag {
                1 => {
                    let len = reader.u16()? as usize;
                    let raw = reader.take(len)?;
                    let relocated = std::str::from_utf8(raw)
                        .ok()
                        .and_then(|s| self.relocate_constant(s));
                    match relocated {
                        Some(value) => {
                            let len = u16::try_from(value.len())
                                .map_err(|_| RelocationError::ConstantTooLong { value: value.clone() })?;
                            out.push(1);
                            out.extend_from_slice(&len.to_be_bytes());
                            out.extend_from_slice(value.as_bytes());
                        }
                        None => out.extend_from_slice(&bytes[start..reader.pos]),
                    }
                }
                3 | 4 => {
                    reader.take(4)?;
                    out.extend_from_slice(&bytes[start..reader.pos]);
                }
                5 | 6 => {
                    reader.take(8)?;
                    out.extend_from_slice(&bytes[start..reader.pos]);
                    // longs and doubles take two slots
                    index += 1;
                }
                7 | 8 | 16 | 19 | 20 => {
                    reader.take(2)?;
                    out.extend_from_slice(&bytes[start..reader.pos]);
                }
                15 => {
                    reader.take(3)?;
                    out.extend_from_slice(&bytes[start..reader.pos]);
                }
                9 | 10 | 11 | 12 | 17 | 18 => {
                    reader.take(4)?;
                    out.extend_from_slice(&bytes[start..reader.pos]);
                }
                _ => return Err(RelocationError::UnknownTag { tag, index }),
            }
            index += 1;
        }

        out.extend_from_slice(&bytes[reader.pos..]);
        Ok(out)
    }
}

fn compile_pattern(pattern: &str) -> Result<Regex, RelocationError> {
    if pattern.is_empty() || pattern.split('.').any(str::is_empty) {
        return Err(RelocationError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: "empty package segment".to_string(),
        });
    }

    let mut source = String::from("^");
    let mut rest = pattern;
    while !rest.is_empty() {
        if let Some(tail) = rest.strip_prefix("**") {
            source.push_str(".*");
            rest = tail;
        } else if let Some(tail) = rest.strip_prefix('*') {
            source.push_str(r"[^.]*");
            rest = tail;
        } else {
            let end = rest.find('*').unwrap_or(rest.len());
            source.push_str(&regex::escape(&rest[..end]));
            rest = &rest[end..];
        }
    }
    source.push('$');

    Regex::new(&source).map_err(|e| RelocationError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

struct ClassReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ClassReader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], RelocationError> {
        let end = self.pos + n;
        if end > self.bytes.len() {
            return Err(RelocationError::Truncated { offset: self.pos });
        }
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, RelocationError> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, RelocationError> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32, RelocationError> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }
}
