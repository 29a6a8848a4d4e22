//! Exclusion rules for derived configurations.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::core::dependency::Coordinate;
use crate::core::error::ConfigurationError;

/// Removes matching modules from a configuration's resolved contents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExclusionRule {
    /// Every module of the group.
    Group { group: String },
    /// Exactly one module.
    Module { group: String, module: String },
}

impl ExclusionRule {
    /// Parse `group` or `group:module`.
    ///
    /// Strings with more than one `:` or an empty segment are rejected
    /// rather than guessed at.
    pub fn parse(rule: &str) -> Result<Self, ConfigurationError> {
        let malformed = |reason: &str| ConfigurationError::MalformedExclusion {
            rule: rule.to_string(),
            reason: reason.to_string(),
        };

        let rule = rule.trim();
        match rule.split_once(':') {
            None if rule.is_empty() => Err(malformed("empty group")),
            None => Ok(ExclusionRule::Group {
                group: rule.to_string(),
            }),
            Some((_, module)) if module.contains(':') => {
                Err(malformed("expected `group` or `group:module`"))
            }
            Some((group, module)) if group.is_empty() || module.is_empty() => {
                Err(malformed("group and module must not be empty"))
            }
            Some((group, module)) => Ok(ExclusionRule::Module {
                group: group.to_string(),
                module: module.to_string(),
            }),
        }
    }

    /// Check if this rule removes the given coordinate.
    pub fn matches(&self, coordinate: &Coordinate) -> bool {
        match self {
            ExclusionRule::Group { group } => coordinate.group() == group,
            ExclusionRule::Module { group, module } => {
                coordinate.group() == group && coordinate.module() == module
            }
        }
    }

    pub fn group(&self) -> &str {
        match self {
            ExclusionRule::Group { group } | ExclusionRule::Module { group, .. } => group,
        }
    }
}

impl FromStr for ExclusionRule {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExclusionRule::parse(s)
    }
}

impl fmt::Display for ExclusionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExclusionRule::Group { group } => f.write_str(group),
            ExclusionRule::Module { group, module } => write!(f, "{}:{}", group, module),
        }
    }
}

impl Serialize for ExclusionRule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
