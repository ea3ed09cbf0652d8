//! Dotted property names.
//!
//! Nested mapping keys are read as one dotted name, the way Spring Boot
//! reads `application.yml`: `a:\n  b: 1` and `a.b: 1` both define `a.b`.
//! Keys are joined verbatim, so a key that itself contains a dot cannot be
//! told apart from two nested keys.

use crate::error::{YamlError, YamlResult};
use crate::scalar::is_plain_safe;
use crate::yaml::Entry;
use std::fmt;
use std::str::FromStr;

/// Join the keys of a root-to-leaf chain of entries with `.`.
pub fn property_path<E: AsRef<Entry>>(entries: &[E]) -> String {
    let mut path = String::new();
    for (i, entry) in entries.iter().enumerate() {
        if i > 0 {
            path.push('.');
        }
        path.push_str(entry.as_ref().key().value());
    }
    path
}

/// Strip the leading segment `key` from a dotted name.
///
/// Returns the rest of the name when `name` equals `key` or starts with
/// `key` followed by a dot, and `None` otherwise. Matching is on whole
/// segments: `ab.c` does not start with `a`.
pub(crate) fn strip_segment<'n>(name: &'n str, key: &str) -> Option<&'n str> {
    let rest = name.strip_prefix(key)?;
    if rest.is_empty() {
        Some(rest)
    } else {
        rest.strip_prefix('.')
    }
}

/// A validated dotted property name such as `spring.datasource.url`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyName(String);

impl PropertyName {
    /// Validate a dotted name: it must be non-empty, contain no empty
    /// segment, and every segment must be writable as a plain key.
    pub fn parse(name: &str) -> YamlResult<Self> {
        let invalid = |reason: &str| YamlError::InvalidProperty {
            name: name.to_string(),
            reason: reason.to_string(),
        };
        if name.is_empty() {
            return Err(invalid("name is empty"));
        }
        let property = PropertyName(name.to_string());
        if property.segments().any(str::is_empty) {
            return Err(invalid("name contains an empty segment"));
        }
        if let Some(segment) = property.segments().find(|segment| !is_plain_safe(segment)) {
            return Err(invalid(&format!("'{}' cannot be written as a plain key", segment)));
        }
        Ok(property)
    }

    /// The name as written.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The dot-separated segments of the name.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }
}

impl FromStr for PropertyName {
    type Err = YamlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PropertyName::parse(s)
    }
}

impl AsRef<str> for PropertyName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PropertyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
