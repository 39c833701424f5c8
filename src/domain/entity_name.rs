use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Deserializer};

use super::AppError;

/// A validated fully-qualified entity name.
///
/// Guarantees:
/// - One or more segments separated by `::`
/// - Each segment starts with a letter or `_`
/// - Segments contain only alphanumeric characters or `_`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityName(String);

impl EntityName {
    pub fn new(raw: &str) -> Result<Self, AppError> {
        if raw.is_empty() {
            return Err(AppError::InvalidEntityName(raw.to_string()));
        }
        for segment in raw.split("::") {
            if !is_valid_segment(segment) {
                return Err(AppError::InvalidEntityName(raw.to_string()));
            }
        }
        Ok(EntityName(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last segment of the qualified name.
    pub fn short_name(&self) -> &str {
        self.0.rsplit("::").next().unwrap_or(&self.0)
    }

    /// Filename encoding used by file-based mapping drivers: segments joined
    /// with `.` (e.g. `crm::Customer` → `crm.Customer`).
    pub fn file_stem(&self) -> String {
        self.0.replace("::", ".")
    }

    /// Decode a filename stem back into a qualified name.
    pub fn from_file_stem(stem: &str) -> Result<Self, AppError> {
        let candidate = stem.split('.').collect::<Vec<_>>().join("::");
        EntityName::new(&candidate)
            .map_err(|_| AppError::InvalidEntityName(stem.to_string()))
    }

    /// Relative path used when rendering Rust source for this entity:
    /// namespace segments become directories verbatim, the type name becomes
    /// a snake_case file stem (e.g. `crm::LineItem` → `crm/line_item`).
    /// Scanning the rendered tree derives the namespace back from the
    /// directories, so they must not be re-cased here.
    pub fn snake_path(&self) -> PathBuf {
        let mut segments: Vec<&str> = self.0.split("::").collect();
        let leaf = segments.pop().unwrap_or(&self.0);
        let mut path: PathBuf = segments.iter().collect();
        path.push(to_snake_case(leaf));
        path
    }
}

impl fmt::Display for EntityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<EntityName> for String {
    fn from(val: EntityName) -> Self {
        val.0
    }
}

impl<'de> Deserialize<'de> for EntityName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        EntityName::new(&s).map_err(serde::de::Error::custom)
    }
}

fn is_valid_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn to_snake_case(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    let chars: Vec<char> = segment.chars().collect();
    for (i, c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() {
            let prev_lower = i > 0 && (chars[i - 1].is_ascii_lowercase() || chars[i - 1].is_ascii_digit());
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            if i > 0 && (prev_lower || next_lower) {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(*c);
        }
    }
    out
}
