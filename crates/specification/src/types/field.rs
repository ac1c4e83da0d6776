//! Paths into an entity's JSON document.

use std::fmt;

use serde_json::Value;

use super::value::ScalarValue;

/// One step of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Object member lookup.
    Key(String),
    /// Array element lookup. Never matches an object member.
    Index(usize),
}

/// A dotted path such as `address.city` or `tags.0`.
///
/// Purely numeric segments index into arrays; every other segment names an
/// object member. An empty path is allowed and addresses nothing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    raw: String,
    segments: Vec<PathSegment>,
}

impl FieldPath {
    /// Parses a dotted path.
    pub fn new(path: impl Into<String>) -> Self {
        let raw = path.into();
        let segments = raw
            .split('.')
            .filter(|s| !s.is_empty())
            .map(|segment| match segment.parse::<usize>() {
                Ok(index) if segment.bytes().all(|b| b.is_ascii_digit()) => {
                    PathSegment::Index(index)
                }
                _ => PathSegment::Key(segment.to_string()),
            })
            .collect();
        Self { raw, segments }
    }

    /// Returns the path as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns the parsed segments.
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Returns the first object key, which names the top-level field.
    pub fn root(&self) -> Option<&str> {
        match self.segments.first() {
            Some(PathSegment::Key(key)) => Some(key),
            _ => None,
        }
    }

    /// Renders the path as a SQLite JSON path (`$."address"."city"`).
    ///
    /// Returns `None` for paths that cannot be expressed: empty paths and keys
    /// containing a double quote.
    pub fn to_json_path(&self) -> Option<String> {
        if self.segments.is_empty() {
            return None;
        }
        let mut out = String::from("$");
        for segment in &self.segments {
            match segment {
                PathSegment::Key(key) if key.contains('"') => return None,
                PathSegment::Key(key) => {
                    out.push_str(".\"");
                    out.push_str(key);
                    out.push('"');
                }
                PathSegment::Index(index) => {
                    out.push('[');
                    out.push_str(&index.to_string());
                    out.push(']');
                }
            }
        }
        Some(out)
    }

    /// Follows the path through a document.
    pub fn resolve<'a>(&self, document: &'a Value) -> Option<&'a Value> {
        if self.segments.is_empty() {
            return None;
        }
        let mut current = document;
        for segment in &self.segments {
            current = match (segment, current) {
                (PathSegment::Key(key), Value::Object(map)) => map.get(key)?,
                (PathSegment::Index(index), Value::Array(items)) => items.get(*index)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Reads the scalar at this path; missing paths read as `Null`.
    pub fn extract(&self, document: &Value) -> ScalarValue {
        self.resolve(document)
            .map_or(ScalarValue::Null, ScalarValue::from_json)
    }

    /// Returns true if the value at this path is a JSON string.
    pub(crate) fn is_text(&self, document: &Value) -> bool {
        matches!(self.resolve(document), Some(Value::String(_)))
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for FieldPath {
    fn from(path: &str) -> Self {
        FieldPath::new(path)
    }
}

impl From<String> for FieldPath {
    fn from(path: String) -> Self {
        FieldPath::new(path)
    }
}
