use core::fmt::Display;

use serde::{Deserialize, Serialize};
use thisisplural::Plural;

/// Options that shape generated field ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IdOptions {
    pub id_prefix: String,
    pub id_separator: String,
}

impl Default for IdOptions {
    fn default() -> Self {
        Self {
            id_prefix: "root".to_string(),
            id_separator: "_".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Array element position
    Index(usize),
    /// Property name
    Name(String),
}

impl Display for PathSegment {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PathSegment::Index(index) => write!(f, "{index}"),
            PathSegment::Name(name) => write!(f, "{name}"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Plural, Serialize, Deserialize)]
pub struct FieldPath(pub Vec<PathSegment>);

impl FieldPath {
    /// Dotted form, e.g. `person.pets.0.name`.
    pub fn to_dotted(&self) -> String {
        self.0
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Stable identifier of a field: the generated DOM-style id plus the path of
/// segments that reach the field from the root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldPathId {
    #[serde(rename = "$id")]
    pub id: String,
    pub path: FieldPath,
}

impl FieldPathId {
    pub fn root(options: &IdOptions) -> Self {
        Self::from_path(FieldPath::default(), options)
    }

    pub fn from_path(path: FieldPath, options: &IdOptions) -> Self {
        let mut id = options.id_prefix.clone();
        for segment in &path.0 {
            id.push_str(&options.id_separator);
            id.push_str(&segment.to_string());
        }
        Self { id, path }
    }

    /// Appends a segment, regenerating the id.
    pub fn child(&self, segment: PathSegment, options: &IdOptions) -> Self {
        let mut path = self.path.clone();
        path.0.push(segment);
        Self::from_path(path, options)
    }

    /// Appends a property name; numeric names are kept as names until a schema
    /// proves the parent is an array.
    pub fn child_name(&self, name: &str, options: &IdOptions) -> Self {
        self.child(PathSegment::Name(name.to_string()), options)
    }

    /// Replaces the last segment with an array index.
    pub fn with_last_index(&self, index: usize, options: &IdOptions) -> Self {
        let mut path = self.path.clone();
        path.0.pop();
        path.0.push(PathSegment::Index(index));
        Self::from_path(path, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_id_uses_prefix() {
        let id = FieldPathId::root(&IdOptions::default());
        assert_eq!(id.id, "root");
        assert!(id.path.0.is_empty());
    }

    #[test]
    fn test_child_ids_join_with_separator() {
        let options = IdOptions::default();
        let id = FieldPathId::root(&options)
            .child_name("person", &options)
            .child_name("address", &options);
        assert_eq!(id.id, "root_person_address");
        assert_eq!(id.path.to_dotted(), "person.address");
    }

    #[test]
    fn test_custom_separator() {
        let options = IdOptions {
            id_prefix: "form".to_string(),
            id_separator: "~".to_string(),
        };
        let id = FieldPathId::root(&options)
            .child_name("list", &options)
            .child_name("2", &options)
            .with_last_index(2, &options);
        assert_eq!(id.id, "form~list~2");
        assert_eq!(id.path.0.last(), Some(&PathSegment::Index(2)));
    }

    #[test]
    fn test_path_serializes_as_mixed_array() {
        let options = IdOptions::default();
        let id = FieldPathId::root(&options)
            .child_name("a", &options)
            .child(PathSegment::Index(0), &options);
        assert_eq!(
            serde_json::to_value(&id).unwrap(),
            serde_json::json!({"$id": "root_a_0", "path": ["a", 0]})
        );
    }
}
