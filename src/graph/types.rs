//! Core type definitions for the people/movie graph

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role categories retained by default when normalizing participations
pub const DEFAULT_CATEGORIES: [&str; 3] = ["actor", "actress", "director"];

/// Relationship type used when exporting participations for bulk import
pub const PARTICIPATION_EDGE_TYPE: &str = "WORKED_IN";

/// The two disjoint node kinds of the bipartite graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Person,
    Movie,
}

impl NodeKind {
    /// Tag used in node references and API payloads
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Person => "person",
            NodeKind::Movie => "movie",
        }
    }

    /// Identifier prefix of this kind's namespace (`nm...`, `tt...`)
    pub fn id_prefix(&self) -> &'static str {
        match self {
            NodeKind::Person => "nm",
            NodeKind::Movie => "tt",
        }
    }

    /// Node label used by the bulk-import header files
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Person => "Person",
            NodeKind::Movie => "Movie",
        }
    }

    /// Parse a kind tag (`person` / `movie`)
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "person" => Some(NodeKind::Person),
            "movie" => Some(NodeKind::Movie),
            _ => None,
        }
    }

    /// Infer the kind from an identifier's namespace prefix
    pub fn from_id_prefix(id: &str) -> Option<Self> {
        if id.starts_with(NodeKind::Person.id_prefix()) {
            Some(NodeKind::Person)
        } else if id.starts_with(NodeKind::Movie.id_prefix()) {
            Some(NodeKind::Movie)
        } else {
            None
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An unambiguous reference to a node: kind plus external identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeRef {
    pub kind: NodeKind,
    pub id: String,
}

impl NodeRef {
    pub fn new(kind: NodeKind, id: impl Into<String>) -> Self {
        NodeRef { kind, id: id.into() }
    }

    pub fn person(id: impl Into<String>) -> Self {
        Self::new(NodeKind::Person, id)
    }

    pub fn movie(id: impl Into<String>) -> Self {
        Self::new(NodeKind::Movie, id)
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Dense index of a node inside a built graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct NodeIdx(pub u32);

impl NodeIdx {
    pub fn new(idx: u32) -> Self {
        NodeIdx(idx)
    }

    pub fn as_usize(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeIdx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeIdx({})", self.0)
    }
}

/// Role category of a participation (e.g., "actor", "director")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    pub fn new(category: impl Into<String>) -> Self {
        Category(category.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Category {
    fn from(s: String) -> Self {
        Category(s)
    }
}

impl From<&str> for Category {
    fn from(s: &str) -> Self {
        Category(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_kind_tags() {
        assert_eq!(NodeKind::from_tag("person"), Some(NodeKind::Person));
        assert_eq!(NodeKind::from_tag("movie"), Some(NodeKind::Movie));
        assert_eq!(NodeKind::from_tag("Person"), None);
        assert_eq!(format!("{}", NodeKind::Movie), "movie");
    }

    #[test]
    fn test_kind_from_prefix() {
        assert_eq!(NodeKind::from_id_prefix("nm0000102"), Some(NodeKind::Person));
        assert_eq!(NodeKind::from_id_prefix("tt0087332"), Some(NodeKind::Movie));
        assert_eq!(NodeKind::from_id_prefix("co0000001"), None);
    }

    #[test]
    fn test_node_ref_display() {
        assert_eq!(NodeRef::person("nm1").to_string(), "person:nm1");
        assert_eq!(NodeRef::movie("tt1").to_string(), "movie:tt1");
    }

    #[test]
    fn test_node_kind_serde() {
        let json = serde_json::to_string(&NodeKind::Person).unwrap();
        assert_eq!(json, "\"person\"");
    }

    #[test]
    fn test_category() {
        let category = Category::new("actress");
        assert_eq!(category.as_str(), "actress");
        let other: Category = "director".into();
        assert_eq!(format!("{}", other), "director");
    }
}
