//! Name and title search over a snapshot's node table
//!
//! Matching is case-insensitive. Names starting with the query rank ahead of
//! names merely containing it; within a rank, hits are ordered by name.

use super::node::Node;
use super::types::NodeKind;
use rayon::prelude::*;
use serde::Serialize;

/// One search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub name: String,
    /// Birth year (people only)
    pub born: Option<i32>,
    /// Release year (movies only)
    pub year: Option<i32>,
}

impl SearchHit {
    fn from_node(node: &Node) -> Self {
        let (born, year) = match node.kind {
            NodeKind::Person => (node.year, None),
            NodeKind::Movie => (None, node.year),
        };
        SearchHit {
            id: node.id.clone(),
            kind: node.kind,
            name: node.name.clone(),
            born,
            year,
        }
    }
}

/// Lower-cased names, aligned with the node table
#[derive(Debug, Default)]
pub(crate) struct NameIndex {
    folded: Vec<String>,
}

impl NameIndex {
    pub(crate) fn build(nodes: &[Node]) -> Self {
        NameIndex {
            folded: nodes.par_iter().map(|n| n.name.to_lowercase()).collect(),
        }
    }

    pub(crate) fn search(&self, nodes: &[Node], query: &str, limit: usize) -> Vec<SearchHit> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() || limit == 0 {
            return Vec::new();
        }

        let mut ranked: Vec<(u8, usize)> = self
            .folded
            .par_iter()
            .enumerate()
            .filter_map(|(idx, name)| {
                if name.starts_with(&needle) {
                    Some((0, idx))
                } else if name.contains(&needle) {
                    Some((1, idx))
                } else {
                    None
                }
            })
            .collect();

        ranked.par_sort_unstable_by(|a, b| {
            a.0.cmp(&b.0)
                .then_with(|| nodes[a.1].name.cmp(&nodes[b.1].name))
                .then_with(|| nodes[a.1].id.cmp(&nodes[b.1].id))
        });

        ranked
            .into_iter()
            .take(limit)
            .map(|(_, idx)| SearchHit::from_node(&nodes[idx]))
            .collect()
    }
}
