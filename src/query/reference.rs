//! Node reference parsing
//!
//! Accepted forms:
//! - `person:<id>` / `movie:<id>` (explicit kind tag)
//! - bare `nm...` (person) / `tt...` (movie) identifiers

use crate::graph::{NodeKind, NodeRef};
use std::str::FromStr;
use thiserror::Error;

/// Why a reference could not be parsed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReferenceError {
    #[error("Empty node reference")]
    Empty,

    #[error("Invalid node type: {0}")]
    UnknownKind(String),

    #[error("Missing node id")]
    MissingId,

    #[error(
        "Invalid node reference {0:?}. Use 'person:nm...' / 'movie:tt...' or a bare 'nm...' / 'tt...' id."
    )]
    UnrecognizedPrefix(String),
}

/// Parse a caller-supplied node reference
pub fn parse_node_ref(value: &str) -> Result<NodeRef, ReferenceError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ReferenceError::Empty);
    }

    if let Some((tag, id)) = value.split_once(':') {
        let kind =
            NodeKind::from_tag(tag).ok_or_else(|| ReferenceError::UnknownKind(tag.to_string()))?;
        if id.is_empty() {
            return Err(ReferenceError::MissingId);
        }
        return Ok(NodeRef::new(kind, id));
    }

    NodeKind::from_id_prefix(value)
        .map(|kind| NodeRef::new(kind, value))
        .ok_or_else(|| ReferenceError::UnrecognizedPrefix(value.to_string()))
}

impl FromStr for NodeRef {
    type Err = ReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_node_ref(s)
    }
}
