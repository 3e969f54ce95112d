//! Degrees of separation

use crate::graph::NodeKind;
use tracing::warn;

/// Translate a path's hop count into degrees of separation
///
/// Only defined between two people: every degree is a person -> movie -> person
/// pair of hops. In a bipartite graph such a path always has an even hop count;
/// an odd count is reported as a data-integrity problem and floored.
pub fn degrees_of_separation(start: NodeKind, end: NodeKind, hops: usize) -> Option<usize> {
    if start != NodeKind::Person || end != NodeKind::Person {
        return None;
    }
    if hops % 2 != 0 {
        warn!(hops, "Person-to-person path with an odd hop count; graph is not bipartite");
    }
    Some(hops / 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_person_to_person() {
        assert_eq!(degrees_of_separation(NodeKind::Person, NodeKind::Person, 0), Some(0));
        assert_eq!(degrees_of_separation(NodeKind::Person, NodeKind::Person, 2), Some(1));
        assert_eq!(degrees_of_separation(NodeKind::Person, NodeKind::Person, 6), Some(3));
    }

    #[test]
    fn test_movie_endpoint_has_no_degree() {
        assert_eq!(degrees_of_separation(NodeKind::Movie, NodeKind::Person, 1), None);
        assert_eq!(degrees_of_separation(NodeKind::Person, NodeKind::Movie, 3), None);
        assert_eq!(degrees_of_separation(NodeKind::Movie, NodeKind::Movie, 0), None);
    }

    #[test]
    fn test_odd_hops_are_floored() {
        assert_eq!(degrees_of_separation(NodeKind::Person, NodeKind::Person, 3), Some(1));
    }
}
