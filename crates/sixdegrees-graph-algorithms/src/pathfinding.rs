//! Pathfinding algorithms
//!
//! Unweighted shortest path over an undirected [`GraphView`]: a plain
//! level-synchronous BFS and a bidirectional BFS that grows whichever frontier
//! is cheaper to expand.

use super::common::{GraphView, NodeIndex};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Bounds on the work a single search may do.
///
/// `None` means unbounded. Exceeding a bound ends the search with
/// [`SearchOutcome::LimitExceeded`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchLimits {
    /// Maximum number of hops of any path the search will look for
    pub max_depth: Option<usize>,
    /// Maximum number of nodes discovered across all frontiers
    pub max_visited: Option<usize>,
}

impl SearchLimits {
    pub fn unbounded() -> Self {
        Self::default()
    }

    fn depth_exceeded(&self, depth: usize) -> bool {
        self.max_depth.is_some_and(|max| depth > max)
    }

    fn visited_exceeded(&self, visited: usize) -> bool {
        self.max_visited.is_some_and(|max| visited > max)
    }
}

/// Which limit ended a search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    Depth,
    Visited,
}

/// A path through the view, source first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodePath {
    pub nodes: Vec<NodeIndex>,
}

impl NodePath {
    /// Number of edges traversed
    pub fn hops(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    pub fn source(&self) -> Option<NodeIndex> {
        self.nodes.first().copied()
    }

    pub fn target(&self) -> Option<NodeIndex> {
        self.nodes.last().copied()
    }
}

/// Result of a shortest-path search
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// A shortest path was found
    Found(NodePath),
    /// The frontier was exhausted without reaching the target
    Unreachable,
    /// A limit stopped the search before it could decide
    LimitExceeded(LimitKind),
}

impl SearchOutcome {
    pub fn path(&self) -> Option<&NodePath> {
        match self {
            SearchOutcome::Found(path) => Some(path),
            _ => None,
        }
    }

    pub fn into_path(self) -> Option<NodePath> {
        match self {
            SearchOutcome::Found(path) => Some(path),
            _ => None,
        }
    }
}

/// Breadth-First Search (Unweighted Shortest Path)
pub fn bfs(
    view: &GraphView,
    source: NodeIndex,
    target: NodeIndex,
    limits: &SearchLimits,
) -> SearchOutcome {
    if source >= view.node_count || target >= view.node_count {
        return SearchOutcome::Unreachable;
    }
    if source == target {
        return SearchOutcome::Found(NodePath { nodes: vec![source] });
    }

    let mut side = Side::new(source);
    while !side.frontier.is_empty() {
        if limits.depth_exceeded(side.depth + 1) {
            return SearchOutcome::LimitExceeded(LimitKind::Depth);
        }
        let target_only = SingleTarget(target);
        match side.expand_level(view, &target_only, limits, 0) {
            Level::Met(meet) => {
                let mut nodes = side.chain(meet);
                nodes.reverse();
                return SearchOutcome::Found(NodePath { nodes });
            }
            Level::Limit(kind) => return SearchOutcome::LimitExceeded(kind),
            Level::Continue => {}
        }
    }

    SearchOutcome::Unreachable
}

/// Bidirectional Breadth-First Search (Unweighted Shortest Path)
///
/// Expands one full level at a time from whichever side has the cheaper
/// frontier (by total degree). Visited sets of the two sides stay disjoint
/// until the first meeting node is discovered, and every meeting discovered
/// during a level expansion lies on a shortest path, so the search stops at
/// the first one.
pub fn bidirectional_bfs(
    view: &GraphView,
    source: NodeIndex,
    target: NodeIndex,
    limits: &SearchLimits,
) -> SearchOutcome {
    if source >= view.node_count || target >= view.node_count {
        return SearchOutcome::Unreachable;
    }
    if source == target {
        return SearchOutcome::Found(NodePath { nodes: vec![source] });
    }

    let mut forward = Side::new(source);
    let mut backward = Side::new(target);

    loop {
        if forward.frontier.is_empty() || backward.frontier.is_empty() {
            return SearchOutcome::Unreachable;
        }
        if limits.depth_exceeded(forward.depth + backward.depth + 1) {
            return SearchOutcome::LimitExceeded(LimitKind::Depth);
        }

        let expand_forward = forward.frontier_cost(view) <= backward.frontier_cost(view);
        let (expanding, other) = if expand_forward {
            (&mut forward, &backward)
        } else {
            (&mut backward, &forward)
        };

        match expanding.expand_level(view, other, limits, other.parents.len()) {
            Level::Met(meet) => {
                let mut nodes = forward.chain(meet);
                nodes.reverse();
                nodes.extend(backward.chain(meet).into_iter().skip(1));
                return SearchOutcome::Found(NodePath { nodes });
            }
            Level::Limit(kind) => return SearchOutcome::LimitExceeded(kind),
            Level::Continue => {}
        }
    }
}

/// Membership test for the "other side" of a level expansion
trait Goal {
    fn contains(&self, node: NodeIndex) -> bool;
}

struct SingleTarget(NodeIndex);

impl Goal for SingleTarget {
    fn contains(&self, node: NodeIndex) -> bool {
        node == self.0
    }
}

enum Level {
    Met(NodeIndex),
    Limit(LimitKind),
    Continue,
}

/// One direction of a search: parent links plus the current frontier.
struct Side {
    root: NodeIndex,
    parents: HashMap<NodeIndex, NodeIndex>, // node -> parent
    frontier: Vec<NodeIndex>,
    depth: usize,
}

impl Goal for Side {
    fn contains(&self, node: NodeIndex) -> bool {
        self.parents.contains_key(&node)
    }
}

impl Side {
    fn new(root: NodeIndex) -> Self {
        let mut parents = HashMap::new();
        parents.insert(root, root);
        Self {
            root,
            parents,
            frontier: vec![root],
            depth: 0,
        }
    }

    fn frontier_cost(&self, view: &GraphView) -> usize {
        self.frontier.iter().map(|&n| view.degree(n)).sum()
    }

    fn expand_level(
        &mut self,
        view: &GraphView,
        goal: &impl Goal,
        limits: &SearchLimits,
        visited_elsewhere: usize,
    ) -> Level {
        let mut next = Vec::new();
        for &current in &self.frontier {
            for &neighbor in view.neighbors(current) {
                let neighbor = neighbor as NodeIndex;
                if let Entry::Vacant(slot) = self.parents.entry(neighbor) {
                    slot.insert(current);
                    if goal.contains(neighbor) {
                        return Level::Met(neighbor);
                    }
                    if limits.visited_exceeded(self.parents.len() + visited_elsewhere) {
                        return Level::Limit(LimitKind::Visited);
                    }
                    next.push(neighbor);
                }
            }
        }
        self.frontier = next;
        self.depth += 1;
        Level::Continue
    }

    /// Walk parent links from `node` back to this side's root (inclusive)
    fn chain(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut path = vec![node];
        let mut current = node;
        while current != self.root {
            match self.parents.get(&current) {
                Some(&parent) => {
                    path.push(parent);
                    current = parent;
                }
                None => break,
            }
        }
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::GraphView;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn chain(n: u32) -> GraphView {
        let edges: Vec<_> = (0..n - 1).map(|i| (i, i + 1, 0)).collect();
        GraphView::from_edge_list(n as usize, &edges)
    }

    #[test]
    fn test_bfs() {
        // 0 - 1 - 2
        let view = chain(3);
        let result = bfs(&view, 0, 2, &SearchLimits::unbounded());
        assert_eq!(result.path().unwrap().nodes, vec![0, 1, 2]);
        assert_eq!(result.path().unwrap().hops(), 2);
    }

    #[test]
    fn test_bidirectional_bfs_chain() {
        let view = chain(6);
        let result = bidirectional_bfs(&view, 0, 5, &SearchLimits::unbounded());
        assert_eq!(result.into_path().unwrap().nodes, vec![0, 1, 2, 3, 4, 5]);

        let reverse = bidirectional_bfs(&view, 5, 0, &SearchLimits::unbounded());
        assert_eq!(reverse.into_path().unwrap().nodes, vec![5, 4, 3, 2, 1, 0]);
    }

    #[test]
    fn test_trivial_path() {
        let view = chain(2);
        let result = bidirectional_bfs(&view, 1, 1, &SearchLimits::unbounded());
        assert_eq!(result.path().unwrap().nodes, vec![1]);
        assert_eq!(result.path().unwrap().hops(), 0);
    }

    #[test]
    fn test_unreachable() {
        // 0 - 1   2 - 3
        let view = GraphView::from_edge_list(4, &[(0, 1, 0), (2, 3, 0)]);
        assert_eq!(
            bidirectional_bfs(&view, 0, 3, &SearchLimits::unbounded()),
            SearchOutcome::Unreachable
        );
        assert_eq!(bfs(&view, 0, 3, &SearchLimits::unbounded()), SearchOutcome::Unreachable);
    }

    #[test]
    fn test_out_of_range_is_unreachable() {
        let view = chain(2);
        assert_eq!(
            bidirectional_bfs(&view, 0, 9, &SearchLimits::unbounded()),
            SearchOutcome::Unreachable
        );
    }

    #[test]
    fn test_prefers_shortcut() {
        // 0 - 1 - 2 - 3 - 4 and shortcut 0 - 5 - 4
        let view = GraphView::from_edge_list(
            6,
            &[(0, 1, 0), (1, 2, 0), (2, 3, 0), (3, 4, 0), (0, 5, 0), (5, 4, 0)],
        );
        let result = bidirectional_bfs(&view, 0, 4, &SearchLimits::unbounded());
        assert_eq!(result.into_path().unwrap().nodes, vec![0, 5, 4]);
    }

    #[test]
    fn test_depth_limit() {
        let view = chain(6);
        let limits = SearchLimits {
            max_depth: Some(3),
            max_visited: None,
        };
        assert_eq!(
            bidirectional_bfs(&view, 0, 5, &limits),
            SearchOutcome::LimitExceeded(LimitKind::Depth)
        );
        assert_eq!(bfs(&view, 0, 5, &limits), SearchOutcome::LimitExceeded(LimitKind::Depth));

        // A path exactly at the limit is still found
        let limits = SearchLimits {
            max_depth: Some(5),
            max_visited: None,
        };
        assert_eq!(bidirectional_bfs(&view, 0, 5, &limits).path().unwrap().hops(), 5);
        assert_eq!(bfs(&view, 0, 5, &limits).path().unwrap().hops(), 5);
    }

    #[test]
    fn test_visited_limit() {
        // Star around 0 with 100 leaves, target hanging off leaf 100
        let mut edges: Vec<_> = (1..=100).map(|i| (0, i, 0)).collect();
        edges.push((100, 101, 0));
        let view = GraphView::from_edge_list(102, &edges);
        let limits = SearchLimits {
            max_depth: None,
            max_visited: Some(10),
        };
        assert_eq!(bfs(&view, 1, 101, &limits), SearchOutcome::LimitExceeded(LimitKind::Visited));
    }

    #[test]
    fn test_bidirectional_matches_bfs_on_random_graphs() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let n: u32 = rng.gen_range(2..40);
            let m = rng.gen_range(0..n * 2);
            let edges: Vec<_> = (0..m)
                .map(|_| (rng.gen_range(0..n), rng.gen_range(0..n), 0))
                .filter(|(u, v, _)| u != v)
                .collect();
            let view = GraphView::from_edge_list(n as usize, &edges);
            let s = rng.gen_range(0..n) as usize;
            let t = rng.gen_range(0..n) as usize;

            let plain = bfs(&view, s, t, &SearchLimits::unbounded());
            let bidi = bidirectional_bfs(&view, s, t, &SearchLimits::unbounded());
            assert_eq!(plain.path().map(|p| p.hops()), bidi.path().map(|p| p.hops()));

            if let Some(path) = bidi.path() {
                assert_eq!(path.source(), Some(s));
                assert_eq!(path.target(), Some(t));
                for pair in path.nodes.windows(2) {
                    assert!(view.neighbors(pair[0]).contains(&(pair[1] as u32)));
                }
            }
        }
    }
}
