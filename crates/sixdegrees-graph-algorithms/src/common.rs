//! Shared utilities for graph algorithms
//!
//! Provides a read-only, compact view of the graph topology for search.

/// Dense node index (0..N) inside a [`GraphView`]
pub type NodeIndex = usize;

/// A dense, integer-indexed, undirected view of the graph topology using
/// Compressed Sparse Row (CSR) format.
///
/// Every undirected edge `{u, v}` is stored twice: once in the neighbor range
/// of `u` and once in the neighbor range of `v`. Neighbor indices are stored as
/// `u32` to halve the footprint on graphs with tens of millions of edges.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GraphView {
    /// Number of nodes
    pub node_count: usize,
    /// Offsets into `targets`. Size = node_count + 1
    pub offsets: Vec<usize>,
    /// Contiguous array of neighbor node indices
    pub targets: Vec<u32>,
    /// Edge labels, aligned with `targets`
    pub labels: Vec<u32>,
}

impl GraphView {
    /// Build a symmetric CSR view from an undirected edge list.
    ///
    /// Each entry is `(u, v, label)`. Indices must be below `node_count`.
    pub fn from_edge_list(node_count: usize, edges: &[(u32, u32, u32)]) -> Self {
        let mut degree = vec![0usize; node_count];
        for &(u, v, _) in edges {
            degree[u as usize] += 1;
            degree[v as usize] += 1;
        }

        let mut offsets = Vec::with_capacity(node_count + 1);
        offsets.push(0);
        for d in &degree {
            let last = offsets[offsets.len() - 1];
            offsets.push(last + d);
        }

        let total = offsets[node_count];
        let mut targets = vec![0u32; total];
        let mut labels = vec![0u32; total];
        let mut cursor: Vec<usize> = offsets[..node_count].to_vec();

        for &(u, v, label) in edges {
            let slot = cursor[u as usize];
            targets[slot] = v;
            labels[slot] = label;
            cursor[u as usize] += 1;

            let slot = cursor[v as usize];
            targets[slot] = u;
            labels[slot] = label;
            cursor[v as usize] += 1;
        }

        Self {
            node_count,
            offsets,
            targets,
            labels,
        }
    }

    /// Helper to create a GraphView from symmetric adjacency lists (test support)
    pub fn from_adjacency_list(adjacency: Vec<Vec<(usize, u32)>>) -> Self {
        let node_count = adjacency.len();
        let mut offsets = Vec::with_capacity(node_count + 1);
        let mut targets = Vec::new();
        let mut labels = Vec::new();

        offsets.push(0);
        for neighbors in adjacency {
            for (target, label) in neighbors {
                targets.push(target as u32);
                labels.push(label);
            }
            offsets.push(targets.len());
        }

        Self {
            node_count,
            offsets,
            targets,
            labels,
        }
    }

    /// Number of stored adjacency entries (twice the undirected edge count)
    pub fn entry_count(&self) -> usize {
        self.targets.len()
    }

    /// Get the degree of a node (by index)
    pub fn degree(&self, idx: NodeIndex) -> usize {
        self.offsets[idx + 1] - self.offsets[idx]
    }

    /// Get the neighbors of a node
    pub fn neighbors(&self, idx: NodeIndex) -> &[u32] {
        &self.targets[self.offsets[idx]..self.offsets[idx + 1]]
    }

    /// Get the edge labels of a node's neighbor range
    pub fn labels(&self, idx: NodeIndex) -> &[u32] {
        &self.labels[self.offsets[idx]..self.offsets[idx + 1]]
    }

    /// Iterate `(neighbor, label)` pairs of a node
    pub fn edges(&self, idx: NodeIndex) -> impl Iterator<Item = (NodeIndex, u32)> + '_ {
        self.neighbors(idx)
            .iter()
            .zip(self.labels(idx))
            .map(|(&n, &l)| (n as NodeIndex, l))
    }
}
