//! Connectivity resolution: junction degrees and electrical node unification.
//!
//! Junctions joined by present, unmeasured short edges belong to the same
//! electrical node. A measured short stays a branch of its own (the probe
//! needs two distinct terminals), so it is not traversed here.

use crate::branch::Measure;
use crate::component::ComponentType;
use crate::grid::{EdgeRef, Grid};
use crate::node::NodeId;

/// Number of present, non-open edges incident to each junction, row-major.
pub fn degree_table(grid: &Grid) -> Vec<u32> {
    let (m, n) = (grid.m(), grid.n());
    let mut degree = vec![0u32; m * n];
    for r in grid.scan_refs() {
        let edge = grid.edge(r);
        if !edge.present || edge.kind == ComponentType::Open {
            continue;
        }
        let ((i1, j1), (i2, j2)) = r.endpoints();
        degree[i1 * n + j1] += 1;
        degree[i2 * n + j2] += 1;
    }
    degree
}

/// Junction-to-node assignment produced by [`unify_nodes`].
#[derive(Debug, Clone)]
pub struct NodeMap {
    n: usize,
    ids: Vec<u32>,
    count: usize,
}

impl NodeMap {
    /// Node of the junction at `(i, j)`.
    pub fn node(&self, i: usize, j: usize) -> NodeId {
        NodeId::new(self.ids[i * self.n + j])
    }

    /// Number of distinct nodes (isolated junctions included).
    pub fn count(&self) -> usize {
        self.count
    }

    /// Apply the grounding remap to every junction.
    pub fn reground(&mut self, ground: NodeId) {
        for id in &mut self.ids {
            *id = reground(NodeId::new(*id), ground).as_u32();
        }
    }
}

/// Flood-fill junctions into electrical nodes.
///
/// Traverses only edges that are present, of kind `Short`, and unmeasured.
/// Node ids come out dense, in order of first discovery (row-major).
pub fn unify_nodes(grid: &Grid) -> NodeMap {
    let (m, n) = (grid.m(), grid.n());
    let mut ids = vec![u32::MAX; m * n];
    let mut count = 0u32;

    let collapses = |r: EdgeRef| {
        let edge = grid.edge(r);
        edge.present && edge.kind == ComponentType::Short && edge.measure == Measure::None
    };

    let mut stack = Vec::new();
    for start_i in 0..m {
        for start_j in 0..n {
            if ids[start_i * n + start_j] != u32::MAX {
                continue;
            }
            let id = count;
            count += 1;
            stack.push((start_i, start_j));
            while let Some((i, j)) = stack.pop() {
                if ids[i * n + j] != u32::MAX {
                    continue;
                }
                ids[i * n + j] = id;
                if i > 0 && collapses(EdgeRef::vertical(i - 1, j)) {
                    stack.push((i - 1, j));
                }
                if i < m - 1 && collapses(EdgeRef::vertical(i, j)) {
                    stack.push((i + 1, j));
                }
                if j > 0 && collapses(EdgeRef::horizontal(i, j - 1)) {
                    stack.push((i, j - 1));
                }
                if j < n - 1 && collapses(EdgeRef::horizontal(i, j)) {
                    stack.push((i, j + 1));
                }
            }
        }
    }

    NodeMap {
        n,
        ids,
        count: count as usize,
    }
}

/// Dense grounding remap over node ids `0..count`.
///
/// The chosen ground becomes node 0 and the remaining ids are renumbered in
/// ascending order, so the result is again dense. Applying the remap to an
/// already-grounded id set (ground = 0) is the identity.
pub fn reground(node: NodeId, ground: NodeId) -> NodeId {
    if node == ground {
        NodeId::GROUND
    } else if node.as_u32() < ground.as_u32() {
        NodeId::new(node.as_u32() + 1)
    } else {
        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Edge;

    fn short() -> Edge {
        Edge::component(ComponentType::Short, 0)
    }

    #[test]
    fn test_isolated_junctions_get_distinct_nodes() {
        let grid = Grid::new(2, 2);
        let nodes = unify_nodes(&grid);
        assert_eq!(nodes.count(), 4);
        assert_ne!(nodes.node(0, 0), nodes.node(1, 1));
    }

    #[test]
    fn test_short_chain_collapses() {
        let mut grid = Grid::new(2, 2);
        *grid.edge_mut(EdgeRef::horizontal(0, 0)) = short();
        *grid.edge_mut(EdgeRef::vertical(0, 1)) = short();
        let nodes = unify_nodes(&grid);
        assert_eq!(nodes.count(), 2);
        assert_eq!(nodes.node(0, 0), nodes.node(0, 1));
        assert_eq!(nodes.node(0, 1), nodes.node(1, 1));
        assert_ne!(nodes.node(0, 0), nodes.node(1, 0));
    }

    #[test]
    fn test_measured_short_is_not_traversed() {
        let mut grid = Grid::new(2, 2);
        let mut edge = short();
        edge.measure = Measure::Current;
        edge.measure_label = 1;
        *grid.edge_mut(EdgeRef::horizontal(0, 0)) = edge;
        let nodes = unify_nodes(&grid);
        assert_ne!(nodes.node(0, 0), nodes.node(0, 1));
    }

    #[test]
    fn test_non_short_edges_are_not_traversed() {
        let mut grid = Grid::new(2, 2);
        *grid.edge_mut(EdgeRef::horizontal(0, 0)) =
            Edge::component(ComponentType::Resistor, 10);
        let nodes = unify_nodes(&grid);
        assert_ne!(nodes.node(0, 0), nodes.node(0, 1));
    }

    #[test]
    fn test_degree_counts_non_open_edges() {
        let mut grid = Grid::new(2, 2);
        *grid.edge_mut(EdgeRef::horizontal(0, 0)) =
            Edge::component(ComponentType::Resistor, 10);
        *grid.edge_mut(EdgeRef::vertical(0, 0)) =
            Edge::component(ComponentType::VoltageSource, 5);
        let degree = degree_table(&grid);
        // Junction (0,0) touches both edges.
        assert_eq!(degree[0], 2);
        // (0,1) touches the horizontal edge only, (1,0) the vertical only.
        assert_eq!(degree[1], 1);
        assert_eq!(degree[2], 1);
        assert_eq!(degree[3], 0);
    }

    #[test]
    fn test_reground_is_dense() {
        // Pre-ground ids 0..4, ground = 2.
        let ground = NodeId::new(2);
        let mapped: Vec<u32> = (0..4)
            .map(|x| reground(NodeId::new(x), ground).as_u32())
            .collect();
        assert_eq!(mapped, vec![1, 2, 0, 3]);
    }

    #[test]
    fn test_reground_idempotent() {
        let ground = NodeId::new(2);
        let once: Vec<NodeId> = (0..5).map(|x| reground(NodeId::new(x), ground)).collect();
        // The ground of the regrounded set is node 0; remapping again must
        // change nothing.
        let twice: Vec<NodeId> = once.iter().map(|&x| reground(x, NodeId::GROUND)).collect();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_reground_ground_already_zero() {
        for x in 0..5 {
            assert_eq!(reground(NodeId::new(x), NodeId::GROUND), NodeId::new(x));
        }
    }
}
