//! All-pairs shortest-path distance and canonical path tables.
//!
//! Tables are computed once per graph (Dijkstra over edge weights, or
//! hop-count BFS for unweighted analysis) and are read-only thereafter.
//! Shortest-path ties are broken towards the smallest predecessor id so the
//! canonical path for every pair is reproducible across runs and
//! implementations. Each path is stored both as a node sequence and as an
//! edge-id sequence; the latter makes the availability path-clear test a
//! pure index intersection.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::error::GraphError;
use crate::graph::{EdgeId, Graph, NodeId};

/// Heap entry ordered so the smallest `(distance, node)` pops first.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Visit {
    distance: f64,
    node: NodeId,
}

impl Eq for Visit {}

impl Ord for Visit {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; invert for nearest-first extraction.
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for Visit {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Precomputed all-pairs shortest distances and canonical paths.
///
/// # Examples
/// ```
/// use ctrlplace_core::{Apsp, GraphBuilder};
///
/// let mut builder = GraphBuilder::new("path");
/// let a = builder.add_node("a");
/// let b = builder.add_node("b");
/// let c = builder.add_node("c");
/// builder.add_edge(a, b, 2.0)?;
/// builder.add_edge(b, c, 3.0)?;
/// let graph = builder.build()?;
///
/// let apsp = Apsp::weighted(&graph)?;
/// assert_eq!(apsp.distance(a, c), 5.0);
/// assert_eq!(apsp.node_path(a, c), &[a, b, c]);
/// # Ok::<(), ctrlplace_core::GraphError>(())
/// ```
#[derive(Clone, Debug)]
pub struct Apsp {
    node_count: usize,
    distances: Vec<f64>,
    node_paths: Vec<Vec<NodeId>>,
    edge_paths: Vec<Vec<EdgeId>>,
}

impl Apsp {
    /// Builds tables using edge weights as distances (Dijkstra).
    ///
    /// # Errors
    /// Returns [`GraphError::Disconnected`] when some node pair has no path.
    pub fn weighted(graph: &Graph) -> Result<Self, GraphError> {
        Self::build(graph, true)
    }

    /// Builds tables using hop counts as distances (BFS equivalent).
    ///
    /// # Errors
    /// Returns [`GraphError::Disconnected`] when some node pair has no path.
    pub fn unweighted(graph: &Graph) -> Result<Self, GraphError> {
        Self::build(graph, false)
    }

    fn build(graph: &Graph, use_weights: bool) -> Result<Self, GraphError> {
        let n = graph.node_count();
        let mut distances = vec![f64::INFINITY; n * n];
        let mut node_paths = vec![Vec::new(); n * n];
        let mut edge_paths = vec![Vec::new(); n * n];

        for source in graph.nodes() {
            let (dist, pred) = single_source(graph, source, use_weights)?;
            for target in graph.nodes() {
                let (nodes, edges) = reconstruct(graph, source, target, &pred);
                distances[source * n + target] = dist[target];
                node_paths[source * n + target] = nodes;
                edge_paths[source * n + target] = edges;
            }
        }

        Ok(Self {
            node_count: n,
            distances,
            node_paths,
            edge_paths,
        })
    }

    /// Returns the number of nodes the tables were built for.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Shortest distance from `source` to `target`.
    ///
    /// # Panics
    /// Panics when either id is out of bounds.
    #[must_use]
    pub fn distance(&self, source: NodeId, target: NodeId) -> f64 {
        assert!(source < self.node_count && target < self.node_count);
        self.distances[source * self.node_count + target]
    }

    /// Canonical shortest path from `source` to `target` as a node sequence,
    /// inclusive of both endpoints.
    ///
    /// # Panics
    /// Panics when either id is out of bounds.
    #[must_use]
    pub fn node_path(&self, source: NodeId, target: NodeId) -> &[NodeId] {
        assert!(source < self.node_count && target < self.node_count);
        &self.node_paths[source * self.node_count + target]
    }

    /// Canonical shortest path from `source` to `target` as an edge-id
    /// sequence. Empty when `source == target`.
    ///
    /// # Panics
    /// Panics when either id is out of bounds.
    #[must_use]
    pub fn edge_path(&self, source: NodeId, target: NodeId) -> &[EdgeId] {
        assert!(source < self.node_count && target < self.node_count);
        &self.edge_paths[source * self.node_count + target]
    }
}

/// Single-source shortest paths with deterministic predecessor selection.
///
/// All edge weights are positive, so every candidate predecessor of a node
/// settles strictly before that node; keeping the smallest candidate id
/// therefore yields the canonical tree regardless of heap pop order.
fn single_source(
    graph: &Graph,
    source: NodeId,
    use_weights: bool,
) -> Result<(Vec<f64>, Vec<Option<NodeId>>), GraphError> {
    let n = graph.node_count();
    let mut dist = vec![f64::INFINITY; n];
    let mut pred: Vec<Option<NodeId>> = vec![None; n];
    let mut settled = vec![false; n];
    let mut heap = BinaryHeap::new();

    dist[source] = 0.0;
    heap.push(Visit {
        distance: 0.0,
        node: source,
    });

    while let Some(Visit { distance, node }) = heap.pop() {
        if settled[node] {
            continue;
        }
        settled[node] = true;
        for &(peer, edge) in graph.neighbors(node) {
            let weight = if use_weights {
                graph.edges()[edge].weight()
            } else {
                1.0
            };
            let candidate = distance + weight;
            if candidate < dist[peer] {
                dist[peer] = candidate;
                pred[peer] = Some(node);
                heap.push(Visit {
                    distance: candidate,
                    node: peer,
                });
            } else if candidate == dist[peer] && pred[peer].is_some_and(|p| node < p) {
                pred[peer] = Some(node);
            }
        }
    }

    if let Some(unreachable) = (0..n).find(|&node| dist[node].is_infinite()) {
        return Err(GraphError::Disconnected {
            first: source,
            unreachable,
        });
    }
    Ok((dist, pred))
}

fn reconstruct(
    graph: &Graph,
    source: NodeId,
    target: NodeId,
    pred: &[Option<NodeId>],
) -> (Vec<NodeId>, Vec<EdgeId>) {
    let mut nodes = vec![target];
    let mut current = target;
    while current != source {
        let Some(previous) = pred[current] else {
            break;
        };
        nodes.push(previous);
        current = previous;
    }
    nodes.reverse();

    let edges = nodes
        .windows(2)
        .filter_map(|pair| graph.edge_between(pair[0], pair[1]))
        .collect();
    (nodes, edges)
}
