//! Immutable network topology model.
//!
//! Nodes are dense indices `0..n` with human-readable labels; undirected
//! edges are stored in canonical form (`source < target`) with a dense edge
//! index so failure enumeration and congestion counters can address edges by
//! id. Construction validates endpoints and weights up front; once built, a
//! [`Graph`] never changes.

use std::collections::HashMap;

use crate::error::GraphError;

/// Identifier of a node, dense in `0..node_count`.
pub type NodeId = usize;

/// Identifier of an edge, dense in `0..edge_count`.
pub type EdgeId = usize;

/// An undirected weighted edge in canonical form (`source < target`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
    source: NodeId,
    target: NodeId,
    weight: f64,
}

impl Edge {
    /// Returns the smaller endpoint id.
    #[must_use]
    #[rustfmt::skip]
    pub fn source(&self) -> NodeId { self.source }

    /// Returns the larger endpoint id.
    #[must_use]
    #[rustfmt::skip]
    pub fn target(&self) -> NodeId { self.target }

    /// Returns the edge weight (a positive finite distance).
    #[must_use]
    #[rustfmt::skip]
    pub fn weight(&self) -> f64 { self.weight }
}

/// Incrementally assembles a validated [`Graph`].
///
/// # Examples
/// ```
/// use ctrlplace_core::GraphBuilder;
///
/// let mut builder = GraphBuilder::new("triangle");
/// let a = builder.add_node("a");
/// let b = builder.add_node("b");
/// let c = builder.add_node("c");
/// builder.add_edge(a, b, 1.0)?;
/// builder.add_edge(b, c, 1.0)?;
/// builder.add_edge(a, c, 1.0)?;
/// let graph = builder.build()?;
/// assert_eq!(graph.node_count(), 3);
/// assert_eq!(graph.edge_count(), 3);
/// # Ok::<(), ctrlplace_core::GraphError>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct GraphBuilder {
    name: String,
    labels: Vec<String>,
    edges: Vec<Edge>,
    seen: HashMap<(NodeId, NodeId), EdgeId>,
}

impl GraphBuilder {
    /// Creates an empty builder for a topology with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds a node and returns its id.
    pub fn add_node(&mut self, label: impl Into<String>) -> NodeId {
        self.labels.push(label.into());
        self.labels.len() - 1
    }

    /// Adds an undirected edge between two existing nodes.
    ///
    /// The endpoints are canonicalised to `(min, max)`.
    ///
    /// # Errors
    /// Returns [`GraphError::InvalidNodeId`] for unknown endpoints,
    /// [`GraphError::SelfLoop`] when both endpoints are the same node,
    /// [`GraphError::InvalidWeight`] for non-positive or non-finite weights,
    /// and [`GraphError::DuplicateEdge`] when the edge already exists.
    pub fn add_edge(&mut self, u: NodeId, v: NodeId, weight: f64) -> Result<EdgeId, GraphError> {
        let node_count = self.labels.len();
        for node in [u, v] {
            if node >= node_count {
                return Err(GraphError::InvalidNodeId { node, node_count });
            }
        }
        if u == v {
            return Err(GraphError::SelfLoop { node: u });
        }
        let (source, target) = if u < v { (u, v) } else { (v, u) };
        if !weight.is_finite() || weight <= 0.0 {
            return Err(GraphError::InvalidWeight {
                first: source,
                target,
                weight,
            });
        }
        if self.seen.contains_key(&(source, target)) {
            return Err(GraphError::DuplicateEdge {
                first: source,
                target,
            });
        }
        let id = self.edges.len();
        self.seen.insert((source, target), id);
        self.edges.push(Edge {
            source,
            target,
            weight,
        });
        Ok(id)
    }

    /// Finalises the builder into an immutable [`Graph`].
    ///
    /// # Errors
    /// Returns [`GraphError::EmptyGraph`] when no nodes were added.
    pub fn build(self) -> Result<Graph, GraphError> {
        if self.labels.is_empty() {
            return Err(GraphError::EmptyGraph);
        }
        let mut adjacency = vec![Vec::new(); self.labels.len()];
        for (id, edge) in self.edges.iter().enumerate() {
            adjacency[edge.source].push((edge.target, id));
            adjacency[edge.target].push((edge.source, id));
        }
        // Neighbour order pins the deterministic tie-breaks downstream.
        for list in &mut adjacency {
            list.sort_unstable();
        }
        Ok(Graph {
            name: self.name,
            labels: self.labels,
            edges: self.edges,
            edge_index: self.seen,
            adjacency,
        })
    }
}

/// An immutable node set plus weighted undirected edges.
#[derive(Clone, Debug)]
pub struct Graph {
    name: String,
    labels: Vec<String>,
    edges: Vec<Edge>,
    edge_index: HashMap<(NodeId, NodeId), EdgeId>,
    adjacency: Vec<Vec<(NodeId, EdgeId)>>,
}

impl Graph {
    /// Returns the topology name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.labels.len()
    }

    /// Returns the number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Iterates node ids in ascending order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + use<> {
        0..self.labels.len()
    }

    /// Returns the label of `node`, if it exists.
    #[must_use]
    pub fn label(&self, node: NodeId) -> Option<&str> {
        self.labels.get(node).map(String::as_str)
    }

    /// Returns all edges in insertion order.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Returns the id of the edge between `u` and `v`, if present.
    #[must_use]
    pub fn edge_between(&self, u: NodeId, v: NodeId) -> Option<EdgeId> {
        let key = if u < v { (u, v) } else { (v, u) };
        self.edge_index.get(&key).copied()
    }

    /// Returns `(neighbour, edge id)` pairs of `node` in ascending
    /// neighbour order.
    #[must_use]
    pub fn neighbors(&self, node: NodeId) -> &[(NodeId, EdgeId)] {
        self.adjacency.get(node).map_or(&[], Vec::as_slice)
    }

    /// Sum of all edge weights.
    #[must_use]
    pub fn total_weight(&self) -> f64 {
        self.edges.iter().map(Edge::weight).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    fn pair() -> GraphBuilder {
        let mut builder = GraphBuilder::new("pair");
        builder.add_node("a");
        builder.add_node("b");
        builder
    }

    #[test]
    fn rejects_empty_graph() {
        let result = GraphBuilder::new("empty").build();
        assert!(matches!(result, Err(GraphError::EmptyGraph)));
    }

    #[test]
    fn rejects_unknown_endpoint() {
        let mut builder = pair();
        let result = builder.add_edge(0, 2, 1.0);
        assert!(matches!(
            result,
            Err(GraphError::InvalidNodeId {
                node: 2,
                node_count: 2
            })
        ));
    }

    #[test]
    fn rejects_self_loop() {
        let mut builder = pair();
        let result = builder.add_edge(1, 1, 1.0);
        assert!(matches!(result, Err(GraphError::SelfLoop { node: 1 })));
    }

    #[rstest]
    #[case::zero(0.0)]
    #[case::negative(-1.0)]
    #[case::nan(f64::NAN)]
    #[case::infinite(f64::INFINITY)]
    fn rejects_invalid_weight(#[case] weight: f64) {
        let mut builder = pair();
        let result = builder.add_edge(0, 1, weight);
        assert!(matches!(result, Err(GraphError::InvalidWeight { .. })));
    }

    #[test]
    fn rejects_duplicate_edge_in_either_direction() {
        let mut builder = pair();
        builder.add_edge(0, 1, 1.0).expect("first edge is valid");
        let result = builder.add_edge(1, 0, 2.0);
        assert!(matches!(
            result,
            Err(GraphError::DuplicateEdge {
                first: 0,
                target: 1
            })
        ));
    }

    #[test]
    fn labels_resolve_by_node_id() {
        let mut builder = pair();
        builder.add_edge(0, 1, 1.0).expect("edge is valid");
        let graph = builder.build().expect("graph is valid");
        assert_eq!(graph.label(0), Some("a"));
        assert_eq!(graph.label(1), Some("b"));
        assert_eq!(graph.label(2), None);
    }

    #[test]
    fn canonicalises_edges_and_indexes_them() {
        let mut builder = GraphBuilder::new("triangle");
        for label in ["a", "b", "c"] {
            builder.add_node(label);
        }
        builder.add_edge(2, 0, 3.0).expect("edge is valid");
        builder.add_edge(0, 1, 1.0).expect("edge is valid");
        let graph = builder.build().expect("graph is valid");

        assert_eq!(graph.edges()[0].source(), 0);
        assert_eq!(graph.edges()[0].target(), 2);
        assert_eq!(graph.edge_between(2, 0), Some(0));
        assert_eq!(graph.edge_between(1, 0), Some(1));
        assert_eq!(graph.edge_between(1, 2), None);
        assert_eq!(graph.neighbors(0), &[(1, 1), (2, 0)]);
        assert!((graph.total_weight() - 4.0).abs() < f64::EPSILON);
    }
}
