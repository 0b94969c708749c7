//! Small topology constructors shared across unit tests.

use crate::graph::{Graph, GraphBuilder};

/// Chain of `weights.len() + 1` nodes with the given edge weights.
pub(crate) fn path_graph(weights: &[f64]) -> Graph {
    let mut builder = GraphBuilder::new("path");
    builder.add_node("n0");
    for (index, &weight) in weights.iter().enumerate() {
        let node = builder.add_node(format!("n{}", index + 1));
        builder
            .add_edge(node - 1, node, weight)
            .expect("path edges are valid");
    }
    builder.build().expect("path graph is valid")
}

/// Node 0 as the hub, `leaves` unit-weight spokes.
pub(crate) fn star_graph(leaves: usize) -> Graph {
    let mut builder = GraphBuilder::new("star");
    let center = builder.add_node("center");
    for index in 0..leaves {
        let leaf = builder.add_node(format!("leaf{index}"));
        builder
            .add_edge(center, leaf, 1.0)
            .expect("star edges are valid");
    }
    builder.build().expect("star graph is valid")
}

/// Complete graph on `n` nodes with unit weights.
pub(crate) fn complete_graph(n: usize) -> Graph {
    let mut builder = GraphBuilder::new("complete");
    for index in 0..n {
        builder.add_node(format!("n{index}"));
    }
    for u in 0..n {
        for v in (u + 1)..n {
            builder.add_edge(u, v, 1.0).expect("edges are valid");
        }
    }
    builder.build().expect("complete graph is valid")
}

/// Cycle on `n` nodes with unit weights.
pub(crate) fn loop_graph(n: usize) -> Graph {
    let mut builder = GraphBuilder::new("loop");
    for index in 0..n {
        builder.add_node(format!("n{index}"));
    }
    for u in 0..n {
        builder
            .add_edge(u, (u + 1) % n, 1.0)
            .expect("loop edges are valid");
    }
    builder.build().expect("loop graph is valid")
}

/// Two equal-cost routes from node 0 to node 3: via node 1 and via node 2.
pub(crate) fn diamond_graph() -> Graph {
    let mut builder = GraphBuilder::new("diamond");
    for label in ["a", "b", "c", "d"] {
        builder.add_node(label);
    }
    builder.add_edge(0, 1, 1.0).expect("edge is valid");
    builder.add_edge(0, 2, 1.0).expect("edge is valid");
    builder.add_edge(1, 3, 1.0).expect("edge is valid");
    builder.add_edge(2, 3, 1.0).expect("edge is valid");
    builder.build().expect("diamond graph is valid")
}
