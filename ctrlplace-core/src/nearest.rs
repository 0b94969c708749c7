//! Shared closest-controller tie-break primitive.
//!
//! Every metric that needs "the nearest controller of a node" resolves it
//! here, so equidistant controllers are broken identically everywhere. Combo
//! members are scanned in ascending node-id order: a strictly smaller
//! distance replaces the nearest set, an equal distance extends it. Two
//! views are exposed from the one scan: the single primary controller
//! (latency, availability) and the full equidistant set with its fractional
//! share (fairness, congestion).

use crate::apsp::Apsp;
use crate::graph::NodeId;

/// The controllers nearest to one node, with their common distance.
#[derive(Clone, Debug, PartialEq)]
pub struct NearestControllers {
    distance: f64,
    controllers: Vec<NodeId>,
}

impl NearestControllers {
    /// Distance from the node to its nearest controller(s).
    #[must_use]
    #[rustfmt::skip]
    pub fn distance(&self) -> f64 { self.distance }

    /// All equidistant nearest controllers, ascending by node id.
    #[must_use]
    #[rustfmt::skip]
    pub fn controllers(&self) -> &[NodeId] { &self.controllers }

    /// The single primary controller: the lowest-id member of the set.
    #[must_use]
    pub fn primary(&self) -> NodeId {
        self.controllers[0]
    }

    /// Fractional credit per equidistant controller, `1 / |set|`.
    #[must_use]
    pub fn share(&self) -> f64 {
        1.0 / self.controllers.len() as f64
    }
}

/// Resolves the nearest controller(s) of `node` among `combo` members.
///
/// `combo` must be non-empty and sorted ascending; the scan order is the
/// explicit total order that pins tie-breaking.
///
/// # Panics
/// Panics when `combo` is empty.
#[must_use]
pub fn nearest_controllers(apsp: &Apsp, node: NodeId, combo: &[NodeId]) -> NearestControllers {
    assert!(!combo.is_empty(), "combo must contain at least one node");
    let mut distance = f64::INFINITY;
    let mut controllers = Vec::with_capacity(1);
    for &controller in combo {
        let candidate = apsp.distance(node, controller);
        if candidate < distance {
            distance = candidate;
            controllers.clear();
            controllers.push(controller);
        } else if candidate == distance {
            controllers.push(controller);
        }
    }
    NearestControllers {
        distance,
        controllers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    use crate::Apsp;
    use crate::test_utils::{loop_graph, path_graph, star_graph};

    #[test]
    fn member_node_is_its_own_controller_at_distance_zero() {
        let graph = star_graph(3);
        let apsp = Apsp::weighted(&graph).expect("connected graph");
        let nearest = nearest_controllers(&apsp, 1, &[1, 2]);
        assert_eq!(nearest.distance(), 0.0);
        assert_eq!(nearest.controllers(), &[1]);
        assert_eq!(nearest.primary(), 1);
        assert_eq!(nearest.share(), 1.0);
    }

    #[test]
    fn strictly_closer_controller_wins() {
        let graph = path_graph(&[1.0, 1.0, 1.0]);
        let apsp = Apsp::weighted(&graph).expect("connected graph");
        let nearest = nearest_controllers(&apsp, 1, &[0, 3]);
        assert_eq!(nearest.distance(), 1.0);
        assert_eq!(nearest.controllers(), &[0]);
    }

    #[rstest]
    #[case::two_way(&[0, 2], 1, 0.5)]
    #[case::single(&[0], 1, 1.0)]
    fn equidistant_controllers_split_the_share(
        #[case] combo: &[NodeId],
        #[case] node: NodeId,
        #[case] expected_share: f64,
    ) {
        let graph = path_graph(&[1.0, 1.0]);
        let apsp = Apsp::weighted(&graph).expect("connected graph");
        let nearest = nearest_controllers(&apsp, node, combo);
        assert_eq!(nearest.share(), expected_share);
        assert_eq!(nearest.primary(), combo[0]);
    }

    #[test]
    fn equidistant_set_is_ascending_by_node_id() {
        // On a 4-cycle, node 0 is one hop from both 1 and 3.
        let graph = loop_graph(4);
        let apsp = Apsp::weighted(&graph).expect("connected graph");
        let nearest = nearest_controllers(&apsp, 0, &[1, 3]);
        assert_eq!(nearest.distance(), 1.0);
        assert_eq!(nearest.controllers(), &[1, 3]);
        assert_eq!(nearest.primary(), 1);
    }
}
