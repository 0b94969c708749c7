//! Shared read-only evaluation context.
//!
//! Workers in a pooled sweep receive the graph, distance/path tables, and
//! failure parameters through one immutable [`EvalContext`] established
//! before the pool starts. Nothing in the context can be mutated after
//! construction, so sharing it by reference across threads is race-free by
//! construction.

use crate::apsp::Apsp;
use crate::error::{PlacementError, Result};
use crate::graph::Graph;

/// Parameters of the simultaneous-link-failure model used by the
/// availability metric.
///
/// In weighted mode the per-edge failure probability is
/// `link_fail_prob × weight`; in unweighted mode every edge fails with
/// `link_fail_prob` directly. Weighted contexts reject models whose scaled
/// probability reaches one on any edge, so state probabilities always stay
/// in range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FailureModel {
    link_fail_prob: f64,
    max_failures: usize,
    state_limit: u64,
}

/// Default cap on the number of enumerated failure states per combo.
pub const DEFAULT_STATE_LIMIT: u64 = 10_000_000;

impl FailureModel {
    /// Creates a failure model from a per-link failure probability and a
    /// maximum simultaneous-failure depth.
    ///
    /// # Errors
    /// Returns [`PlacementError::InvalidFailureProbability`] unless
    /// `link_fail_prob` lies in `(0, 1)`.
    pub fn new(link_fail_prob: f64, max_failures: usize) -> Result<Self> {
        if !link_fail_prob.is_finite() || link_fail_prob <= 0.0 || link_fail_prob >= 1.0 {
            return Err(PlacementError::InvalidFailureProbability {
                got: link_fail_prob,
            });
        }
        Ok(Self {
            link_fail_prob,
            max_failures,
            state_limit: DEFAULT_STATE_LIMIT,
        })
    }

    /// Creates a weighted-mode model whose probability is normalised so the
    /// expected per-link failure rate roughly matches `link_fail_prob` on
    /// this graph: the raw probability is scaled by
    /// `edge_count / total_weight`.
    ///
    /// # Errors
    /// Returns [`PlacementError::InvalidFailureProbability`] when the
    /// normalised probability falls outside `(0, 1)`.
    pub fn normalized_for(graph: &Graph, link_fail_prob: f64, max_failures: usize) -> Result<Self> {
        let scale = graph.edge_count() as f64 / graph.total_weight();
        Self::new(link_fail_prob * scale, max_failures)
    }

    /// Overrides the failure-state enumeration cap.
    #[must_use]
    pub fn with_state_limit(mut self, limit: u64) -> Self {
        self.state_limit = limit;
        self
    }

    /// Probability parameter (see the type docs for its interpretation).
    #[must_use]
    #[rustfmt::skip]
    pub fn link_fail_prob(&self) -> f64 { self.link_fail_prob }

    /// Maximum number of simultaneous link failures enumerated.
    #[must_use]
    #[rustfmt::skip]
    pub fn max_failures(&self) -> usize { self.max_failures }

    /// Cap on the number of enumerated failure states per combo.
    #[must_use]
    #[rustfmt::skip]
    pub fn state_limit(&self) -> u64 { self.state_limit }
}

/// Immutable bundle of everything a metric evaluation reads: the graph, its
/// distance/path tables, the weighted flag, and optional failure parameters.
///
/// # Examples
/// ```
/// use ctrlplace_core::{EvalContext, GraphBuilder};
///
/// let mut builder = GraphBuilder::new("pair");
/// let a = builder.add_node("a");
/// let b = builder.add_node("b");
/// builder.add_edge(a, b, 7.0)?;
/// let ctx = EvalContext::weighted(builder.build()?, None)?;
/// assert_eq!(ctx.apsp().distance(a, b), 7.0);
/// assert!(ctx.is_weighted());
/// # Ok::<(), ctrlplace_core::PlacementError>(())
/// ```
#[derive(Clone, Debug)]
pub struct EvalContext {
    graph: Graph,
    apsp: Apsp,
    weighted: bool,
    failure: Option<FailureModel>,
}

impl EvalContext {
    /// Builds a context with Dijkstra tables over edge weights.
    ///
    /// # Errors
    /// Propagates table-construction failures and rejects a failure model
    /// whose depth exceeds the edge count.
    pub fn weighted(graph: Graph, failure: Option<FailureModel>) -> Result<Self> {
        let apsp = Apsp::weighted(&graph)?;
        Self::assemble(graph, apsp, true, failure)
    }

    /// Builds a context with hop-count tables, ignoring edge weights.
    ///
    /// # Errors
    /// Propagates table-construction failures and rejects a failure model
    /// whose depth exceeds the edge count.
    pub fn unweighted(graph: Graph, failure: Option<FailureModel>) -> Result<Self> {
        let apsp = Apsp::unweighted(&graph)?;
        Self::assemble(graph, apsp, false, failure)
    }

    fn assemble(
        graph: Graph,
        apsp: Apsp,
        weighted: bool,
        failure: Option<FailureModel>,
    ) -> Result<Self> {
        if let Some(model) = &failure {
            if model.max_failures() > graph.edge_count() {
                return Err(PlacementError::MaxFailuresExceedsEdges {
                    max_failures: model.max_failures(),
                    edge_count: graph.edge_count(),
                });
            }
            if weighted
                && let Some(edge) = graph
                    .edges()
                    .iter()
                    .find(|edge| model.link_fail_prob() * edge.weight() >= 1.0)
            {
                return Err(PlacementError::EdgeFailProbabilityTooHigh {
                    first: edge.source(),
                    target: edge.target(),
                    got: model.link_fail_prob() * edge.weight(),
                });
            }
        }
        Ok(Self {
            graph,
            apsp,
            weighted,
            failure,
        })
    }

    /// The evaluated topology.
    #[must_use]
    #[rustfmt::skip]
    pub fn graph(&self) -> &Graph { &self.graph }

    /// The precomputed distance/path tables.
    #[must_use]
    #[rustfmt::skip]
    pub fn apsp(&self) -> &Apsp { &self.apsp }

    /// Whether distances follow edge weights rather than hop counts.
    #[must_use]
    #[rustfmt::skip]
    pub fn is_weighted(&self) -> bool { self.weighted }

    /// The failure model, when availability evaluation is configured.
    #[must_use]
    #[rustfmt::skip]
    pub fn failure_model(&self) -> Option<&FailureModel> { self.failure.as_ref() }
}
