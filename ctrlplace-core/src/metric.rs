//! Placement fitness metrics.
//!
//! Each metric is a deterministic, side-effect-free function of the shared
//! evaluation context and one combo. Dispatch is static over the [`Metric`]
//! enum; names exist only at the configuration boundary.

use std::str::FromStr;
use std::sync::Arc;

use crate::availability::availability_for_combo;
use crate::context::EvalContext;
use crate::error::{PlacementError, Result};
use crate::graph::NodeId;
use crate::nearest::nearest_controllers;

/// Tolerance used when checking that fractional allocation credits sum to
/// the node count.
const ALLOCATION_TOLERANCE: f64 = 1e-4;

/// A placement fitness metric.
///
/// # Examples
/// ```
/// use ctrlplace_core::Metric;
///
/// let metric: Metric = "wc_latency".parse()?;
/// assert_eq!(metric, Metric::WorstCaseLatency);
/// assert_eq!(metric.as_str(), "wc_latency");
/// # Ok::<(), ctrlplace_core::PlacementError>(())
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Metric {
    /// Mean distance from each node to its nearest controller.
    Latency,
    /// Maximum distance from any node to its nearest controller.
    WorstCaseLatency,
    /// Jain's fairness index over per-controller node allocations.
    Fairness,
    /// Probability-weighted connectivity under simultaneous link failures.
    Availability,
    /// Worst-case control-traffic overlap on a single link, as a fraction
    /// of the node count.
    Congestion,
}

impl Metric {
    /// Every metric, in canonical report order.
    pub const ALL: [Self; 5] = [
        Self::Latency,
        Self::WorstCaseLatency,
        Self::Fairness,
        Self::Availability,
        Self::Congestion,
    ];

    /// Returns the stable metric name used in reports and configuration.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Latency => "latency",
            Self::WorstCaseLatency => "wc_latency",
            Self::Fairness => "fairness",
            Self::Availability => "availability",
            Self::Congestion => "congestion",
        }
    }

    /// Whether this metric needs a [`crate::FailureModel`] on the context.
    #[must_use]
    pub const fn requires_failure_model(self) -> bool {
        matches!(self, Self::Availability)
    }

    /// Evaluates this metric for one combo.
    ///
    /// `combo` must be sorted ascending and non-empty.
    ///
    /// # Errors
    /// Returns [`PlacementError::MissingFailureModel`] when availability is
    /// evaluated without failure parameters, and propagates invariant
    /// violations from the fairness allocation check.
    pub fn evaluate(self, ctx: &EvalContext, combo: &[NodeId]) -> Result<f64> {
        match self {
            Self::Latency => Ok(mean_latency(ctx, combo)),
            Self::WorstCaseLatency => Ok(worst_case_latency(ctx, combo)),
            Self::Fairness => controller_split_fairness(ctx, combo),
            Self::Availability => Ok(availability_for_combo(ctx, combo)?.availability()),
            Self::Congestion => Ok(control_traffic_congestion(ctx, combo)),
        }
    }
}

impl FromStr for Metric {
    type Err = PlacementError;

    fn from_str(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|metric| metric.as_str() == name)
            .ok_or_else(|| PlacementError::UnknownMetric {
                name: Arc::from(name),
            })
    }
}

/// Mean over nodes of the distance to the nearest combo member.
fn mean_latency(ctx: &EvalContext, combo: &[NodeId]) -> f64 {
    let apsp = ctx.apsp();
    let total: f64 = ctx
        .graph()
        .nodes()
        .map(|node| nearest_controllers(apsp, node, combo).distance())
        .sum();
    total / ctx.graph().node_count() as f64
}

/// Max over nodes of the distance to the nearest combo member.
fn worst_case_latency(ctx: &EvalContext, combo: &[NodeId]) -> f64 {
    let apsp = ctx.apsp();
    ctx.graph()
        .nodes()
        .map(|node| nearest_controllers(apsp, node, combo).distance())
        .fold(0.0, f64::max)
}

/// Jain's fairness index: `(Σx)² / (n · Σx²)`.
///
/// # Examples
/// ```
/// use ctrlplace_core::jain_index;
///
/// assert_eq!(jain_index(&[1.0, 1.0, 1.0]), 1.0);
/// assert!((jain_index(&[2.0, 2.0, 0.0]) - 2.0 / 3.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn jain_index(values: &[f64]) -> f64 {
    let sum: f64 = values.iter().sum();
    let sum_sq: f64 = values.iter().map(|value| value * value).sum();
    (sum * sum) / (values.len() as f64 * sum_sq)
}

/// Jain's index over per-controller allocations with fractional
/// tie-splitting: a node equidistant from several controllers credits
/// `1/|set|` to each.
fn controller_split_fairness(ctx: &EvalContext, combo: &[NodeId]) -> Result<f64> {
    let apsp = ctx.apsp();
    let mut allocations = vec![0.0_f64; combo.len()];
    for node in ctx.graph().nodes() {
        let nearest = nearest_controllers(apsp, node, combo);
        let share = nearest.share();
        for &controller in nearest.controllers() {
            // Combo is sorted, so the slot is found by binary search. A miss
            // is impossible for a well-formed combo; if it ever happened the
            // allocation sum check below would surface it.
            if let Ok(slot) = combo.binary_search(&controller) {
                allocations[slot] += share;
            }
        }
    }

    let expected = ctx.graph().node_count() as f64;
    let got: f64 = allocations.iter().sum();
    if (got - expected).abs() > ALLOCATION_TOLERANCE {
        return Err(PlacementError::AllocationMismatch { expected, got });
    }

    Ok(jain_index(&allocations))
}

/// Worst-case aggregated shortest-path control traffic on a single link,
/// normalised by the node count. An equidistant node splits its unit of
/// traffic evenly across its nearest controllers' canonical paths.
fn control_traffic_congestion(ctx: &EvalContext, combo: &[NodeId]) -> f64 {
    let apsp = ctx.apsp();
    let mut traffic = vec![0.0_f64; ctx.graph().edge_count()];
    for node in ctx.graph().nodes() {
        let nearest = nearest_controllers(apsp, node, combo);
        let share = nearest.share();
        for &controller in nearest.controllers() {
            for &edge in apsp.edge_path(node, controller) {
                traffic[edge] += share;
            }
        }
    }
    let busiest = traffic.into_iter().fold(0.0, f64::max);
    busiest / ctx.graph().node_count() as f64
}
