//! Availability under simultaneous link failures.
//!
//! Enumerates every failure state of up to `max_failures` edges, weights
//! each state by its occurrence probability, and scores the fraction of
//! nodes whose canonical primary path to a nearest controller survives the
//! state. Connectivity is a path/failed-edge intersection test against the
//! precomputed tables, never a re-route.
//!
//! The uncovered probability mass (`1 - coverage`) is reported, not folded
//! into the availability value; combining the two is the caller's choice.

use tracing::debug;

use crate::combos::{Combinations, failure_state_count};
use crate::context::{EvalContext, FailureModel};
use crate::error::{PlacementError, Result};
use crate::graph::NodeId;
use crate::nearest::nearest_controllers;

/// Outcome of the failure enumeration for one combo.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Availability {
    availability: f64,
    coverage: f64,
}

impl Availability {
    /// `Σ state_probability × connectivity` over enumerated states.
    #[must_use]
    #[rustfmt::skip]
    pub fn availability(&self) -> f64 { self.availability }

    /// `Σ state_probability` over enumerated states. Below `1.0` whenever
    /// `max_failures < edge_count`; the residual mass is the documented
    /// approximation boundary.
    #[must_use]
    #[rustfmt::skip]
    pub fn coverage(&self) -> f64 { self.coverage }
}

/// Computes availability and coverage for one combo.
///
/// `combo` must be sorted ascending and non-empty.
///
/// A zero failure depth disables the failure analysis outright: the empty
/// state is taken at probability one rather than `(1-p)^|E|`, so a depth-0
/// run reports exact unity instead of a residual-mass approximation.
///
/// # Errors
/// Returns [`PlacementError::MissingFailureModel`] when the context carries
/// no failure parameters, and
/// [`PlacementError::EnumerationLimitExceeded`] when the state count would
/// exceed the model's limit.
pub fn availability_for_combo(ctx: &EvalContext, combo: &[NodeId]) -> Result<Availability> {
    let model = ctx
        .failure_model()
        .ok_or(PlacementError::MissingFailureModel)?;
    if model.max_failures() == 0 {
        return Ok(Availability {
            availability: 1.0,
            coverage: 1.0,
        });
    }
    let edge_count = ctx.graph().edge_count();
    guard_state_count(edge_count, model)?;

    let per_edge_fail = per_edge_probabilities(ctx, model);
    let mut failed = vec![false; edge_count];
    let mut availability = 0.0;
    let mut coverage = 0.0;

    for failures in 0..=model.max_failures() {
        for state in Combinations::new(edge_count, failures) {
            for &edge in &state {
                failed[edge] = true;
            }
            let probability = state_probability(ctx, model, &per_edge_fail, &state);
            let connectivity = connectivity_sssp(ctx, combo, &failed);
            availability += probability * connectivity;
            coverage += probability;
            for &edge in &state {
                failed[edge] = false;
            }
        }
        debug!(failures, availability, coverage, "failure depth complete");
    }

    Ok(Availability {
        availability,
        coverage,
    })
}

/// Fails when enumerating all failure states up to the model's depth would
/// exceed its state limit. Also called by the sweep validator so a
/// misconfigured run aborts before any combo is evaluated.
pub(crate) fn guard_state_count(edge_count: usize, model: &FailureModel) -> Result<()> {
    let states = failure_state_count(edge_count, model.max_failures()).unwrap_or(u128::MAX);
    if states > u128::from(model.state_limit()) {
        return Err(PlacementError::EnumerationLimitExceeded {
            what: "failure states",
            states,
            limit: model.state_limit(),
        });
    }
    Ok(())
}

/// Per-edge failure probabilities: scaled by weight in weighted mode,
/// uniform otherwise. The context rejects models whose scaled probability
/// reaches one, so every entry is a valid probability.
fn per_edge_probabilities(ctx: &EvalContext, model: &FailureModel) -> Vec<f64> {
    let base = model.link_fail_prob();
    ctx.graph()
        .edges()
        .iter()
        .map(|edge| {
            if ctx.is_weighted() {
                base * edge.weight()
            } else {
                base
            }
        })
        .collect()
}

/// Occurrence probability of one failure state.
///
/// Weighted mode convolves the per-edge terms; unweighted mode collapses to
/// the closed form `p^|F| (1-p)^(|E|-|F|)`.
fn state_probability(
    ctx: &EvalContext,
    model: &FailureModel,
    per_edge_fail: &[f64],
    state: &[usize],
) -> f64 {
    if ctx.is_weighted() {
        let mut in_state = vec![false; per_edge_fail.len()];
        for &edge in state {
            in_state[edge] = true;
        }
        per_edge_fail
            .iter()
            .zip(&in_state)
            .map(|(&fail, &down)| if down { fail } else { 1.0 - fail })
            .product()
    } else {
        let p = model.link_fail_prob();
        let bad = state.len() as i32;
        let good = (per_edge_fail.len() - state.len()) as i32;
        p.powi(bad) * (1.0 - p).powi(good)
    }
}

/// Fraction of nodes whose primary path to a nearest controller avoids every
/// failed edge. A node equidistant from several controllers earns `1/|set|`
/// credit per controller whose canonical path is clear.
fn connectivity_sssp(ctx: &EvalContext, combo: &[NodeId], failed: &[bool]) -> f64 {
    let apsp = ctx.apsp();
    let mut connected = 0.0;
    for node in ctx.graph().nodes() {
        let nearest = nearest_controllers(apsp, node, combo);
        let share = nearest.share();
        for &controller in nearest.controllers() {
            let clear = apsp
                .edge_path(node, controller)
                .iter()
                .all(|&edge| !failed[edge]);
            if clear {
                connected += share;
            }
        }
    }
    connected / ctx.graph().node_count() as f64
}
