//! Ctrlplace core library.
//!
//! Exhaustive controller-placement evaluation over a network graph. Build a
//! [`Graph`] with [`GraphBuilder`], wrap it in an [`EvalContext`] (which
//! precomputes all-pairs shortest paths), configure a [`Sweep`] with the
//! metrics and combo sizes of interest, and run it to obtain a
//! JSON-serialisable [`PlacementReport`].

mod aggregate;
mod apsp;
mod availability;
mod combos;
mod context;
mod error;
mod graph;
mod metric;
mod nearest;
mod report;
mod sweep;
#[cfg(test)]
pub(crate) mod test_utils;

pub use crate::{
    aggregate::{AggregateRecord, DistributionEntry},
    apsp::Apsp,
    availability::{Availability, availability_for_combo},
    combos::{Combinations, binomial},
    context::{DEFAULT_STATE_LIMIT, EvalContext, FailureModel},
    error::{GraphError, GraphErrorCode, PlacementError, PlacementErrorCode, Result},
    graph::{Edge, EdgeId, Graph, GraphBuilder, NodeId},
    metric::{Metric, jain_index},
    nearest::{NearestControllers, nearest_controllers},
    report::{GroupReport, PlacementReport},
    sweep::{
        ComboSizes, DEFAULT_ENUMERATION_LIMIT, ExecutionMode, Sweep, SweepBuilder,
    },
};
