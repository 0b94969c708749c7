//! Error types for the ctrlplace core library.
//!
//! Defines the error enums exposed by the public API and a convenient result
//! alias. Every variant carries a stable machine-readable code for logging
//! and downstream tooling.

use std::{fmt, sync::Arc};

use thiserror::Error;

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// An error produced while constructing a [`crate::Graph`] or its
/// all-pairs shortest-path tables.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GraphError {
    /// The graph contained no nodes.
    #[error("graph contains no nodes")]
    EmptyGraph,
    /// An edge referenced a node id that is not present in the graph.
    #[error("edge references node {node}, but node_count is {node_count}")]
    InvalidNodeId {
        /// The invalid node id referenced by the edge.
        node: usize,
        /// The number of nodes in the graph.
        node_count: usize,
    },
    /// An edge connected a node to itself.
    #[error("self-loop on node {node} is not allowed")]
    SelfLoop {
        /// The offending node id.
        node: usize,
    },
    /// An edge weight was not a positive finite number.
    #[error("edge ({first}, {target}) has invalid weight {weight}")]
    InvalidWeight {
        /// The smaller endpoint id.
        first: usize,
        /// The larger endpoint id.
        target: usize,
        /// The rejected weight value.
        weight: f64,
    },
    /// The same undirected edge was added twice.
    #[error("duplicate edge ({first}, {target})")]
    DuplicateEdge {
        /// The smaller endpoint id.
        first: usize,
        /// The larger endpoint id.
        target: usize,
    },
    /// The graph was not connected, so shortest-path tables are undefined
    /// for some node pairs.
    #[error("graph is disconnected: node {unreachable} is unreachable from node {first}")]
    Disconnected {
        /// A source node from which the sweep started.
        first: usize,
        /// A node that could not be reached.
        unreachable: usize,
    },
}

define_error_codes! {
    /// Stable codes describing [`GraphError`] variants.
    enum GraphErrorCode for GraphError {
        /// The graph contained no nodes.
        EmptyGraph => EmptyGraph => "GRAPH_EMPTY",
        /// An edge referenced an unknown node id.
        InvalidNodeId => InvalidNodeId { .. } => "GRAPH_INVALID_NODE_ID",
        /// An edge connected a node to itself.
        SelfLoop => SelfLoop { .. } => "GRAPH_SELF_LOOP",
        /// An edge weight was not a positive finite number.
        InvalidWeight => InvalidWeight { .. } => "GRAPH_INVALID_WEIGHT",
        /// The same undirected edge was added twice.
        DuplicateEdge => DuplicateEdge { .. } => "GRAPH_DUPLICATE_EDGE",
        /// The graph was not connected.
        Disconnected => Disconnected { .. } => "GRAPH_DISCONNECTED",
    }
}

/// Error type produced when configuring or running a placement sweep.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum PlacementError {
    /// A metric name did not match any known metric.
    #[error("unknown metric `{name}`")]
    UnknownMetric {
        /// The unrecognized metric name supplied by the caller.
        name: Arc<str>,
    },
    /// The sweep was configured without any metrics.
    #[error("at least one metric must be requested")]
    NoMetrics,
    /// The sweep was configured without any combination sizes.
    #[error("at least one combination size must be requested")]
    NoComboSizes,
    /// A combination size was zero or exceeded the node count.
    #[error("combination size {size} is invalid for a graph with {node_count} nodes")]
    InvalidComboSize {
        /// The rejected combination size.
        size: usize,
        /// The number of nodes in the graph.
        node_count: usize,
    },
    /// A combo-size group finished without evaluating any combo.
    ///
    /// Validated sizes always yield at least one combo, so this is an
    /// internal invariant violation, never a recoverable condition.
    #[error("combo size {size} produced no evaluations")]
    EmptyComboGroup {
        /// The combo size whose group came up empty.
        size: usize,
    },
    /// The availability metric was requested without failure parameters.
    #[error("metric `availability` requires a failure model on the evaluation context")]
    MissingFailureModel,
    /// A link failure probability was outside `(0, 1)`.
    #[error("link failure probability {got} must lie in (0, 1)")]
    InvalidFailureProbability {
        /// The rejected probability.
        got: f64,
    },
    /// A weighted per-edge failure probability reached one.
    #[error("failure probability {got} on edge ({first}, {target}) must stay below 1")]
    EdgeFailProbabilityTooHigh {
        /// The smaller endpoint id.
        first: usize,
        /// The larger endpoint id.
        target: usize,
        /// The offending `link_fail_prob × weight` product.
        got: f64,
    },
    /// The configured failure depth exceeded the number of edges.
    #[error("max_failures {max_failures} exceeds the edge count {edge_count}")]
    MaxFailuresExceedsEdges {
        /// The configured maximum number of simultaneous failures.
        max_failures: usize,
        /// The number of edges in the graph.
        edge_count: usize,
    },
    /// An enumeration would exceed the configured state limit.
    #[error("{what} would enumerate {states} states, exceeding the limit of {limit}")]
    EnumerationLimitExceeded {
        /// Which enumeration overflowed (`"combinations"` or `"failure states"`).
        what: &'static str,
        /// The number of states that would be enumerated. `u128::MAX` means
        /// the count itself overflowed.
        states: u128,
        /// The configured limit.
        limit: u64,
    },
    /// The worker pool could not be constructed.
    #[error("failed to build worker pool: {message}")]
    PoolBuild {
        /// Error reported by the pool builder.
        message: Arc<str>,
    },
    /// Fractional allocation credits did not sum to the node count.
    ///
    /// This is an input-correctness bug in the distance tables, never a
    /// recoverable condition.
    #[error("allocation credits sum to {got} but {expected} nodes were allocated")]
    AllocationMismatch {
        /// The expected sum (the node count).
        expected: f64,
        /// The observed sum of fractional credits.
        got: f64,
    },
    /// A graph or table construction failed.
    #[error(transparent)]
    Graph(#[from] GraphError),
}

define_error_codes! {
    /// Stable codes describing [`PlacementError`] variants.
    enum PlacementErrorCode for PlacementError {
        /// A metric name did not match any known metric.
        UnknownMetric => UnknownMetric { .. } => "PLACEMENT_UNKNOWN_METRIC",
        /// The sweep was configured without any metrics.
        NoMetrics => NoMetrics => "PLACEMENT_NO_METRICS",
        /// The sweep was configured without any combination sizes.
        NoComboSizes => NoComboSizes => "PLACEMENT_NO_COMBO_SIZES",
        /// A combination size was zero or exceeded the node count.
        InvalidComboSize => InvalidComboSize { .. } => "PLACEMENT_INVALID_COMBO_SIZE",
        /// A combo-size group finished without evaluating any combo.
        EmptyComboGroup => EmptyComboGroup { .. } => "PLACEMENT_EMPTY_COMBO_GROUP",
        /// The availability metric was requested without failure parameters.
        MissingFailureModel => MissingFailureModel => "PLACEMENT_MISSING_FAILURE_MODEL",
        /// A link failure probability was outside `(0, 1)`.
        InvalidFailureProbability => InvalidFailureProbability { .. } =>
            "PLACEMENT_INVALID_FAILURE_PROBABILITY",
        /// A weighted per-edge failure probability reached one.
        EdgeFailProbabilityTooHigh => EdgeFailProbabilityTooHigh { .. } =>
            "PLACEMENT_EDGE_FAIL_PROBABILITY_TOO_HIGH",
        /// The configured failure depth exceeded the number of edges.
        MaxFailuresExceedsEdges => MaxFailuresExceedsEdges { .. } =>
            "PLACEMENT_MAX_FAILURES_EXCEEDS_EDGES",
        /// An enumeration would exceed the configured state limit.
        EnumerationLimitExceeded => EnumerationLimitExceeded { .. } =>
            "PLACEMENT_ENUMERATION_LIMIT_EXCEEDED",
        /// The worker pool could not be constructed.
        PoolBuild => PoolBuild { .. } => "PLACEMENT_POOL_BUILD",
        /// Fractional allocation credits did not sum to the node count.
        AllocationMismatch => AllocationMismatch { .. } => "PLACEMENT_ALLOCATION_MISMATCH",
        /// A graph or table construction failed.
        GraphFailure => Graph { .. } => "PLACEMENT_GRAPH_FAILURE",
    }
}

impl PlacementError {
    /// Retrieve the inner [`GraphErrorCode`] when the error originated in
    /// graph or table construction.
    pub const fn graph_code(&self) -> Option<GraphErrorCode> {
        match self {
            Self::Graph(error) => Some(error.code()),
            _ => None,
        }
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, PlacementError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        let err = PlacementError::UnknownMetric {
            name: Arc::from("bogus"),
        };
        assert_eq!(err.code().as_str(), "PLACEMENT_UNKNOWN_METRIC");
        assert_eq!(err.code().to_string(), "PLACEMENT_UNKNOWN_METRIC");
    }

    #[test]
    fn graph_code_is_exposed_through_placement_error() {
        let err = PlacementError::from(GraphError::EmptyGraph);
        assert_eq!(err.code(), PlacementErrorCode::GraphFailure);
        assert_eq!(err.graph_code(), Some(GraphErrorCode::EmptyGraph));
    }

    #[test]
    fn graph_code_is_absent_for_config_errors() {
        assert_eq!(PlacementError::NoMetrics.graph_code(), None);
    }
}
