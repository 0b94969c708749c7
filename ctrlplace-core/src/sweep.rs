//! Sweep configuration and execution.
//!
//! A [`Sweep`] evaluates every requested metric for every k-subset of nodes,
//! for every requested combo size, and folds the results into a
//! [`PlacementReport`]. Execution is either sequential or data-parallel over
//! the combination stream on a fixed-size worker pool; both modes produce
//! identical metric values because the shared context is immutable and
//! results are folded in canonical enumeration order either way.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::{info, instrument, warn};

use crate::aggregate::{DistributionEntry, MetricAccumulator};
use crate::availability::guard_state_count;
use crate::combos::{Combinations, binomial};
use crate::context::EvalContext;
use crate::error::{PlacementError, Result};
use crate::graph::NodeId;
use crate::metric::Metric;
use crate::report::{GroupReport, PlacementReport};

/// Default cap on the number of combinations enumerated per combo size.
pub const DEFAULT_ENUMERATION_LIMIT: u64 = 10_000_000;

/// Which combo sizes a sweep evaluates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ComboSizes {
    /// An explicit list of sizes; duplicates are folded, order is ignored.
    Explicit(Vec<usize>),
    /// The `first` smallest sizes (`1..=first`) and the `last` largest
    /// sizes (`n-last+1..=n`) of the node count.
    FirstAndLast {
        /// Number of sizes taken from the start.
        first: usize,
        /// Number of sizes taken from the end.
        last: usize,
    },
}

/// How combos are dispatched to metric evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Evaluate combos one at a time on the calling thread.
    Sequential,
    /// Evaluate combos on a fixed-size worker pool. The chunk size only
    /// affects throughput, never results.
    Pooled {
        /// Number of worker threads.
        workers: NonZeroUsize,
        /// Minimum number of combos handed to a worker at a time.
        chunk: NonZeroUsize,
    },
}

/// Configures and constructs [`Sweep`] instances.
///
/// # Examples
/// ```
/// use ctrlplace_core::{ComboSizes, Metric, SweepBuilder};
///
/// let sweep = SweepBuilder::new()
///     .with_metrics([Metric::Latency, Metric::WorstCaseLatency])
///     .with_combo_sizes(ComboSizes::Explicit(vec![1, 2]))
///     .build()?;
/// # let _ = sweep;
/// # Ok::<(), ctrlplace_core::PlacementError>(())
/// ```
#[derive(Clone, Debug)]
pub struct SweepBuilder {
    metrics: Vec<Metric>,
    combo_sizes: ComboSizes,
    execution: ExecutionMode,
    keep_distribution: bool,
    keep_combos: bool,
    median: bool,
    enumeration_limit: u64,
}

impl Default for SweepBuilder {
    fn default() -> Self {
        Self {
            metrics: Vec::new(),
            combo_sizes: ComboSizes::Explicit(Vec::new()),
            execution: ExecutionMode::Sequential,
            keep_distribution: false,
            keep_combos: false,
            median: false,
            enumeration_limit: DEFAULT_ENUMERATION_LIMIT,
        }
    }
}

impl SweepBuilder {
    /// Creates a builder with no metrics or sizes selected.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the metrics to evaluate, in report order. Duplicates are
    /// folded, keeping the first occurrence.
    #[must_use]
    pub fn with_metrics(mut self, metrics: impl IntoIterator<Item = Metric>) -> Self {
        self.metrics.clear();
        for metric in metrics {
            if !self.metrics.contains(&metric) {
                self.metrics.push(metric);
            }
        }
        self
    }

    /// Selects metrics by name.
    ///
    /// # Errors
    /// Returns [`PlacementError::UnknownMetric`] for an unrecognised name.
    pub fn with_metric_names<I, S>(self, names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let metrics = names
            .into_iter()
            .map(|name| name.as_ref().parse())
            .collect::<Result<Vec<Metric>>>()?;
        Ok(self.with_metrics(metrics))
    }

    /// Selects the combo sizes to evaluate.
    #[must_use]
    pub fn with_combo_sizes(mut self, combo_sizes: ComboSizes) -> Self {
        self.combo_sizes = combo_sizes;
        self
    }

    /// Selects sequential or pooled execution.
    #[must_use]
    pub fn with_execution(mut self, execution: ExecutionMode) -> Self {
        self.execution = execution;
        self
    }

    /// Retains the full per-combo distribution in the report.
    #[must_use]
    pub fn keep_distribution(mut self, keep: bool) -> Self {
        self.keep_distribution = keep;
        self
    }

    /// Retains the raw combo in each distribution entry.
    #[must_use]
    pub fn keep_combos(mut self, keep: bool) -> Self {
        self.keep_combos = keep;
        self
    }

    /// Computes exact medians, at the cost of retaining every value for the
    /// duration of a combo-size group.
    #[must_use]
    pub fn with_median(mut self, median: bool) -> Self {
        self.median = median;
        self
    }

    /// Overrides the per-size combination enumeration cap.
    #[must_use]
    pub fn with_enumeration_limit(mut self, limit: u64) -> Self {
        self.enumeration_limit = limit;
        self
    }

    /// Validates the configuration and constructs a [`Sweep`].
    ///
    /// # Errors
    /// Returns [`PlacementError::NoMetrics`] when no metrics are selected.
    /// Graph-dependent validation happens in [`Sweep::run`].
    pub fn build(self) -> Result<Sweep> {
        if self.metrics.is_empty() {
            return Err(PlacementError::NoMetrics);
        }
        Ok(Sweep {
            metrics: self.metrics,
            combo_sizes: self.combo_sizes,
            execution: self.execution,
            keep_distribution: self.keep_distribution,
            keep_combos: self.keep_combos,
            median: self.median,
            enumeration_limit: self.enumeration_limit,
        })
    }
}

/// A validated sweep, ready to run against evaluation contexts.
#[derive(Clone, Debug)]
pub struct Sweep {
    metrics: Vec<Metric>,
    combo_sizes: ComboSizes,
    execution: ExecutionMode,
    keep_distribution: bool,
    keep_combos: bool,
    median: bool,
    enumeration_limit: u64,
}

/// Metric values and durations for one combo, parallel to the sweep's
/// metric list.
struct ComboOutcome {
    combo: Vec<NodeId>,
    values: Vec<(f64, Duration)>,
}

impl Sweep {
    /// The metrics this sweep evaluates, in report order.
    #[must_use]
    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    /// Runs the sweep and assembles the result document.
    ///
    /// All graph-dependent validation happens before any combo is
    /// evaluated: combo sizes against the node count, the enumeration caps,
    /// and the failure-model requirement of the availability metric. There
    /// are no partial results: the first metric error aborts the run.
    ///
    /// # Errors
    /// Returns configuration errors as described above, and propagates any
    /// metric evaluation failure.
    #[instrument(
        name = "sweep.run",
        err,
        skip(self, ctx),
        fields(
            graph = %ctx.graph().name(),
            nodes = ctx.graph().node_count(),
            metrics = self.metrics.len(),
            execution = ?self.execution,
        ),
    )]
    pub fn run(&self, ctx: &EvalContext) -> Result<PlacementReport> {
        let sizes = self.validate(ctx)?;

        let pool = match self.execution {
            ExecutionMode::Sequential => None,
            ExecutionMode::Pooled { workers, .. } => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(workers.get())
                    .build()
                    .map_err(|error| PlacementError::PoolBuild {
                        message: Arc::from(error.to_string()),
                    })?,
            ),
        };

        let mut report = PlacementReport::new(sizes.clone(), &self.metrics);
        let mut point_id = 0_u64;
        for &combo_size in &sizes {
            let outcomes = self.evaluate_size(ctx, combo_size, pool.as_ref())?;
            let combos = outcomes.len();
            let group = self.fold_group(combo_size, outcomes, &mut point_id)?;
            info!(combo_size, combos, "combo size complete");
            report.data.insert(combo_size.to_string(), group);
        }
        Ok(report)
    }

    /// Resolves combo sizes and performs every fail-fast check.
    fn validate(&self, ctx: &EvalContext) -> Result<Vec<usize>> {
        let node_count = ctx.graph().node_count();
        let sizes = resolve_sizes(&self.combo_sizes, node_count)?;

        for &size in &sizes {
            let states = binomial(node_count, size).unwrap_or(u128::MAX);
            if states > u128::from(self.enumeration_limit) {
                warn!(size, states, "combination enumeration over limit");
                return Err(PlacementError::EnumerationLimitExceeded {
                    what: "combinations",
                    states,
                    limit: self.enumeration_limit,
                });
            }
        }

        for metric in &self.metrics {
            if metric.requires_failure_model() {
                let model = ctx
                    .failure_model()
                    .ok_or(PlacementError::MissingFailureModel)?;
                if model.max_failures() > 0 {
                    guard_state_count(ctx.graph().edge_count(), model)?;
                }
            }
        }

        Ok(sizes)
    }

    /// Evaluates every combo of one size. Pooled execution maps over an
    /// indexed parallel iterator, which preserves enumeration order in the
    /// collected output, so the subsequent fold is canonical in both modes.
    fn evaluate_size(
        &self,
        ctx: &EvalContext,
        combo_size: usize,
        pool: Option<&rayon::ThreadPool>,
    ) -> Result<Vec<ComboOutcome>> {
        let combos: Vec<Vec<NodeId>> =
            Combinations::new(ctx.graph().node_count(), combo_size).collect();
        match (pool, self.execution) {
            (Some(pool), ExecutionMode::Pooled { chunk, .. }) => pool.install(|| {
                combos
                    .par_iter()
                    .with_min_len(chunk.get())
                    .map(|combo| self.evaluate_combo(ctx, combo))
                    .collect()
            }),
            _ => combos
                .iter()
                .map(|combo| self.evaluate_combo(ctx, combo))
                .collect(),
        }
    }

    fn evaluate_combo(&self, ctx: &EvalContext, combo: &[NodeId]) -> Result<ComboOutcome> {
        let mut values = Vec::with_capacity(self.metrics.len());
        for metric in &self.metrics {
            let start = Instant::now();
            let value = metric.evaluate(ctx, combo)?;
            values.push((value, start.elapsed()));
        }
        Ok(ComboOutcome {
            combo: combo.to_vec(),
            values,
        })
    }

    /// Folds one combo size's outcomes, in canonical order, into aggregates
    /// and the optional distribution.
    fn fold_group(
        &self,
        combo_size: usize,
        outcomes: Vec<ComboOutcome>,
        point_id: &mut u64,
    ) -> Result<GroupReport> {
        let mut accumulators: Vec<MetricAccumulator> = self
            .metrics
            .iter()
            .map(|_| MetricAccumulator::new(self.median))
            .collect();
        let mut distribution = Vec::new();

        for outcome in outcomes {
            for (accumulator, &(value, duration)) in accumulators.iter_mut().zip(&outcome.values) {
                accumulator.record(&outcome.combo, value, duration);
            }
            if self.keep_distribution {
                distribution.push(DistributionEntry {
                    id: *point_id,
                    values: self
                        .metrics
                        .iter()
                        .zip(&outcome.values)
                        .map(|(metric, &(value, _))| (metric.as_str().to_owned(), value))
                        .collect(),
                    combo: self.keep_combos.then(|| outcome.combo.clone()),
                });
            }
            *point_id += 1;
        }

        let mut group = GroupReport::default();
        for (metric, accumulator) in self.metrics.iter().zip(accumulators) {
            let record = accumulator
                .finalize()
                .ok_or(PlacementError::EmptyComboGroup { size: combo_size })?;
            group.metrics.insert(metric.as_str().to_owned(), record);
        }
        group.distribution = distribution;
        Ok(group)
    }
}

/// Expands a [`ComboSizes`] selection against the node count into a sorted,
/// deduplicated list of valid sizes.
fn resolve_sizes(combo_sizes: &ComboSizes, node_count: usize) -> Result<Vec<usize>> {
    let mut sizes = match combo_sizes {
        ComboSizes::Explicit(sizes) => sizes.clone(),
        ComboSizes::FirstAndLast { first, last } => {
            for &span in [first, last] {
                if span > node_count {
                    return Err(PlacementError::InvalidComboSize {
                        size: span,
                        node_count,
                    });
                }
            }
            let mut sizes: Vec<usize> = (1..=*first).collect();
            sizes.extend((node_count - last + 1)..=node_count);
            sizes
        }
    };
    for &size in &sizes {
        if size == 0 || size > node_count {
            return Err(PlacementError::InvalidComboSize { size, node_count });
        }
    }
    sizes.sort_unstable();
    sizes.dedup();
    if sizes.is_empty() {
        return Err(PlacementError::NoComboSizes);
    }
    Ok(sizes)
}
