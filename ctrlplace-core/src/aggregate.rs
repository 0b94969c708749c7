//! Folding per-combo results into summary statistics.
//!
//! One [`MetricAccumulator`] per metric per combo size consumes values in
//! canonical combo order and finalises into an [`AggregateRecord`]. Exact
//! ties on extrema keep the first-seen combo, which the canonical fold order
//! makes deterministic regardless of execution mode.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::graph::NodeId;

/// Summary statistics for one metric over every combo of one size.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct AggregateRecord {
    /// Largest observed value.
    pub highest: f64,
    /// The combo that produced [`Self::highest`] (first seen on ties).
    pub highest_combo: Vec<NodeId>,
    /// Smallest observed value.
    pub lowest: f64,
    /// The combo that produced [`Self::lowest`] (first seen on ties).
    pub lowest_combo: Vec<NodeId>,
    /// Arithmetic mean over all combos.
    pub mean: f64,
    /// Exact median, when value retention was enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub median: Option<f64>,
    /// Total evaluation wall-clock time for this metric, in seconds.
    pub duration: f64,
    /// Number of combos folded in.
    pub samples: u64,
}

/// One retained distribution point: a combo's metric values.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct DistributionEntry {
    /// Position of the combo in the overall canonical enumeration, unique
    /// across combo sizes within one sweep.
    pub id: u64,
    /// Metric name to value for this combo.
    #[serde(flatten)]
    pub values: std::collections::BTreeMap<String, f64>,
    /// The combo itself, when combo retention was enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub combo: Option<Vec<NodeId>>,
}

/// Running state for one metric while iterating combos of one size.
#[derive(Clone, Debug)]
pub(crate) struct MetricAccumulator {
    highest: f64,
    highest_combo: Option<Vec<NodeId>>,
    lowest: f64,
    lowest_combo: Option<Vec<NodeId>>,
    sum: f64,
    samples: u64,
    duration: Duration,
    values: Option<Vec<f64>>,
}

impl MetricAccumulator {
    /// Creates an empty accumulator; `keep_values` enables the O(C(n, k))
    /// value list needed for an exact median.
    pub(crate) fn new(keep_values: bool) -> Self {
        Self {
            highest: f64::NEG_INFINITY,
            highest_combo: None,
            lowest: f64::INFINITY,
            lowest_combo: None,
            sum: 0.0,
            samples: 0,
            duration: Duration::ZERO,
            values: keep_values.then(Vec::new),
        }
    }

    /// Folds one combo's value in. Must be called in canonical combo order;
    /// strict comparisons keep the first-seen combo on exact ties.
    pub(crate) fn record(&mut self, combo: &[NodeId], value: f64, duration: Duration) {
        if value > self.highest {
            self.highest = value;
            self.highest_combo = Some(combo.to_vec());
        }
        if value < self.lowest {
            self.lowest = value;
            self.lowest_combo = Some(combo.to_vec());
        }
        self.sum += value;
        self.samples += 1;
        self.duration += duration;
        if let Some(values) = &mut self.values {
            values.push(value);
        }
    }

    /// Finalises into an [`AggregateRecord`]; `None` when nothing was
    /// recorded.
    pub(crate) fn finalize(self) -> Option<AggregateRecord> {
        let highest_combo = self.highest_combo?;
        let lowest_combo = self.lowest_combo?;
        let mean = self.sum / self.samples as f64;
        let median = self.values.as_deref().map(median_of);
        Some(AggregateRecord {
            highest: self.highest,
            highest_combo,
            lowest: self.lowest,
            lowest_combo,
            mean,
            median,
            duration: self.duration.as_secs_f64(),
            samples: self.samples,
        })
    }
}

/// Exact median: midpoint of the two central order statistics for even
/// counts.
fn median_of(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        f64::midpoint(sorted[mid - 1], sorted[mid])
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    fn record_all(acc: &mut MetricAccumulator, samples: &[(Vec<NodeId>, f64)]) {
        for (combo, value) in samples {
            acc.record(combo, *value, Duration::from_millis(10));
        }
    }

    #[test]
    fn tracks_extrema_with_producing_combos() {
        let mut acc = MetricAccumulator::new(false);
        record_all(
            &mut acc,
            &[
                (vec![0], 2.0),
                (vec![1], 0.5),
                (vec![2], 3.0),
                (vec![3], 1.0),
            ],
        );
        let record = acc.finalize().expect("samples were recorded");
        assert_eq!(record.highest, 3.0);
        assert_eq!(record.highest_combo, vec![2]);
        assert_eq!(record.lowest, 0.5);
        assert_eq!(record.lowest_combo, vec![1]);
        assert!((record.mean - 1.625).abs() < 1e-12);
        assert_eq!(record.samples, 4);
        assert!((record.duration - 0.04).abs() < 1e-12);
        assert_eq!(record.median, None);
    }

    #[test]
    fn exact_ties_keep_the_first_seen_combo() {
        let mut acc = MetricAccumulator::new(false);
        record_all(&mut acc, &[(vec![0], 1.0), (vec![1], 1.0), (vec![2], 1.0)]);
        let record = acc.finalize().expect("samples were recorded");
        assert_eq!(record.highest_combo, vec![0]);
        assert_eq!(record.lowest_combo, vec![0]);
    }

    #[rstest]
    #[case::odd(&[3.0, 1.0, 2.0], 2.0)]
    #[case::even(&[4.0, 1.0, 2.0, 3.0], 2.5)]
    #[case::single(&[7.0], 7.0)]
    fn median_is_exact(#[case] values: &[f64], #[case] expected: f64) {
        assert_eq!(median_of(values), expected);
    }

    #[test]
    fn median_requires_value_retention() {
        let mut with_values = MetricAccumulator::new(true);
        record_all(&mut with_values, &[(vec![0], 2.0), (vec![1], 4.0)]);
        let record = with_values.finalize().expect("samples were recorded");
        assert_eq!(record.median, Some(3.0));
    }

    #[test]
    fn empty_accumulator_finalizes_to_none() {
        assert!(MetricAccumulator::new(true).finalize().is_none());
    }

    #[test]
    fn samples_stay_within_extrema() {
        let values = [0.25, 0.5, 0.125, 0.75];
        let mut acc = MetricAccumulator::new(false);
        for (index, value) in values.iter().enumerate() {
            acc.record(&[index], *value, Duration::ZERO);
        }
        let record = acc.finalize().expect("samples were recorded");
        for value in values {
            assert!(record.lowest <= value && value <= record.highest);
        }
    }
}
