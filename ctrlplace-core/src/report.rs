//! The serialisable result document of a sweep.
//!
//! The schema is a nested mapping keyed by combo size, matching what the
//! downstream plotting and analysis collaborators consume:
//!
//! ```json
//! {
//!   "group": [1, 2],
//!   "metric": ["latency"],
//!   "data": {
//!     "1": {
//!       "latency": { "highest": ..., "lowest": ..., ... },
//!       "distribution": []
//!     }
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::aggregate::{AggregateRecord, DistributionEntry};
use crate::metric::Metric;

/// Aggregates and distribution for one combo size.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct GroupReport {
    /// Metric name to its aggregate record.
    #[serde(flatten)]
    pub metrics: BTreeMap<String, AggregateRecord>,
    /// Retained per-combo points; empty unless distribution retention was
    /// enabled.
    pub distribution: Vec<DistributionEntry>,
}

/// The complete result document of one sweep.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct PlacementReport {
    /// Evaluated combo sizes, ascending.
    pub group: Vec<usize>,
    /// Names of the evaluated metrics, in request order.
    pub metric: Vec<String>,
    /// Combo size (stringified, for JSON object keys) to group results.
    pub data: BTreeMap<String, GroupReport>,
}

impl PlacementReport {
    pub(crate) fn new(group: Vec<usize>, metrics: &[Metric]) -> Self {
        Self {
            group,
            metric: metrics.iter().map(|m| m.as_str().to_owned()).collect(),
            data: BTreeMap::new(),
        }
    }

    /// Looks up the aggregate record for one combo size and metric.
    #[must_use]
    pub fn record(&self, combo_size: usize, metric: Metric) -> Option<&AggregateRecord> {
        self.data
            .get(&combo_size.to_string())
            .and_then(|group| group.metrics.get(metric.as_str()))
    }

    /// Looks up the retained distribution for one combo size.
    #[must_use]
    pub fn distribution(&self, combo_size: usize) -> Option<&[DistributionEntry]> {
        self.data
            .get(&combo_size.to_string())
            .map(|group| group.distribution.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> AggregateRecord {
        AggregateRecord {
            highest: 1.25,
            highest_combo: vec![1],
            lowest: 0.75,
            lowest_combo: vec![0],
            mean: 1.0,
            median: Some(1.125),
            duration: 0.004,
            samples: 4,
        }
    }

    fn sample_report() -> PlacementReport {
        let mut report = PlacementReport::new(vec![1], &[Metric::Latency]);
        let mut group = GroupReport::default();
        group
            .metrics
            .insert("latency".to_owned(), sample_record());
        group.distribution.push(DistributionEntry {
            id: 0,
            values: [("latency".to_owned(), 0.75)].into_iter().collect(),
            combo: Some(vec![0]),
        });
        report.data.insert("1".to_owned(), group);
        report
    }

    #[test]
    fn lookup_by_size_and_metric() {
        let report = sample_report();
        let record = report.record(1, Metric::Latency).expect("record exists");
        assert_eq!(record.lowest_combo, vec![0]);
        assert!(report.record(2, Metric::Latency).is_none());
        assert!(report.record(1, Metric::Fairness).is_none());
        assert_eq!(report.distribution(1).map(<[_]>::len), Some(1));
    }

    #[test]
    fn json_round_trip_preserves_aggregates() {
        let report = sample_report();
        let encoded = serde_json::to_string(&report).expect("report serialises");
        let decoded: PlacementReport = serde_json::from_str(&encoded).expect("report parses");
        assert_eq!(decoded, report);
    }

    #[test]
    fn schema_nests_metrics_under_stringified_size() {
        let report = sample_report();
        let value = serde_json::to_value(&report).expect("report serialises");
        assert_eq!(value["group"][0], 1);
        assert_eq!(value["metric"][0], "latency");
        assert_eq!(value["data"]["1"]["latency"]["samples"], 4);
        assert_eq!(value["data"]["1"]["distribution"][0]["id"], 0);
        assert_eq!(value["data"]["1"]["distribution"][0]["latency"], 0.75);
    }

    #[test]
    fn absent_median_is_omitted_from_json() {
        let mut record = sample_record();
        record.median = None;
        let value = serde_json::to_value(&record).expect("record serialises");
        assert!(value.get("median").is_none());
    }
}
