//! Distribution of the AQ-10 total score.

use asdscreen_dataset::record::{MAX_SCORE, NormalizedRecord};
use asdscreen_stats::{
    descriptive::DescriptiveStats,
    frequency::FrequencyTable,
    measure::{Measure, UndefinedReason},
    percentiles::Percentiles,
};
use serde::{Deserialize, Serialize};

/// Percentile points reported for the score.
pub const SCORE_PERCENTILES: [f64; 3] = [25.0, 50.0, 75.0];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreDistribution {
    /// Records with a known score.
    pub known: usize,
    pub missing: usize,
    /// Count of every score in `0..=10`; sums to `known`.
    pub frequencies: FrequencyTable,
    /// Most frequent score (the lowest one on ties).
    pub mode: Option<u32>,
    /// Mean, median, population variance and standard deviation.
    pub summary: Measure<DescriptiveStats>,
    /// P25, P50 and P75, interpolated between closest ranks.
    pub percentiles: Measure<Percentiles>,
}

impl ScoreDistribution {
    #[must_use]
    pub fn compute(records: &[NormalizedRecord]) -> Self {
        let scores = records.iter().filter_map(|r| r.score).collect::<Vec<_>>();
        let frequencies =
            FrequencyTable::new(scores.iter().map(|&s| u32::from(s)), 0..=u32::from(MAX_SCORE));

        let mut sorted = scores.iter().map(|&s| f64::from(s)).collect::<Vec<_>>();
        sorted.sort_by(f64::total_cmp);
        let summary = DescriptiveStats::from_sorted(&sorted)
            .map_or(Measure::Undefined(UndefinedReason::ZeroDenominator), Measure::Value);
        let percentiles = Percentiles::from_sorted(&sorted, &SCORE_PERCENTILES)
            .map_or(Measure::Undefined(UndefinedReason::ZeroDenominator), Measure::Value);

        Self {
            known: scores.len(),
            missing: records.len() - scores.len(),
            mode: frequencies.mode(),
            frequencies,
            summary,
            percentiles,
        }
    }

    /// Value of one of [`SCORE_PERCENTILES`]; not computed for other points.
    #[must_use]
    pub fn percentile(&self, point: f64) -> Measure<f64> {
        self.percentiles.as_ref().and_then(|p| match p.get(point) {
            Some(v) => Measure::Value(v),
            None => Measure::NotComputed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::record;

    fn records_with_scores(scores: &[Option<u8>]) -> Vec<NormalizedRecord> {
        scores.iter().map(|&s| record().score(s).build()).collect()
    }

    #[test]
    fn test_frequencies_sum_to_known_count() {
        let records = records_with_scores(&[Some(0), Some(3), Some(3), None, Some(10), Some(7)]);
        let dist = ScoreDistribution::compute(&records);
        assert_eq!(dist.known, 5);
        assert_eq!(dist.missing, 1);
        assert_eq!(dist.frequencies.bins.len(), 11);
        assert_eq!(dist.frequencies.total(), dist.known);
        assert_eq!(dist.frequencies.out_of_range, 0);
        assert_eq!(dist.frequencies.count_of(3), Some(2));
        assert_eq!(dist.mode, Some(3));
    }

    #[test]
    fn test_summary_statistics() {
        let records = records_with_scores(&[Some(2), Some(4), Some(4), Some(6)]);
        let dist = ScoreDistribution::compute(&records);
        let stats = dist.summary.value().unwrap();
        assert_eq!(stats.mean, 4.0);
        assert_eq!(stats.median, 4.0);
        assert_eq!(stats.variance, 2.0);
        assert_eq!(dist.percentile(25.0), Measure::Value(3.5));
        assert_eq!(dist.percentile(50.0), Measure::Value(stats.median));
        assert_eq!(dist.percentile(75.0), Measure::Value(4.5));
        assert_eq!(dist.percentile(90.0), Measure::NotComputed);
    }

    #[test]
    fn test_no_known_scores() {
        let records = records_with_scores(&[None, None]);
        let dist = ScoreDistribution::compute(&records);
        assert_eq!(dist.known, 0);
        assert_eq!(dist.frequencies.total(), 0);
        assert_eq!(dist.mode, None);
        assert!(dist.summary.is_undefined());
        assert!(dist.percentile(50.0).is_undefined());
    }
}
