//! The comparative model: every per-group result plus the cross-group tests.

use std::collections::BTreeMap;

use asdscreen_dataset::{
    dataset::{GroupDataset, SizeCheck},
    group::AgeGroup,
    normalize::NormalizationFailureCounts,
    record::NormalizedRecord,
};
use asdscreen_stats::{correlation::CorrelationMatrix, measure::Measure};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    comparison::CrossGroupTests,
    config::AnalysisConfig,
    demographics::Demographics,
    detection::DetectionSummary,
    importance::{FeatureMatrix, HoldoutEvaluation, ImportanceRanking},
    items::{ItemStatistic, item_correlations, item_statistics},
    metric::MetricKey,
    risk::{RiskFactorAssociation, risk_factor_associations},
    score::ScoreDistribution,
};

/// What was loaded for a group and what was dropped on the way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub records: usize,
    pub complete_cases: usize,
    pub load_failures: usize,
    pub normalization_failures: NormalizationFailureCounts,
    pub size_check: Option<SizeCheck>,
}

/// All metrics of one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupReport {
    pub group: AgeGroup,
    pub dataset: DatasetSummary,
    pub detection: DetectionSummary,
    pub score: ScoreDistribution,
    pub demographics: Demographics,
    pub items: Vec<ItemStatistic>,
    pub item_correlations: CorrelationMatrix,
    pub risk_factors: Vec<RiskFactorAssociation>,
    pub importance: Measure<ImportanceRanking>,
    pub holdout: Measure<HoldoutEvaluation>,
}

impl GroupReport {
    #[must_use]
    pub fn compute(dataset: &GroupDataset, config: &AnalysisConfig) -> Self {
        let records = &dataset.records;
        let matrix = FeatureMatrix::complete_cases(records);
        log::info!(
            "{}: computing metrics over {} records ({} complete cases)",
            dataset.group,
            records.len(),
            matrix.len()
        );

        let importance = crate::importance::variable_importance(&matrix, config);
        let holdout = crate::importance::holdout_evaluation(&matrix, config);
        if let Measure::Unavailable(sample) = &importance {
            log::warn!(
                "{}: variable importance unavailable ({} complete cases, {} required)",
                dataset.group,
                sample.actual,
                sample.threshold
            );
        }

        Self {
            group: dataset.group,
            dataset: DatasetSummary {
                records: records.len(),
                complete_cases: matrix.len(),
                load_failures: dataset.load_failures,
                normalization_failures: dataset.normalization_failures.clone(),
                size_check: dataset.size_check,
            },
            detection: DetectionSummary::compute(records, config.min_stratum),
            score: ScoreDistribution::compute(records),
            demographics: Demographics::compute(records),
            items: item_statistics(records),
            item_correlations: item_correlations(records),
            risk_factors: risk_factor_associations(records),
            importance,
            holdout,
        }
    }
}

/// A group that could not be analyzed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingGroup {
    pub group: AgeGroup,
    pub reason: String,
}

/// Result of one analysis run.
///
/// Built once by [`ComparativeModel::assemble`] and read-only afterwards; all
/// lookups go through [`ComparativeModel::metric`] and the cross-group helpers.
///
/// `generated_at` is run metadata supplied by the caller. Every other field is
/// a function of the datasets and the configuration alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparativeModel {
    generated_at: DateTime<Utc>,
    config: AnalysisConfig,
    groups: BTreeMap<AgeGroup, GroupReport>,
    /// Groups whose source could not be read.
    #[serde(default)]
    missing_groups: Vec<MissingGroup>,
    comparisons: CrossGroupTests,
}

impl ComparativeModel {
    /// Assembles the model from analyzed groups.
    ///
    /// `datasets` supplies the records for the cross-group tests; `reports`
    /// must hold one report per dataset.
    #[must_use]
    pub fn assemble(
        datasets: &[GroupDataset],
        reports: Vec<GroupReport>,
        missing_groups: Vec<MissingGroup>,
        config: &AnalysisConfig,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let records = datasets
            .iter()
            .map(|d| (d.group, d.records.as_slice()))
            .collect::<BTreeMap<AgeGroup, &[NormalizedRecord]>>();
        let comparisons = CrossGroupTests::compute(&records);
        Self {
            generated_at,
            config: config.clone(),
            groups: reports.into_iter().map(|r| (r.group, r)).collect(),
            missing_groups,
            comparisons,
        }
    }

    #[must_use]
    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    #[must_use]
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Reports of the analyzed groups, in group order.
    #[must_use]
    pub fn groups(&self) -> &BTreeMap<AgeGroup, GroupReport> {
        &self.groups
    }

    #[must_use]
    pub fn group(&self, group: AgeGroup) -> Option<&GroupReport> {
        self.groups.get(&group)
    }

    #[must_use]
    pub fn missing_groups(&self) -> &[MissingGroup] {
        &self.missing_groups
    }

    #[must_use]
    pub fn comparisons(&self) -> &CrossGroupTests {
        &self.comparisons
    }

    /// Looks up a scalar metric; [`Measure::NotComputed`] when the group was
    /// not analyzed or the key names something that was not computed.
    #[must_use]
    pub fn metric(&self, group: AgeGroup, key: &MetricKey) -> Measure<f64> {
        self.group(group)
            .map_or(Measure::NotComputed, |report| key.lookup(report))
    }

    /// `metric(a) - metric(b)`; a non-value on either side propagates.
    #[must_use]
    pub fn difference(&self, key: &MetricKey, a: AgeGroup, b: AgeGroup) -> Measure<f64> {
        self.metric(a, key)
            .zip_with(self.metric(b, key), |x, y| x - y)
    }

    /// The metric for every group, in group order.
    #[must_use]
    pub fn compare(&self, key: &MetricKey) -> BTreeMap<AgeGroup, Measure<f64>> {
        AgeGroup::ALL
            .into_iter()
            .map(|group| (group, self.metric(group, key)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use asdscreen_stats::measure::UndefinedReason;

    use super::*;
    use crate::test_util::{record, separable_records};

    fn dataset(group: AgeGroup, records: Vec<NormalizedRecord>) -> GroupDataset {
        GroupDataset {
            group,
            records,
            load_failures: 0,
            normalization_failures: NormalizationFailureCounts::default(),
            size_check: None,
        }
    }

    fn model(datasets: &[GroupDataset]) -> ComparativeModel {
        let config = AnalysisConfig::default();
        let reports = datasets
            .iter()
            .map(|d| GroupReport::compute(d, &config))
            .collect();
        ComparativeModel::assemble(datasets, reports, vec![], &config, Utc::now())
    }

    #[test]
    fn test_metric_lookup_and_difference() {
        let datasets = [
            dataset(
                AgeGroup::Child,
                (0..4).map(|i| record().outcome(Some(i < 3)).build()).collect(),
            ),
            dataset(
                AgeGroup::Adult,
                (0..4).map(|i| record().outcome(Some(i < 1)).build()).collect(),
            ),
        ];
        let model = model(&datasets);
        let key: MetricKey = "detection_rate".parse().unwrap();
        assert_eq!(model.metric(AgeGroup::Child, &key), Measure::Value(0.75));
        assert_eq!(
            model.difference(&key, AgeGroup::Child, AgeGroup::Adult),
            Measure::Value(0.5)
        );
        assert_eq!(model.metric(AgeGroup::Adolescent, &key), Measure::NotComputed);
        assert_eq!(
            model.difference(&key, AgeGroup::Child, AgeGroup::Adolescent),
            Measure::NotComputed
        );
        let all = model.compare(&key);
        assert_eq!(all.len(), 3);
        assert_eq!(all[&AgeGroup::Adult], Measure::Value(0.25));
    }

    #[test]
    fn test_same_inputs_and_timestamp_give_identical_models() {
        let datasets = [
            dataset(AgeGroup::Child, separable_records(AgeGroup::Child, 64)),
            dataset(AgeGroup::Adult, separable_records(AgeGroup::Adult, 40)),
        ];
        let config = AnalysisConfig::default();
        let generated_at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let build = || {
            let reports = datasets
                .iter()
                .map(|d| GroupReport::compute(d, &config))
                .collect();
            ComparativeModel::assemble(&datasets, reports, vec![], &config, generated_at)
        };
        let first = build();
        assert_eq!(first, build());
        assert_eq!(first.generated_at(), generated_at);
    }

    #[test]
    fn test_undefined_propagates_through_difference() {
        let datasets = [
            dataset(AgeGroup::Child, vec![record().outcome(None).build()]),
            dataset(AgeGroup::Adult, vec![record().outcome(Some(true)).build()]),
        ];
        let model = model(&datasets);
        let key = MetricKey::DetectionRate;
        assert_eq!(
            model.difference(&key, AgeGroup::Adult, AgeGroup::Child),
            Measure::Undefined(UndefinedReason::ZeroDenominator)
        );
    }

    #[test]
    fn test_model_serializes_to_json_and_back() {
        let datasets = [
            dataset(AgeGroup::Child, separable_records(AgeGroup::Child, 64)),
            dataset(AgeGroup::Adult, separable_records(AgeGroup::Adult, 20)),
        ];
        let model = model(&datasets);
        assert!(model.groups()[&AgeGroup::Child].importance.is_value());
        assert!(model.group(AgeGroup::Adult).unwrap().importance.is_unavailable());

        let json = serde_json::to_value(&model).unwrap();
        assert_eq!(json["groups"]["adult"]["importance"]["status"], "unavailable");
        assert_eq!(json["groups"]["adult"]["importance"]["value"]["threshold"], 30);
        assert_eq!(json["groups"]["adult"]["importance"]["value"]["actual"], 20);

        let parsed: ComparativeModel = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.groups().len(), 2);
        assert_eq!(parsed.generated_at(), model.generated_at());
        let key: MetricKey = "importance:A1".parse().unwrap();
        let before = model.metric(AgeGroup::Child, &key).into_value().unwrap();
        let after = parsed.metric(AgeGroup::Child, &key).into_value().unwrap();
        assert!((before - after).abs() < 1e-12);
    }
}
