//! Variable importance from a class-balanced logistic regression.
//!
//! Each group gets its own model, fitted on the complete cases only (every
//! item, age, gender, jaundice, family history and the outcome known). The
//! features are the ten item responses, age in years, a male indicator and
//! the two risk-factor flags. All features are standardized before fitting, so
//! the coefficients are directly comparable; a feature's importance is its
//! signed standardized coefficient and the ranking orders features by
//! magnitude.
//!
//! Groups with too few complete cases get an [`Measure::Unavailable`]
//! ranking that keeps the threshold and the count. A group whose complete
//! cases all share one outcome gets [`UndefinedReason::SingleClass`].
//!
//! The same feature matrix is also split 75/25 (stratified, seeded) to report
//! how well the model classifies held-out records.

use std::{fmt, str::FromStr};

use asdscreen_dataset::{
    record::{ItemId, NormalizedRecord},
    vocabulary::Gender,
};
use asdscreen_stats::measure::{InsufficientSample, Measure, UndefinedReason};
use asdscreen_training::{
    TrainingError,
    evaluation::ClassificationReport,
    logistic::StandardizedModel,
    split::stratified_split,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::config::AnalysisConfig;

/// One input of the importance model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Feature {
    Item(ItemId),
    Age,
    GenderMale,
    Jaundice,
    FamilyHistory,
}

impl Feature {
    /// All features in model column order.
    pub fn all() -> impl Iterator<Item = Self> {
        ItemId::all().map(Self::Item).chain([
            Self::Age,
            Self::GenderMale,
            Self::Jaundice,
            Self::FamilyHistory,
        ])
    }

    fn value(self, record: &NormalizedRecord) -> Option<f64> {
        let flag = |b: bool| f64::from(u8::from(b));
        match self {
            Self::Item(item) => record.item(item).map(flag),
            Self::Age => record.age_years,
            Self::GenderMale => record.gender.map(|g| flag(g == Gender::Male)),
            Self::Jaundice => record.jaundice.map(flag),
            Self::FamilyHistory => record.family_history.map(flag),
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Item(item) => fmt::Display::fmt(item, f),
            Self::Age => f.pad("age"),
            Self::GenderMale => f.pad("gender_male"),
            Self::Jaundice => f.pad("jaundice"),
            Self::FamilyHistory => f.pad("family_history"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown feature '{_0}'")]
pub struct ParseFeatureError(#[error(not(source))] String);

impl FromStr for Feature {
    type Err = ParseFeatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "age" => Ok(Self::Age),
            "gender_male" => Ok(Self::GenderMale),
            "jaundice" => Ok(Self::Jaundice),
            "family_history" => Ok(Self::FamilyHistory),
            _ => s
                .parse()
                .map(Self::Item)
                .map_err(|_| ParseFeatureError(s.to_owned())),
        }
    }
}

impl Serialize for Feature {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Feature {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: Feature,
    /// Standardized coefficient; undefined for a feature that is constant
    /// among the complete cases.
    pub coefficient: Measure<f64>,
}

/// Features ordered by the magnitude of their standardized coefficient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportanceRanking {
    pub complete_cases: usize,
    /// Largest magnitude first; features with an undefined coefficient last.
    pub features: Vec<FeatureImportance>,
    pub intercept: f64,
    pub iterations: usize,
    pub converged: bool,
}

impl ImportanceRanking {
    #[must_use]
    pub fn coefficient(&self, feature: Feature) -> Measure<f64> {
        self.features
            .iter()
            .find(|f| f.feature == feature)
            .map_or(Measure::NotComputed, |f| f.coefficient)
    }
}

/// Classification quality of a model fitted on the training partition and
/// applied to the held-out partition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HoldoutEvaluation {
    pub train_size: usize,
    pub test_size: usize,
    pub report: ClassificationReport,
}

/// Feature rows and outcome labels of the complete cases.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    pub rows: Vec<Vec<f64>>,
    pub labels: Vec<bool>,
}

impl FeatureMatrix {
    #[must_use]
    pub fn complete_cases(records: &[NormalizedRecord]) -> Self {
        let (rows, labels) = records
            .iter()
            .filter(|r| r.is_complete_case())
            .filter_map(|r| {
                let row = Feature::all()
                    .map(|f| f.value(r))
                    .collect::<Option<Vec<_>>>()?;
                Some((row, r.outcome?))
            })
            .unzip();
        Self { rows, labels }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn subset(&self, indices: &[usize]) -> Self {
        Self {
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
        }
    }

    fn check_size(&self, threshold: usize) -> Measure<()> {
        match InsufficientSample::check(threshold, self.len()) {
            Ok(()) => Measure::Value(()),
            Err(sample) => sample.into(),
        }
    }
}

fn training_failure<T>(err: &TrainingError) -> Measure<T> {
    match err {
        TrainingError::SingleClass => Measure::Undefined(UndefinedReason::SingleClass),
        TrainingError::Empty => Measure::Undefined(UndefinedReason::ZeroDenominator),
        TrainingError::LengthMismatch { .. } | TrainingError::RaggedRow { .. } => {
            unreachable!("feature matrix rows are built uniformly: {err}")
        }
    }
}

/// Fits the importance model on all complete cases and ranks the features.
#[must_use]
pub fn variable_importance(
    matrix: &FeatureMatrix,
    config: &AnalysisConfig,
) -> Measure<ImportanceRanking> {
    matrix.check_size(config.min_complete_cases).and_then(|()| {
        match StandardizedModel::fit(&matrix.rows, &matrix.labels, &config.logistic) {
            Ok(fitted) => Measure::Value(rank(&fitted, matrix.len())),
            Err(err) => training_failure(&err),
        }
    })
}

fn rank(fitted: &StandardizedModel, complete_cases: usize) -> ImportanceRanking {
    let mut features = Feature::all()
        .enumerate()
        .map(|(j, feature)| FeatureImportance {
            feature,
            coefficient: if fitted.scaler.is_constant(j) {
                Measure::Undefined(UndefinedReason::ZeroVariance)
            } else {
                Measure::finite(fitted.model.coefficients[j])
            },
        })
        .collect::<Vec<_>>();
    // stable sort keeps column order among ties and among undefined entries
    features.sort_by(|a, b| {
        let magnitude = |f: &FeatureImportance| f.coefficient.value().map(|c| c.abs());
        match (magnitude(a), magnitude(b)) {
            (Some(x), Some(y)) => y.total_cmp(&x),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        }
    });
    ImportanceRanking {
        complete_cases,
        features,
        intercept: fitted.model.intercept,
        iterations: fitted.model.iterations,
        converged: fitted.model.converged,
    }
}

/// Fits on a stratified training partition and evaluates on the rest.
///
/// Not computed when the configured test fraction is invalid.
#[must_use]
pub fn holdout_evaluation(
    matrix: &FeatureMatrix,
    config: &AnalysisConfig,
) -> Measure<HoldoutEvaluation> {
    if let Err(err) = config.validate() {
        log::warn!("holdout evaluation skipped: {err}");
        return Measure::NotComputed;
    }
    matrix.check_size(config.min_complete_cases).and_then(|()| {
        let split = stratified_split(&matrix.labels, config.test_fraction, config.seed);
        let train = matrix.subset(&split.train);
        let test = matrix.subset(&split.test);
        match StandardizedModel::fit(&train.rows, &train.labels, &config.logistic) {
            Ok(fitted) => {
                let pairs = test
                    .rows
                    .iter()
                    .zip(&test.labels)
                    .map(|(row, &actual)| (actual, fitted.predict(row)));
                Measure::Value(HoldoutEvaluation {
                    train_size: train.len(),
                    test_size: test.len(),
                    report: ClassificationReport::from_pairs(pairs),
                })
            }
            Err(err) => training_failure(&err),
        }
    })
}

#[cfg(test)]
mod tests {
    use asdscreen_dataset::group::AgeGroup;

    use super::*;
    use crate::test_util::{record, separable_records};

    fn a(n: u8) -> Feature {
        Feature::Item(ItemId::new(n).unwrap())
    }

    #[test]
    fn test_feature_names_round_trip() {
        let names = Feature::all().map(|f| f.to_string()).collect::<Vec<_>>();
        assert_eq!(names.len(), 14);
        assert_eq!(names[0], "A1");
        assert_eq!(names[10..], ["age", "gender_male", "jaundice", "family_history"]);
        for feature in Feature::all() {
            assert_eq!(feature.to_string().parse::<Feature>().unwrap(), feature);
        }
        assert!("height".parse::<Feature>().is_err());
        let json = serde_json::to_string(&Feature::GenderMale).unwrap();
        assert_eq!(json, "\"gender_male\"");
    }

    #[test]
    fn test_complete_cases_only() {
        let records = vec![
            record().build(),
            record().age(None).build(),
            record().outcome(None).build(),
            record().item(3, None).build(),
        ];
        let matrix = FeatureMatrix::complete_cases(&records);
        assert_eq!(matrix.len(), 1);
        assert_eq!(matrix.rows[0].len(), 14);
    }

    #[test]
    fn test_twenty_complete_cases_is_unavailable() {
        let records = separable_records(AgeGroup::Adult, 20);
        let matrix = FeatureMatrix::complete_cases(&records);
        let ranking = variable_importance(&matrix, &AnalysisConfig::default());
        assert_eq!(
            ranking,
            Measure::Unavailable(InsufficientSample {
                threshold: 30,
                actual: 20
            })
        );
        assert!(holdout_evaluation(&matrix, &AnalysisConfig::default()).is_unavailable());
    }

    #[test]
    fn test_single_outcome_class_is_undefined() {
        let records = (0..40).map(|_| record().outcome(Some(false)).build()).collect::<Vec<_>>();
        let matrix = FeatureMatrix::complete_cases(&records);
        assert_eq!(
            variable_importance(&matrix, &AnalysisConfig::default()),
            Measure::Undefined(UndefinedReason::SingleClass)
        );
    }

    #[test]
    fn test_informative_items_rank_first() {
        let records = separable_records(AgeGroup::Child, 64);
        let matrix = FeatureMatrix::complete_cases(&records);
        let ranking = variable_importance(&matrix, &AnalysisConfig::default())
            .into_value()
            .unwrap();
        assert_eq!(ranking.complete_cases, 64);

        let top = ranking.features[..3]
            .iter()
            .map(|f| f.feature)
            .collect::<Vec<_>>();
        for feature in [a(1), a(2), a(3)] {
            assert!(top.contains(&feature), "{feature} not in {top:?}");
            assert!(ranking.coefficient(feature).into_value().unwrap() > 0.0);
        }
        // A7..A10 never vary in 64 records
        assert_eq!(
            ranking.coefficient(a(10)),
            Measure::Undefined(UndefinedReason::ZeroVariance)
        );
        assert!(
            ranking
                .features
                .iter()
                .rev()
                .take(4)
                .all(|f| f.coefficient.is_undefined())
        );
    }

    #[test]
    fn test_holdout_evaluation_sizes() {
        let records = separable_records(AgeGroup::Adolescent, 64);
        let matrix = FeatureMatrix::complete_cases(&records);
        let holdout = holdout_evaluation(&matrix, &AnalysisConfig::default())
            .into_value()
            .unwrap();
        assert_eq!(holdout.train_size + holdout.test_size, 64);
        // 8 positives, 56 negatives
        assert_eq!(holdout.report.positive.support, 2);
        assert_eq!(holdout.report.negative.support, 14);
        assert!(holdout.report.accuracy.is_value());
    }

    #[test]
    fn test_invalid_test_fraction_is_not_computed() {
        let records = separable_records(AgeGroup::Adolescent, 64);
        let matrix = FeatureMatrix::complete_cases(&records);
        for test_fraction in [1.5, f64::NAN] {
            let config = AnalysisConfig {
                test_fraction,
                ..AnalysisConfig::default()
            };
            assert_eq!(holdout_evaluation(&matrix, &config), Measure::NotComputed);
            assert!(variable_importance(&matrix, &config).is_value());
        }
    }
}
