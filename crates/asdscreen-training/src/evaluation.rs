//! Classification quality on held-out samples.

use asdscreen_stats::measure::{Measure, UndefinedReason};
use serde::{Deserialize, Serialize};

/// Counts of actual-versus-predicted outcomes, positive class = `true`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub true_negative: usize,
    pub false_positive: usize,
    pub false_negative: usize,
    pub true_positive: usize,
}

impl ConfusionMatrix {
    /// Tallies `(actual, predicted)` pairs.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (bool, bool)>,
    {
        pairs
            .into_iter()
            .fold(Self::default(), |mut m, (actual, predicted)| {
                match (actual, predicted) {
                    (false, false) => m.true_negative += 1,
                    (false, true) => m.false_positive += 1,
                    (true, false) => m.false_negative += 1,
                    (true, true) => m.true_positive += 1,
                }
                m
            })
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.true_negative + self.false_positive + self.false_negative + self.true_positive
    }

    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn accuracy(&self) -> Measure<f64> {
        Measure::ratio(
            (self.true_positive + self.true_negative) as f64,
            self.total() as f64,
        )
    }

    /// Precision, recall and F1 of the positive (`true`) or negative class.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn class_metrics(&self, positive: bool) -> ClassMetrics {
        let (hit, false_alarm, miss) = if positive {
            (self.true_positive, self.false_positive, self.false_negative)
        } else {
            (self.true_negative, self.false_negative, self.false_positive)
        };
        let precision = Measure::ratio(hit as f64, (hit + false_alarm) as f64);
        let recall = Measure::ratio(hit as f64, (hit + miss) as f64);
        let f1 = precision.zip_with(recall, |p, r| (p, r)).and_then(|(p, r)| {
            if p + r == 0.0 {
                Measure::Undefined(UndefinedReason::ZeroDenominator)
            } else {
                Measure::Value(2.0 * p * r / (p + r))
            }
        });
        ClassMetrics {
            precision,
            recall,
            f1,
            support: hit + miss,
        }
    }
}

/// Per-class precision, recall and F1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: Measure<f64>,
    pub recall: Measure<f64>,
    pub f1: Measure<f64>,
    /// Number of held-out samples actually in this class.
    pub support: usize,
}

/// Holdout evaluation of a binary classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub accuracy: Measure<f64>,
    pub confusion: ConfusionMatrix,
    pub negative: ClassMetrics,
    pub positive: ClassMetrics,
}

impl ClassificationReport {
    /// Builds a report from `(actual, predicted)` pairs.
    ///
    /// # Examples
    ///
    /// ```
    /// use asdscreen_stats::measure::Measure;
    /// use asdscreen_training::evaluation::ClassificationReport;
    ///
    /// let report = ClassificationReport::from_pairs([
    ///     (true, true),
    ///     (true, false),
    ///     (false, false),
    ///     (false, false),
    /// ]);
    /// assert_eq!(report.accuracy, Measure::Value(0.75));
    /// assert_eq!(report.positive.recall, Measure::Value(0.5));
    /// assert_eq!(report.positive.precision, Measure::Value(1.0));
    /// ```
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (bool, bool)>,
    {
        let confusion = ConfusionMatrix::from_pairs(pairs);
        Self {
            accuracy: confusion.accuracy(),
            confusion,
            negative: confusion.class_metrics(false),
            positive: confusion.class_metrics(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_metrics() {
        let m = ConfusionMatrix {
            true_negative: 50,
            false_positive: 10,
            false_negative: 5,
            true_positive: 35,
        };
        assert_eq!(m.total(), 100);
        assert_eq!(m.accuracy(), Measure::Value(0.85));

        let pos = m.class_metrics(true);
        assert_eq!(pos.support, 40);
        assert_eq!(pos.recall, Measure::Value(0.875));
        assert_eq!(pos.precision, Measure::Value(35.0 / 45.0));
        let f1 = pos.f1.into_value().unwrap();
        assert!((f1 - 70.0 / 85.0).abs() < 1e-12);

        let neg = m.class_metrics(false);
        assert_eq!(neg.support, 60);
        assert_eq!(neg.precision, Measure::Value(50.0 / 55.0));
    }

    #[test]
    fn test_never_predicted_class_has_undefined_precision() {
        let report = ClassificationReport::from_pairs([(true, false), (false, false)]);
        assert!(report.positive.precision.is_undefined());
        assert_eq!(report.positive.recall, Measure::Value(0.0));
        assert!(report.positive.f1.is_undefined());
    }

    #[test]
    fn test_empty_holdout() {
        let report = ClassificationReport::from_pairs([]);
        assert!(report.accuracy.is_undefined());
        assert_eq!(report.positive.support, 0);
    }
}
