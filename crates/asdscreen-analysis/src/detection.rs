//! Detection rates: the share of positive screening outcomes.

use asdscreen_dataset::{record::NormalizedRecord, vocabulary::Gender};
use asdscreen_stats::rate::Rate;
use serde::{Deserialize, Serialize};

/// Detection rate within one gender category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenderStratum {
    pub gender: Gender,
    pub rate: Rate,
    /// Fewer known outcomes than the configured minimum. The rate is still
    /// reported.
    pub low_confidence: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionSummary {
    pub overall: Rate,
    /// One stratum per canonical gender, in vocabulary order.
    pub by_gender: Vec<GenderStratum>,
}

/// `count(outcome = true) / count(outcome known)`.
#[must_use]
pub fn detection_rate<'a, I>(records: I) -> Rate
where
    I: IntoIterator<Item = &'a NormalizedRecord>,
{
    Rate::from_observations(records.into_iter().map(|r| r.outcome))
}

impl DetectionSummary {
    #[must_use]
    pub fn compute(records: &[NormalizedRecord], min_stratum: usize) -> Self {
        let by_gender = Gender::ALL
            .iter()
            .map(|&gender| {
                let rate = detection_rate(records.iter().filter(|r| r.gender == Some(gender)));
                GenderStratum {
                    gender,
                    rate,
                    low_confidence: rate.trials < min_stratum,
                }
            })
            .collect();
        Self {
            overall: detection_rate(records),
            by_gender,
        }
    }

    #[must_use]
    pub fn stratum(&self, gender: Gender) -> Option<&GenderStratum> {
        self.by_gender.iter().find(|s| s.gender == gender)
    }
}

#[cfg(test)]
mod tests {
    use asdscreen_stats::measure::Measure;

    use super::*;
    use crate::test_util::record;

    #[test]
    fn test_detection_rate_ignores_unknown_outcomes() {
        let records = vec![
            record().outcome(Some(true)).build(),
            record().outcome(Some(false)).build(),
            record().outcome(Some(false)).build(),
            record().outcome(None).build(),
        ];
        let rate = detection_rate(&records);
        assert_eq!(rate.trials, 3);
        assert_eq!(rate.successes, 1);
        let value = rate.value.into_value().unwrap();
        assert!((0.0..=1.0).contains(&value));
    }

    #[test]
    fn test_no_known_outcome_is_undefined() {
        let records = vec![record().outcome(None).build()];
        assert!(detection_rate(&records).value.is_undefined());
        assert!(detection_rate(&[]).value.is_undefined());
    }

    #[test]
    fn test_small_strata_are_flagged_not_suppressed() {
        let mut records = (0..6)
            .map(|i| record().gender(Gender::Male).outcome(Some(i < 3)).build())
            .collect::<Vec<_>>();
        records.push(record().gender(Gender::Female).outcome(Some(true)).build());
        let summary = DetectionSummary::compute(&records, 5);

        let male = summary.stratum(Gender::Male).unwrap();
        assert!(!male.low_confidence);
        assert_eq!(male.rate.value, Measure::Value(0.5));

        let female = summary.stratum(Gender::Female).unwrap();
        assert!(female.low_confidence);
        assert_eq!(female.rate.value, Measure::Value(1.0));
        assert_eq!(summary.overall.trials, 7);
    }
}
