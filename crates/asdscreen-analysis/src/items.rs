//! Per-item response rates and how well each item separates the outcomes.

use asdscreen_dataset::record::{ItemId, NormalizedRecord};
use asdscreen_stats::{
    correlation::{CorrelationMatrix, pearson},
    measure::Measure,
    rate::Rate,
};
use serde::{Deserialize, Serialize};

/// Response statistics of one AQ-10 item within one group.
///
/// Every rate excludes records whose response to this item is missing; the
/// outcome-conditional rates and the derived measures additionally exclude
/// records with an unknown outcome.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemStatistic {
    pub item: ItemId,
    /// Records with a known response.
    pub responded: usize,
    pub positive_rate: Rate,
    /// Positive-response rate among records with a positive outcome.
    pub rate_given_positive: Rate,
    /// Positive-response rate among records with a negative outcome.
    pub rate_given_negative: Rate,
    /// `rate_given_positive - rate_given_negative`.
    pub discriminative_power: Measure<f64>,
    /// Phi correlation between the response and the outcome.
    pub phi: Measure<f64>,
}

impl ItemStatistic {
    #[must_use]
    pub fn compute(records: &[NormalizedRecord], item: ItemId) -> Self {
        let positive_rate = Rate::from_observations(records.iter().map(|r| r.item(item)));

        let pairs = records
            .iter()
            .filter_map(|r| Some((r.item(item)?, r.outcome?)))
            .collect::<Vec<_>>();
        let rate_given = |outcome: bool| {
            Rate::from_observations(
                pairs
                    .iter()
                    .filter(|(_, o)| *o == outcome)
                    .map(|(response, _)| Some(*response)),
            )
        };
        let rate_given_positive = rate_given(true);
        let rate_given_negative = rate_given(false);
        let discriminative_power = rate_given_positive
            .value
            .zip_with(rate_given_negative.value, |p, n| p - n);

        let (responses, outcomes): (Vec<f64>, Vec<f64>) = pairs
            .iter()
            .map(|&(response, outcome)| (f64::from(u8::from(response)), f64::from(u8::from(outcome))))
            .unzip();

        Self {
            item,
            responded: positive_rate.trials,
            positive_rate,
            rate_given_positive,
            rate_given_negative,
            discriminative_power,
            phi: pearson(&responses, &outcomes),
        }
    }
}

/// Statistics of all ten items, in item order.
#[must_use]
pub fn item_statistics(records: &[NormalizedRecord]) -> Vec<ItemStatistic> {
    ItemId::all()
        .map(|item| ItemStatistic::compute(records, item))
        .collect()
}

/// Label of the total-score column in [`item_correlations`].
pub const SCORE_LABEL: &str = "score";

/// Pearson correlations between A1..A10 and the total score.
///
/// Only records with every item and the score known take part, so all
/// entries are computed on the same sample.
#[must_use]
pub fn item_correlations(records: &[NormalizedRecord]) -> CorrelationMatrix {
    let complete = records
        .iter()
        .filter_map(|r| {
            let items = r.items.iter().copied().collect::<Option<Vec<_>>>()?;
            Some((items, r.score?))
        })
        .collect::<Vec<_>>();

    let mut columns = ItemId::all()
        .map(|item| {
            let values = complete
                .iter()
                .map(|(items, _)| f64::from(u8::from(items[item.index()])))
                .collect::<Vec<_>>();
            (item.to_string(), values)
        })
        .collect::<Vec<_>>();
    columns.push((
        SCORE_LABEL.to_owned(),
        complete.iter().map(|(_, score)| f64::from(*score)).collect(),
    ));
    CorrelationMatrix::new(columns)
}

#[cfg(test)]
mod tests {
    use asdscreen_dataset::record::ITEM_COUNT;
    use asdscreen_stats::measure::UndefinedReason;

    use super::*;
    use crate::test_util::record;

    fn a(n: u8) -> ItemId {
        ItemId::new(n).unwrap()
    }

    #[test]
    fn test_discriminative_power() {
        // A1 endorsed by 3/4 positives and 1/4 negatives
        let records = (0..8)
            .map(|i| {
                let positive = i < 4;
                let endorsed = if positive { i < 3 } else { i == 4 };
                record()
                    .item(0, Some(endorsed))
                    .outcome(Some(positive))
                    .build()
            })
            .collect::<Vec<_>>();
        let stat = ItemStatistic::compute(&records, a(1));
        assert_eq!(stat.responded, 8);
        assert_eq!(stat.rate_given_positive.value, Measure::Value(0.75));
        assert_eq!(stat.rate_given_negative.value, Measure::Value(0.25));
        assert_eq!(stat.discriminative_power, Measure::Value(0.5));
        assert!((stat.phi.into_value().unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_equal_rates_give_exactly_zero() {
        let records = [(true, true), (false, true), (true, false), (false, false)]
            .into_iter()
            .map(|(endorsed, positive)| {
                record()
                    .item(4, Some(endorsed))
                    .outcome(Some(positive))
                    .build()
            })
            .collect::<Vec<_>>();
        let stat = ItemStatistic::compute(&records, a(5));
        assert_eq!(stat.discriminative_power, Measure::Value(0.0));
    }

    #[test]
    fn test_missing_values_are_excluded_per_item() {
        let records = vec![
            record().item(0, None).outcome(Some(true)).build(),
            record().item(0, Some(true)).outcome(None).build(),
            record().item(0, Some(true)).outcome(Some(true)).build(),
            record().item(0, Some(false)).outcome(Some(false)).build(),
        ];
        let a1 = ItemStatistic::compute(&records, a(1));
        assert_eq!(a1.responded, 3);
        assert_eq!(a1.positive_rate.successes, 2);
        assert_eq!(a1.rate_given_positive.trials, 1);
        assert_eq!(a1.rate_given_negative.trials, 1);

        // A2 is known everywhere, so only the unknown outcome is dropped
        let a2 = ItemStatistic::compute(&records, a(2));
        assert_eq!(a2.responded, 4);
        assert_eq!(a2.rate_given_positive.trials + a2.rate_given_negative.trials, 3);
    }

    #[test]
    fn test_single_outcome_class_makes_power_undefined() {
        let records = vec![
            record().item(0, Some(true)).outcome(Some(true)).build(),
            record().item(0, Some(false)).outcome(Some(true)).build(),
        ];
        let stat = ItemStatistic::compute(&records, a(1));
        assert_eq!(
            stat.discriminative_power,
            Measure::Undefined(UndefinedReason::ZeroDenominator)
        );
        assert!(stat.phi.is_undefined());
    }

    #[test]
    fn test_correlation_matrix_includes_score() {
        let records = (0..20)
            .map(|i| {
                let mut items = [false; ITEM_COUNT];
                items[0] = i % 2 == 0;
                items[1] = i % 3 == 0;
                items[2] = i % 2 == 0;
                record().items(items).build()
            })
            .collect::<Vec<_>>();
        let matrix = item_correlations(&records);
        assert_eq!(matrix.labels.len(), ITEM_COUNT + 1);
        assert_eq!(matrix.labels.last().map(String::as_str), Some(SCORE_LABEL));
        let r = matrix.get("A1", "A3").unwrap().into_value().unwrap();
        assert!((r - 1.0).abs() < 1e-12);
        assert!(matrix.get("A1", SCORE_LABEL).unwrap().into_value().unwrap() > 0.0);
        // A10 is never endorsed
        assert_eq!(
            matrix.get("A10", "A1"),
            Some(Measure::Undefined(UndefinedReason::ZeroVariance))
        );
        assert_eq!(item_statistics(&records).len(), ITEM_COUNT);
    }
}
