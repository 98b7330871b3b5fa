//! Association of the screening outcome with family history and jaundice.

use std::{fmt, str::FromStr};

use asdscreen_dataset::record::NormalizedRecord;
use asdscreen_stats::{
    measure::{Measure, UndefinedReason},
    rate::Rate,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    /// A family member has a pervasive developmental disorder.
    FamilyHistory,
    /// Born with jaundice.
    Jaundice,
}

impl RiskFactor {
    pub const ALL: [Self; 2] = [Self::FamilyHistory, Self::Jaundice];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FamilyHistory => "family_history",
            Self::Jaundice => "jaundice",
        }
    }

    #[must_use]
    pub fn of(self, record: &NormalizedRecord) -> Option<bool> {
        match self {
            Self::FamilyHistory => record.family_history,
            Self::Jaundice => record.jaundice,
        }
    }
}

impl fmt::Display for RiskFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown risk factor '{_0}'")]
pub struct ParseRiskFactorError(#[error(not(source))] String);

impl FromStr for RiskFactor {
    type Err = ParseRiskFactorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| ParseRiskFactorError(s.to_owned()))
    }
}

/// Outcome rates with and without a risk factor, and the ratio measures
/// derived from them.
///
/// Records with an unknown factor or an unknown outcome take no part.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskFactorAssociation {
    pub factor: RiskFactor,
    /// Outcome rate among records with the factor present.
    pub exposed: Rate,
    /// Outcome rate among records with the factor absent.
    pub unexposed: Rate,
    /// `P(outcome | factor) / P(outcome | ¬factor)`.
    pub relative_risk: Measure<f64>,
    /// `(a·d) / (b·c)` over the 2x2 exposure × outcome table.
    pub odds_ratio: Measure<f64>,
}

impl RiskFactorAssociation {
    /// # Examples
    ///
    /// The reference rate is zero, so the relative risk has no value:
    ///
    /// ```
    /// use asdscreen_analysis::risk::{RiskFactor, RiskFactorAssociation};
    /// use asdscreen_stats::measure::{Measure, UndefinedReason};
    /// # use asdscreen_dataset::{group::AgeGroup, record::NormalizedRecord};
    /// # let record = |family_history, outcome| NormalizedRecord {
    /// #     group: AgeGroup::Child, source_line: 2, items: [Some(false); 10],
    /// #     age_years: Some(6.0), gender: None, ethnicity: None, country: None,
    /// #     jaundice: Some(false), family_history: Some(family_history),
    /// #     completer: None, used_app_before: None, score: Some(0),
    /// #     outcome: Some(outcome),
    /// # };
    ///
    /// let records = vec![record(true, true), record(false, false), record(false, false)];
    /// let assoc = RiskFactorAssociation::compute(&records, RiskFactor::FamilyHistory);
    /// assert_eq!(assoc.exposed.value, Measure::Value(1.0));
    /// assert_eq!(
    ///     assoc.relative_risk,
    ///     Measure::Undefined(UndefinedReason::ZeroReference)
    /// );
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn compute(records: &[NormalizedRecord], factor: RiskFactor) -> Self {
        let (exposed, unexposed): (Vec<_>, Vec<_>) = records
            .iter()
            .filter_map(|r| Some((factor.of(r)?, r.outcome?)))
            .partition(|(present, _)| *present);
        let exposed = Rate::from_observations(exposed.into_iter().map(|(_, o)| Some(o)));
        let unexposed = Rate::from_observations(unexposed.into_iter().map(|(_, o)| Some(o)));

        let relative_risk = exposed.value.zip_with(unexposed.value, |p, q| (p, q)).and_then(
            |(p, q)| {
                if q == 0.0 {
                    Measure::Undefined(UndefinedReason::ZeroReference)
                } else {
                    Measure::finite(p / q)
                }
            },
        );

        let a = exposed.successes as f64;
        let b = exposed.failures() as f64;
        let c = unexposed.successes as f64;
        let d = unexposed.failures() as f64;
        let odds_ratio = Measure::ratio(a * d, b * c);

        Self {
            factor,
            exposed,
            unexposed,
            relative_risk,
            odds_ratio,
        }
    }
}

#[must_use]
pub fn risk_factor_associations(records: &[NormalizedRecord]) -> Vec<RiskFactorAssociation> {
    RiskFactor::ALL
        .into_iter()
        .map(|factor| RiskFactorAssociation::compute(records, factor))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::record;

    #[test]
    fn test_all_positives_exposed_gives_undefined_relative_risk() {
        // 4 positives all with family history, 6 negatives none with it
        let records = (0..10)
            .map(|i| {
                let positive = i < 4;
                record()
                    .family_history(Some(positive))
                    .outcome(Some(positive))
                    .build()
            })
            .collect::<Vec<_>>();
        let assoc = RiskFactorAssociation::compute(&records, RiskFactor::FamilyHistory);
        assert_eq!(assoc.exposed.trials, 4);
        assert_eq!(assoc.unexposed.trials, 6);
        assert_eq!(assoc.unexposed.value, Measure::Value(0.0));
        assert_eq!(
            assoc.relative_risk,
            Measure::Undefined(UndefinedReason::ZeroReference)
        );
        assert!(assoc.odds_ratio.is_undefined());
    }

    #[test]
    fn test_relative_risk_and_odds_ratio() {
        // exposed: 6/10 positive, unexposed: 3/20 positive
        let mut records = (0..10)
            .map(|i| record().jaundice(Some(true)).outcome(Some(i < 6)).build())
            .collect::<Vec<_>>();
        records.extend((0..20).map(|i| record().jaundice(Some(false)).outcome(Some(i < 3)).build()));
        records.push(record().jaundice(None).outcome(Some(true)).build());

        let assoc = RiskFactorAssociation::compute(&records, RiskFactor::Jaundice);
        assert_eq!(assoc.exposed.trials + assoc.unexposed.trials, 30);
        let rr = assoc.relative_risk.into_value().unwrap();
        assert!((rr - 4.0).abs() < 1e-12);
        // (6 * 17) / (4 * 3)
        let or = assoc.odds_ratio.into_value().unwrap();
        assert!((or - 8.5).abs() < 1e-12);
    }

    #[test]
    fn test_empty_side_is_undefined() {
        let records = vec![
            record().family_history(Some(true)).outcome(Some(true)).build(),
            record().family_history(Some(true)).outcome(Some(false)).build(),
        ];
        let assoc = RiskFactorAssociation::compute(&records, RiskFactor::FamilyHistory);
        assert_eq!(
            assoc.relative_risk,
            Measure::Undefined(UndefinedReason::ZeroDenominator)
        );
        assert!(assoc.odds_ratio.is_undefined());
    }

    #[test]
    fn test_factor_names_round_trip() {
        for factor in RiskFactor::ALL {
            assert_eq!(factor.as_str().parse::<RiskFactor>().unwrap(), factor);
        }
        assert!("smoking".parse::<RiskFactor>().is_err());
        assert_eq!(risk_factor_associations(&[]).len(), 2);
    }
}
