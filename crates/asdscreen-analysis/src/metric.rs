//! Stable textual keys for scalar metrics.
//!
//! A key is a metric name optionally followed by `:` and an argument:
//!
//! | key | value |
//! |---|---|
//! | `detection_rate` | share of positive outcomes |
//! | `gender_detection_rate:<gender>` | detection rate within `male` or `female` |
//! | `mean_score`, `median_score`, `score_variance`, `score_std_dev` | score summary |
//! | `score_percentile:<p>` | P25, P50 or P75 of the score |
//! | `score_frequency:<s>` | number of records scoring `s` |
//! | `mean_age` | mean age in years |
//! | `item_positive_rate:<item>` | positive-response rate of `A1`..`A10` |
//! | `item_discrimination:<item>` | discriminative power of an item |
//! | `item_phi:<item>` | phi correlation of an item with the outcome |
//! | `exposed_rate:<factor>`, `unexposed_rate:<factor>` | outcome rate with/without `family_history` or `jaundice` |
//! | `relative_risk:<factor>`, `odds_ratio:<factor>` | risk-factor association |
//! | `importance:<feature>` | standardized coefficient of an item, `age`, `gender_male`, `jaundice` or `family_history` |
//! | `holdout_accuracy` | accuracy on the held-out partition |

use std::{fmt, str::FromStr};

use asdscreen_dataset::{record::ItemId, vocabulary::Gender};
use asdscreen_stats::measure::Measure;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{importance::Feature, report::GroupReport, risk::RiskFactor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKey {
    DetectionRate,
    GenderDetectionRate(Gender),
    MeanScore,
    MedianScore,
    ScoreVariance,
    ScoreStdDev,
    ScorePercentile(u8),
    ScoreFrequency(u8),
    MeanAge,
    ItemPositiveRate(ItemId),
    ItemDiscrimination(ItemId),
    ItemPhi(ItemId),
    ExposedRate(RiskFactor),
    UnexposedRate(RiskFactor),
    RelativeRisk(RiskFactor),
    OddsRatio(RiskFactor),
    Importance(Feature),
    HoldoutAccuracy,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ParseMetricKeyError {
    #[display("unknown metric '{name}'")]
    UnknownMetric { name: String },
    #[display("metric '{name}' requires an argument")]
    MissingArgument { name: String },
    #[display("metric '{name}' takes no argument")]
    UnexpectedArgument { name: String },
    #[display("invalid argument '{argument}' for metric '{name}'")]
    InvalidArgument { name: String, argument: String },
}

impl MetricKey {
    /// Reads this metric from a group report.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn lookup(&self, report: &GroupReport) -> Measure<f64> {
        let score = || report.score.summary.as_ref();
        let item = |id: ItemId| report.items.iter().find(|s| s.item == id);
        let risk = |factor: RiskFactor| report.risk_factors.iter().find(|a| a.factor == factor);
        let found = |m: Option<Measure<f64>>| m.unwrap_or(Measure::NotComputed);

        match *self {
            Self::DetectionRate => report.detection.overall.value,
            Self::GenderDetectionRate(gender) => {
                found(report.detection.stratum(gender).map(|s| s.rate.value))
            }
            Self::MeanScore => score().map(|s| s.mean),
            Self::MedianScore => score().map(|s| s.median),
            Self::ScoreVariance => score().map(|s| s.variance),
            Self::ScoreStdDev => score().map(|s| s.std_dev),
            Self::ScorePercentile(p) => report.score.percentile(f64::from(p)),
            Self::ScoreFrequency(s) => found(
                report
                    .score
                    .frequencies
                    .count_of(u32::from(s))
                    .map(|c| Measure::Value(c as f64)),
            ),
            Self::MeanAge => report.demographics.age.as_ref().map(|a| a.mean),
            Self::ItemPositiveRate(id) => found(item(id).map(|s| s.positive_rate.value)),
            Self::ItemDiscrimination(id) => found(item(id).map(|s| s.discriminative_power)),
            Self::ItemPhi(id) => found(item(id).map(|s| s.phi)),
            Self::ExposedRate(f) => found(risk(f).map(|a| a.exposed.value)),
            Self::UnexposedRate(f) => found(risk(f).map(|a| a.unexposed.value)),
            Self::RelativeRisk(f) => found(risk(f).map(|a| a.relative_risk)),
            Self::OddsRatio(f) => found(risk(f).map(|a| a.odds_ratio)),
            Self::Importance(feature) => report
                .importance
                .as_ref()
                .and_then(|ranking| ranking.coefficient(feature)),
            Self::HoldoutAccuracy => report.holdout.as_ref().and_then(|h| h.report.accuracy),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::DetectionRate => "detection_rate",
            Self::GenderDetectionRate(_) => "gender_detection_rate",
            Self::MeanScore => "mean_score",
            Self::MedianScore => "median_score",
            Self::ScoreVariance => "score_variance",
            Self::ScoreStdDev => "score_std_dev",
            Self::ScorePercentile(_) => "score_percentile",
            Self::ScoreFrequency(_) => "score_frequency",
            Self::MeanAge => "mean_age",
            Self::ItemPositiveRate(_) => "item_positive_rate",
            Self::ItemDiscrimination(_) => "item_discrimination",
            Self::ItemPhi(_) => "item_phi",
            Self::ExposedRate(_) => "exposed_rate",
            Self::UnexposedRate(_) => "unexposed_rate",
            Self::RelativeRisk(_) => "relative_risk",
            Self::OddsRatio(_) => "odds_ratio",
            Self::Importance(_) => "importance",
            Self::HoldoutAccuracy => "holdout_accuracy",
        }
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())?;
        match self {
            Self::GenderDetectionRate(g) => write!(f, ":{g}"),
            Self::ScorePercentile(n) | Self::ScoreFrequency(n) => write!(f, ":{n}"),
            Self::ItemPositiveRate(id) | Self::ItemDiscrimination(id) | Self::ItemPhi(id) => {
                write!(f, ":{id}")
            }
            Self::ExposedRate(r)
            | Self::UnexposedRate(r)
            | Self::RelativeRisk(r)
            | Self::OddsRatio(r) => write!(f, ":{r}"),
            Self::Importance(feature) => write!(f, ":{feature}"),
            Self::DetectionRate
            | Self::MeanScore
            | Self::MedianScore
            | Self::ScoreVariance
            | Self::ScoreStdDev
            | Self::MeanAge
            | Self::HoldoutAccuracy => Ok(()),
        }
    }
}

impl FromStr for MetricKey {
    type Err = ParseMetricKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, argument) = match s.trim().split_once(':') {
            Some((name, argument)) => (name, Some(argument)),
            None => (s.trim(), None),
        };
        let owned = || name.to_owned();

        let plain = match name {
            "detection_rate" => Some(Self::DetectionRate),
            "mean_score" => Some(Self::MeanScore),
            "median_score" => Some(Self::MedianScore),
            "score_variance" => Some(Self::ScoreVariance),
            "score_std_dev" => Some(Self::ScoreStdDev),
            "mean_age" => Some(Self::MeanAge),
            "holdout_accuracy" => Some(Self::HoldoutAccuracy),
            _ => None,
        };
        if let Some(key) = plain {
            return match argument {
                None => Ok(key),
                Some(_) => Err(ParseMetricKeyError::UnexpectedArgument { name: owned() }),
            };
        }

        let with_argument = |ctor: fn(&str) -> Option<Self>| {
            let argument = argument.ok_or_else(|| ParseMetricKeyError::MissingArgument {
                name: owned(),
            })?;
            ctor(argument.trim()).ok_or_else(|| ParseMetricKeyError::InvalidArgument {
                name: owned(),
                argument: argument.to_owned(),
            })
        };
        match name {
            "gender_detection_rate" => {
                with_argument(|a| a.parse().ok().map(Self::GenderDetectionRate))
            }
            "score_percentile" => with_argument(|a| {
                a.parse::<u8>()
                    .ok()
                    .filter(|p| *p <= 100)
                    .map(Self::ScorePercentile)
            }),
            "score_frequency" => with_argument(|a| a.parse().ok().map(Self::ScoreFrequency)),
            "item_positive_rate" => with_argument(|a| a.parse().ok().map(Self::ItemPositiveRate)),
            "item_discrimination" => with_argument(|a| a.parse().ok().map(Self::ItemDiscrimination)),
            "item_phi" => with_argument(|a| a.parse().ok().map(Self::ItemPhi)),
            "exposed_rate" => with_argument(|a| a.parse().ok().map(Self::ExposedRate)),
            "unexposed_rate" => with_argument(|a| a.parse().ok().map(Self::UnexposedRate)),
            "relative_risk" => with_argument(|a| a.parse().ok().map(Self::RelativeRisk)),
            "odds_ratio" => with_argument(|a| a.parse().ok().map(Self::OddsRatio)),
            "importance" => with_argument(|a| a.parse().ok().map(Self::Importance)),
            _ => Err(ParseMetricKeyError::UnknownMetric { name: owned() }),
        }
    }
}

impl Serialize for MetricKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MetricKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
