use asdscreen_training::logistic::LogisticParams;
use serde::{Deserialize, Serialize};

/// Thresholds and switches of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Gender strata with fewer known outcomes are flagged low-confidence.
    pub min_stratum: usize,
    /// Minimum complete cases needed to fit the importance model.
    pub min_complete_cases: usize,
    /// Seed of the holdout split.
    pub seed: u64,
    /// Share of complete cases held out for evaluation.
    pub test_fraction: f64,
    /// Run the per-group pipelines on the rayon thread pool.
    pub parallel: bool,
    pub logistic: LogisticParams,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_stratum: 5,
            min_complete_cases: 30,
            seed: 42,
            test_fraction: 0.25,
            parallel: true,
            logistic: LogisticParams::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("test fraction {value} is not strictly between 0 and 1")]
    TestFraction { value: f64 },
}

impl AnalysisConfig {
    /// Checks the values that the statistics cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(ConfigError::TestFraction {
                value: self.test_fraction,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(AnalysisConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_test_fraction_must_leave_both_partitions() {
        for value in [0.0, 1.0, 1.5, -0.25, f64::NAN] {
            let config = AnalysisConfig {
                test_fraction: value,
                ..AnalysisConfig::default()
            };
            assert!(
                matches!(config.validate(), Err(ConfigError::TestFraction { .. })),
                "{value} accepted"
            );
        }
    }
}
