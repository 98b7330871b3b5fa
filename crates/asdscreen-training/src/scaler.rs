//! Feature standardization (z-scores).

use asdscreen_stats::descriptive::DescriptiveStats;
use serde::{Deserialize, Serialize};

use crate::{TrainingError, check_rows};

/// Per-feature mean and population standard deviation learned from a sample.
///
/// A feature with zero standard deviation is *constant*: it carries no
/// information, and [`Standardizer::transform`] maps it to `0.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standardizer {
    pub means: Vec<f64>,
    pub std_devs: Vec<f64>,
}

impl Standardizer {
    /// Learns means and standard deviations column by column.
    ///
    /// # Examples
    ///
    /// ```
    /// use asdscreen_training::scaler::Standardizer;
    ///
    /// let rows = vec![vec![1.0, 5.0], vec![3.0, 5.0]];
    /// let scaler = Standardizer::fit(&rows).unwrap();
    /// assert_eq!(scaler.means, [2.0, 5.0]);
    /// assert_eq!(scaler.transform(&[3.0, 5.0]), [1.0, 0.0]);
    /// assert!(scaler.is_constant(1));
    /// ```
    pub fn fit(rows: &[Vec<f64>]) -> Result<Self, TrainingError> {
        let width = check_rows(rows)?;
        let (means, std_devs) = (0..width)
            .map(|j| {
                // rows are non-empty, so stats always exist
                let stats = DescriptiveStats::new(rows.iter().map(|r| r[j]))
                    .ok_or(TrainingError::Empty)?;
                Ok((stats.mean, stats.std_dev))
            })
            .collect::<Result<Vec<_>, TrainingError>>()?
            .into_iter()
            .unzip();
        Ok(Self { means, std_devs })
    }

    #[must_use]
    pub fn feature_count(&self) -> usize {
        self.means.len()
    }

    #[must_use]
    pub fn is_constant(&self, feature: usize) -> bool {
        self.std_devs[feature] == 0.0
    }

    /// Standardizes one row.
    ///
    /// # Panics
    ///
    /// Panics if `row` has a different width than the fitted sample.
    #[must_use]
    pub fn transform(&self, row: &[f64]) -> Vec<f64> {
        assert_eq!(row.len(), self.feature_count(), "row width mismatch");
        row.iter()
            .zip(self.means.iter().zip(&self.std_devs))
            .map(|(x, (mean, sd))| if *sd == 0.0 { 0.0 } else { (x - mean) / sd })
            .collect()
    }

    #[must_use]
    pub fn transform_all(&self, rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
        rows.iter().map(|r| self.transform(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transformed_columns_have_zero_mean_unit_variance() {
        let rows = vec![
            vec![10.0, 0.0],
            vec![20.0, 1.0],
            vec![30.0, 0.0],
            vec![40.0, 1.0],
        ];
        let scaler = Standardizer::fit(&rows).unwrap();
        let z = scaler.transform_all(&rows);
        for j in 0..2 {
            let column = z.iter().map(|r| r[j]).collect::<Vec<_>>();
            let stats = DescriptiveStats::new(column).unwrap();
            assert!(stats.mean.abs() < 1e-12);
            assert!((stats.std_dev - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_empty_and_ragged_input_is_rejected() {
        assert_eq!(Standardizer::fit(&[]), Err(TrainingError::Empty));
        let ragged = vec![vec![1.0, 2.0], vec![1.0]];
        assert_eq!(
            Standardizer::fit(&ragged),
            Err(TrainingError::RaggedRow {
                row: 1,
                expected: 2,
                found: 1
            })
        );
    }
}
