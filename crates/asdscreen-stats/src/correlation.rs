use serde::{Deserialize, Serialize};

use crate::measure::{Measure, UndefinedReason};

/// Pearson correlation coefficient of two equally long samples.
///
/// Undefined when fewer than two pairs are given or either sample has zero
/// variance. Applied to two 0/1 variables this is the phi coefficient.
///
/// # Examples
///
/// ```
/// use asdscreen_stats::{correlation::pearson, measure::Measure};
///
/// let r = pearson(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]);
/// assert!((r.value().unwrap() - 1.0).abs() < 1e-12);
///
/// assert!(pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).is_undefined());
/// ```
///
/// # Panics
///
/// Panics if the samples differ in length.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn pearson(xs: &[f64], ys: &[f64]) -> Measure<f64> {
    assert_eq!(xs.len(), ys.len(), "samples must have equal length");
    if xs.len() < 2 {
        return Measure::Undefined(UndefinedReason::ZeroDenominator);
    }
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return Measure::Undefined(UndefinedReason::ZeroVariance);
    }
    Measure::finite((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}

/// Symmetric matrix of pairwise Pearson correlations between named columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    /// Column labels, in row/column order.
    pub labels: Vec<String>,
    /// `values[i][j]` is the correlation between column `i` and column `j`.
    pub values: Vec<Vec<Measure<f64>>>,
}

impl CorrelationMatrix {
    /// Computes all pairwise correlations between `columns`.
    ///
    /// ```
    /// use asdscreen_stats::correlation::CorrelationMatrix;
    ///
    /// let matrix = CorrelationMatrix::new(vec![
    ///     ("a".to_owned(), vec![1.0, 0.0, 1.0, 0.0]),
    ///     ("b".to_owned(), vec![0.0, 1.0, 0.0, 1.0]),
    /// ]);
    /// assert!((matrix.get("a", "b").unwrap().value().unwrap() + 1.0).abs() < 1e-12);
    /// ```
    #[must_use]
    pub fn new(columns: Vec<(String, Vec<f64>)>) -> Self {
        let (labels, data): (Vec<_>, Vec<_>) = columns.into_iter().unzip();
        let values = data
            .iter()
            .map(|xs| data.iter().map(|ys| pearson(xs, ys)).collect())
            .collect();
        Self { labels, values }
    }

    #[must_use]
    pub fn get(&self, row: &str, column: &str) -> Option<Measure<f64>> {
        let i = self.labels.iter().position(|l| l == row)?;
        let j = self.labels.iter().position(|l| l == column)?;
        Some(self.values[i][j])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uncorrelated_binary_variables() {
        let xs = [1.0, 1.0, 0.0, 0.0];
        let ys = [1.0, 0.0, 1.0, 0.0];
        assert_eq!(pearson(&xs, &ys), Measure::Value(0.0));
    }

    #[test]
    fn test_single_pair_is_undefined() {
        assert!(pearson(&[1.0], &[2.0]).is_undefined());
    }

    #[test]
    fn test_matrix_diagonal_and_constant_column() {
        let matrix = CorrelationMatrix::new(vec![
            ("x".to_owned(), vec![1.0, 2.0, 4.0]),
            ("c".to_owned(), vec![3.0, 3.0, 3.0]),
        ]);
        let diag = matrix.get("x", "x").unwrap();
        assert!((diag.value().unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(
            matrix.get("x", "c"),
            Some(Measure::Undefined(UndefinedReason::ZeroVariance))
        );
        assert_eq!(matrix.get("x", "missing"), None);
    }
}
