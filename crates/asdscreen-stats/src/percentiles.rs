use serde::{Deserialize, Serialize};

/// Value of one percentile point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Percentile {
    /// Percentile point in `0.0..=100.0`.
    pub point: f64,
    pub value: f64,
}

/// Percentiles of a sample at a fixed set of points.
///
/// Values are linearly interpolated between the closest ranks, so the 50th
/// percentile always equals the median of
/// [`DescriptiveStats`](crate::descriptive::DescriptiveStats).
///
/// # Examples
///
/// ```
/// use asdscreen_stats::percentiles::Percentiles;
///
/// let sorted = [2.0, 4.0, 4.0, 6.0];
/// let quartiles = Percentiles::from_sorted(&sorted, &[25.0, 50.0, 75.0]).unwrap();
///
/// assert_eq!(quartiles.get(25.0), Some(3.5));
/// assert_eq!(quartiles.get(50.0), Some(4.0));
/// assert_eq!(quartiles.get(75.0), Some(4.5));
/// assert_eq!(quartiles.get(90.0), None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Percentiles {
    /// In the order the points were requested.
    points: Vec<Percentile>,
}

impl Percentiles {
    /// Computes the requested points over an ascending sample.
    ///
    /// Returns `None` for an empty sample.
    ///
    /// # Panics
    ///
    /// Panics if `sorted_values` is not sorted in ascending order, or if a
    /// point is outside `0.0..=100.0`.
    #[must_use]
    pub fn from_sorted(sorted_values: &[f64], points: &[f64]) -> Option<Self> {
        assert!(
            sorted_values.is_sorted_by(|a, b| a <= b),
            "values must be sorted in ascending order"
        );
        if sorted_values.is_empty() {
            return None;
        }
        let points = points
            .iter()
            .map(|&point| Percentile {
                point,
                value: interpolate(sorted_values, point),
            })
            .collect();
        Some(Self { points })
    }

    /// Value at `point`; `None` when that point was not computed.
    #[must_use]
    pub fn get(&self, point: f64) -> Option<f64> {
        self.points
            .iter()
            .find(|p| (p.point - point).abs() < f64::EPSILON)
            .map(|p| p.value)
    }
}

/// Linear interpolation between closest ranks.
///
/// The point `p` sits at fractional position `h = (n - 1) * p / 100` of the
/// sorted sample; the result lies between `sorted[floor(h)]` and
/// `sorted[ceil(h)]`.
///
/// ```
/// use asdscreen_stats::percentiles::interpolate;
///
/// let values = [1.0, 2.0, 3.0, 4.0];
/// assert_eq!(interpolate(&values, 50.0), 2.5);
/// assert_eq!(interpolate(&values, 0.0), 1.0);
/// assert_eq!(interpolate(&values, 100.0), 4.0);
/// ```
///
/// # Panics
///
/// Panics if `sorted_values` is empty or `point` is outside `0.0..=100.0`.
#[expect(
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]
#[must_use]
pub fn interpolate(sorted_values: &[f64], point: f64) -> f64 {
    assert!(!sorted_values.is_empty(), "sample must not be empty");
    assert!(
        (0.0..=100.0).contains(&point),
        "percentile point must be within 0..=100"
    );
    let position = (sorted_values.len() - 1) as f64 * point / 100.0;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - position.floor();
    sorted_values[lower] + fraction * (sorted_values[upper] - sorted_values[lower])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptive::DescriptiveStats;

    #[test]
    fn test_median_agrees_with_descriptive_stats() {
        for sample in [
            &[1.0, 2.0, 3.0, 4.0][..],
            &[2.0, 4.0, 4.0, 6.0],
            &[0.0, 3.0, 3.0, 7.0, 10.0],
            &[5.0],
        ] {
            let median = DescriptiveStats::from_sorted(sample).unwrap().median;
            assert_eq!(interpolate(sample, 50.0), median, "sample {sample:?}");
        }
    }

    #[test]
    fn test_quartiles_stay_within_neighbouring_values() {
        let sample = [1.0, 3.0, 3.0, 4.0, 8.0, 9.0, 10.0];
        // position 1.5 and 4.5
        assert_eq!(interpolate(&sample, 25.0), 3.0);
        assert_eq!(interpolate(&sample, 75.0), 8.5);
    }

    #[test]
    fn test_single_value_sample() {
        let quartiles = Percentiles::from_sorted(&[7.0], &[25.0, 75.0]).unwrap();
        assert_eq!(quartiles.get(25.0), Some(7.0));
        assert_eq!(quartiles.get(75.0), Some(7.0));
    }

    #[test]
    fn test_empty_sample_has_no_percentiles() {
        assert!(Percentiles::from_sorted(&[], &[50.0]).is_none());
    }
}
