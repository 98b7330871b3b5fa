//! Binary logistic regression fitted by batch gradient descent.
//!
//! The fitted objective is the mean (optionally class-weighted) cross-entropy
//! plus an L2 penalty on the coefficients:
//!
//! ```text
//! J(w, b) = 1/n Σ sᵢ · loss(σ(w·xᵢ + b), yᵢ) + λ/(2n) ‖w‖²
//! ```
//!
//! With [`ClassWeight::Balanced`] each sample of class `c` is weighted by
//! `n / (2 · n_c)`, so both outcome classes contribute equally regardless of
//! prevalence. The intercept is not penalized.
//!
//! Fitting is deterministic: coefficients start at zero and every iteration
//! uses the full sample.

use serde::{Deserialize, Serialize};

use crate::{TrainingError, check_rows, scaler::Standardizer};

/// Weighting of samples by outcome class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassWeight {
    /// Every sample has weight 1.
    Uniform,
    /// Samples are weighted inversely to their class frequency.
    #[default]
    Balanced,
}

/// Hyperparameters of [`LogisticRegression::fit`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogisticParams {
    /// L2 penalty strength λ (the inverse of scikit-style `C`).
    pub l2: f64,
    pub learning_rate: f64,
    pub max_iter: usize,
    /// Fitting stops early once every gradient component is below this.
    pub tolerance: f64,
    pub class_weight: ClassWeight,
}

impl Default for LogisticParams {
    fn default() -> Self {
        Self {
            l2: 1.0,
            learning_rate: 0.1,
            max_iter: 1000,
            tolerance: 1e-6,
            class_weight: ClassWeight::Balanced,
        }
    }
}

/// A fitted logistic regression model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    /// Number of gradient steps taken.
    pub iterations: usize,
    /// Whether the gradient fell below the tolerance before `max_iter`.
    pub converged: bool,
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl LogisticRegression {
    /// Fits a model to `rows` (one feature vector per sample) and `labels`.
    ///
    /// Fails when the input is empty, ragged, mismatched in length, or contains
    /// a single outcome class.
    #[expect(clippy::cast_precision_loss)]
    pub fn fit(
        rows: &[Vec<f64>],
        labels: &[bool],
        params: &LogisticParams,
    ) -> Result<Self, TrainingError> {
        let width = check_rows(rows)?;
        if rows.len() != labels.len() {
            return Err(TrainingError::LengthMismatch {
                rows: rows.len(),
                labels: labels.len(),
            });
        }
        let positives = labels.iter().filter(|y| **y).count();
        let negatives = labels.len() - positives;
        if positives == 0 || negatives == 0 {
            return Err(TrainingError::SingleClass);
        }

        let n = rows.len() as f64;
        let sample_weights = labels
            .iter()
            .map(|y| match params.class_weight {
                ClassWeight::Uniform => 1.0,
                ClassWeight::Balanced => {
                    let class_count = if *y { positives } else { negatives };
                    n / (2.0 * class_count as f64)
                }
            })
            .collect::<Vec<_>>();

        let mut model = Self {
            coefficients: vec![0.0; width],
            intercept: 0.0,
            iterations: 0,
            converged: false,
        };
        let mut grad = vec![0.0; width];
        while model.iterations < params.max_iter {
            grad.fill(0.0);
            let mut grad_intercept = 0.0;
            for ((row, y), s) in rows.iter().zip(labels).zip(&sample_weights) {
                let error = s * (model.probability(row) - f64::from(u8::from(*y)));
                grad_intercept += error;
                for (g, x) in grad.iter_mut().zip(row) {
                    *g += error * x;
                }
            }
            grad_intercept /= n;
            for (g, w) in grad.iter_mut().zip(&model.coefficients) {
                *g = *g / n + params.l2 * w / n;
            }

            model.intercept -= params.learning_rate * grad_intercept;
            for (w, g) in model.coefficients.iter_mut().zip(&grad) {
                *w -= params.learning_rate * g;
            }
            model.iterations += 1;

            if grad_intercept.abs() < params.tolerance
                && grad.iter().all(|g| g.abs() < params.tolerance)
            {
                model.converged = true;
                break;
            }
        }
        Ok(model)
    }

    /// Probability of a positive outcome for one feature vector.
    #[must_use]
    pub fn probability(&self, row: &[f64]) -> f64 {
        let z = self.intercept
            + self
                .coefficients
                .iter()
                .zip(row)
                .map(|(w, x)| w * x)
                .sum::<f64>();
        sigmoid(z)
    }

    #[must_use]
    pub fn predict(&self, row: &[f64]) -> bool {
        self.probability(row) >= 0.5
    }
}

/// A logistic regression fitted on standardized features.
///
/// The coefficients are on the standardized scale, so their magnitudes are
/// comparable across features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardizedModel {
    pub scaler: Standardizer,
    pub model: LogisticRegression,
}

impl StandardizedModel {
    /// Standardizes `rows` and fits a logistic regression on them.
    ///
    /// # Examples
    ///
    /// ```
    /// use asdscreen_training::logistic::{LogisticParams, StandardizedModel};
    ///
    /// let rows = (0..20).map(|i| vec![f64::from(i)]).collect::<Vec<_>>();
    /// let labels = (0..20).map(|i| i >= 10).collect::<Vec<_>>();
    /// let fitted = StandardizedModel::fit(&rows, &labels, &LogisticParams::default()).unwrap();
    /// assert!(fitted.model.coefficients[0] > 0.0);
    /// assert!(fitted.predict(&[19.0]));
    /// assert!(!fitted.predict(&[0.0]));
    /// ```
    pub fn fit(
        rows: &[Vec<f64>],
        labels: &[bool],
        params: &LogisticParams,
    ) -> Result<Self, TrainingError> {
        let scaler = Standardizer::fit(rows)?;
        let model = LogisticRegression::fit(&scaler.transform_all(rows), labels, params)?;
        Ok(Self { scaler, model })
    }

    #[must_use]
    pub fn probability(&self, row: &[f64]) -> f64 {
        self.model.probability(&self.scaler.transform(row))
    }

    #[must_use]
    pub fn predict(&self, row: &[f64]) -> bool {
        self.probability(row) >= 0.5
    }
}
