//! Simple classifier fitting for variable-importance ranking.
//!
//! This crate fits the small, interpretable model behind the importance
//! ranking and measures how well it classifies held-out records. It knows
//! nothing about screening records: inputs are plain feature rows and boolean
//! labels.
//!
//! # Pipeline
//!
//! ```text
//! feature rows ──► Standardizer (z-scores)
//!                      │
//!                      ▼
//!              LogisticRegression (L2, class-balanced)
//!                      │
//!          ┌───────────┴────────────┐
//!          ▼                        ▼
//!  standardized coefficients   holdout predictions
//!  (importance)                (ClassificationReport)
//! ```
//!
//! - [`scaler`]: per-feature standardization
//! - [`logistic`]: gradient-descent logistic regression
//! - [`split`]: seeded stratified train/test split
//! - [`evaluation`]: confusion matrix, accuracy and per-class metrics
//!
//! Everything is deterministic: fitting starts from zero coefficients and the
//! split is driven by an explicit seed.

pub mod evaluation;
pub mod logistic;
pub mod scaler;
pub mod split;

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum TrainingError {
    #[display("no samples to fit")]
    Empty,
    #[display("{rows} feature rows but {labels} labels")]
    LengthMismatch { rows: usize, labels: usize },
    #[display("row {row} has {found} features, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[display("only one outcome class is present")]
    SingleClass,
}

/// Returns the common width of `rows`.
fn check_rows(rows: &[Vec<f64>]) -> Result<usize, TrainingError> {
    let width = rows.first().ok_or(TrainingError::Empty)?.len();
    if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
        return Err(TrainingError::RaggedRow {
            row,
            expected: width,
            found: r.len(),
        });
    }
    Ok(width)
}
