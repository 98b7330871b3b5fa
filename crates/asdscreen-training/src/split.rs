//! Seeded, stratified train/test splitting.

use rand::{SeedableRng, seq::SliceRandom};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// Sample indices assigned to the training and test partitions.
///
/// Both lists are sorted in ascending order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Splits sample indices so that each outcome class is represented in the
/// test partition in proportion to its size.
///
/// Each class is shuffled independently with a generator seeded from `seed`,
/// then `round(class_size * test_fraction)` of its samples go to the test
/// partition. The same labels and seed always give the same split.
///
/// # Examples
///
/// ```
/// use asdscreen_training::split::stratified_split;
///
/// let labels = (0..40).map(|i| i % 5 == 0).collect::<Vec<_>>();
/// let split = stratified_split(&labels, 0.25, 42);
/// assert_eq!(split.test.len(), 10);
/// assert_eq!(split.test.iter().filter(|&&i| labels[i]).count(), 2);
/// assert_eq!(split, stratified_split(&labels, 0.25, 42));
/// ```
///
/// # Panics
///
/// Panics if `test_fraction` is outside `0.0..=1.0`.
#[expect(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
#[must_use]
pub fn stratified_split(labels: &[bool], test_fraction: f64, seed: u64) -> Split {
    assert!(
        (0.0..=1.0).contains(&test_fraction),
        "test fraction must be within 0..=1"
    );
    let mut rng = Pcg32::seed_from_u64(seed);
    let mut train = vec![];
    let mut test = vec![];
    for class in [false, true] {
        let mut indices = labels
            .iter()
            .enumerate()
            .filter(|(_, y)| **y == class)
            .map(|(i, _)| i)
            .collect::<Vec<_>>();
        indices.shuffle(&mut rng);
        let test_count = (indices.len() as f64 * test_fraction).round() as usize;
        test.extend_from_slice(&indices[..test_count]);
        train.extend_from_slice(&indices[test_count..]);
    }
    train.sort_unstable();
    test.sort_unstable();
    Split { train, test }
}
