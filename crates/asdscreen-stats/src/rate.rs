use serde::{Deserialize, Serialize};

use crate::measure::Measure;

/// A proportion `successes / trials` that keeps its counts.
///
/// The rate is [`Measure::Undefined`] when there are no trials; it is never
/// reported as zero in that case.
///
/// # Examples
///
/// ```
/// use asdscreen_stats::{measure::Measure, rate::Rate};
///
/// let rate = Rate::new(3, 12);
/// assert_eq!(rate.value, Measure::Value(0.25));
///
/// assert!(Rate::new(0, 0).value.is_undefined());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rate {
    /// Number of positive observations.
    pub successes: usize,
    /// Number of observations with a known value (the denominator).
    pub trials: usize,
    /// `successes / trials`.
    pub value: Measure<f64>,
}

impl Rate {
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn new(successes: usize, trials: usize) -> Self {
        assert!(successes <= trials, "successes must not exceed trials");
        Self {
            successes,
            trials,
            value: Measure::ratio(successes as f64, trials as f64),
        }
    }

    /// Counts `true` values among the known (`Some`) observations.
    ///
    /// ```
    /// use asdscreen_stats::{measure::Measure, rate::Rate};
    ///
    /// let rate = Rate::from_observations([Some(true), None, Some(false), Some(true)]);
    /// assert_eq!(rate.trials, 3);
    /// assert_eq!(rate.successes, 2);
    /// ```
    pub fn from_observations<I>(observations: I) -> Self
    where
        I: IntoIterator<Item = Option<bool>>,
    {
        let (successes, trials) = observations
            .into_iter()
            .flatten()
            .fold((0, 0), |(s, t), v| (s + usize::from(v), t + 1));
        Self::new(successes, trials)
    }

    #[must_use]
    pub fn failures(&self) -> usize {
        self.trials - self.successes
    }
}
