use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// A frequency table over a closed domain of integer values.
///
/// Unlike a binned histogram, every integer in the domain has its own bin,
/// including values that never occur (count 0). Values outside the domain are
/// tallied separately in [`FrequencyTable::out_of_range`] instead of being
/// dropped silently.
///
/// # Examples
///
/// ```
/// use asdscreen_stats::frequency::FrequencyTable;
///
/// let table = FrequencyTable::new([0, 3, 3, 10], 0..=10);
/// assert_eq!(table.bins.len(), 11);
/// assert_eq!(table.count_of(3), Some(2));
/// assert_eq!(table.total(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyTable {
    /// One bin per domain value, in ascending order.
    pub bins: Vec<FrequencyBin>,
    /// Number of values that fell outside the domain.
    pub out_of_range: usize,
}

/// A single value of a [`FrequencyTable`] and how often it occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyBin {
    pub value: u32,
    pub count: usize,
}

impl FrequencyTable {
    #[must_use]
    pub fn new<I>(values: I, domain: RangeInclusive<u32>) -> Self
    where
        I: IntoIterator<Item = u32>,
    {
        let start = *domain.start();
        let mut bins = domain
            .map(|value| FrequencyBin { value, count: 0 })
            .collect::<Vec<_>>();
        let mut out_of_range = 0;
        for value in values {
            let idx = value
                .checked_sub(start)
                .and_then(|offset| usize::try_from(offset).ok())
                .filter(|&idx| idx < bins.len());
            match idx {
                Some(idx) => bins[idx].count += 1,
                None => out_of_range += 1,
            }
        }
        Self { bins, out_of_range }
    }

    /// Total number of values inside the domain.
    #[must_use]
    pub fn total(&self) -> usize {
        self.bins.iter().map(|bin| bin.count).sum()
    }

    /// Count for `value`, or `None` if it lies outside the domain.
    #[must_use]
    pub fn count_of(&self, value: u32) -> Option<usize> {
        self.bins
            .iter()
            .find(|bin| bin.value == value)
            .map(|bin| bin.count)
    }

    /// The value with the highest count (lowest value wins ties).
    #[must_use]
    pub fn mode(&self) -> Option<u32> {
        self.bins
            .iter()
            .filter(|bin| bin.count > 0)
            .fold(None::<FrequencyBin>, |best, bin| match best {
                Some(b) if b.count >= bin.count => Some(b),
                _ => Some(*bin),
            })
            .map(|bin| bin.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_values_keep_domain_bins() {
        let table = FrequencyTable::new(std::iter::empty(), 0..=10);
        assert_eq!(table.bins.len(), 11);
        assert_eq!(table.total(), 0);
        assert_eq!(table.mode(), None);
    }

    #[test]
    fn test_out_of_range_values_are_counted_separately() {
        let table = FrequencyTable::new([2, 5, 11, 1], 2..=10);
        assert_eq!(table.total(), 2);
        assert_eq!(table.out_of_range, 2);
        assert_eq!(table.count_of(1), None);
    }

    #[test]
    fn test_mode_prefers_lowest_value_on_ties() {
        let table = FrequencyTable::new([4, 4, 7, 7, 1], 0..=10);
        assert_eq!(table.mode(), Some(4));
    }
}
