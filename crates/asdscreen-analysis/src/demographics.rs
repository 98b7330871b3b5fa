//! Who was screened: age, categorical breakdowns and flag prevalences.

use std::collections::BTreeMap;

use asdscreen_dataset::{
    record::NormalizedRecord,
    vocabulary::{Completer, Ethnicity, Gender},
};
use asdscreen_stats::{
    descriptive::DescriptiveStats,
    measure::{Measure, UndefinedReason},
    rate::Rate,
};
use serde::{Deserialize, Serialize};

/// Number of countries kept in [`Demographics::top_countries`].
pub const TOP_COUNTRIES: usize = 10;

/// Counts per canonical category plus the number of records with no value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts<T>
where
    T: Ord,
{
    pub counts: BTreeMap<T, usize>,
    pub missing: usize,
}

impl<T> CategoryCounts<T>
where
    T: Ord,
{
    fn tally<I>(values: I) -> Self
    where
        I: IntoIterator<Item = Option<T>>,
    {
        let mut counts = BTreeMap::new();
        let mut missing = 0;
        for value in values {
            match value {
                Some(v) => *counts.entry(v).or_default() += 1,
                None => missing += 1,
            }
        }
        Self { counts, missing }
    }

    #[must_use]
    pub fn count(&self, category: &T) -> usize {
        self.counts.get(category).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryCount {
    pub country: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Demographics {
    /// Age in years over records with a known age.
    pub age: Measure<DescriptiveStats>,
    pub age_missing: usize,
    pub gender: CategoryCounts<Gender>,
    pub ethnicity: CategoryCounts<Ethnicity>,
    pub completer: CategoryCounts<Completer>,
    /// Most frequent countries of residence, by count then name.
    pub top_countries: Vec<CountryCount>,
    pub jaundice: Rate,
    pub family_history: Rate,
    pub used_app_before: Rate,
}

impl Demographics {
    #[must_use]
    pub fn compute(records: &[NormalizedRecord]) -> Self {
        let ages = records.iter().filter_map(|r| r.age_years).collect::<Vec<_>>();
        let age = DescriptiveStats::new(ages.iter().copied())
            .map_or(Measure::Undefined(UndefinedReason::ZeroDenominator), Measure::Value);

        let mut countries = CategoryCounts::tally(records.iter().map(|r| r.country.clone()))
            .counts
            .into_iter()
            .map(|(country, count)| CountryCount { country, count })
            .collect::<Vec<_>>();
        // BTreeMap order is by name, so a stable sort by count breaks ties alphabetically
        countries.sort_by(|a, b| b.count.cmp(&a.count));
        countries.truncate(TOP_COUNTRIES);

        Self {
            age,
            age_missing: records.len() - ages.len(),
            gender: CategoryCounts::tally(records.iter().map(|r| r.gender)),
            ethnicity: CategoryCounts::tally(records.iter().map(|r| r.ethnicity)),
            completer: CategoryCounts::tally(records.iter().map(|r| r.completer)),
            top_countries: countries,
            jaundice: Rate::from_observations(records.iter().map(|r| r.jaundice)),
            family_history: Rate::from_observations(records.iter().map(|r| r.family_history)),
            used_app_before: Rate::from_observations(records.iter().map(|r| r.used_app_before)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::record;

    #[test]
    fn test_category_counts_keep_missing_separate() {
        let mut records = vec![
            record().gender(Gender::Female).build(),
            record().gender(Gender::Female).build(),
            record().gender(Gender::Male).build(),
        ];
        let mut unknown = record().build();
        unknown.gender = None;
        unknown.ethnicity = Some(Ethnicity::Asian);
        records.push(unknown);

        let demo = Demographics::compute(&records);
        assert_eq!(demo.gender.count(&Gender::Female), 2);
        assert_eq!(demo.gender.count(&Gender::Male), 1);
        assert_eq!(demo.gender.missing, 1);
        assert_eq!(demo.ethnicity.count(&Ethnicity::Asian), 1);
        assert_eq!(demo.ethnicity.missing, 3);
        assert_eq!(demo.completer.missing, 4);
    }

    #[test]
    fn test_age_and_flags() {
        let records = vec![
            record().age(Some(4.0)).jaundice(Some(true)).build(),
            record().age(Some(8.0)).jaundice(Some(false)).build(),
            record().age(None).jaundice(None).build(),
        ];
        let demo = Demographics::compute(&records);
        assert_eq!(demo.age_missing, 1);
        assert_eq!(demo.age.value().unwrap().mean, 6.0);
        assert_eq!(demo.jaundice.trials, 2);
        assert_eq!(demo.jaundice.value, Measure::Value(0.5));
        assert_eq!(demo.used_app_before.trials, 3);
    }

    #[test]
    fn test_top_countries_order() {
        let countries = ["Jordan", "Egypt", "Jordan", "Austria", "Egypt", "Jordan"];
        let records = countries
            .iter()
            .map(|c| {
                let mut r = record().build();
                r.country = Some((*c).to_owned());
                r
            })
            .collect::<Vec<_>>();
        let demo = Demographics::compute(&records);
        let order = demo
            .top_countries
            .iter()
            .map(|c| (c.country.as_str(), c.count))
            .collect::<Vec<_>>();
        assert_eq!(order, [("Jordan", 3), ("Egypt", 2), ("Austria", 1)]);
    }

    #[test]
    fn test_empty_group() {
        let demo = Demographics::compute(&[]);
        assert!(demo.age.is_undefined());
        assert!(demo.jaundice.value.is_undefined());
        assert!(demo.top_countries.is_empty());
    }
}
