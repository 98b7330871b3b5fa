use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{
    group::AgeGroup,
    vocabulary::{Completer, Ethnicity, Gender},
};

/// Number of AQ-10 questionnaire items.
pub const ITEM_COUNT: usize = 10;

/// Highest possible AQ-10 total score.
pub const MAX_SCORE: u8 = 10;

/// Identifier of one AQ-10 item, `A1` through `A10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemId(u8);

impl ItemId {
    /// Returns the item with the given 1-based number.
    #[must_use]
    pub fn new(number: u8) -> Option<Self> {
        (1..=10).contains(&number).then_some(Self(number))
    }

    pub fn all() -> impl Iterator<Item = Self> {
        (1..=10).map(Self)
    }

    #[must_use]
    pub fn number(self) -> u8 {
        self.0
    }

    #[must_use]
    pub fn index(self) -> usize {
        usize::from(self.0 - 1)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&format!("A{}", self.0))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid item id '{_0}', expected A1..A10")]
pub struct ParseItemIdError(#[error(not(source))] String);

impl FromStr for ItemId {
    type Err = ParseItemIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        s.strip_prefix(['A', 'a'])
            .and_then(|n| n.parse::<u8>().ok())
            .and_then(Self::new)
            .ok_or_else(|| ParseItemIdError(s.to_owned()))
    }
}

impl Serialize for ItemId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One row of a group's source, before any vocabulary mapping.
///
/// Numeric columns are parsed; categorical columns keep their raw label.
/// `None` marks a missing value (one of the group's missing-value markers),
/// which is distinct from a valid `0` or `false`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawRecord {
    /// 1-based line number in the source (the header is line 1).
    pub line: u64,
    pub items: [Option<bool>; ITEM_COUNT],
    /// Age in the source's unit.
    pub age: Option<f64>,
    pub gender: Option<String>,
    pub ethnicity: Option<String>,
    pub country: Option<String>,
    pub jaundice: Option<String>,
    pub family_history: Option<String>,
    pub completer: Option<String>,
    pub used_app_before: Option<String>,
    pub score: Option<u32>,
    pub outcome: Option<String>,
}

/// A record mapped onto the canonical vocabularies shared by all groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub group: AgeGroup,
    /// Line of the [`RawRecord`] this record was built from.
    pub source_line: u64,
    pub items: [Option<bool>; ITEM_COUNT],
    pub age_years: Option<f64>,
    pub gender: Option<Gender>,
    pub ethnicity: Option<Ethnicity>,
    pub country: Option<String>,
    pub jaundice: Option<bool>,
    pub family_history: Option<bool>,
    pub completer: Option<Completer>,
    pub used_app_before: Option<bool>,
    /// AQ-10 total, always within `0..=10`.
    pub score: Option<u8>,
    /// `true` for a positive screening outcome.
    pub outcome: Option<bool>,
}

impl NormalizedRecord {
    #[must_use]
    pub fn item(&self, item: ItemId) -> Option<bool> {
        self.items[item.index()]
    }

    /// Whether every item, age, gender, both risk flags and the outcome are known.
    #[must_use]
    pub fn is_complete_case(&self) -> bool {
        self.items.iter().all(Option::is_some)
            && self.age_years.is_some()
            && self.gender.is_some()
            && self.jaundice.is_some()
            && self.family_history.is_some()
            && self.outcome.is_some()
    }
}
