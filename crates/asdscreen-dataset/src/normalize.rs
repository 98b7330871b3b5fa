//! Mapping raw records onto the canonical record shape.
//!
//! [`normalize`] is a pure function of a [`RawRecord`], its group and the
//! group's [`GroupEncoding`]. Missing values stay missing; only present
//! values are mapped, and a present value that the encoding cannot map is a
//! [`NormalizationError`] for the whole record.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

use crate::{
    encoding::GroupEncoding,
    group::AgeGroup,
    record::{MAX_SCORE, NormalizedRecord, RawRecord},
    vocabulary::Vocabulary,
};

/// Categorical column whose value could not be mapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryField {
    Gender,
    Ethnicity,
    Completer,
    Jaundice,
    FamilyHistory,
    UsedAppBefore,
    Outcome,
}

impl fmt::Display for CategoryField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Gender => "gender",
            Self::Ethnicity => "ethnicity",
            Self::Completer => "completer",
            Self::Jaundice => "jaundice",
            Self::FamilyHistory => "family_history",
            Self::UsedAppBefore => "used_app_before",
            Self::Outcome => "outcome",
        };
        f.pad(s)
    }
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum NormalizationError {
    #[display("line {line}: {field} value '{value}' is not in the mapping table")]
    UnmappedCategory {
        line: u64,
        field: CategoryField,
        value: String,
    },
    #[display("line {line}: score {score} is outside 0..=10")]
    ScoreOutOfRange { line: u64, score: u32 },
    #[display("line {line}: age {age_years} years exceeds the maximum of {max_years}")]
    AgeOutOfRange {
        line: u64,
        age_years: f64,
        max_years: f64,
    },
}

/// Normalization failures of one group, counted by reason.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizationFailureCounts {
    pub unmapped: BTreeMap<CategoryField, usize>,
    pub score_out_of_range: usize,
    pub age_out_of_range: usize,
}

impl NormalizationFailureCounts {
    pub fn record(&mut self, error: &NormalizationError) {
        match error {
            NormalizationError::UnmappedCategory { field, .. } => {
                *self.unmapped.entry(*field).or_default() += 1;
            }
            NormalizationError::ScoreOutOfRange { .. } => self.score_out_of_range += 1,
            NormalizationError::AgeOutOfRange { .. } => self.age_out_of_range += 1,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.unmapped.values().sum::<usize>() + self.score_out_of_range + self.age_out_of_range
    }
}

fn map_category<T>(
    raw: Option<&str>,
    vocabulary: &Vocabulary<T>,
    field: CategoryField,
    line: u64,
) -> Result<Option<T>, NormalizationError>
where
    T: Copy,
{
    raw.map(|value| {
        vocabulary
            .lookup(value)
            .ok_or_else(|| NormalizationError::UnmappedCategory {
                line,
                field,
                value: value.to_owned(),
            })
    })
    .transpose()
}

/// Maps one raw record onto the canonical vocabularies.
///
/// # Examples
///
/// ```
/// use asdscreen_dataset::{
///     encoding::GroupEncoding, group::AgeGroup, normalize::normalize, record::RawRecord,
///     vocabulary::Gender,
/// };
///
/// let encoding = GroupEncoding::reference(AgeGroup::Adult);
/// let raw = RawRecord {
///     line: 2,
///     gender: Some("f".to_owned()),
///     score: Some(7),
///     outcome: Some("YES".to_owned()),
///     ..RawRecord::default()
/// };
/// let record = normalize(&raw, AgeGroup::Adult, &encoding).unwrap();
/// assert_eq!(record.gender, Some(Gender::Female));
/// assert_eq!(record.outcome, Some(true));
/// assert_eq!(record.age_years, None);
/// ```
pub fn normalize(
    raw: &RawRecord,
    group: AgeGroup,
    encoding: &GroupEncoding,
) -> Result<NormalizedRecord, NormalizationError> {
    let line = raw.line;
    let flag = |value: &Option<String>, field| {
        map_category(value.as_deref(), &encoding.flags, field, line)
    };

    let score = raw
        .score
        .map(|score| {
            u8::try_from(score)
                .ok()
                .filter(|s| *s <= MAX_SCORE)
                .ok_or(NormalizationError::ScoreOutOfRange { line, score })
        })
        .transpose()?;

    let age_years = raw
        .age
        .map(|age| {
            let age_years = encoding.age_unit.to_years(age);
            match encoding.max_age_years {
                Some(max_years) if age_years > max_years => Err(NormalizationError::AgeOutOfRange {
                    line,
                    age_years,
                    max_years,
                }),
                _ => Ok(age_years),
            }
        })
        .transpose()?;

    Ok(NormalizedRecord {
        group,
        source_line: line,
        items: raw.items,
        age_years,
        gender: map_category(
            raw.gender.as_deref(),
            &encoding.gender,
            CategoryField::Gender,
            line,
        )?,
        ethnicity: map_category(
            raw.ethnicity.as_deref(),
            &encoding.ethnicity,
            CategoryField::Ethnicity,
            line,
        )?,
        country: raw.country.clone(),
        jaundice: flag(&raw.jaundice, CategoryField::Jaundice)?,
        family_history: flag(&raw.family_history, CategoryField::FamilyHistory)?,
        completer: map_category(
            raw.completer.as_deref(),
            &encoding.completer,
            CategoryField::Completer,
            line,
        )?,
        used_app_before: flag(&raw.used_app_before, CategoryField::UsedAppBefore)?,
        score,
        outcome: map_category(
            raw.outcome.as_deref(),
            &encoding.outcome,
            CategoryField::Outcome,
            line,
        )?,
    })
}

/// Normalizes every record, collecting the successes and counting the failures.
pub fn normalize_all<'a, I>(
    raws: I,
    group: AgeGroup,
    encoding: &GroupEncoding,
) -> (Vec<NormalizedRecord>, NormalizationFailureCounts)
where
    I: IntoIterator<Item = &'a RawRecord>,
{
    let mut counts = NormalizationFailureCounts::default();
    let records = raws
        .into_iter()
        .filter_map(|raw| match normalize(raw, group, encoding) {
            Ok(record) => Some(record),
            Err(err) => {
                log::debug!("{group}: {err}");
                counts.record(&err);
                None
            }
        })
        .collect();
    (records, counts)
}
