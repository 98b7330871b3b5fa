//! Per-group schema descriptors and mapping tables.
//!
//! The three reference sources share a column set but not their encodings:
//! ages may be recorded in years or months, completer-role vocabularies differ,
//! and each source documents its own sample size. Everything that varies is
//! captured in a [`GroupEncoding`], and the three encodings are kept together
//! in an [`EncodingSet`] keyed by [`AgeGroup`].
//!
//! # Configuration file
//!
//! An [`EncodingSet`] serializes to JSON keyed by group:
//!
//! ```json
//! {
//!   "child": {
//!     "columns": { "items": ["A1_Score", "..."], "age": "age", "...": "..." },
//!     "missing_markers": ["?", "", "NA"],
//!     "age_unit": "years",
//!     "max_age_years": 100.0,
//!     "expected_records": 292,
//!     "gender": { "m": "male", "f": "female" },
//!     "...": "..."
//!   }
//! }
//! ```
//!
//! [`EncodingSet::reference`] returns the tables for the reference datasets;
//! the CLI can dump them as a starting point for a custom file.

use std::{collections::BTreeMap, io, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    group::AgeGroup,
    record::ITEM_COUNT,
    vocabulary::{Completer, Ethnicity, Gender, Vocabulary},
};

/// Unit of the source's age column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeUnit {
    Years,
    Months,
}

impl AgeUnit {
    #[must_use]
    pub fn to_years(self, age: f64) -> f64 {
        match self {
            Self::Years => age,
            Self::Months => age / 12.0,
        }
    }
}

/// Header names of the source columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnNames {
    /// Columns of items A1..A10, in order.
    pub items: [String; ITEM_COUNT],
    pub age: String,
    pub gender: String,
    pub ethnicity: String,
    pub jaundice: String,
    pub family_history: String,
    pub country: String,
    pub used_app_before: String,
    pub score: String,
    pub completer: String,
    pub outcome: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            items: std::array::from_fn(|i| format!("A{}_Score", i + 1)),
            age: "age".to_owned(),
            gender: "gender".to_owned(),
            ethnicity: "ethnicity".to_owned(),
            jaundice: "jundice".to_owned(),
            family_history: "austim".to_owned(),
            country: "contry_of_res".to_owned(),
            used_app_before: "used_app_before".to_owned(),
            score: "result".to_owned(),
            completer: "relation".to_owned(),
            outcome: "Class/ASD".to_owned(),
        }
    }
}

/// Everything needed to read and normalize one group's source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupEncoding {
    pub columns: ColumnNames,
    /// Cell values treated as missing (compared after trimming, case-insensitive).
    pub missing_markers: Vec<String>,
    pub age_unit: AgeUnit,
    /// Records older than this (in years) are rejected as outliers.
    #[serde(default)]
    pub max_age_years: Option<f64>,
    /// Documented sample size, checked after loading.
    #[serde(default)]
    pub expected_records: Option<usize>,
    pub gender: Vocabulary<Gender>,
    pub ethnicity: Vocabulary<Ethnicity>,
    pub completer: Vocabulary<Completer>,
    /// Table shared by the jaundice, family-history and prior-app-use flags.
    pub flags: Vocabulary<bool>,
    pub outcome: Vocabulary<bool>,
}

impl GroupEncoding {
    /// Whether `cell` is one of this encoding's missing-value markers.
    #[must_use]
    pub fn is_missing(&self, cell: &str) -> bool {
        let cell = cell.trim();
        self.missing_markers
            .iter()
            .any(|m| m.trim().eq_ignore_ascii_case(cell))
    }

    /// Encoding of the reference source for `group`.
    #[must_use]
    pub fn reference(group: AgeGroup) -> Self {
        let mut completer = vec![
            ("self", Completer::SelfReport),
            ("parent", Completer::Parent),
            ("relative", Completer::Relative),
            ("health care professional", Completer::HealthCareProfessional),
        ];
        let expected_records = match group {
            AgeGroup::Child => 292,
            AgeGroup::Adolescent => 104,
            AgeGroup::Adult => {
                completer.push(("others", Completer::Other));
                704
            }
        };

        Self {
            columns: ColumnNames::default(),
            missing_markers: ["?", "", "NA", "NaN"].map(str::to_owned).to_vec(),
            age_unit: AgeUnit::Years,
            max_age_years: Some(100.0),
            expected_records: Some(expected_records),
            gender: Vocabulary::new([
                ("m", Gender::Male),
                ("f", Gender::Female),
                ("male", Gender::Male),
                ("female", Gender::Female),
            ]),
            ethnicity: Vocabulary::new([
                ("white-european", Ethnicity::WhiteEuropean),
                ("asian", Ethnicity::Asian),
                ("middle eastern", Ethnicity::MiddleEastern),
                ("black", Ethnicity::Black),
                ("south asian", Ethnicity::SouthAsian),
                ("hispanic", Ethnicity::Hispanic),
                ("latino", Ethnicity::Latino),
                ("pasifika", Ethnicity::Pasifika),
                ("turkish", Ethnicity::Turkish),
                ("others", Ethnicity::Other),
            ]),
            completer: Vocabulary::new(completer),
            flags: Vocabulary::yes_no(),
            outcome: Vocabulary::yes_no(),
        }
    }
}

/// Encodings for every group, keyed by group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodingSet {
    groups: BTreeMap<AgeGroup, GroupEncoding>,
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum EncodingError {
    #[display("failed to read encoding file {}", path)]
    Read { path: String, source: io::Error },
    #[display("failed to parse encoding JSON")]
    Parse { source: serde_json::Error },
    #[display("no encoding for group '{group}'")]
    MissingGroup { group: AgeGroup },
}

impl EncodingSet {
    /// Encodings of the three reference sources.
    #[must_use]
    pub fn reference() -> Self {
        let groups = AgeGroup::ALL
            .into_iter()
            .map(|g| (g, GroupEncoding::reference(g)))
            .collect();
        Self { groups }
    }

    /// Reads an encoding set from JSON. Every group must be present.
    pub fn from_reader<R>(reader: R) -> Result<Self, EncodingError>
    where
        R: io::Read,
    {
        let set: Self =
            serde_json::from_reader(reader).map_err(|source| EncodingError::Parse { source })?;
        for group in AgeGroup::ALL {
            set.get(group)?;
        }
        Ok(set)
    }

    pub fn from_path<P>(path: P) -> Result<Self, EncodingError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| EncodingError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_reader(io::BufReader::new(file))
    }

    pub fn get(&self, group: AgeGroup) -> Result<&GroupEncoding, EncodingError> {
        self.groups
            .get(&group)
            .ok_or(EncodingError::MissingGroup { group })
    }

    pub fn iter(&self) -> impl Iterator<Item = (AgeGroup, &GroupEncoding)> + '_ {
        self.groups.iter().map(|(g, e)| (*g, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_vocabularies_differ_by_group() {
        let child = GroupEncoding::reference(AgeGroup::Child);
        let adult = GroupEncoding::reference(AgeGroup::Adult);
        assert_eq!(child.completer.lookup("Others"), None);
        assert_eq!(adult.completer.lookup("Others"), Some(Completer::Other));
        assert_eq!(child.expected_records, Some(292));
        assert_eq!(adult.expected_records, Some(704));
    }

    #[test]
    fn test_missing_markers() {
        let enc = GroupEncoding::reference(AgeGroup::Adolescent);
        assert!(enc.is_missing("?"));
        assert!(enc.is_missing("  "));
        assert!(enc.is_missing("na"));
        assert!(!enc.is_missing("0"));
    }

    #[test]
    fn test_age_unit_conversion() {
        assert_eq!(AgeUnit::Months.to_years(18.0), 1.5);
        assert_eq!(AgeUnit::Years.to_years(18.0), 18.0);
    }

    #[test]
    fn test_json_round_trip_keeps_every_group() {
        let set = EncodingSet::reference();
        let json = serde_json::to_string(&set).unwrap();
        let parsed = EncodingSet::from_reader(json.as_bytes()).unwrap();
        assert_eq!(parsed, set);
    }

    #[test]
    fn test_incomplete_set_is_rejected() {
        let mut value = serde_json::to_value(EncodingSet::reference()).unwrap();
        value.as_object_mut().unwrap().remove("adolescent");
        let json = serde_json::to_string(&value).unwrap();
        let err = EncodingSet::from_reader(json.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            EncodingError::MissingGroup {
                group: AgeGroup::Adolescent
            }
        ));
    }
}
