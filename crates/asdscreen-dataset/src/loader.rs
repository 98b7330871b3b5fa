//! CSV loading of one group's raw records.
//!
//! A load never fails because of a single bad row. Rows with the wrong number
//! of fields, non-binary item responses, unparsable numbers or undecodable
//! bytes are skipped and reported as [`RowFailure`]s, separately from cells
//! that merely hold a missing-value marker.
//!
//! Only two conditions abort a load, both reported as [`LoadError`]:
//! the source cannot be opened or read, or its header lacks a configured
//! column. A readable source with zero valid rows is a successful load with
//! no records.

use std::{collections::HashMap, fmt, fs::File, io, path::Path};

use serde::{Deserialize, Serialize};

use crate::{encoding::GroupEncoding, group::AgeGroup, record::RawRecord};

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum LoadError {
    #[display("failed to open {group} source {}", path.display())]
    Open {
        group: AgeGroup,
        path: std::path::PathBuf,
        source: io::Error,
    },
    #[display("failed to read {group} source")]
    Read { group: AgeGroup, source: csv::Error },
    #[display("{group} source has no column '{column}'")]
    MissingColumn { group: AgeGroup, column: String },
}

/// Why a row was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowFailureKind {
    FieldCount { expected: usize, found: usize },
    InvalidItem { column: String, value: String },
    InvalidNumber { column: String, value: String },
    Undecodable { message: String },
}

impl fmt::Display for RowFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FieldCount { expected, found } => {
                write!(f, "expected {expected} fields, found {found}")
            }
            Self::InvalidItem { column, value } => {
                write!(f, "item column '{column}' has non-binary value '{value}'")
            }
            Self::InvalidNumber { column, value } => {
                write!(f, "column '{column}' has non-numeric value '{value}'")
            }
            Self::Undecodable { message } => write!(f, "undecodable row: {message}"),
        }
    }
}

/// A row skipped during loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowFailure {
    pub line: u64,
    #[serde(flatten)]
    pub kind: RowFailureKind,
}

/// Raw records read from one source, plus the rows that could not be parsed.
#[derive(Debug, Clone)]
pub struct LoadedSource {
    pub group: AgeGroup,
    pub records: Vec<RawRecord>,
    pub failures: Vec<RowFailure>,
}

impl LoadedSource {
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }
}

/// Opens `path` and loads it with [`load_reader`].
pub fn load_path<P>(
    group: AgeGroup,
    path: P,
    encoding: &GroupEncoding,
) -> Result<LoadedSource, LoadError>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::Open {
        group,
        path: path.to_owned(),
        source,
    })?;
    log::info!("Loading {group} records from {}", path.display());
    load_reader(group, io::BufReader::new(file), encoding)
}

/// Loads a group's raw records from CSV data with a header row.
pub fn load_reader<R>(
    group: AgeGroup,
    reader: R,
    encoding: &GroupEncoding,
) -> Result<LoadedSource, LoadError>
where
    R: io::Read,
{
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::None)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|source| LoadError::Read { group, source })?
        .clone();
    let layout = ColumnLayout::resolve(group, &headers, encoding)?;

    let mut records = vec![];
    let mut failures = vec![];
    let mut row = csv::StringRecord::new();
    loop {
        let line = reader.position().line();
        match reader.read_record(&mut row) {
            Ok(false) => break,
            Ok(true) => {
                let line = row.position().map_or(line, csv::Position::line);
                match layout.parse_row(&row, line, encoding) {
                    Ok(record) => records.push(record),
                    Err(kind) => {
                        log::debug!("{group} line {line}: {kind}");
                        failures.push(RowFailure { line, kind });
                    }
                }
            }
            Err(err) => match err.kind() {
                csv::ErrorKind::Utf8 { pos, err: utf8 } => {
                    let line = pos.as_ref().map_or(line, csv::Position::line);
                    let kind = RowFailureKind::Undecodable {
                        message: utf8.to_string(),
                    };
                    log::debug!("{group} line {line}: {kind}");
                    failures.push(RowFailure { line, kind });
                }
                _ => return Err(LoadError::Read { group, source: err }),
            },
        }
    }

    if !failures.is_empty() {
        log::warn!(
            "{group}: skipped {} malformed rows, loaded {}",
            failures.len(),
            records.len()
        );
    }
    Ok(LoadedSource {
        group,
        records,
        failures,
    })
}

/// Field positions of the configured columns within the header.
#[derive(Debug)]
struct ColumnLayout {
    width: usize,
    items: Vec<(usize, String)>,
    age: usize,
    gender: usize,
    ethnicity: usize,
    jaundice: usize,
    family_history: usize,
    country: usize,
    used_app_before: usize,
    score: usize,
    completer: usize,
    outcome: usize,
}

impl ColumnLayout {
    fn resolve(
        group: AgeGroup,
        headers: &csv::StringRecord,
        encoding: &GroupEncoding,
    ) -> Result<Self, LoadError> {
        let positions = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim(), i))
            .collect::<HashMap<_, _>>();
        let find = |column: &str| {
            positions
                .get(column.trim())
                .copied()
                .ok_or_else(|| LoadError::MissingColumn {
                    group,
                    column: column.to_owned(),
                })
        };

        let columns = &encoding.columns;
        let items = columns
            .items
            .iter()
            .map(|c| Ok((find(c)?, c.clone())))
            .collect::<Result<Vec<_>, LoadError>>()?;

        Ok(Self {
            width: headers.len(),
            items,
            age: find(&columns.age)?,
            gender: find(&columns.gender)?,
            ethnicity: find(&columns.ethnicity)?,
            jaundice: find(&columns.jaundice)?,
            family_history: find(&columns.family_history)?,
            country: find(&columns.country)?,
            used_app_before: find(&columns.used_app_before)?,
            score: find(&columns.score)?,
            completer: find(&columns.completer)?,
            outcome: find(&columns.outcome)?,
        })
    }

    fn parse_row(
        &self,
        row: &csv::StringRecord,
        line: u64,
        encoding: &GroupEncoding,
    ) -> Result<RawRecord, RowFailureKind> {
        if row.len() != self.width {
            return Err(RowFailureKind::FieldCount {
                expected: self.width,
                found: row.len(),
            });
        }

        let cell = |idx: usize| {
            let value = row.get(idx).unwrap_or_default();
            (!encoding.is_missing(value)).then(|| value.trim())
        };
        let text = |idx: usize| cell(idx).map(str::to_owned);

        let mut items = [None; crate::record::ITEM_COUNT];
        for (slot, (idx, column)) in items.iter_mut().zip(&self.items) {
            *slot = cell(*idx)
                .map(|v| parse_binary(v, column))
                .transpose()?;
        }

        let age_column = &encoding.columns.age;
        let age = cell(self.age)
            .map(|v| match v.parse::<f64>() {
                Ok(age) if age.is_finite() && age >= 0.0 => Ok(age),
                _ => Err(invalid_number(age_column, v)),
            })
            .transpose()?;
        let score_column = &encoding.columns.score;
        let score = cell(self.score)
            .map(|v| parse_count(v).ok_or_else(|| invalid_number(score_column, v)))
            .transpose()?;

        Ok(RawRecord {
            line,
            items,
            age,
            gender: text(self.gender),
            ethnicity: text(self.ethnicity),
            country: text(self.country),
            jaundice: text(self.jaundice),
            family_history: text(self.family_history),
            completer: text(self.completer),
            used_app_before: text(self.used_app_before),
            score,
            outcome: text(self.outcome),
        })
    }
}

fn invalid_number(column: &str, value: &str) -> RowFailureKind {
    RowFailureKind::InvalidNumber {
        column: column.to_owned(),
        value: value.to_owned(),
    }
}

fn parse_binary(value: &str, column: &str) -> Result<bool, RowFailureKind> {
    match parse_count(value) {
        Some(0) => Ok(false),
        Some(1) => Ok(true),
        _ => Err(RowFailureKind::InvalidItem {
            column: column.to_owned(),
            value: value.to_owned(),
        }),
    }
}

/// Parses a non-negative integer, accepting a float spelling such as `6.0`.
#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_count(value: &str) -> Option<u32> {
    if let Ok(n) = value.parse::<u32>() {
        return Some(n);
    }
    let f = value.parse::<f64>().ok()?;
    (f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= f64::from(u32::MAX)).then_some(f as u32)
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;

    const HEADER: &str = "id,A1_Score,A2_Score,A3_Score,A4_Score,A5_Score,A6_Score,A7_Score,\
        A8_Score,A9_Score,A10_Score,age,gender,ethnicity,jundice,austim,contry_of_res,\
        used_app_before,result,age_desc,relation,Class/ASD";

    fn row(id: usize, items: &str, age: &str, score: &str, outcome: &str) -> String {
        format!(
            "{id},{items},{age},m,White-European,no,yes,'United States',no,{score},\
             '4-11 years',Parent,{outcome}"
        )
    }

    fn encoding() -> GroupEncoding {
        GroupEncoding::reference(AgeGroup::Child)
    }

    #[test]
    fn test_parses_a_valid_row() {
        let data = format!(
            "{HEADER}\n{}\n",
            row(1, "1,0,1,0,1,0,1,0,1,0", "6", "5", "NO")
        );
        let loaded = load_reader(AgeGroup::Child, data.as_bytes(), &encoding()).unwrap();
        assert_eq!(loaded.failure_count(), 0);
        let record = &loaded.records[0];
        assert_eq!(record.line, 2);
        assert_eq!(record.items[0], Some(true));
        assert_eq!(record.items[1], Some(false));
        assert_eq!(record.age, Some(6.0));
        assert_eq!(record.score, Some(5));
        assert_eq!(record.gender.as_deref(), Some("m"));
        assert_eq!(record.family_history.as_deref(), Some("yes"));
        assert_eq!(record.outcome.as_deref(), Some("NO"));
    }

    #[test]
    fn test_columns_are_found_by_header_name() {
        // reordered, no age_desc, one column the encoding does not know
        let data = "Class/ASD,relation,result,used_app_before,contry_of_res,austim,jundice,\
            ethnicity,gender,age,A10_Score,A9_Score,A8_Score,A7_Score,A6_Score,A5_Score,\
            A4_Score,A3_Score,A2_Score,A1_Score,notes\n\
            YES,Parent,3,no,Jordan,no,no,Asian,f,7,0,0,0,0,0,0,0,1,1,1,retest\n";
        let loaded = load_reader(AgeGroup::Child, data.as_bytes(), &encoding()).unwrap();
        assert_eq!(loaded.failure_count(), 0);
        let record = &loaded.records[0];
        assert_eq!(record.items[..3], [Some(true); 3]);
        assert_eq!(record.items[9], Some(false));
        assert_eq!(record.age, Some(7.0));
        assert_eq!(record.score, Some(3));
        assert_eq!(record.outcome.as_deref(), Some("YES"));
    }

    #[test]
    fn test_missing_markers_become_none() {
        let data = format!(
            "{HEADER}\n{}\n",
            row(1, "?,0,1,0,1,0,1,0,1,0", "?", "", "YES")
        );
        let loaded = load_reader(AgeGroup::Child, data.as_bytes(), &encoding()).unwrap();
        assert_eq!(loaded.failure_count(), 0);
        let record = &loaded.records[0];
        assert_eq!(record.items[0], None);
        assert_eq!(record.age, None);
        assert_eq!(record.score, None);
    }

    #[test]
    fn test_two_malformed_rows_of_hundred_are_skipped() {
        let mut data = format!("{HEADER}\n");
        for i in 0..100 {
            let line = match i {
                17 => "1,2,3".to_owned(),
                58 => row(i, "1,0,1,0,1,0,1,0,1,7", "9", "6", "YES"),
                _ => row(i, "1,1,1,1,1,1,0,0,0,0", "9", "6", "YES"),
            };
            data.push_str(&line);
            data.push('\n');
        }
        let loaded = load_reader(AgeGroup::Child, data.as_bytes(), &encoding()).unwrap();
        assert_eq!(loaded.records.len(), 98);
        assert_eq!(loaded.failure_count(), 2);
        assert!(matches!(
            loaded.failures[0].kind,
            RowFailureKind::FieldCount { found: 3, .. }
        ));
        assert!(matches!(
            loaded.failures[1].kind,
            RowFailureKind::InvalidItem { ref column, .. } if column == "A10_Score"
        ));
    }

    #[test]
    fn test_non_numeric_age_is_a_row_failure() {
        let data = format!(
            "{HEADER}\n{}\n",
            row(1, "1,0,1,0,1,0,1,0,1,0", "six", "5", "NO")
        );
        let loaded = load_reader(AgeGroup::Child, data.as_bytes(), &encoding()).unwrap();
        assert!(loaded.records.is_empty());
        assert_eq!(
            loaded.failures[0].kind,
            RowFailureKind::InvalidNumber {
                column: "age".to_owned(),
                value: "six".to_owned()
            }
        );
    }

    #[test]
    fn test_float_spelled_score_is_accepted() {
        assert_eq!(parse_count("6.0"), Some(6));
        assert_eq!(parse_count("6.5"), None);
        assert_eq!(parse_count("-1"), None);
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let data = "A1_Score,age\n1,5\n";
        let err = load_reader(AgeGroup::Child, data.as_bytes(), &encoding()).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn { ref column, .. } if column == "A2_Score"));
    }

    #[test]
    fn test_header_only_source_loads_zero_records() {
        let data = format!("{HEADER}\n");
        let loaded = load_reader(AgeGroup::Adult, data.as_bytes(), &encoding()).unwrap();
        assert!(loaded.records.is_empty());
        assert_eq!(loaded.failure_count(), 0);
    }

    #[test]
    fn test_missing_file_is_distinct_from_empty_source() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_path(AgeGroup::Adult, dir.path().join("absent.csv"), &encoding())
            .unwrap_err();
        assert!(matches!(err, LoadError::Open { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{HEADER}").unwrap();
        writeln!(file, "{}", row(1, "0,0,0,0,0,0,0,0,0,0", "14", "0", "NO")).unwrap();
        let loaded = load_path(AgeGroup::Adolescent, file.path(), &encoding()).unwrap();
        assert_eq!(loaded.group, AgeGroup::Adolescent);
        assert_eq!(loaded.records.len(), 1);
        assert_eq!(loaded.records[0].score, Some(0));
    }
}
