use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    encoding::GroupEncoding,
    group::AgeGroup,
    loader::{self, LoadError, LoadedSource},
    normalize::{self, NormalizationFailureCounts},
    record::NormalizedRecord,
};

/// Comparison of a loaded group against its documented sample size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeCheck {
    pub expected: usize,
    pub actual: usize,
}

impl SizeCheck {
    #[must_use]
    pub fn matches(&self) -> bool {
        self.expected == self.actual
    }
}

/// Normalized records of one group together with what was dropped on the way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupDataset {
    pub group: AgeGroup,
    pub records: Vec<NormalizedRecord>,
    /// Rows skipped by the loader.
    pub load_failures: usize,
    pub normalization_failures: NormalizationFailureCounts,
    /// Present when the encoding documents an expected record count.
    pub size_check: Option<SizeCheck>,
}

impl GroupDataset {
    /// Normalizes a loaded source.
    ///
    /// The size check compares the number of rows the loader produced with the
    /// documented sample size, before any record is dropped for normalization.
    #[must_use]
    pub fn from_source(source: &LoadedSource, encoding: &GroupEncoding) -> Self {
        let group = source.group;
        let (records, normalization_failures) =
            normalize::normalize_all(&source.records, group, encoding);

        let size_check = encoding.expected_records.map(|expected| SizeCheck {
            expected,
            actual: source.records.len(),
        });
        if let Some(check) = size_check.filter(|c| !c.matches()) {
            log::warn!(
                "{group}: expected {} records, loaded {}",
                check.expected,
                check.actual
            );
        }
        if normalization_failures.total() > 0 {
            log::warn!(
                "{group}: dropped {} records that could not be normalized",
                normalization_failures.total()
            );
        }
        log::info!("{group}: {} records ready for analysis", records.len());

        Self {
            group,
            records,
            load_failures: source.failure_count(),
            normalization_failures,
            size_check,
        }
    }

    /// Loads and normalizes the source at `path`.
    pub fn load<P>(group: AgeGroup, path: P, encoding: &GroupEncoding) -> Result<Self, LoadError>
    where
        P: AsRef<Path>,
    {
        let source = loader::load_path(group, path, encoding)?;
        Ok(Self::from_source(&source, encoding))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
