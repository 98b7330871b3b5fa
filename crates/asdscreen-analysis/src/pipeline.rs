//! Runs the per-group load, normalize and analyze pipelines and joins them
//! into a [`ComparativeModel`].

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use asdscreen_dataset::{
    dataset::GroupDataset,
    encoding::{EncodingError, EncodingSet, GroupEncoding},
    group::AgeGroup,
    loader::LoadError,
};
use chrono::{DateTime, Utc};
use rayon::prelude::*;

use crate::{
    config::{AnalysisConfig, ConfigError},
    report::{ComparativeModel, GroupReport, MissingGroup},
};

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum PipelineError {
    #[display("invalid analysis configuration")]
    Config { source: ConfigError },
    #[display("no source given for the {group} group")]
    MissingSource { group: AgeGroup },
    #[display("no encoding for the {group} group")]
    Encoding {
        group: AgeGroup,
        source: EncodingError,
    },
    #[display("failed to load the {group} group")]
    Load { group: AgeGroup, source: LoadError },
}

/// One analysis run over up to three group sources.
///
/// ```no_run
/// use asdscreen_analysis::{config::AnalysisConfig, pipeline::Pipeline};
/// use asdscreen_dataset::{encoding::EncodingSet, group::AgeGroup};
///
/// let model = Pipeline::new(EncodingSet::reference(), AnalysisConfig::default())
///     .source(AgeGroup::Child, "child.csv")
///     .source(AgeGroup::Adolescent, "adolescent.csv")
///     .source(AgeGroup::Adult, "adult.csv")
///     .run()?;
/// println!("{}", model.groups().len());
/// # Ok::<(), asdscreen_analysis::pipeline::PipelineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Pipeline {
    sources: BTreeMap<AgeGroup, PathBuf>,
    encodings: EncodingSet,
    config: AnalysisConfig,
    allow_missing_groups: bool,
    generated_at: Option<DateTime<Utc>>,
}

struct AnalyzedGroup {
    dataset: GroupDataset,
    report: GroupReport,
}

impl Pipeline {
    #[must_use]
    pub fn new(encodings: EncodingSet, config: AnalysisConfig) -> Self {
        Self {
            sources: BTreeMap::new(),
            encodings,
            config,
            allow_missing_groups: false,
            generated_at: None,
        }
    }

    #[must_use]
    pub fn source<P>(mut self, group: AgeGroup, path: P) -> Self
    where
        P: Into<PathBuf>,
    {
        self.sources.insert(group, path.into());
        self
    }

    /// Records unreadable or absent sources as missing groups instead of
    /// failing the run.
    #[must_use]
    pub fn allow_missing_groups(mut self, allow: bool) -> Self {
        self.allow_missing_groups = allow;
        self
    }

    /// Timestamp recorded in the model; the time of the run when unset.
    #[must_use]
    pub fn generated_at(mut self, generated_at: DateTime<Utc>) -> Self {
        self.generated_at = Some(generated_at);
        self
    }

    #[must_use]
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn run(&self) -> Result<ComparativeModel, PipelineError> {
        self.config
            .validate()
            .map_err(|source| PipelineError::Config { source })?;
        let jobs = AgeGroup::ALL
            .into_iter()
            .map(|group| (group, self.sources.get(&group)))
            .collect::<Vec<_>>();
        log::info!(
            "analyzing {} groups ({})",
            self.sources.len(),
            if self.config.parallel {
                "parallel"
            } else {
                "sequential"
            }
        );

        let results = if self.config.parallel {
            jobs.par_iter()
                .map(|&(group, path)| self.analyze(group, path))
                .collect::<Vec<_>>()
        } else {
            jobs.iter()
                .map(|&(group, path)| self.analyze(group, path))
                .collect::<Vec<_>>()
        };

        let mut datasets = vec![];
        let mut reports = vec![];
        let mut missing_groups = vec![];
        for ((group, _), result) in jobs.into_iter().zip(results) {
            match result {
                Ok(analyzed) => {
                    datasets.push(analyzed.dataset);
                    reports.push(analyzed.report);
                }
                Err(err @ (PipelineError::MissingSource { .. } | PipelineError::Load { .. }))
                    if self.allow_missing_groups =>
                {
                    log::warn!("{group}: skipped ({})", describe(&err));
                    missing_groups.push(MissingGroup {
                        group,
                        reason: describe(&err),
                    });
                }
                Err(err) => return Err(err),
            }
        }

        Ok(ComparativeModel::assemble(
            &datasets,
            reports,
            missing_groups,
            &self.config,
            self.generated_at.unwrap_or_else(Utc::now),
        ))
    }

    fn analyze(
        &self,
        group: AgeGroup,
        path: Option<&PathBuf>,
    ) -> Result<AnalyzedGroup, PipelineError> {
        let path = path.ok_or(PipelineError::MissingSource { group })?;
        let encoding = self
            .encodings
            .get(group)
            .map_err(|source| PipelineError::Encoding { group, source })?;
        let dataset = load(group, path, encoding)?;
        let report = GroupReport::compute(&dataset, &self.config);
        Ok(AnalyzedGroup { dataset, report })
    }
}

fn load(
    group: AgeGroup,
    path: &Path,
    encoding: &GroupEncoding,
) -> Result<GroupDataset, PipelineError> {
    log::info!("{group}: loading {}", path.display());
    GroupDataset::load(group, path, encoding)
        .map_err(|source| PipelineError::Load { group, source })
}

/// The error and its sources, joined into one line.
fn describe(err: &PipelineError) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
