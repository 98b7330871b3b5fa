use std::path::PathBuf;

use anyhow::Context;
use asdscreen_analysis::{config::AnalysisConfig, pipeline::Pipeline, report::ComparativeModel};
use asdscreen_dataset::{encoding::EncodingSet, group::AgeGroup};
use clap::{Args, Parser, Subcommand};

use self::{
    analyze::AnalyzeArg, encodings::EncodingsArg, query::QueryArg, summary::SummaryArg,
};

mod analyze;
mod encodings;
mod query;
mod summary;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Analyze the three group sources and write the comparative model as JSON
    Analyze(#[clap(flatten)] AnalyzeArg),
    /// Analyze the three group sources and print plain-text tables
    Summary(#[clap(flatten)] SummaryArg),
    /// Dump the built-in encoding tables as JSON
    Encodings(#[clap(flatten)] EncodingsArg),
    /// Look up a metric in a saved comparative model
    Query(#[clap(flatten)] QueryArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Analyze(arg) => analyze::run(&arg)?,
        Mode::Summary(arg) => summary::run(&arg)?,
        Mode::Encodings(arg) => encodings::run(&arg)?,
        Mode::Query(arg) => query::run(&arg)?,
    }
    Ok(())
}

/// Sources and thresholds shared by `analyze` and `summary`.
#[derive(Debug, Clone, Args)]
pub(crate) struct SourceArg {
    /// CSV source of the child group (4-11 years)
    pub child: PathBuf,
    /// CSV source of the adolescent group (12-16 years)
    pub adolescent: PathBuf,
    /// CSV source of the adult group (18+ years)
    pub adult: PathBuf,

    /// Encoding tables JSON (see `encodings`); built-in tables when omitted
    #[arg(long)]
    pub encodings: Option<PathBuf>,

    /// Analyze the groups one after another instead of in parallel
    #[arg(long)]
    pub sequential: bool,

    /// Gender strata with fewer known outcomes are flagged low-confidence
    #[arg(long, default_value_t = 5)]
    pub min_stratum: usize,

    /// Minimum complete cases needed for variable importance
    #[arg(long, default_value_t = 30)]
    pub min_complete_cases: usize,

    /// Seed of the holdout split
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Share of complete cases held out to evaluate the importance model
    #[arg(long, default_value_t = 0.25)]
    pub test_fraction: f64,

    /// Record unreadable sources as missing groups instead of failing
    #[arg(long)]
    pub allow_missing_groups: bool,
}

impl SourceArg {
    fn config(&self) -> AnalysisConfig {
        AnalysisConfig {
            min_stratum: self.min_stratum,
            min_complete_cases: self.min_complete_cases,
            seed: self.seed,
            test_fraction: self.test_fraction,
            parallel: !self.sequential,
            ..AnalysisConfig::default()
        }
    }

    fn encodings(&self) -> anyhow::Result<EncodingSet> {
        match &self.encodings {
            Some(path) => EncodingSet::from_path(path)
                .with_context(|| format!("Failed to load encodings: {}", path.display())),
            None => Ok(EncodingSet::reference()),
        }
    }

    pub(crate) fn run_pipeline(&self) -> anyhow::Result<ComparativeModel> {
        let model = Pipeline::new(self.encodings()?, self.config())
            .source(AgeGroup::Child, &self.child)
            .source(AgeGroup::Adolescent, &self.adolescent)
            .source(AgeGroup::Adult, &self.adult)
            .allow_missing_groups(self.allow_missing_groups)
            .run()
            .context("Analysis failed")?;
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory as _;

    use super::*;

    #[test]
    fn test_command_definition() {
        CommandArgs::command().debug_assert();
    }

    #[test]
    fn test_analyze_flags_set_config() {
        let args = CommandArgs::try_parse_from([
            "asdscreen",
            "analyze",
            "c.csv",
            "t.csv",
            "a.csv",
            "--sequential",
            "--min-complete-cases",
            "50",
            "--seed",
            "7",
        ])
        .unwrap();
        let Mode::Analyze(arg) = args.mode else {
            panic!("expected analyze");
        };
        let config = arg.source.config();
        assert!(!config.parallel);
        assert_eq!(config.min_complete_cases, 50);
        assert_eq!(config.seed, 7);
        assert_eq!(config.min_stratum, 5);
        assert_eq!(config.test_fraction, 0.25);
        assert_eq!(arg.source.adult, PathBuf::from("a.csv"));
    }

    #[test]
    fn test_out_of_range_test_fraction_fails_the_run() {
        let args = CommandArgs::try_parse_from([
            "asdscreen",
            "summary",
            "c.csv",
            "t.csv",
            "a.csv",
            "--test-fraction",
            "1.5",
        ])
        .unwrap();
        let Mode::Summary(arg) = args.mode else {
            panic!("expected summary");
        };
        let err = arg.source.run_pipeline().unwrap_err();
        assert!(format!("{err:#}").contains("test fraction 1.5"));
    }
}
